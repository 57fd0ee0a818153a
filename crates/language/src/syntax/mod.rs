//! Parsing text into syntax trees.
//!
//! A [`Parser`] is bound to one [`Language`] at a time and turns source text
//! into an immutable [`Tree`]. Parsing never fails outright: input the
//! grammar cannot place ends up inside `ERROR` nodes.

use tracing::{trace, warn};

use crate::language::{Language, LanguageError, check_version};

mod engine;
mod tree;

pub use tree::{Node, Point, Range, Tree};

/// Default limit on nested rule applications.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Largest nesting limit a parser accepts. The engine recurses once per
/// level, so this keeps a parse within a default thread stack.
pub const MAX_DEPTH_LIMIT: usize = 1024;

/// Options controlling a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
	/// Nesting beyond this many rules is treated as a failed match.
	/// Clamped to [`MAX_DEPTH_LIMIT`] by the parser.
	pub max_depth: usize,
}

impl ParserOptions {
	fn clamped(self) -> Self {
		Self {
			max_depth: self.max_depth.min(MAX_DEPTH_LIMIT),
		}
	}
}

impl Default for ParserOptions {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

#[derive(Debug, Default)]
pub struct Parser {
	language: Option<Language>,
	options: ParserOptions,
}

impl Parser {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: ParserOptions) -> Self {
		Self {
			language: None,
			options: options.clamped(),
		}
	}

	/// Options in effect, after clamping.
	pub fn options(&self) -> ParserOptions {
		self.options
	}

	pub fn set_options(&mut self, options: ParserOptions) {
		self.options = options.clamped();
	}

	/// Binds the parser to `language`, replacing any previous one.
	pub fn set_language(&mut self, language: &Language) -> Result<(), LanguageError> {
		check_version(language.abi_version())?;
		self.language = Some(language.clone());
		Ok(())
	}

	pub fn language(&self) -> Option<&Language> {
		self.language.as_ref()
	}

	/// Parses `text`. Returns `None` if no language has been set.
	pub fn parse(&mut self, text: &str) -> Option<Tree> {
		let language = self.language.as_ref()?;
		let lexed = language.lexer().tokenize(text);

		let mut engine = engine::Engine::new(
			language,
			&lexed.tokens,
			text.len(),
			self.options.max_depth,
		);
		let mut root = engine.parse_root();
		if engine.truncated {
			warn!(
				language = language.name(),
				max_depth = self.options.max_depth,
				"Parse hit the nesting limit"
			);
		}
		engine::attach_extras(&mut root, &lexed.extras);

		trace!(
			language = language.name(),
			bytes = text.len(),
			tokens = lexed.tokens.len(),
			steps = engine.steps,
			"Parsed"
		);
		Some(tree::Tree::build(language.clone(), root, text))
	}
}
