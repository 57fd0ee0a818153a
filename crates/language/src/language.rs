//! Language handles.
//!
//! A [`Language`] is the validated, runtime form of a grammar artifact. It is
//! only ever produced by [`Language::new`], so holding one means the artifact
//! passed every structural check and its token patterns compiled.

use std::fmt;
use std::sync::Arc;

use ponos_abi::{
	Definition, ExpressionTable, LANGUAGE_VERSION, LanguageFn, MIN_COMPATIBLE_LANGUAGE_VERSION,
	RawLanguage, Rule, Symbol, SymbolInfo,
};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::lexer::Lexer;

/// Kind id of `ERROR` nodes and unrecognised input.
pub const ERROR_SYMBOL: Symbol = Symbol::MAX;

const ERROR_KIND: &str = "ERROR";

/// Errors that can occur when constructing a [`Language`].
#[derive(Error, Debug)]
pub enum LanguageError {
	/// Artifact version outside the supported range.
	#[error("incompatible language version {version}, expected {min}..={max}")]
	Version { version: u32, min: u32, max: u32 },

	/// Artifact has no symbols at all.
	#[error("language has no symbols")]
	Empty,

	/// More symbols than ids below [`ERROR_SYMBOL`].
	#[error("language has {0} symbols, at most {max} are supported", max = ERROR_SYMBOL)]
	TooManySymbols(usize),

	/// Symbol 0 is not the end symbol.
	#[error("symbol 0 must be the end symbol")]
	MissingEnd,

	/// Two symbols share a name and namedness.
	#[error("duplicate symbol {0:?}")]
	DuplicateSymbol(String),

	/// Root symbol is out of range or not a rule.
	#[error("root symbol {0} is not a rule")]
	InvalidRoot(Symbol),

	/// A rule or table points at a symbol that cannot be parsed there.
	#[error("{rule} references invalid symbol {symbol}")]
	InvalidReference { rule: String, symbol: Symbol },

	/// An expression operator is not a literal token.
	#[error("{rule} uses symbol {symbol} as an operator but it is not a literal")]
	InvalidOperator { rule: String, symbol: Symbol },

	/// A token can match without consuming input.
	#[error("token {0:?} matches the empty string")]
	EmptyToken(String),

	/// A token pattern failed to compile.
	#[error("invalid pattern for {name}: {source}")]
	InvalidPattern {
		name: String,
		#[source]
		source: regex::Error,
	},

	/// An extra or recovery symbol is not a token.
	#[error("symbol {0} is not a token")]
	InvalidToken(Symbol),
}

/// Validated language handle.
///
/// Cheap to clone; all clones share the same compiled lexer.
#[derive(Clone)]
pub struct Language(Arc<LanguageInner>);

struct LanguageInner {
	raw: &'static RawLanguage,
	lexer: Lexer,
	kinds: FxHashMap<(&'static str, bool), Symbol>,
}

impl Language {
	/// Loads the artifact returned by a binding accessor.
	pub fn new(language_fn: LanguageFn) -> Result<Self, LanguageError> {
		Self::from_raw(language_fn.raw())
	}

	/// Validates a raw artifact and compiles its lexer.
	pub fn from_raw(raw: &'static RawLanguage) -> Result<Self, LanguageError> {
		check_version(raw.abi_version)?;
		if raw.symbols.is_empty() {
			return Err(LanguageError::Empty);
		}
		if raw.symbols.len() > ERROR_SYMBOL as usize {
			return Err(LanguageError::TooManySymbols(raw.symbols.len()));
		}
		if !matches!(raw.symbols[0].definition, Definition::End) {
			return Err(LanguageError::MissingEnd);
		}

		let mut kinds = FxHashMap::default();
		for (id, info) in (0..ERROR_SYMBOL).zip(raw.symbols) {
			if kinds.insert((info.name, info.named), id).is_some() {
				return Err(LanguageError::DuplicateSymbol(info.name.to_string()));
			}
		}

		match raw.symbols.get(raw.root as usize) {
			Some(SymbolInfo {
				definition: Definition::Rule(_),
				..
			}) => {}
			_ => return Err(LanguageError::InvalidRoot(raw.root)),
		}

		for info in raw.symbols {
			match info.definition {
				Definition::Rule(rule) => check_rule(raw, info.name, &rule)?,
				Definition::Expression(table) => check_table(raw, info.name, table)?,
				_ => {}
			}
		}

		for &symbol in raw.extras.iter().chain(raw.recovery) {
			if !raw
				.symbols
				.get(symbol as usize)
				.is_some_and(SymbolInfo::is_token)
			{
				return Err(LanguageError::InvalidToken(symbol));
			}
		}

		let lexer = Lexer::new(raw)?;

		debug!(
			language = raw.name,
			version = raw.abi_version,
			symbols = raw.symbols.len(),
			"Loaded language"
		);

		Ok(Self(Arc::new(LanguageInner { raw, lexer, kinds })))
	}

	/// Grammar name.
	pub fn name(&self) -> &'static str {
		self.0.raw.name
	}

	pub fn abi_version(&self) -> u32 {
		self.0.raw.abi_version
	}

	/// Number of symbols, including the end symbol.
	pub fn node_kind_count(&self) -> usize {
		self.0.raw.symbols.len()
	}

	/// Returns the kind name for `id`. [`ERROR_SYMBOL`] maps to `"ERROR"`.
	pub fn node_kind_for_id(&self, id: Symbol) -> Option<&'static str> {
		if id == ERROR_SYMBOL {
			return Some(ERROR_KIND);
		}
		self.symbol(id).map(|info| info.name)
	}

	/// Looks up a kind by name. Named and anonymous kinds live in separate
	/// namespaces, so `"bool"` and `(bool)` may differ.
	pub fn id_for_node_kind(&self, kind: &str, named: bool) -> Option<Symbol> {
		if named && kind == ERROR_KIND {
			return Some(ERROR_SYMBOL);
		}
		self.0.kinds.get(&(kind, named)).copied()
	}

	pub fn node_kind_is_named(&self, id: Symbol) -> bool {
		id == ERROR_SYMBOL || self.symbol(id).is_some_and(|info| info.named)
	}

	/// Whether nodes of this kind can appear in a tree.
	pub fn node_kind_is_visible(&self, id: Symbol) -> bool {
		id == ERROR_SYMBOL
			|| self
				.symbol(id)
				.is_some_and(|info| !info.hidden && !matches!(info.definition, Definition::End))
	}

	/// Kind name of the root node.
	pub fn root_kind(&self) -> &'static str {
		self.0.raw.symbols[self.0.raw.root as usize].name
	}

	pub(crate) fn raw(&self) -> &'static RawLanguage {
		self.0.raw
	}

	pub(crate) fn symbol(&self, id: Symbol) -> Option<&'static SymbolInfo> {
		self.0.raw.symbols.get(id as usize)
	}

	pub(crate) fn lexer(&self) -> &Lexer {
		&self.0.lexer
	}

	pub(crate) fn is_recovery(&self, id: Symbol) -> bool {
		self.0.raw.recovery.contains(&id)
	}
}

impl PartialEq for Language {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.0.raw, other.0.raw)
	}
}

impl Eq for Language {}

impl fmt::Debug for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Language")
			.field("name", &self.name())
			.field("abi_version", &self.abi_version())
			.field("node_kind_count", &self.node_kind_count())
			.finish()
	}
}

/// Fails unless `version` lies in the supported range.
pub(crate) fn check_version(version: u32) -> Result<(), LanguageError> {
	if (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
		Ok(())
	} else {
		Err(LanguageError::Version {
			version,
			min: MIN_COMPATIBLE_LANGUAGE_VERSION,
			max: LANGUAGE_VERSION,
		})
	}
}

fn check_rule(raw: &RawLanguage, owner: &str, rule: &Rule) -> Result<(), LanguageError> {
	match *rule {
		Rule::Symbol(symbol) => check_reference(raw, owner, symbol),
		Rule::Seq(rules) | Rule::Choice(rules) => rules
			.iter()
			.try_for_each(|rule| check_rule(raw, owner, rule)),
		Rule::Repeat(inner) | Rule::Repeat1(inner) | Rule::Optional(inner) => {
			check_rule(raw, owner, inner)
		}
	}
}

/// Parseable symbols: tokens, rules and expression tables.
fn check_reference(raw: &RawLanguage, owner: &str, symbol: Symbol) -> Result<(), LanguageError> {
	match raw.symbols.get(symbol as usize).map(|info| info.definition) {
		Some(
			Definition::Literal(_)
			| Definition::Pattern(_)
			| Definition::Rule(_)
			| Definition::Expression(_),
		) => Ok(()),
		_ => Err(LanguageError::InvalidReference {
			rule: owner.to_string(),
			symbol,
		}),
	}
}

fn check_table(
	raw: &RawLanguage,
	owner: &str,
	table: &ExpressionTable,
) -> Result<(), LanguageError> {
	check_rule(raw, owner, &table.operand)?;

	let operators = table
		.prefix
		.iter()
		.map(|op| (op.operator, op.node))
		.chain(table.infix.iter().map(|op| (op.operator, op.node)));
	for (operator, node) in operators {
		if !matches!(
			raw.symbols.get(operator as usize).map(|info| info.definition),
			Some(Definition::Literal(_))
		) {
			return Err(LanguageError::InvalidOperator {
				rule: owner.to_string(),
				symbol: operator,
			});
		}
		check_node(raw, owner, node)?;
	}

	for postfix in table.postfix {
		check_rule(raw, owner, &postfix.rule)?;
		check_node(raw, owner, postfix.node)?;
	}
	Ok(())
}

/// Nodes built by a table must be visible, named and not the end symbol.
fn check_node(raw: &RawLanguage, owner: &str, node: Symbol) -> Result<(), LanguageError> {
	match raw.symbols.get(node as usize) {
		Some(info) if info.named && !info.hidden && !matches!(info.definition, Definition::End) => {
			Ok(())
		}
		_ => Err(LanguageError::InvalidReference {
			rule: owner.to_string(),
			symbol: node,
		}),
	}
}
