//! Longest-match lexer driven by a language's token table.

use ponos_abi::{Definition, RawLanguage, Symbol};
use regex::Regex;

use crate::language::{ERROR_SYMBOL, LanguageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
	pub symbol: Symbol,
	pub start: usize,
	pub end: usize,
}

/// Lexer output. Extras are kept apart so the parser never sees them.
#[derive(Debug, Default)]
pub(crate) struct Lexed {
	pub tokens: Vec<Token>,
	pub extras: Vec<Token>,
}

pub(crate) struct Lexer {
	/// Sorted longest first.
	literals: Vec<(&'static str, Symbol)>,
	/// Anchored at the start of the remaining input.
	patterns: Vec<(Regex, Symbol)>,
	extras: Vec<Symbol>,
}

impl Lexer {
	pub(crate) fn new(raw: &RawLanguage) -> Result<Self, LanguageError> {
		let mut literals = Vec::new();
		let mut patterns = Vec::new();

		for (symbol, info) in (0..ERROR_SYMBOL).zip(raw.symbols) {
			match info.definition {
				Definition::Literal(text) => {
					if text.is_empty() {
						return Err(LanguageError::EmptyToken(info.name.to_string()));
					}
					literals.push((text, symbol));
				}
				Definition::Pattern(pattern) => {
					let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
						LanguageError::InvalidPattern {
							name: info.name.to_string(),
							source,
						}
					})?;
					if regex.is_match("") {
						return Err(LanguageError::EmptyToken(info.name.to_string()));
					}
					patterns.push((regex, symbol));
				}
				_ => {}
			}
		}

		literals.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

		Ok(Self {
			literals,
			patterns,
			extras: raw.extras.to_vec(),
		})
	}

	/// Splits `text` into tokens.
	///
	/// Whitespace separates tokens and is dropped. Characters no token
	/// matches are merged into runs of [`ERROR_SYMBOL`] tokens.
	pub(crate) fn tokenize(&self, text: &str) -> Lexed {
		let mut lexed = Lexed::default();
		let mut pos = 0;

		while let Some(ch) = text[pos..].chars().next() {
			if ch.is_whitespace() {
				pos += ch.len_utf8();
				continue;
			}

			match self.longest_match(&text[pos..]) {
				Some((symbol, len)) => {
					let token = Token {
						symbol,
						start: pos,
						end: pos + len,
					};
					if self.extras.contains(&symbol) {
						lexed.extras.push(token);
					} else {
						lexed.tokens.push(token);
					}
					pos += len;
				}
				None => {
					let end = pos + ch.len_utf8();
					match lexed.tokens.last_mut() {
						Some(last) if last.symbol == ERROR_SYMBOL && last.end == pos => last.end = end,
						_ => lexed.tokens.push(Token {
							symbol: ERROR_SYMBOL,
							start: pos,
							end,
						}),
					}
					pos = end;
				}
			}
		}

		lexed
	}

	/// Longest token at the start of `rest`. Literals win ties so keywords
	/// beat identifiers.
	fn longest_match(&self, rest: &str) -> Option<(Symbol, usize)> {
		let mut best = self
			.literals
			.iter()
			.find(|(text, _)| rest.starts_with(text))
			.map(|&(text, symbol)| (symbol, text.len()));

		for (regex, symbol) in &self.patterns {
			if let Some(m) = regex.find(rest)
				&& m.end() > best.map_or(0, |(_, len)| len)
			{
				best = Some((*symbol, m.end()));
			}
		}

		best
	}
}

impl std::fmt::Debug for Lexer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Lexer")
			.field("literals", &self.literals.len())
			.field("patterns", &self.patterns.len())
			.finish()
	}
}
