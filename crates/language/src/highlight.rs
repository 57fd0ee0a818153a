//! Syntax highlighting.
//!
//! A [`HighlightConfiguration`] pairs a language with a highlight query whose
//! capture names (`@keyword`, `@string`, ...) become highlight classes.
//! [`HighlightConfiguration::highlight`] flattens the captures of a tree into
//! a sequence of non-overlapping spans.

use tracing::warn;

use crate::language::Language;
use crate::query::{Query, QueryError};
use crate::syntax::Tree;

/// Index into [`HighlightConfiguration::names`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Highlight(pub u32);

impl Highlight {
	pub const fn idx(self) -> usize {
		self.0 as usize
	}
}

/// A span of text with a specific highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
	/// Start byte offset (inclusive).
	pub start: u32,
	/// End byte offset (exclusive).
	pub end: u32,
	pub highlight: Highlight,
}

impl HighlightSpan {
	/// Byte range, for slicing the source text.
	pub fn range(&self) -> std::ops::Range<usize> {
		self.start as usize..self.end as usize
	}

	pub fn is_empty(&self) -> bool {
		self.start >= self.end
	}
}

#[derive(Debug)]
pub struct HighlightConfiguration {
	language: Language,
	query: Query,
}

impl HighlightConfiguration {
	pub fn new(language: &Language, query: &str) -> Result<Self, QueryError> {
		Ok(Self {
			language: language.clone(),
			query: Query::new(language, query)?,
		})
	}

	/// Highlight class names, indexed by [`Highlight`].
	pub fn names(&self) -> &[String] {
		self.query.capture_names()
	}

	pub fn query(&self) -> &Query {
		&self.query
	}

	/// Computes highlight spans for `tree`, in document order.
	///
	/// A capture nested inside another overrides it for its own range. When
	/// several patterns capture the same range, the earliest pattern wins.
	/// Adjacent spans with the same highlight are merged.
	pub fn highlight(&self, tree: &Tree) -> Vec<HighlightSpan> {
		if tree.language() != &self.language {
			warn!(
				expected = self.language.name(),
				actual = tree.language().name(),
				"Tree language does not match highlight configuration"
			);
			return Vec::new();
		}

		let mut captures: Vec<_> = self
			.query
			.matches(tree.root_node())
			.into_iter()
			.flat_map(|m| {
				let pattern = m.pattern_index;
				m.captures.into_iter().map(move |c| {
					(
						c.node.start_byte() as u32,
						c.node.end_byte() as u32,
						pattern,
						Highlight(c.index),
					)
				})
			})
			.filter(|&(start, end, ..)| start < end)
			.collect();
		captures.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)).then(a.2.cmp(&b.2)));
		captures.dedup_by(|later, earlier| later.0 == earlier.0 && later.1 == earlier.1);

		let mut spans = Vec::new();
		let mut stack: Vec<(u32, Highlight)> = Vec::new();
		let mut cursor = 0;
		for (start, end, _, highlight) in captures {
			while let Some(&(top_end, top)) = stack.last()
				&& top_end <= start
			{
				push_span(&mut spans, cursor, top_end, top);
				cursor = top_end;
				stack.pop();
			}
			if let Some(&(_, top)) = stack.last() {
				push_span(&mut spans, cursor, start, top);
			}
			cursor = start;
			let end = stack.last().map_or(end, |&(top_end, _)| end.min(top_end));
			stack.push((end, highlight));
		}
		while let Some((end, highlight)) = stack.pop() {
			push_span(&mut spans, cursor, end, highlight);
			cursor = end;
		}
		spans
	}
}

fn push_span(spans: &mut Vec<HighlightSpan>, start: u32, end: u32, highlight: Highlight) {
	if start >= end {
		return;
	}
	if let Some(last) = spans.last_mut()
		&& last.highlight == highlight
		&& last.end == start
	{
		last.end = end;
		return;
	}
	spans.push(HighlightSpan {
		start,
		end,
		highlight,
	});
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::syntax::Parser;

	/// `(start, end, name)` for every span.
	fn spans(query: &str, text: &str) -> Vec<(u32, u32, String)> {
		let language = Language::new(ponos_grammar::LANGUAGE).unwrap();
		let config = HighlightConfiguration::new(&language, query).unwrap();
		let mut parser = Parser::new();
		parser.set_language(&language).unwrap();
		let tree = parser.parse(text).unwrap();
		config
			.highlight(&tree)
			.into_iter()
			.map(|s| (s.start, s.end, config.names()[s.highlight.idx()].clone()))
			.collect()
	}

	fn expect(items: &[(u32, u32, &str)]) -> Vec<(u32, u32, String)> {
		items
			.iter()
			.map(|&(start, end, name)| (start, end, name.to_string()))
			.collect()
	}

	#[test]
	fn test_flat_captures() {
		assert_eq!(
			spans(
				"\"пер\" @keyword (identifier) @variable (number) @number",
				"пер x = 1;"
			),
			expect(&[(0, 6, "keyword"), (7, 8, "variable"), (11, 12, "number")])
		);
	}

	#[test]
	fn test_inner_capture_wins() {
		assert_eq!(
			spans("(call_expression) @call (identifier) @variable", "f(x);"),
			expect(&[
				(0, 1, "variable"),
				(1, 2, "call"),
				(2, 3, "variable"),
				(3, 4, "call"),
			])
		);
	}

	#[test]
	fn test_earlier_pattern_wins() {
		assert_eq!(
			spans("(identifier) @function (identifier) @variable", "f;"),
			expect(&[(0, 1, "function")])
		);
	}

	#[test]
	fn test_adjacent_spans_merge() {
		assert_eq!(
			spans("(arguments) @punctuation \"(\" @punctuation", "f(1);"),
			expect(&[(1, 4, "punctuation")])
		);
	}

	#[test]
	fn test_foreign_tree_is_ignored() {
		use ponos_abi::{LANGUAGE_VERSION, RawLanguage, Rule, SymbolInfo};

		static SYMBOLS: [SymbolInfo; 3] = [
			SymbolInfo::end(),
			SymbolInfo::pattern("identifier", "[a-z]+"),
			SymbolInfo::rule("words", Rule::Repeat(&Rule::Symbol(1))),
		];
		static WORDS: RawLanguage = RawLanguage {
			abi_version: LANGUAGE_VERSION,
			name: "words",
			symbols: &SYMBOLS,
			root: 2,
			extras: &[],
			recovery: &[],
		};

		let ponos = Language::new(ponos_grammar::LANGUAGE).unwrap();
		let words = Language::from_raw(&WORDS).unwrap();
		let config = HighlightConfiguration::new(&ponos, "(identifier) @variable").unwrap();
		let mut parser = Parser::new();
		parser.set_language(&words).unwrap();
		let tree = parser.parse("abc").unwrap();
		assert!(config.highlight(&tree).is_empty());
	}

	#[test]
	fn test_highlight_span() {
		let span = HighlightSpan {
			start: 10,
			end: 20,
			highlight: Highlight(0),
		};

		assert_eq!(span.range(), 10..20);
		assert_eq!(&"0123456789abcdefghijk"[span.range()], "abcdefghij");
		assert!(!span.is_empty());
	}
}
