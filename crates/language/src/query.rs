//! Structural queries over syntax trees.
//!
//! Supports the core of tree-sitter's S-expression query language: node
//! patterns with nested children, the `(_)` wildcard, anonymous tokens
//! written as strings, `[...]` alternations, `@captures` and `;` comments.
//! Child patterns match an ordered subsequence of a node's children. Fields,
//! quantifiers, anchors and predicates are rejected at compile time.

use ponos_abi::Symbol;
use thiserror::Error;

use crate::language::Language;
use crate::syntax::Node;

/// Errors produced when compiling a [`Query`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
	#[error("syntax error at offset {offset}: {message}")]
	Syntax { offset: usize, message: String },

	#[error("invalid node type {name:?} at offset {offset}")]
	NodeType { offset: usize, name: String },

	#[error("{feature} are not supported (at offset {offset})")]
	Unsupported { offset: usize, feature: &'static str },
}

/// A capture within a [`QueryMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCapture<'tree> {
	pub node: Node<'tree>,
	/// Index into [`Query::capture_names`].
	pub index: u32,
}

/// One pattern matched at one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryMatch<'tree> {
	pub pattern_index: usize,
	pub captures: Vec<QueryCapture<'tree>>,
}

/// A compiled query.
#[derive(Debug)]
pub struct Query {
	patterns: Vec<Pattern>,
	capture_names: Vec<String>,
}

impl Query {
	pub fn new(language: &Language, source: &str) -> Result<Self, QueryError> {
		let mut parser = QueryParser {
			language,
			source,
			pos: 0,
			capture_names: Vec::new(),
		};

		let mut patterns = Vec::new();
		loop {
			parser.skip_trivia();
			if parser.peek().is_none() {
				break;
			}
			patterns.push(parser.pattern()?);
		}

		Ok(Self {
			patterns,
			capture_names: parser.capture_names,
		})
	}

	pub fn pattern_count(&self) -> usize {
		self.patterns.len()
	}

	pub fn capture_names(&self) -> &[String] {
		&self.capture_names
	}

	pub fn capture_index_for_name(&self, name: &str) -> Option<u32> {
		self.capture_names
			.iter()
			.position(|n| n == name)
			.map(|idx| idx as u32)
	}

	/// Runs every pattern against `node` and each of its descendants.
	///
	/// Matches are ordered by node (pre-order), then by pattern index. Each
	/// pattern matches a given node at most once.
	pub fn matches<'tree>(&self, node: Node<'tree>) -> Vec<QueryMatch<'tree>> {
		let mut matches = Vec::new();
		for node in node.descendants() {
			for (pattern_index, pattern) in self.patterns.iter().enumerate() {
				let mut captures = Vec::new();
				if pattern.matches(node, &mut captures) {
					matches.push(QueryMatch {
						pattern_index,
						captures,
					});
				}
			}
		}
		matches
	}
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
	/// `(_)`: any named node.
	Named,
	Kind(Symbol),
}

impl Matcher {
	fn accepts(self, node: Node<'_>) -> bool {
		match self {
			Matcher::Named => node.is_named(),
			Matcher::Kind(symbol) => node.kind_id() == symbol,
		}
	}
}

#[derive(Debug)]
enum Pattern {
	Node {
		matcher: Matcher,
		children: Vec<Pattern>,
		captures: Vec<u32>,
	},
	Alternation {
		alternatives: Vec<Pattern>,
		captures: Vec<u32>,
	},
}

impl Pattern {
	fn captures_mut(&mut self) -> &mut Vec<u32> {
		match self {
			Pattern::Node { captures, .. } | Pattern::Alternation { captures, .. } => captures,
		}
	}

	/// On failure `out` is restored to its previous length.
	fn matches<'tree>(&self, node: Node<'tree>, out: &mut Vec<QueryCapture<'tree>>) -> bool {
		let mark = out.len();
		let (Pattern::Node { captures, .. } | Pattern::Alternation { captures, .. }) = self;
		out.extend(captures.iter().map(|&index| QueryCapture { node, index }));

		let matched = match self {
			Pattern::Node {
				matcher, children, ..
			} => {
				matcher.accepts(node)
					&& (children.is_empty() || {
						let nodes: Vec<_> = node.children().collect();
						match_children(children, &nodes, out)
					})
			}
			Pattern::Alternation { alternatives, .. } => {
				alternatives.iter().any(|alt| alt.matches(node, out))
			}
		};

		if !matched {
			out.truncate(mark);
		}
		matched
	}
}

fn match_children<'tree>(
	patterns: &[Pattern],
	nodes: &[Node<'tree>],
	out: &mut Vec<QueryCapture<'tree>>,
) -> bool {
	let Some((first, rest)) = patterns.split_first() else {
		return true;
	};
	nodes.iter().enumerate().any(|(idx, &node)| {
		let mark = out.len();
		if first.matches(node, out) && match_children(rest, &nodes[idx + 1..], out) {
			return true;
		}
		out.truncate(mark);
		false
	})
}

struct QueryParser<'a> {
	language: &'a Language,
	source: &'a str,
	pos: usize,
	capture_names: Vec<String>,
}

impl<'a> QueryParser<'a> {
	fn peek(&self) -> Option<char> {
		self.source[self.pos..].chars().next()
	}

	fn bump(&mut self) -> Option<char> {
		let ch = self.peek()?;
		self.pos += ch.len_utf8();
		Some(ch)
	}

	fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
		let source = self.source;
		let start = self.pos;
		while let Some(ch) = self.peek()
			&& f(ch)
		{
			self.pos += ch.len_utf8();
		}
		&source[start..self.pos]
	}

	fn skip_trivia(&mut self) {
		while let Some(ch) = self.peek() {
			if ch.is_whitespace() {
				self.pos += ch.len_utf8();
			} else if ch == ';' {
				self.take_while(|c| c != '\n');
			} else {
				break;
			}
		}
	}

	fn syntax<T>(&self, message: impl Into<String>) -> Result<T, QueryError> {
		Err(QueryError::Syntax {
			offset: self.pos,
			message: message.into(),
		})
	}

	fn unsupported<T>(&self, feature: &'static str) -> Result<T, QueryError> {
		Err(QueryError::Unsupported {
			offset: self.pos,
			feature,
		})
	}

	fn pattern(&mut self) -> Result<Pattern, QueryError> {
		self.skip_trivia();
		let mut pattern = match self.peek() {
			Some('(') => self.node()?,
			Some('"') => self.literal()?,
			Some('[') => self.alternation()?,
			Some('#') => return self.unsupported("predicates"),
			Some('.') => return self.unsupported("anchors"),
			Some('!') => return self.unsupported("negated fields"),
			Some(ch) if is_kind_char(ch) => {
				let offset = self.pos;
				self.take_while(is_kind_char);
				if self.peek() == Some(':') {
					return Err(QueryError::Unsupported {
						offset,
						feature: "fields",
					});
				}
				return Err(QueryError::Syntax {
					offset,
					message: "expected a pattern".to_string(),
				});
			}
			Some(ch) => return self.syntax(format!("unexpected {ch:?}")),
			None => return self.syntax("unexpected end of query"),
		};
		self.captures(&mut pattern)?;
		Ok(pattern)
	}

	fn captures(&mut self, pattern: &mut Pattern) -> Result<(), QueryError> {
		loop {
			self.skip_trivia();
			match self.peek() {
				Some('?' | '*' | '+') => return self.unsupported("quantifiers"),
				Some('@') => {
					self.bump();
					let name = self.take_while(|c| is_kind_char(c) || c == '.');
					if name.is_empty() {
						return self.syntax("expected a capture name");
					}
					let index = self.capture_index(name);
					pattern.captures_mut().push(index);
				}
				_ => return Ok(()),
			}
		}
	}

	fn capture_index(&mut self, name: &str) -> u32 {
		match self.capture_names.iter().position(|n| n == name) {
			Some(idx) => idx as u32,
			None => {
				self.capture_names.push(name.to_string());
				(self.capture_names.len() - 1) as u32
			}
		}
	}

	fn node(&mut self) -> Result<Pattern, QueryError> {
		self.bump();
		self.skip_trivia();
		if self.peek() == Some('(') {
			return self.unsupported("grouped patterns");
		}

		let offset = self.pos;
		let matcher = match self.take_while(is_kind_char) {
			"" => return self.syntax("expected a node kind"),
			"_" => Matcher::Named,
			name => {
				let id = self
					.language
					.id_for_node_kind(name, true)
					.filter(|&id| self.language.node_kind_is_visible(id))
					.ok_or_else(|| QueryError::NodeType {
						offset,
						name: name.to_string(),
					})?;
				Matcher::Kind(id)
			}
		};

		let mut children = Vec::new();
		loop {
			self.skip_trivia();
			match self.peek() {
				Some(')') => {
					self.bump();
					break;
				}
				None => return self.syntax("unclosed `(`"),
				Some(_) => children.push(self.pattern()?),
			}
		}

		Ok(Pattern::Node {
			matcher,
			children,
			captures: Vec::new(),
		})
	}

	fn literal(&mut self) -> Result<Pattern, QueryError> {
		let offset = self.pos;
		self.bump();

		let mut text = String::new();
		loop {
			match self.bump() {
				Some('"') => break,
				Some('\\') => match self.bump() {
					Some('n') => text.push('\n'),
					Some('t') => text.push('\t'),
					Some(ch) => text.push(ch),
					None => return self.syntax("unterminated string"),
				},
				Some(ch) => text.push(ch),
				None => return self.syntax("unterminated string"),
			}
		}

		let id = self
			.language
			.id_for_node_kind(&text, false)
			.ok_or(QueryError::NodeType { offset, name: text })?;
		Ok(Pattern::Node {
			matcher: Matcher::Kind(id),
			children: Vec::new(),
			captures: Vec::new(),
		})
	}

	fn alternation(&mut self) -> Result<Pattern, QueryError> {
		self.bump();
		let mut alternatives = Vec::new();
		loop {
			self.skip_trivia();
			match self.peek() {
				Some(']') => {
					self.bump();
					break;
				}
				None => return self.syntax("unclosed `[`"),
				Some(_) => alternatives.push(self.pattern()?),
			}
		}
		if alternatives.is_empty() {
			return self.syntax("empty alternation");
		}
		Ok(Pattern::Alternation {
			alternatives,
			captures: Vec::new(),
		})
	}
}

fn is_kind_char(ch: char) -> bool {
	ch.is_alphanumeric() || ch == '_' || ch == '-'
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::syntax::Parser;

	fn language() -> Language {
		Language::new(ponos_grammar::LANGUAGE).unwrap()
	}

	fn compile(source: &str) -> Result<Query, QueryError> {
		Query::new(&language(), source)
	}

	/// `(pattern, [(capture, text)])` for every match over `text`.
	fn run(query: &str, text: &str) -> Vec<(usize, Vec<(String, String)>)> {
		let language = language();
		let query = Query::new(&language, query).unwrap();
		let mut parser = Parser::new();
		parser.set_language(&language).unwrap();
		let tree = parser.parse(text).unwrap();
		query
			.matches(tree.root_node())
			.into_iter()
			.map(|m| {
				let captures = m
					.captures
					.iter()
					.map(|c| {
						(
							query.capture_names()[c.index as usize].clone(),
							c.node.utf8_text(text.as_bytes()).unwrap().to_string(),
						)
					})
					.collect();
				(m.pattern_index, captures)
			})
			.collect()
	}

	fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
		items
			.iter()
			.map(|(a, b)| (a.to_string(), b.to_string()))
			.collect()
	}

	#[test]
	fn test_capture_names_are_shared() {
		let query = compile("(identifier) @a ; comment\n(number) @b (string) @a").unwrap();
		assert_eq!(query.pattern_count(), 3);
		assert_eq!(query.capture_names(), ["a", "b"]);
		assert_eq!(query.capture_index_for_name("b"), Some(1));
		assert_eq!(query.capture_index_for_name("c"), None);
	}

	#[test]
	fn test_dotted_capture_names() {
		let query = compile("(call_expression (identifier) @function.call)").unwrap();
		assert_eq!(query.capture_names(), ["function.call"]);
	}

	#[test]
	fn test_unknown_node_type() {
		assert_eq!(
			compile("(nonsense)").unwrap_err(),
			QueryError::NodeType {
				offset: 1,
				name: "nonsense".to_string()
			}
		);
	}

	#[test]
	fn test_hidden_node_type() {
		assert!(matches!(
			compile("(_expression)"),
			Err(QueryError::NodeType { .. })
		));
	}

	#[test]
	fn test_unknown_literal() {
		assert!(matches!(
			compile("\"%%\""),
			Err(QueryError::NodeType { offset: 0, .. })
		));
	}

	#[test]
	fn test_unsupported_features() {
		let feature = |source| match compile(source) {
			Err(QueryError::Unsupported { feature, .. }) => feature,
			other => panic!("expected unsupported feature, got {other:?}"),
		};
		assert_eq!(feature("(var_statement name: (identifier))"), "fields");
		assert_eq!(feature("(identifier)+"), "quantifiers");
		assert_eq!(feature("(var_statement (identifier) #match)"), "predicates");
		assert_eq!(feature("(var_statement . (identifier))"), "anchors");
		assert_eq!(feature("((identifier) @x)"), "grouped patterns");
	}

	#[test]
	fn test_syntax_errors() {
		assert!(matches!(
			compile("(identifier"),
			Err(QueryError::Syntax { .. })
		));
		assert!(matches!(compile("[]"), Err(QueryError::Syntax { .. })));
		assert!(matches!(compile("\"пер"), Err(QueryError::Syntax { .. })));
		assert!(matches!(
			compile("(identifier) @"),
			Err(QueryError::Syntax { .. })
		));
	}

	#[test]
	fn test_child_patterns() {
		assert_eq!(
			run(
				"(var_statement (identifier) @name (number) @value)",
				"пер x = 1;"
			),
			[(0, pairs(&[("name", "x"), ("value", "1")]))]
		);
	}

	#[test]
	fn test_children_match_in_order() {
		assert_eq!(run("(var_statement (number))", "пер x = 1;").len(), 1);
		assert!(run("(var_statement (number) (identifier))", "пер x = 1;").is_empty());
	}

	#[test]
	fn test_alternation_and_literals() {
		assert_eq!(
			run("[\"пер\" \"=\"] @keyword", "пер x = 1;"),
			[
				(0, pairs(&[("keyword", "пер")])),
				(0, pairs(&[("keyword", "=")])),
			]
		);
	}

	#[test]
	fn test_captures_roll_back() {
		// The first alternative captures `@name` before failing on its arguments.
		let query = "[
			(call_expression (identifier) @name (arguments (string)))
			(call_expression (identifier) @other)
		]";
		assert_eq!(run(query, "f(1);"), [(0, pairs(&[("other", "f")]))]);
	}

	#[test]
	fn test_wildcard() {
		assert_eq!(
			run(
				"(binary_expression (_) @lhs \"+\" (_) @rhs)",
				"1 * 2 + f;"
			),
			[(0, pairs(&[("lhs", "1 * 2"), ("rhs", "f")]))]
		);
	}

	#[test]
	fn test_nested_children() {
		assert_eq!(
			run(
				"(call_expression (identifier) @callee (arguments (number) @arg))",
				"f(1);"
			),
			[(0, pairs(&[("callee", "f"), ("arg", "1")]))]
		);
		assert_eq!(
			run(
				"(field_expression (identifier) @object (identifier) @field)",
				"a.b;"
			),
			[(0, pairs(&[("object", "a"), ("field", "b")]))]
		);
	}
}
