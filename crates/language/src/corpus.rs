//! Corpus tests in tree-sitter's file layout.
//!
//! ```text
//! ==================
//! Variable
//! ==================
//!
//! пер x = 1;
//!
//! ---
//!
//! (source_file (var_statement (identifier) (number)))
//! ```

use thiserror::Error;

use crate::syntax::Parser;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorpusError {
	#[error("line {line}: {message}")]
	Malformed { line: usize, message: &'static str },
}

/// One named test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusCase {
	pub name: String,
	pub input: String,
	/// Expected tree, already passed through [`normalize_sexp`].
	pub expected: String,
	/// One-based line of the opening header.
	pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
	Pass,
	Fail { expected: String, actual: String },
}

impl CaseOutcome {
	pub fn is_pass(&self) -> bool {
		matches!(self, CaseOutcome::Pass)
	}
}

/// Splits a corpus file into cases.
pub fn parse_corpus(text: &str) -> Result<Vec<CorpusCase>, CorpusError> {
	let lines: Vec<&str> = text.lines().collect();
	let malformed = |idx: usize, message| CorpusError::Malformed {
		line: idx + 1,
		message,
	};

	let mut cases = Vec::new();
	let mut idx = 0;
	while idx < lines.len() {
		if lines[idx].trim().is_empty() {
			idx += 1;
			continue;
		}
		if !is_rule(lines[idx], '=') {
			return Err(malformed(idx, "expected a `===` header"));
		}
		let header = idx;
		idx += 1;

		let name_start = idx;
		while idx < lines.len() && !is_rule(lines[idx], '=') {
			idx += 1;
		}
		if idx == lines.len() {
			return Err(malformed(header, "unterminated header"));
		}
		let name = lines[name_start..idx]
			.iter()
			.map(|l| l.trim())
			.filter(|l| !l.is_empty())
			.collect::<Vec<_>>()
			.join(" ");
		if name.is_empty() {
			return Err(malformed(header, "test has no name"));
		}
		idx += 1;

		let input_start = idx;
		while idx < lines.len() && !is_rule(lines[idx], '-') {
			if is_rule(lines[idx], '=') {
				return Err(malformed(idx, "missing `---` separator"));
			}
			idx += 1;
		}
		if idx == lines.len() {
			return Err(malformed(header, "missing `---` separator"));
		}
		let input = trim_blank_lines(&lines[input_start..idx]).join("\n");
		idx += 1;

		let expected_start = idx;
		while idx < lines.len() && !is_rule(lines[idx], '=') {
			idx += 1;
		}
		let expected = normalize_sexp(&lines[expected_start..idx].join("\n"));
		if expected.is_empty() {
			return Err(malformed(header, "missing expected tree"));
		}

		cases.push(CorpusCase {
			name,
			input,
			expected,
			line: header + 1,
		});
	}
	Ok(cases)
}

/// Parses the case input and compares trees.
pub fn run_case(parser: &mut Parser, case: &CorpusCase) -> CaseOutcome {
	let actual = parser
		.parse(&case.input)
		.map(|tree| tree.root_node().to_sexp())
		.unwrap_or_default();
	if actual == case.expected {
		CaseOutcome::Pass
	} else {
		CaseOutcome::Fail {
			expected: case.expected.clone(),
			actual,
		}
	}
}

/// Collapses whitespace to single spaces, dropping it after `(` and before `)`.
pub fn normalize_sexp(sexp: &str) -> String {
	let mut out = String::with_capacity(sexp.len());
	let mut space = false;
	for ch in sexp.chars() {
		if ch.is_whitespace() {
			space = !out.is_empty();
			continue;
		}
		if space && ch != ')' && !out.ends_with('(') {
			out.push(' ');
		}
		space = false;
		out.push(ch);
	}
	out
}

fn is_rule(line: &str, ch: char) -> bool {
	let line = line.trim_end();
	line.len() >= 3 && line.chars().all(|c| c == ch)
}

fn trim_blank_lines<'a, 'b>(lines: &'b [&'a str]) -> &'b [&'a str] {
	let start = lines
		.iter()
		.position(|l| !l.trim().is_empty())
		.unwrap_or(lines.len());
	let end = lines
		.iter()
		.rposition(|l| !l.trim().is_empty())
		.map_or(start, |idx| idx + 1);
	&lines[start..end]
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::language::Language;

	const SAMPLE: &str = "\
================
Variable
================

пер x = 1;

---

(source_file
  (var_statement
    (identifier)
    (number)))

=====
Two
lines
=====
f();
g();
---
(source_file (expression_statement (call_expression (identifier) (arguments))))
";

	#[test]
	fn test_parse_corpus() {
		let cases = parse_corpus(SAMPLE).unwrap();
		assert_eq!(cases.len(), 2);

		assert_eq!(cases[0].name, "Variable");
		assert_eq!(cases[0].input, "пер x = 1;");
		assert_eq!(
			cases[0].expected,
			"(source_file (var_statement (identifier) (number)))"
		);
		assert_eq!(cases[0].line, 1);

		assert_eq!(cases[1].name, "Two lines");
		assert_eq!(cases[1].input, "f();\ng();");
		assert_eq!(cases[1].line, 14);
	}

	#[test]
	fn test_malformed_corpus() {
		assert_eq!(
			parse_corpus("===\nName\n===\ninput\n").unwrap_err(),
			CorpusError::Malformed {
				line: 1,
				message: "missing `---` separator"
			}
		);
		assert_eq!(
			parse_corpus("stray\n").unwrap_err(),
			CorpusError::Malformed {
				line: 1,
				message: "expected a `===` header"
			}
		);
		assert!(parse_corpus("===\nName\n===\nx;\n---\n").is_err());
		assert!(parse_corpus("===\n===\nx;\n---\n(x)").is_err());
	}

	#[test]
	fn test_empty_corpus() {
		assert!(parse_corpus("\n\n").unwrap().is_empty());
	}

	#[test]
	fn test_normalize_sexp() {
		assert_eq!(normalize_sexp("  ( a\n\t( b )  (c ) )\n"), "(a (b) (c))");
		assert_eq!(normalize_sexp(""), "");
	}

	#[test]
	fn test_run_case() {
		let language = Language::new(ponos_grammar::LANGUAGE).unwrap();
		let mut parser = Parser::new();
		parser.set_language(&language).unwrap();

		let cases = parse_corpus(SAMPLE).unwrap();
		assert_eq!(run_case(&mut parser, &cases[0]), CaseOutcome::Pass);

		let outcome = run_case(&mut parser, &cases[1]);
		let CaseOutcome::Fail { actual, .. } = outcome else {
			panic!("two statements cannot match one");
		};
		assert_eq!(
			actual,
			"(source_file (expression_statement (call_expression (identifier) (arguments))) \
			(expression_statement (call_expression (identifier) (arguments))))"
		);
	}
}
