#![allow(unused_crate_dependencies)]

use ponos_language::{HighlightConfiguration, Language, Node, Parser};
use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
	"пер", "возврат", "функ", "конец", "если", "иначе", "пока", "класс", "наследует",
	"реализует", "истина", "ложь", "и", "или", "=", ";", "(", ")", ",", ".", "-", "!", "*",
	"/", "+", "<", "<=", ">", ">=", "x", "имя", "1", "2.5", "\"s\"", "\"", "// c\n", "\n",
	"@", "$",
];

fn language() -> Language {
	Language::new(ponos_grammar::LANGUAGE).unwrap()
}

fn arb_source() -> impl Strategy<Value = String> {
	prop_oneof![
		prop::collection::vec(prop::sample::select(FRAGMENTS), 0..48).prop_map(|f| f.join(" ")),
		"\\PC{0,64}",
	]
}

fn check_structure(node: Node<'_>) -> Result<(), TestCaseError> {
	prop_assert!(node.start_byte() <= node.end_byte());
	let mut last_end = node.start_byte();
	for child in node.children() {
		prop_assert!(child.start_byte() >= last_end, "children overlap in {:?}", node);
		prop_assert!(child.end_byte() <= node.end_byte(), "child escapes {:?}", node);
		prop_assert_eq!(child.parent(), Some(node));
		last_end = child.end_byte();
		check_structure(child)?;
	}
	Ok(())
}

proptest! {
	/// Any input parses, and the root covers all of it.
	#[test]
	fn prop_parse_total(text in arb_source()) {
		let mut parser = Parser::new();
		parser.set_language(&language()).unwrap();
		let tree = parser.parse(&text).unwrap();
		let root = tree.root_node();
		prop_assert_eq!(root.byte_range(), 0..text.len());
		check_structure(root)?;
	}

	/// Parsing is a pure function of the input.
	#[test]
	fn prop_parse_deterministic(text in arb_source()) {
		let mut parser = Parser::new();
		parser.set_language(&language()).unwrap();
		let first = parser.parse(&text).unwrap().root_node().to_sexp();
		let second = parser.parse(&text).unwrap().root_node().to_sexp();
		prop_assert_eq!(first, second);
	}

	/// Highlight spans are ordered, non-empty and disjoint.
	#[test]
	fn prop_highlight_disjoint(text in arb_source()) {
		let language = language();
		let config = HighlightConfiguration::new(&language, ponos_grammar::HIGHLIGHTS_QUERY).unwrap();
		let mut parser = Parser::new();
		parser.set_language(&language).unwrap();
		let tree = parser.parse(&text).unwrap();

		let spans = config.highlight(&tree);
		for span in &spans {
			prop_assert!(!span.is_empty());
			prop_assert!(text.get(span.range()).is_some(), "{:?} is not a char range", span);
		}
		for pair in spans.windows(2) {
			prop_assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
		}
	}
}
