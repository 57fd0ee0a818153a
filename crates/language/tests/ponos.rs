#![allow(unused_crate_dependencies)]

use ponos_language::{Language, Parser, Point, Query, Tree};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn parse(text: &str) -> Tree {
	let language = Language::new(ponos_grammar::LANGUAGE).unwrap();
	let mut parser = Parser::new();
	parser.set_language(&language).unwrap();
	parser.parse(text).unwrap()
}

#[rstest]
#[case::empty("", "(source_file)")]
#[case::only_comment("// пусто", "(source_file (comment))")]
#[case::return_logic(
	"возврат a и b или c;",
	"(source_file (return_statement (binary_expression (binary_expression (identifier) (identifier)) (identifier))))"
)]
#[case::unary_field(
	"-x.y;",
	"(source_file (expression_statement (unary_expression (field_expression (identifier) (identifier)))))"
)]
#[case::call_on_closure(
	"функ() конец();",
	"(source_file (expression_statement (call_expression (closure_expression (params_list)) (arguments))))"
)]
#[case::keyword_prefix_is_identifier(
	"пере = иначеx;",
	"(source_file (assigment_statement (identifier) (identifier)))"
)]
#[case::comparison_chain(
	"a <= b >= c;",
	"(source_file (expression_statement (binary_expression (binary_expression (identifier) (identifier)) (identifier))))"
)]
fn test_parse(#[case] text: &str, #[case] expected: &str) {
	assert_eq!(parse(text).root_node().to_sexp(), expected);
}

#[test]
fn test_positions_are_byte_based() {
	let text = "пер x = 1;\nx = 2;";
	let tree = parse(text);
	let root = tree.root_node();

	let var = root.child(0).unwrap();
	assert_eq!(var.kind(), "var_statement");
	assert_eq!(var.end_position(), Point::new(0, 13));

	let assign = root.child(1).unwrap();
	assert_eq!(assign.kind(), "assigment_statement");
	assert_eq!(assign.start_position(), Point::new(1, 0));
	assert_eq!(assign.utf8_text(text.as_bytes()).unwrap(), "x = 2;");
}

#[test]
fn test_error_nodes() {
	let tree = parse("пер = 1;\nпер y = 2;");
	let root = tree.root_node();
	assert!(root.has_error());

	let kinds: Vec<_> = root.children().map(|n| n.kind()).collect();
	assert_eq!(kinds, ["ERROR", "expression_statement", "var_statement"]);
	assert!(root.child(0).unwrap().is_error());
	assert!(!root.child(2).unwrap().has_error());
}

#[test]
fn test_comment_inside_statement() {
	let text = "пер x = // значение\n  1;";
	let tree = parse(text);
	let comment = tree.walk().find(|n| n.is_extra()).unwrap();
	assert_eq!(comment.kind(), "comment");
	assert_eq!(comment.parent().unwrap().kind(), "var_statement");
	assert_eq!(comment.utf8_text(text.as_bytes()).unwrap(), "// значение");
}

#[test]
fn test_query_over_ponos_tree() {
	let text = "функ f(a, b) возврат a; конец";
	let tree = parse(text);
	let query = Query::new(
		tree.language(),
		"(function_declaration_statement (identifier) @name (params_list (identifier) @param))",
	)
	.unwrap();

	let matches = query.matches(tree.root_node());
	assert_eq!(matches.len(), 1);
	let captured: Vec<_> = matches[0]
		.captures
		.iter()
		.map(|c| c.node.utf8_text(text.as_bytes()).unwrap())
		.collect();
	assert_eq!(captured, ["f", "a"]);
}
