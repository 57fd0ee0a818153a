#![allow(unused_crate_dependencies)]

use std::path::Path;

use pretty_assertions::assert_eq;
use ponos_abi::{LanguageFn, RawLanguage};
use ponos_grammar::{GRAMMAR_NAME, HIGHLIGHTS_QUERY, LANGUAGE};
use ponos_language::corpus::{self as corpus_support, CaseOutcome};
use ponos_language::{
	GrammarLoadFailure, HighlightConfiguration, Language, LanguageError, Parser, verify_grammar,
};
use rstest::rstest;

#[test]
fn can_load_grammar() {
	if let Err(err) = verify_grammar(GRAMMAR_NAME, LANGUAGE) {
		panic!("{err}: {}", err.source);
	}
}

#[test]
fn stub_accessor_fails_to_load() {
	fn stub() -> &'static RawLanguage {
		&RawLanguage::EMPTY
	}

	let err: GrammarLoadFailure =
		verify_grammar(GRAMMAR_NAME, LanguageFn::from_raw(stub)).unwrap_err();
	assert_eq!(err.to_string(), "Error loading Ponos grammar");
	assert!(matches!(err.source, LanguageError::Version { .. }));
}

#[test]
fn loading_is_idempotent() {
	let first = verify_grammar(GRAMMAR_NAME, LANGUAGE).unwrap();
	let second = verify_grammar(GRAMMAR_NAME, LANGUAGE).unwrap();
	assert_eq!(first, second);
	assert_eq!(first.node_kind_count(), second.node_kind_count());
}

#[test]
fn language_metadata() {
	let language = Language::new(LANGUAGE).unwrap();
	assert_eq!(language.name(), "Ponos");
	assert_eq!(language.root_kind(), "source_file");
	assert!(language.id_for_node_kind("assigment_statement", true).is_some());
	assert!(language.id_for_node_kind("конец", false).is_some());
	assert!(!language.node_kind_is_visible(
		language.id_for_node_kind("_expression", true).unwrap()
	));
}

#[rstest]
#[case::statements("statements.txt")]
#[case::expressions("expressions.txt")]
#[case::errors("errors.txt")]
fn corpus(#[case] file: &str) {
	let path = Path::new(env!("CARGO_MANIFEST_DIR"))
		.join("test/corpus")
		.join(file);
	let text = std::fs::read_to_string(&path).unwrap();
	let cases = corpus_support::parse_corpus(&text).unwrap();
	assert!(!cases.is_empty());

	let language = Language::new(LANGUAGE).unwrap();
	let mut parser = Parser::new();
	parser.set_language(&language).unwrap();

	for case in &cases {
		if let CaseOutcome::Fail { expected, actual } = corpus_support::run_case(&mut parser, case) {
			assert_eq!(actual, expected, "{}:{} {}", file, case.line, case.name);
		}
	}
}

#[test]
fn highlights_query_compiles() {
	let language = Language::new(LANGUAGE).unwrap();
	let config = HighlightConfiguration::new(&language, HIGHLIGHTS_QUERY).unwrap();
	assert!(config.names().iter().any(|n| n == "keyword"));
}

#[test]
fn highlights_statement() {
	let language = Language::new(LANGUAGE).unwrap();
	let config = HighlightConfiguration::new(&language, HIGHLIGHTS_QUERY).unwrap();
	let mut parser = Parser::new();
	parser.set_language(&language).unwrap();

	let text = "пер x = 1; // c";
	let tree = parser.parse(text).unwrap();
	let spans: Vec<_> = config
		.highlight(&tree)
		.into_iter()
		.map(|s| {
			(
				&text[s.range()],
				config.names()[s.highlight.idx()].as_str(),
			)
		})
		.collect();
	assert_eq!(
		spans,
		[
			("пер", "keyword"),
			("x", "variable"),
			("=", "operator"),
			("1", "number"),
			(";", "punctuation.delimiter"),
			("// c", "comment"),
		]
	);
}

#[test]
fn highlights_definitions() {
	let language = Language::new(LANGUAGE).unwrap();
	let config = HighlightConfiguration::new(&language, HIGHLIGHTS_QUERY).unwrap();
	let mut parser = Parser::new();
	parser.set_language(&language).unwrap();

	let text = "функ f(a) конец";
	let tree = parser.parse(text).unwrap();
	let names: Vec<_> = config
		.highlight(&tree)
		.into_iter()
		.map(|s| config.names()[s.highlight.idx()].as_str())
		.collect();
	assert_eq!(
		names,
		[
			"keyword",
			"function",
			"punctuation.bracket",
			"variable.parameter",
			"punctuation.bracket",
			"keyword",
		]
	);
}
