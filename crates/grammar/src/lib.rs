//! Ponos grammar binding.
//!
//! Exposes the compiled Ponos grammar artifact through [`LANGUAGE`], together
//! with the bundled highlight query.
//!
//! ```ignore
//! let language = ponos_language::Language::new(ponos_grammar::LANGUAGE)?;
//! let mut parser = ponos_language::Parser::new();
//! parser.set_language(&language)?;
//! let tree = parser.parse("пер x = 1;").expect("language is set");
//! assert_eq!(tree.root_node().to_sexp(), "(source_file (var_statement (identifier) (number)))");
//! ```

use ponos_abi::{LanguageFn, RawLanguage};

mod grammar;

/// Accessor for the Ponos grammar artifact.
pub const LANGUAGE: LanguageFn = LanguageFn::from_raw(language);

/// Display name of the grammar.
pub const GRAMMAR_NAME: &str = "Ponos";

/// Syntax highlighting query.
pub const HIGHLIGHTS_QUERY: &str = include_str!("../queries/highlights.scm");

fn language() -> &'static RawLanguage {
	&grammar::PONOS
}
