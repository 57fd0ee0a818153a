// Library code reports through tracing, never stderr
#![deny(clippy::print_stderr)]

//! Ponos parsing runtime
//!
//! Loads static grammar artifacts (see `ponos-abi`) and parses text with them.
//!
//! # Architecture
//!
//! * [`language`]: Artifact validation and the [`Language`] handle
//! * [`grammar`]: Grammar load verification for bindings
//! * [`syntax`]: [`Parser`], [`Tree`] and [`Node`]
//! * [`query`]: Structural queries over trees
//! * [`highlight`]: Query-driven syntax highlighting
//! * [`corpus`]: Corpus test files and a runner
//!
//! # Example
//!
//! ```ignore
//! let language = ponos_language::verify_grammar("Ponos", ponos_grammar::LANGUAGE)?;
//! let mut parser = ponos_language::Parser::new();
//! parser.set_language(&language)?;
//! let tree = parser.parse("пер x = 1;").expect("language is set");
//! ```

pub mod corpus;
pub mod grammar;
pub mod highlight;
pub mod language;
mod lexer;
pub mod query;
pub mod syntax;

pub use grammar::{GrammarLoadFailure, verify_grammar};
pub use highlight::{Highlight, HighlightConfiguration, HighlightSpan};
pub use language::{ERROR_SYMBOL, Language, LanguageError};
pub use ponos_abi::{LanguageFn, Symbol};
pub use query::{Query, QueryCapture, QueryError, QueryMatch};
pub use syntax::{Node, Parser, ParserOptions, Point, Range, Tree};
