//! Grammar load verification.
//!
//! A grammar binding exposes its compiled artifact through a zero-argument
//! accessor. [`verify_grammar`] runs that artifact through the runtime
//! constructor and binds the result to a parser, which is everything a host
//! needs before it can start parsing.

use ponos_abi::LanguageFn;
use thiserror::Error;
use tracing::{debug, warn};

use crate::language::{Language, LanguageError};
use crate::syntax::Parser;

/// A grammar artifact the runtime refused to load.
#[derive(Error, Debug)]
#[error("Error loading {grammar} grammar")]
pub struct GrammarLoadFailure {
	/// Display name of the grammar, e.g. `Ponos`.
	pub grammar: String,
	#[source]
	pub source: LanguageError,
}

/// Loads the artifact behind `language_fn` and checks a parser accepts it.
///
/// `name` is only used for reporting. Calling this repeatedly is fine and
/// yields equal handles for the same artifact.
pub fn verify_grammar(name: &str, language_fn: LanguageFn) -> Result<Language, GrammarLoadFailure> {
	let fail = |source: LanguageError| {
		warn!(grammar = name, error = %source, "Grammar failed to load");
		GrammarLoadFailure {
			grammar: name.to_string(),
			source,
		}
	};

	let language = Language::new(language_fn).map_err(fail)?;
	Parser::new().set_language(&language).map_err(fail)?;

	debug!(
		grammar = name,
		version = language.abi_version(),
		kinds = language.node_kind_count(),
		"Grammar loaded"
	);
	Ok(language)
}
