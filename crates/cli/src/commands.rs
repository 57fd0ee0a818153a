//! Subcommand implementations.
//!
//! Each command writes its report to `out` and returns whether it succeeded.
//! Hard failures (unreadable files, invalid queries) are returned as errors.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ponos_grammar::{GRAMMAR_NAME, HIGHLIGHTS_QUERY, LANGUAGE};
use ponos_language::corpus::{self, CaseOutcome};
use ponos_language::{HighlightConfiguration, Language, Parser, Tree, verify_grammar};
use serde::Serialize;
use tracing::{debug, info};

use crate::cli::Command;
use crate::config::Config;

pub fn run(command: &Command, config: &Config, out: &mut impl Write) -> Result<bool> {
	match command {
		Command::Verify => verify(out),
		Command::Parse { file, quiet } => parse(config, file, *quiet, out),
		Command::Highlight { file } => highlight(config, file, out),
		Command::NodeTypes => node_types(out),
		Command::Test { dir } => test(config, dir, out),
	}
}

fn load() -> Result<Language> {
	Ok(verify_grammar(GRAMMAR_NAME, LANGUAGE)?)
}

fn parse_file(config: &Config, language: &Language, path: &Path) -> Result<(String, Tree)> {
	let text = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read {}", path.display()))?;
	let mut parser = Parser::with_options(config.parser_options());
	parser.set_language(language)?;
	let tree = parser.parse(&text).context("parser has no language")?;
	Ok((text, tree))
}

fn verify(out: &mut impl Write) -> Result<bool> {
	match verify_grammar(GRAMMAR_NAME, LANGUAGE) {
		Ok(language) => {
			writeln!(
				out,
				"{} grammar loaded: ABI {}, {} node kinds",
				language.name(),
				language.abi_version(),
				language.node_kind_count()
			)?;
			Ok(true)
		}
		Err(err) => {
			writeln!(out, "{err}: {}", err.source)?;
			Ok(false)
		}
	}
}

fn parse(config: &Config, path: &Path, quiet: bool, out: &mut impl Write) -> Result<bool> {
	let language = load()?;
	let (_, tree) = parse_file(config, &language, path)?;
	let root = tree.root_node();

	if !quiet {
		writeln!(out, "{}", root.to_sexp())?;
	}

	let errors: Vec<_> = tree.walk().filter(|n| n.is_error()).collect();
	for node in &errors {
		writeln!(
			out,
			"{}\tERROR {} - {}",
			path.display(),
			node.start_position(),
			node.end_position()
		)?;
	}
	debug!(path = %path.display(), errors = errors.len(), "Parsed file");
	Ok(errors.is_empty())
}

fn highlight(config: &Config, path: &Path, out: &mut impl Write) -> Result<bool> {
	let language = load()?;
	let query_source = match &config.highlight.query {
		Some(query) => std::fs::read_to_string(query)
			.with_context(|| format!("failed to read highlight query {}", query.display()))?,
		None => HIGHLIGHTS_QUERY.to_string(),
	};
	let highlighter = HighlightConfiguration::new(&language, &query_source)
		.context("invalid highlight query")?;

	let (text, tree) = parse_file(config, &language, path)?;
	for span in highlighter.highlight(&tree) {
		let name = &highlighter.names()[span.highlight.idx()];
		let snippet = &text[span.range()];
		writeln!(out, "{}-{} {name} {snippet:?}", span.start, span.end)?;
	}
	Ok(true)
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct NodeType {
	#[serde(rename = "type")]
	kind: &'static str,
	named: bool,
}

fn node_types(out: &mut impl Write) -> Result<bool> {
	let language = load()?;
	let types: Vec<NodeType> = (0..language.node_kind_count())
		.filter_map(|id| u16::try_from(id).ok())
		.filter(|&id| language.node_kind_is_visible(id))
		.filter_map(|id| {
			Some(NodeType {
				kind: language.node_kind_for_id(id)?,
				named: language.node_kind_is_named(id),
			})
		})
		.collect();

	serde_json::to_writer_pretty(&mut *out, &types)?;
	writeln!(out)?;
	Ok(true)
}

fn corpus_files(dir: &Path) -> Result<Vec<PathBuf>> {
	let mut files = Vec::new();
	for entry in std::fs::read_dir(dir)
		.with_context(|| format!("failed to read corpus directory {}", dir.display()))?
	{
		let path = entry?.path();
		if path.extension().is_some_and(|ext| ext == "txt") {
			files.push(path);
		}
	}
	files.sort();
	Ok(files)
}

fn test(config: &Config, dir: &Path, out: &mut impl Write) -> Result<bool> {
	let language = load()?;
	let mut parser = Parser::with_options(config.parser_options());
	parser.set_language(&language)?;

	let (mut passed, mut failed) = (0usize, 0usize);
	for path in corpus_files(dir)? {
		let text = std::fs::read_to_string(&path)
			.with_context(|| format!("failed to read {}", path.display()))?;
		let cases = corpus::parse_corpus(&text)
			.with_context(|| format!("malformed corpus file {}", path.display()))?;

		writeln!(out, "{}:", path.display())?;
		for case in &cases {
			match corpus::run_case(&mut parser, case) {
				CaseOutcome::Pass => {
					passed += 1;
					writeln!(out, "  ✓ {}", case.name)?;
				}
				CaseOutcome::Fail { expected, actual } => {
					failed += 1;
					writeln!(out, "  ✗ {} (line {})", case.name, case.line)?;
					writeln!(out, "    expected: {expected}")?;
					writeln!(out, "    actual:   {actual}")?;
				}
			}
		}
	}

	writeln!(out, "\n{passed} passed, {failed} failed")?;
	info!(passed, failed, "Corpus run finished");
	Ok(failed == 0)
}
