//! Ponos grammar tools.

mod cli;
mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::Config;

const VERBOSE_FILTER: &str = "ponos_language=trace,ponos_cli=trace,debug";
const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive. `RUST_LOG` wins, then `--verbose`, then
/// `[log] level` from the config.
fn filter_directive(env: Option<String>, verbose: bool, level: Option<&str>) -> String {
	env.filter(|directive| !directive.trim().is_empty())
		.unwrap_or_else(|| {
			if verbose {
				VERBOSE_FILTER.to_string()
			} else {
				level.unwrap_or(DEFAULT_FILTER).to_string()
			}
		})
}

/// Installs the stderr subscriber.
fn setup_tracing(verbose: bool, level: Option<&str>) {
	let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
	let filter = EnvFilter::new(filter_directive(env, verbose, level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn main() -> anyhow::Result<ExitCode> {
	let cli = Cli::parse();
	let config = Config::load(cli.config.as_deref())?;
	setup_tracing(cli.verbose, config.log.level.as_deref());

	let mut stdout = std::io::stdout().lock();
	let ok = commands::run(&cli.command, &config, &mut stdout)?;
	Ok(if ok {
		ExitCode::SUCCESS
	} else {
		ExitCode::FAILURE
	})
}
