use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ponos")]
#[command(about = "Ponos grammar tools")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Config file (defaults to $PONOS_CONFIG, then the user config directory)
	#[arg(short, long, value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Subcommand to execute.
	#[command(subcommand)]
	pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
	/// Check that the bundled grammar loads
	Verify,
	/// Parse a file and print its syntax tree
	Parse {
		/// Source file
		file: PathBuf,
		/// Only report errors
		#[arg(short, long)]
		quiet: bool,
	},
	/// Print highlight spans for a file
	Highlight {
		/// Source file
		file: PathBuf,
	},
	/// List visible node kinds as JSON
	NodeTypes,
	/// Run corpus tests
	Test {
		/// Directory of corpus files
		#[arg(default_value = "test/corpus")]
		dir: PathBuf,
	},
}
