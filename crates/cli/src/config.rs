//! Optional TOML configuration.
//!
//! Looked up from `--config`, then `$PONOS_CONFIG`, then
//! `<config dir>/ponos/config.toml`. A missing default file is not an error.
//!
//! ```toml
//! [parser]
//! max-depth = 256
//!
//! [highlight]
//! query = "highlights.scm"
//!
//! [log]
//! level = "debug"
//! ```

use std::path::{Path, PathBuf};

use ponos_language::ParserOptions;
use ponos_language::syntax::{DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_ENV: &str = "PONOS_CONFIG";

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("failed to read {}: {source}", path.display())]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("invalid config {}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("invalid config {}: parser.max-depth {value} exceeds {limit}", path.display())]
	MaxDepth {
		path: PathBuf,
		value: usize,
		limit: usize,
	},
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub parser: ParserConfig,
	pub highlight: HighlightConfig,
	pub log: LogConfig,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct ParserConfig {
	pub max_depth: usize,
}

impl Default for ParserConfig {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
		}
	}
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
	/// Replaces the bundled highlight query. Relative to the config file.
	pub query: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
	/// Filter directive used when neither `RUST_LOG` nor `--verbose` is set.
	pub level: Option<String>,
}

impl Config {
	/// Loads the first config file found, or defaults if there is none.
	pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
		let path = resolve(
			explicit,
			std::env::var_os(CONFIG_ENV).map(PathBuf::from),
			config_dir().map(|dir| dir.join("ponos").join("config.toml")),
		);
		match path {
			Some(path) => Self::from_file(&path),
			None => Ok(Self::default()),
		}
	}

	pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})?;
		if config.parser.max_depth > MAX_DEPTH_LIMIT {
			return Err(ConfigError::MaxDepth {
				path: path.to_path_buf(),
				value: config.parser.max_depth,
				limit: MAX_DEPTH_LIMIT,
			});
		}

		if let Some(query) = &mut config.highlight.query
			&& query.is_relative()
			&& let Some(dir) = path.parent()
		{
			*query = dir.join(&*query);
		}

		debug!(path = %path.display(), "Loaded config");
		Ok(config)
	}

	pub fn parser_options(&self) -> ParserOptions {
		ParserOptions {
			max_depth: self.parser.max_depth,
		}
	}
}

/// Picks the config file. Explicit paths win and must exist; the default
/// location is only used when present.
fn resolve(
	explicit: Option<&Path>,
	env: Option<PathBuf>,
	default: Option<PathBuf>,
) -> Option<PathBuf> {
	explicit
		.map(Path::to_path_buf)
		.or(env)
		.or_else(|| default.filter(|path| path.is_file()))
}

fn config_dir() -> Option<PathBuf> {
	#[cfg(unix)]
	{
		std::env::var_os("XDG_CONFIG_HOME")
			.map(PathBuf::from)
			.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
	}
	#[cfg(windows)]
	{
		std::env::var_os("APPDATA").map(PathBuf::from)
	}
	#[cfg(not(any(unix, windows)))]
	{
		None
	}
}
