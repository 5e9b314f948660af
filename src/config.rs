//! CLI configuration
//!
//! Read from `<config_dir>/asksql/config.toml` unless a path is given:
//!
//! ```toml
//! database = "library.sqlite"
//! schema_file = "library.json"
//! format = "json"
//! max_connections = 2
//! ```

use crate::error::{AskError, AskResult};

use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// How result rows are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// File configuration. Every field is optional; CLI flags win.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite file path or `sqlite:` URL.
    pub database: Option<String>,

    /// JSON schema snapshot used when no database is given.
    pub schema_file: Option<PathBuf>,

    pub format: Option<OutputFormat>,

    pub max_connections: Option<u32>,
}

impl Config {
    /// `<config_dir>/asksql/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("asksql").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried and a missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> AskResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> AskResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AskError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AskResult<Self> {
        toml::from_str(content).map_err(|e| AskError::Config(e.to_string()))
    }
}
