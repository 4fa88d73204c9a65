//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{global_config_path, Config, PROJECT_CONFIG_FILE};

/// Keys whose environment values are whitespace-separated lists
const LIST_KEYS: [&str; 3] = [
    "generator.command",
    "host.reload_command",
    "watcher.ignore_patterns",
];

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `STUBWATCH_` and use double underscores
    /// for nested values. For example:
    /// - `STUBWATCH_PLANNER__SCHEMA_FILENAME=structure.sql`
    /// - `STUBWATCH_GENERATOR__COMMAND="bin/tapioca dsl"`
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Add the config file if it exists
        if path.exists() {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path));
        }

        let mut env = Environment::with_prefix("STUBWATCH")
            .prefix_separator("_")
            .separator("__")
            .list_separator(" ")
            .try_parsing(true);
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }
        builder = builder.add_source(env);

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (`--config` path, else `./stubwatch.toml`, else `~/.stubwatch/config.toml`)
    /// 3. Environment variables (STUBWATCH_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => default_config_path()?,
        };
        Self::from_file(&path)
    }
}

/// Project-local file when present, otherwise the global one
fn default_config_path() -> Result<PathBuf> {
    let local = PathBuf::from(PROJECT_CONFIG_FILE);
    if local.exists() {
        return Ok(local);
    }
    global_config_path()
}
