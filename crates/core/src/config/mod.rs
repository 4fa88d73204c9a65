//! Configuration module for stubwatch
//!
//! Configuration can be loaded from a TOML file and/or environment variables.
//! Every section is optional; missing keys fall back to the defaults in
//! `defaults.rs`.

mod defaults;
mod loading;


use crate::entities::EntityCategory;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use defaults::*;

/// Name of the project-local configuration file
pub const PROJECT_CONFIG_FILE: &str = "stubwatch.toml";

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.stubwatch/config.toml` and is used when
/// no project-local `stubwatch.toml` exists.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".stubwatch").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Change classification settings
    #[serde(default)]
    pub planner: PlannerConfig,

    /// File watcher settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Host application (reload and registry) settings
    #[serde(default)]
    pub host: HostConfig,

    /// Generation runner settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Watch loop settings
    #[serde(default)]
    pub daemon: DaemonConfig,
}

/// Settings for relevance filtering and change classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Source-file suffix a path must end with to count as a change
    #[serde(default = "default_tracked_extension")]
    pub tracked_extension: String,

    /// Paths containing this marker are tooling output and never count
    #[serde(default = "default_ignored_marker")]
    pub ignored_marker: String,

    /// File name whose change fans out to every entity of `schema_category`
    #[serde(default = "default_schema_filename")]
    pub schema_filename: String,

    /// Category regenerated when the schema file changes
    #[serde(default = "default_schema_category")]
    pub schema_category: String,

    /// Generator-name prefixes serving each category
    #[serde(default = "default_category_prefixes")]
    pub category_prefixes: BTreeMap<String, Vec<String>>,
}

impl PlannerConfig {
    pub fn schema_category(&self) -> EntityCategory {
        EntityCategory::new(self.schema_category.clone())
    }

    /// Prefixes configured for `category`, comparing table keys case-insensitively
    pub fn prefixes_for(&self, category: &EntityCategory) -> Option<&[String]> {
        prefixes_for(&self.category_prefixes, category)
    }
}

/// Look up a category in a prefix table whose keys may differ in case
pub fn prefixes_for<'a>(
    table: &'a BTreeMap<String, Vec<String>>,
    category: &EntityCategory,
) -> Option<&'a [String]> {
    table
        .iter()
        .find(|(name, _)| EntityCategory::new(name.as_str()) == *category)
        .map(|(_, prefixes)| prefixes.as_slice())
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            tracked_extension: default_tracked_extension(),
            ignored_marker: default_ignored_marker(),
            schema_filename: default_schema_filename(),
            schema_category: default_schema_category(),
            category_prefixes: default_category_prefixes(),
        }
    }
}

/// File watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Quiescence window in milliseconds before a batch is emitted
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Glob patterns to ignore
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Capacity of the raw event channel
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            ignore_patterns: default_ignore_patterns(),
            max_queue_size: default_max_queue_size(),
        }
    }
}

/// Host application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// JSON registry snapshot written by the host application
    #[serde(default = "default_registry_path")]
    pub registry_path: String,

    /// Command that refreshes the registry snapshot (empty = re-read only)
    #[serde(default)]
    pub reload_command: Vec<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            registry_path: default_registry_path(),
            reload_command: Vec::new(),
        }
    }
}

/// Generation runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Program and leading arguments of the generation command
    #[serde(default = "default_generator_command")]
    pub command: Vec<String>,

    /// Output directory for generated interface files
    #[serde(default = "default_outpath")]
    pub outpath: String,

    /// Worker count handed to the generation command
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Write the generated-files `.gitattributes` marker after every run
    #[serde(default = "default_write_gitattributes")]
    pub write_gitattributes: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_generator_command(),
            outpath: default_outpath(),
            workers: default_workers(),
            write_gitattributes: default_write_gitattributes(),
        }
    }
}

/// Watch loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Stop watching after the first failed reload or generation run
    #[serde(default = "default_exit_on_failure")]
    pub exit_on_failure: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            exit_on_failure: default_exit_on_failure(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let planner = &self.planner;

        if planner.tracked_extension.is_empty() {
            return Err(Error::config(
                "planner.tracked_extension must not be empty".to_string(),
            ));
        }

        if planner.ignored_marker.is_empty() {
            return Err(Error::config(
                "planner.ignored_marker must not be empty".to_string(),
            ));
        }

        if planner.schema_filename.is_empty()
            || planner
                .schema_filename
                .contains(|c: char| c == '/' || c == '\\')
        {
            return Err(Error::config(format!(
                "planner.schema_filename must be a bare file name, got '{}'",
                planner.schema_filename
            )));
        }

        match planner.prefixes_for(&planner.schema_category()) {
            Some(prefixes) if !prefixes.is_empty() => {}
            _ => {
                return Err(Error::config(format!(
                    "planner.category_prefixes has no prefixes for schema category '{}'",
                    planner.schema_category
                )));
            }
        }

        if self.watcher.debounce_ms == 0 {
            return Err(Error::config(
                "watcher.debounce_ms must be greater than 0".to_string(),
            ));
        }
        if self.watcher.debounce_ms > 60_000 {
            return Err(Error::config(format!(
                "watcher.debounce_ms too large (max 60000, got {})",
                self.watcher.debounce_ms
            )));
        }

        if self.watcher.max_queue_size == 0 {
            return Err(Error::config(
                "watcher.max_queue_size must be greater than 0".to_string(),
            ));
        }

        if self.host.registry_path.is_empty() {
            return Err(Error::config(
                "host.registry_path must not be empty".to_string(),
            ));
        }

        if self.generator.command.is_empty() {
            return Err(Error::config(
                "generator.command must name a program".to_string(),
            ));
        }

        if self.generator.workers == 0 {
            return Err(Error::config(
                "generator.workers must be greater than 0".to_string(),
            ));
        }
        if self.generator.workers > 128 {
            return Err(Error::config(format!(
                "generator.workers too large (max 128, got {})",
                self.generator.workers
            )));
        }

        Ok(())
    }
}
