//! Configuration types for the file watcher
//!
//! Built either from the `[watcher]` section of the application configuration
//! or programmatically through [`WatcherConfig::builder`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Immutable configuration for the file watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Quiescence window in milliseconds (default: 250ms)
    pub debounce_ms: u64,
    /// Patterns to ignore (glob patterns, matched against root-relative paths)
    pub ignore_patterns: Vec<String>,
    /// Maximum number of raw events in queue (default: 10000)
    pub max_queue_size: usize,
    /// Attempts at creating the platform watcher before giving up
    pub max_init_retries: u32,
    /// Delay between initialization attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Poll interval for the polling fallback backend
    pub polling_interval_ms: u64,
}

impl WatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }

    /// Get the debounce duration
    pub fn debounce_duration(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self::from(&stubwatch_core::WatcherConfig::default())
    }
}

impl From<&stubwatch_core::WatcherConfig> for WatcherConfig {
    fn from(config: &stubwatch_core::WatcherConfig) -> Self {
        Self {
            debounce_ms: config.debounce_ms,
            ignore_patterns: config.ignore_patterns.clone(),
            max_queue_size: config.max_queue_size,
            max_init_retries: 3,
            retry_delay_ms: 1000,
            polling_interval_ms: 2000,
        }
    }
}

/// Builder for WatcherConfig
#[derive(Debug, Default)]
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    /// Set debounce window in milliseconds
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.debounce_ms = ms;
        self
    }

    /// Replace the ignore patterns
    pub fn ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.config.ignore_patterns = patterns;
        self
    }

    pub fn add_ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.ignore_patterns.push(pattern.into());
        self
    }

    pub fn max_queue_size(mut self, size: usize) -> Self {
        self.config.max_queue_size = size;
        self
    }

    pub fn max_init_retries(mut self, retries: u32) -> Self {
        self.config.max_init_retries = retries;
        self
    }

    pub fn retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.retry_delay_ms = ms;
        self
    }

    /// Build the configuration
    pub fn build(self) -> WatcherConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = WatcherConfig::default();
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.max_queue_size, 10_000);
        assert_eq!(config.max_init_retries, 3);
        assert!(config.ignore_patterns.contains(&"*.swp".to_string()));
    }

    #[test]
    fn test_builder() {
        let config = WatcherConfig::builder()
            .debounce_ms(50)
            .ignore_patterns(vec![])
            .add_ignore_pattern("*.log")
            .max_queue_size(16)
            .build();

        assert_eq!(config.debounce_duration(), Duration::from_millis(50));
        assert_eq!(config.ignore_patterns, vec!["*.log".to_string()]);
        assert_eq!(config.max_queue_size, 16);
    }

    #[test]
    fn test_from_application_config() {
        let app = stubwatch_core::WatcherConfig {
            debounce_ms: 1200,
            ignore_patterns: vec!["vendor/**".to_string()],
            max_queue_size: 64,
        };
        let config = WatcherConfig::from(&app);
        assert_eq!(config.debounce_ms, 1200);
        assert_eq!(config.ignore_patterns, vec!["vendor/**".to_string()]);
        assert_eq!(config.max_queue_size, 64);
    }
}
