//! File ignore pattern matching
//!
//! Glob patterns are checked against the root-relative path and against the
//! bare file name, so `*.swp` and `**/tmp/**` both behave as expected.

use glob::{Pattern, PatternError};
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Manages file ignore patterns and filtering
///
/// By default, ignores nothing.
#[derive(Clone, Default)]
pub struct IgnoreFilter {
    patterns: Arc<Vec<Pattern>>,
}

impl IgnoreFilter {
    /// Create a filter from patterns
    pub fn from_patterns(patterns: &[String]) -> Result<Self, PatternError> {
        Self::builder().patterns(patterns.to_vec()).build()
    }

    pub fn builder() -> IgnoreFilterBuilder {
        IgnoreFilterBuilder::default()
    }

    /// Check if a path should be ignored
    pub fn should_ignore(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        let file_name = path.file_name().map(|name| name.to_string_lossy());

        for pattern in self.patterns.iter() {
            let matched = pattern.matches(&path_str)
                || file_name
                    .as_deref()
                    .is_some_and(|name| pattern.matches(name));
            if matched {
                trace!("Path {:?} matches ignore pattern {}", path, pattern);
                return true;
            }
        }

        false
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Builder for IgnoreFilter
#[derive(Debug, Default)]
pub struct IgnoreFilterBuilder {
    patterns: Vec<String>,
}

impl IgnoreFilterBuilder {
    /// Add a glob pattern to ignore
    pub fn add_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }

    /// Add multiple patterns
    pub fn patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Build the ignore filter
    pub fn build(self) -> Result<IgnoreFilter, PatternError> {
        let compiled_patterns = self
            .patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(IgnoreFilter {
            patterns: Arc::new(compiled_patterns),
        })
    }
}
