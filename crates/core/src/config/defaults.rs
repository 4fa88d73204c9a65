//! Default values and functions for configuration

use std::collections::BTreeMap;

// Default constants
pub(crate) const DEFAULT_TRACKED_EXTENSION: &str = ".rb";
pub(crate) const DEFAULT_IGNORED_MARKER: &str = "sorbet";
pub(crate) const DEFAULT_SCHEMA_FILENAME: &str = "schema.rb";
pub(crate) const DEFAULT_REGISTRY_PATH: &str = "tmp/stubwatch/registry.json";
pub(crate) const DEFAULT_OUTPATH: &str = "sorbet/rbi/dsl";
pub(crate) const ACTIVE_RECORD_PREFIX: &str = "Tapioca::Dsl::Compilers::ActiveRecord";
pub(crate) const ACTIVE_MODEL_PREFIX: &str = "Tapioca::Dsl::Compilers::ActiveModel";

pub(crate) fn default_tracked_extension() -> String {
    DEFAULT_TRACKED_EXTENSION.to_string()
}

pub(crate) fn default_ignored_marker() -> String {
    DEFAULT_IGNORED_MARKER.to_string()
}

pub(crate) fn default_schema_filename() -> String {
    DEFAULT_SCHEMA_FILENAME.to_string()
}

pub(crate) fn default_schema_category() -> String {
    crate::entities::EntityCategory::PERSISTENCE_MODEL.to_string()
}

pub(crate) fn default_category_prefixes() -> BTreeMap<String, Vec<String>> {
    let mut table = BTreeMap::new();
    table.insert(
        default_schema_category(),
        vec![
            ACTIVE_RECORD_PREFIX.to_string(),
            ACTIVE_MODEL_PREFIX.to_string(),
        ],
    );
    table
}

pub(crate) fn default_debounce_ms() -> u64 {
    250
}

pub(crate) fn default_max_queue_size() -> usize {
    10_000
}

pub(crate) fn default_ignore_patterns() -> Vec<String> {
    vec![
        "*.swp".to_string(),
        "*.tmp".to_string(),
        "*~".to_string(),
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/log/**".to_string(),
        "**/tmp/**".to_string(),
    ]
}

pub(crate) fn default_registry_path() -> String {
    DEFAULT_REGISTRY_PATH.to_string()
}

pub(crate) fn default_generator_command() -> Vec<String> {
    vec![
        "bundle".to_string(),
        "exec".to_string(),
        "tapioca".to_string(),
        "dsl".to_string(),
    ]
}

pub(crate) fn default_outpath() -> String {
    DEFAULT_OUTPATH.to_string()
}

pub(crate) fn default_workers() -> usize {
    2
}

pub(crate) fn default_write_gitattributes() -> bool {
    true
}

pub(crate) fn default_exit_on_failure() -> bool {
    false
}
