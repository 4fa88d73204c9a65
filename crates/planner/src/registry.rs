//! JSON registry snapshot written by the host application
//!
//! The host dumps its loaded constants, the categories each definition was
//! registered under and its generation backends. `constants` lists candidate
//! names; a candidate without a matching `definitions` entry fails resolution.
//!
//! ```json
//! {
//!   "constants": ["User", "Order"],
//!   "definitions": { "User": { "categories": ["persistence_model"] } },
//!   "generators": ["Tapioca::Dsl::Compilers::ActiveRecordColumns"]
//! }
//! ```

use crate::entity_catalog::{EntitySource, ResolutionError};
use crate::generator_catalog::GeneratorSource;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use stubwatch_core::{Entity, EntityCategory, Error, Generator, Result};
use tracing::debug;

/// Categories attached to one registered definition
#[derive(Debug, Clone, Default, Deserialize)]
struct Definition {
    #[serde(default)]
    categories: BTreeSet<EntityCategory>,
}

/// In-memory registry of entities and generators
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    constants: Vec<String>,
    #[serde(default)]
    definitions: BTreeMap<String, Definition>,
    #[serde(default)]
    generators: Vec<String>,
}

impl RegistrySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from JSON
    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Read and parse a snapshot file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::registry(path.display().to_string(), e.to_string()))?;
        let snapshot = Self::from_json_str(&content)
            .map_err(|e| Error::registry(path.display().to_string(), e.to_string()))?;
        debug!(
            "Loaded registry {} ({} constants, {} generators)",
            path.display(),
            snapshot.constants.len(),
            snapshot.generators.len()
        );
        Ok(snapshot)
    }

    /// Register a resolvable entity
    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.constants.push(entity.name().to_string());
        self.definitions.insert(
            entity.name().to_string(),
            Definition {
                categories: entity.categories().clone(),
            },
        );
        self
    }

    /// Register a candidate name without a definition
    pub fn with_candidate(mut self, name: impl Into<String>) -> Self {
        self.constants.push(name.into());
        self
    }

    pub fn with_generator(mut self, name: impl Into<String>) -> Self {
        self.generators.push(name.into());
        self
    }
}

impl EntitySource for RegistrySnapshot {
    fn candidate_names(&self) -> Vec<String> {
        self.constants.clone()
    }

    fn resolve(&self, name: &str) -> std::result::Result<Entity, ResolutionError> {
        if !is_qualified_name(name) {
            return Err(ResolutionError::Malformed(name.to_string()));
        }
        self.definitions
            .get(name)
            .map(|definition| Entity::with_categories(name, definition.categories.iter().cloned()))
            .ok_or_else(|| ResolutionError::Unknown(name.to_string()))
    }
}

impl GeneratorSource for RegistrySnapshot {
    fn generators(&self) -> Vec<Generator> {
        self.generators.iter().map(Generator::new).collect()
    }
}

/// `Foo::Bar` style constant path: non-empty segments starting uppercase
fn is_qualified_name(name: &str) -> bool {
    !name.is_empty()
        && name.split("::").all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_uppercase())
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        })
}
