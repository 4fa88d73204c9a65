//! Entities, categories and generators known to the host application
//!
//! Categories are plain tags attached to an entity when the host registers
//! it. Membership is a set lookup; nothing here inspects runtime types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Tag classifying entities by capability, e.g. `persistence_model`
///
/// Names are case-insensitive and stored lowercased, matching how layered
/// configuration reports table keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityCategory(String);

impl EntityCategory {
    /// Category of persistence-model entities (database-backed records)
    pub const PERSISTENCE_MODEL: &'static str = "persistence_model";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().to_lowercase())
    }

    /// The default category that schema-file changes fan out to
    pub fn persistence_model() -> Self {
        Self::new(Self::PERSISTENCE_MODEL)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityCategory {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityCategory {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<EntityCategory> for String {
    fn from(value: EntityCategory) -> Self {
        value.0
    }
}

/// A named, resolvable definition in the host application
///
/// Identity is the fully-qualified name; the category set is ignored for
/// equality so two snapshots of the same constant compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    name: String,
    #[serde(default)]
    categories: BTreeSet<EntityCategory>,
}

impl Entity {
    /// Create an entity with no categories
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            categories: BTreeSet::new(),
        }
    }

    /// Create an entity tagged with the given categories
    pub fn with_categories<I>(name: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = EntityCategory>,
    {
        Self {
            name: name.into(),
            categories: categories.into_iter().collect(),
        }
    }

    /// Fully-qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn categories(&self) -> &BTreeSet<EntityCategory> {
        &self.categories
    }

    /// Check whether the entity was registered under `category`
    pub fn is_a(&self, category: &EntityCategory) -> bool {
        self.categories.contains(category)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Entity {}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A generation backend, identified by name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generator(String);

impl Generator {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Check whether the generator name starts with any of `prefixes`
    pub fn matches_any_prefix<S: AsRef<str>>(&self, prefixes: &[S]) -> bool {
        prefixes.iter().any(|p| self.0.starts_with(p.as_ref()))
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
