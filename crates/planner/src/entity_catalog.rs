//! Enumeration of the host application's entities
//!
//! The catalog walks the candidate names of an [`EntitySource`], resolves each
//! one and keeps the successes. A name that fails to resolve is dropped and
//! never reported to the caller.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use stubwatch_core::{Entity, EntityCategory};
use thiserror::Error;
use tracing::{debug, trace};

/// Why a candidate name did not resolve to a live entity
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// No definition is registered under the name
    #[error("unknown entity '{0}'")]
    Unknown(String),

    /// The name is not a valid qualified name
    #[error("malformed entity name '{0}'")]
    Malformed(String),
}

/// Registry of the entities currently loaded in the host application
pub trait EntitySource {
    /// Every candidate name, in registration order
    fn candidate_names(&self) -> Vec<String>;

    /// Resolve one candidate to its entity
    fn resolve(&self, name: &str) -> Result<Entity, ResolutionError>;
}

/// Memoized view over an [`EntitySource`] for one classification pass
pub struct EntityCatalog<'a> {
    source: &'a dyn EntitySource,
    all: OnceCell<Vec<Entity>>,
    by_category: RefCell<HashMap<EntityCategory, Vec<Entity>>>,
}

impl<'a> EntityCatalog<'a> {
    pub fn new(source: &'a dyn EntitySource) -> Self {
        Self {
            source,
            all: OnceCell::new(),
            by_category: RefCell::new(HashMap::new()),
        }
    }

    /// Every resolvable entity, computed once
    pub fn all_entities(&self) -> &[Entity] {
        self.all.get_or_init(|| {
            let entities: Vec<Entity> = self
                .source
                .candidate_names()
                .iter()
                .filter_map(|name| match self.source.resolve(name) {
                    Ok(entity) => Some(entity),
                    Err(e) => {
                        trace!("Skipping candidate: {e}");
                        None
                    }
                })
                .collect();
            debug!("Resolved {} entities", entities.len());
            entities
        })
    }

    /// Entities registered under `category`, computed once per category
    pub fn entities_of(&self, category: &EntityCategory) -> Vec<Entity> {
        if let Some(cached) = self.by_category.borrow().get(category) {
            return cached.clone();
        }

        let matching: Vec<Entity> = self
            .all_entities()
            .iter()
            .filter(|entity| entity.is_a(category))
            .cloned()
            .collect();
        debug!(
            "Found {} entities in category {}",
            matching.len(),
            category
        );

        self.by_category
            .borrow_mut()
            .insert(category.clone(), matching.clone());
        matching
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Source that counts how often it is enumerated
    struct CountingSource {
        entities: Vec<Entity>,
        unresolvable: Vec<String>,
        enumerations: Cell<usize>,
    }

    impl EntitySource for CountingSource {
        fn candidate_names(&self) -> Vec<String> {
            self.enumerations.set(self.enumerations.get() + 1);
            self.entities
                .iter()
                .map(|e| e.name().to_string())
                .chain(self.unresolvable.iter().cloned())
                .collect()
        }

        fn resolve(&self, name: &str) -> Result<Entity, ResolutionError> {
            self.entities
                .iter()
                .find(|e| e.name() == name)
                .cloned()
                .ok_or_else(|| ResolutionError::Unknown(name.to_string()))
        }
    }

    fn source() -> CountingSource {
        CountingSource {
            entities: vec![
                Entity::with_categories("User", [EntityCategory::persistence_model()]),
                Entity::new("UserMailer"),
                Entity::with_categories("Order", [EntityCategory::persistence_model()]),
            ],
            unresolvable: vec!["Ghost".to_string()],
            enumerations: Cell::new(0),
        }
    }

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities.iter().map(Entity::name).collect()
    }

    #[test]
    fn test_unresolvable_names_are_dropped() {
        let source = source();
        let catalog = EntityCatalog::new(&source);
        assert_eq!(
            names(catalog.all_entities()),
            vec!["User", "UserMailer", "Order"]
        );
    }

    #[test]
    fn test_entities_of_category() {
        let source = source();
        let catalog = EntityCatalog::new(&source);
        let models = catalog.entities_of(&EntityCategory::persistence_model());
        assert_eq!(names(&models), vec!["User", "Order"]);
        assert!(catalog.entities_of(&EntityCategory::new("job")).is_empty());
    }

    #[test]
    fn test_enumeration_is_memoized() {
        let source = source();
        let catalog = EntityCatalog::new(&source);

        catalog.all_entities();
        catalog.entities_of(&EntityCategory::persistence_model());
        catalog.entities_of(&EntityCategory::persistence_model());
        catalog.entities_of(&EntityCategory::new("job"));

        assert_eq!(source.enumerations.get(), 1);
    }

    #[test]
    fn test_fresh_catalog_sees_fresh_source() {
        let source = source();
        EntityCatalog::new(&source).all_entities();
        EntityCatalog::new(&source).all_entities();
        assert_eq!(source.enumerations.get(), 2);
    }
}
