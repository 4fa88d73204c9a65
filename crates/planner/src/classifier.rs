//! Change classification: from a change batch to a generation plan
//!
//! A change to the schema-definition file is the one case where changed paths
//! do not map to affected entities: every entity of the schema category may
//! need regeneration although none of their sources changed. Every other batch
//! is treated as local and planned by path with the full generator set.

use crate::entity_catalog::{EntityCatalog, EntitySource};
use crate::generator_catalog::{GeneratorCatalog, GeneratorSource};
use std::ffi::OsStr;
use stubwatch_core::{ChangeBatch, EntityCategory, GenerationPlan, PlannerConfig};
use tracing::{debug, warn};

/// Builds one [`GenerationPlan`] per change batch
///
/// A classifier owns the catalogs of a single pass; build a new one for every
/// batch so that catalog memoization never outlives a reload.
pub struct ChangeClassifier<'a> {
    schema_filename: &'a str,
    schema_category: EntityCategory,
    entities: EntityCatalog<'a>,
    generators: GeneratorCatalog<'a>,
}

impl<'a> ChangeClassifier<'a> {
    pub fn new(
        config: &'a PlannerConfig,
        entities: &'a dyn EntitySource,
        generators: &'a dyn GeneratorSource,
    ) -> Self {
        Self {
            schema_filename: &config.schema_filename,
            schema_category: config.schema_category(),
            entities: EntityCatalog::new(entities),
            generators: GeneratorCatalog::new(generators, &config.category_prefixes),
        }
    }

    /// True when any path of the batch is named exactly like the schema file
    pub fn is_schema_change(&self, batch: &ChangeBatch) -> bool {
        let schema = OsStr::new(self.schema_filename);
        batch
            .all_paths()
            .any(|path| path.file_name() == Some(schema))
    }

    /// Classify a batch
    ///
    /// Never fails; an empty batch yields a path-scoped plan with no paths,
    /// which callers avoid by checking relevance first.
    pub fn classify(&self, batch: &ChangeBatch) -> GenerationPlan {
        if self.is_schema_change(batch) {
            let targets = self.entities.entities_of(&self.schema_category);
            if !targets.is_empty() {
                debug!(
                    "Schema change affects {} {} entities",
                    targets.len(),
                    self.schema_category
                );
                let generators = self.generators.generators_for(&self.schema_category);
                return GenerationPlan::for_entities(&targets, generators);
            }
            warn!(
                "{} changed but no {} entities are registered; planning by path instead",
                self.schema_filename, self.schema_category
            );
        }

        GenerationPlan::for_paths(batch.union(), self.generators.all_generators().to_vec())
    }

    pub fn entity_catalog(&self) -> &EntityCatalog<'a> {
        &self.entities
    }

    pub fn generator_catalog(&self) -> &GeneratorCatalog<'a> {
        &self.generators
    }
}
