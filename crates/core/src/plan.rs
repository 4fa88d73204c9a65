//! Generation plans produced by change classification
//!
//! A plan is scoped either by entity name or by raw path, never both. The two
//! constructors are the only way to build one, so the exclusivity holds for
//! every value of the type.

use crate::entities::{Entity, Generator};
use serde::Serialize;
use std::path::PathBuf;

/// What to regenerate for one change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationPlan {
    requested_entities: Vec<String>,
    requested_paths: Vec<PathBuf>,
    selected_generators: Vec<Generator>,
}

/// Which input scope a plan carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanScope {
    /// Specific named entities
    Entities,
    /// Specific source paths
    Paths,
    /// Nothing to regenerate
    Empty,
}

impl GenerationPlan {
    /// Plan scoped to named entities
    pub fn for_entities(entities: &[Entity], generators: Vec<Generator>) -> Self {
        Self {
            requested_entities: entities.iter().map(|e| e.name().to_string()).collect(),
            requested_paths: Vec::new(),
            selected_generators: generators,
        }
    }

    /// Plan scoped to raw paths
    pub fn for_paths(paths: Vec<PathBuf>, generators: Vec<Generator>) -> Self {
        Self {
            requested_entities: Vec::new(),
            requested_paths: paths,
            selected_generators: generators,
        }
    }

    pub fn requested_entities(&self) -> &[String] {
        &self.requested_entities
    }

    pub fn requested_paths(&self) -> &[PathBuf] {
        &self.requested_paths
    }

    pub fn selected_generators(&self) -> &[Generator] {
        &self.selected_generators
    }

    pub fn scope(&self) -> PlanScope {
        if !self.requested_entities.is_empty() {
            PlanScope::Entities
        } else if !self.requested_paths.is_empty() {
            PlanScope::Paths
        } else {
            PlanScope::Empty
        }
    }

    /// A plan is worth running when it has a scope and at least one generator
    pub fn is_actionable(&self) -> bool {
        self.scope() != PlanScope::Empty && !self.selected_generators.is_empty()
    }

    /// Human-readable lines describing the plan, one per non-empty part
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.requested_entities.is_empty() {
            lines.push(format!(
                "Detected the following entities to be changed: {}",
                self.requested_entities.join(", ")
            ));
        }
        if !self.requested_paths.is_empty() {
            let paths: Vec<_> = self
                .requested_paths
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            lines.push(format!(
                "Detected the following paths to be changed: {}",
                paths.join(", ")
            ));
        }
        if !self.selected_generators.is_empty() {
            let generators: Vec<_> = self.selected_generators.iter().map(Generator::name).collect();
            lines.push(format!(
                "Using the following generators: {}",
                generators.join(", ")
            ));
        }
        lines
    }
}
