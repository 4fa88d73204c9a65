#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Change classification and generator selection
//!
//! Given a batch of changed paths this crate decides:
//! - whether the batch is relevant at all ([`PathFilter`])
//! - which generators must run and over which scope ([`ChangeClassifier`])
//!
//! Entities and generators come from explicit registries supplied by the host
//! application ([`EntitySource`], [`GeneratorSource`]), usually a
//! [`RegistrySnapshot`] read from disk.
//!
//! # Example
//!
//! ```
//! use stubwatch_core::{ChangeBatch, Entity, EntityCategory, PlannerConfig};
//! use stubwatch_planner::{ChangeClassifier, PathFilter, RegistrySnapshot};
//!
//! let config = PlannerConfig::default();
//! let registry = RegistrySnapshot::new()
//!     .with_entity(Entity::with_categories("User", [EntityCategory::persistence_model()]))
//!     .with_generator("Tapioca::Dsl::Compilers::ActiveRecordColumns");
//!
//! let batch = ChangeBatch::modified(["db/schema.rb"]);
//! assert!(PathFilter::from_config(&config).is_relevant(&batch));
//!
//! let plan = ChangeClassifier::new(&config, &registry, &registry).classify(&batch);
//! assert_eq!(plan.requested_entities(), &["User".to_string()]);
//! ```

mod classifier;
mod entity_catalog;
mod generator_catalog;
mod path_filter;
mod registry;

pub use classifier::ChangeClassifier;
pub use entity_catalog::{EntityCatalog, EntitySource, ResolutionError};
pub use generator_catalog::{GeneratorCatalog, GeneratorSource};
pub use path_filter::PathFilter;
pub use registry::RegistrySnapshot;
