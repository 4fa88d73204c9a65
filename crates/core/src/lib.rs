//! Core types for the stubwatch change-driven generation daemon
//!
//! This crate provides the foundational pieces shared by every other crate:
//!
//! - **Data model**: change batches, entities, categories, generators and plans
//! - **Configuration**: layered TOML + environment configuration
//! - **Error handling**: unified error types
//!

pub mod batch;
pub mod config;
pub mod entities;
pub mod error;
pub mod plan;

// Re-export main types for convenience
pub use batch::ChangeBatch;
pub use config::{
    Config, DaemonConfig, GeneratorConfig, HostConfig, PlannerConfig, WatcherConfig,
};
pub use entities::{Entity, EntityCategory, Generator};
pub use error::{Error, Result, ResultExt};
pub use plan::{GenerationPlan, PlanScope};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::batch::ChangeBatch;
    pub use crate::config::Config;
    pub use crate::entities::{Entity, EntityCategory, Generator};
    pub use crate::error::{Result, ResultExt};
    pub use crate::plan::GenerationPlan;
}
