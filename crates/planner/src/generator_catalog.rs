//! Enumeration of generation backends and their applicability
//!
//! Applicability is decided by name prefix: a generator serves a category when
//! its name starts with one of the prefixes configured for that category. This
//! avoids asking every backend for its own applicability rules during the fast
//! path.

use std::cell::OnceCell;
use std::collections::BTreeMap;
use stubwatch_core::config::prefixes_for;
use stubwatch_core::{EntityCategory, Generator};
use tracing::debug;

/// Registry of the generators available in the host generation framework
pub trait GeneratorSource {
    /// Every registered generator, in registration order
    fn generators(&self) -> Vec<Generator>;
}

/// Memoized view over a [`GeneratorSource`] for one classification pass
pub struct GeneratorCatalog<'a> {
    source: &'a dyn GeneratorSource,
    category_prefixes: &'a BTreeMap<String, Vec<String>>,
    all: OnceCell<Vec<Generator>>,
}

impl<'a> GeneratorCatalog<'a> {
    pub fn new(
        source: &'a dyn GeneratorSource,
        category_prefixes: &'a BTreeMap<String, Vec<String>>,
    ) -> Self {
        Self {
            source,
            category_prefixes,
            all: OnceCell::new(),
        }
    }

    /// Every registered generator, computed once
    pub fn all_generators(&self) -> &[Generator] {
        self.all.get_or_init(|| {
            let generators = self.source.generators();
            debug!("Found {} generators", generators.len());
            generators
        })
    }

    /// Generators whose name matches one of the category's prefixes
    ///
    /// A category with no configured prefixes has no generators.
    pub fn generators_for(&self, category: &EntityCategory) -> Vec<Generator> {
        let Some(prefixes) = prefixes_for(self.category_prefixes, category) else {
            debug!("No generator prefixes configured for category {}", category);
            return Vec::new();
        };

        self.all_generators()
            .iter()
            .filter(|generator| generator.matches_any_prefix(prefixes))
            .cloned()
            .collect()
    }
}
