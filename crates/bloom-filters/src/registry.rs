//! Filter registry
//!
//! Maps filter names to filters. The key set is fixed when the registry is
//! built; afterwards only filter contents change. Each filter sits behind its
//! own `RwLock`, held only for the duration of a single insert or lookup.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::domain::BloomFilter;
use crate::error::FilterError;

/// Immutable-keyed collection of named filters
#[derive(Debug, Default)]
pub struct FilterRegistry {
    filters: HashMap<String, RwLock<BloomFilter>>,
}

impl FilterRegistry {
    /// Build a registry from named filters
    ///
    /// Fails if the same name appears twice.
    pub fn from_filters<I>(filters: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (String, BloomFilter)>,
    {
        let mut map = HashMap::new();
        for (name, filter) in filters {
            if map.contains_key(&name) {
                return Err(FilterError::DuplicateFilter { name });
            }
            map.insert(name, RwLock::new(filter));
        }
        Ok(Self { filters: map })
    }

    /// Whether a filter with this name exists
    pub fn contains_filter(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Test a keyword against a named filter
    ///
    /// Returns `None` if the filter does not exist.
    pub fn test(&self, name: &str, keyword: &[u8]) -> Option<bool> {
        self.filters
            .get(name)
            .map(|filter| filter.read().contains(keyword))
    }

    /// Insert a keyword into a named filter
    ///
    /// Returns `None` if the filter does not exist, otherwise whether the
    /// keyword was newly inserted.
    pub fn add(&self, name: &str, keyword: &[u8]) -> Option<bool> {
        self.filters
            .get(name)
            .map(|filter| filter.write().insert(keyword))
    }

    /// Registered filter names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.filters.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered filters
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
