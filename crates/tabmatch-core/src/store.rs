//! Store: the current Dictionary/Description snapshot.
//!
//! The store is the single source of truth for searches. Loading a table
//! never mutates the snapshot a running search holds: it builds a new
//! [`Snapshot`] and swaps the `Arc`.

use std::sync::Arc;

use crate::normalizer::{UnitSynonymSource, UnitSynonymTable};
use crate::types::Table;

/// Both tables plus the unit synonyms built alongside the dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub dictionary: Table,
    pub descriptions: Table,
    pub units: UnitSynonymTable,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    current: Arc<Snapshot>,
}

impl Catalog {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: Arc::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current)
    }

    /// Replace the dictionary and rebuild the unit table from scratch.
    pub fn load_dictionary(&mut self, dictionary: Table, units: &dyn UnitSynonymSource) {
        let units = UnitSynonymTable::from_source(units);
        tracing::info!(
            rows = dictionary.len(),
            columns = dictionary.width(),
            units = units.len(),
            "dictionary loaded"
        );
        self.current = Arc::new(Snapshot {
            dictionary,
            descriptions: self.current.descriptions.clone(),
            units,
        });
    }

    /// Replace the description table, keeping dictionary and units.
    pub fn load_descriptions(&mut self, descriptions: Table) {
        tracing::info!(
            rows = descriptions.len(),
            columns = descriptions.width(),
            "descriptions loaded"
        );
        self.current = Arc::new(Snapshot {
            dictionary: self.current.dictionary.clone(),
            descriptions,
            units: self.current.units.clone(),
        });
    }
}
