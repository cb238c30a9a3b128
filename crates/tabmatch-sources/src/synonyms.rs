//! Unit synonym files.
//!
//! A JSON object mapping each canonical unit to its synonyms:
//!
//! ```json
//! { "VATIOS": ["W", "WATTS"], "METROS": "M" }
//! ```
//!
//! Key order is preserved so that later canonical units win conflicts the
//! same way the file reads.

use std::path::Path;

use serde::Deserialize;
use tabmatch_core::UnitSynonymSource;

use crate::SourceError;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Synonyms {
    One(String),
    Many(Vec<String>),
}

/// Canonical unit → synonyms, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSynonyms {
    entries: Vec<(String, Vec<String>)>,
}

impl UnitSynonyms {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(map.len());
        for (canonical, value) in map {
            let synonyms = match Synonyms::deserialize(value)? {
                Synonyms::One(s) => vec![s],
                Synonyms::Many(v) => v,
            };
            entries.push((canonical, synonyms));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl UnitSynonymSource for UnitSynonyms {
    fn canonical_to_synonyms(&self) -> Vec<(String, Vec<String>)> {
        self.entries.clone()
    }
}

pub fn load_unit_synonyms(path: &Path) -> Result<UnitSynonyms, SourceError> {
    let json = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let synonyms = UnitSynonyms::from_json_str(&json).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), units = synonyms.len(), "loaded unit synonyms");
    Ok(synonyms)
}
