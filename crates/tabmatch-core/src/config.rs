//! Configuration types for tabmatch.
//!
//! [`Config::load`] reads `~/.config/tabmatch/config.toml` (or an explicit
//! path), creating the default file if it does not yet exist.
//! [`Config::defaults`] returns the same defaults without touching the
//! filesystem (useful in tests).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result, TableRole};
use crate::normalizer::{BuiltinUnits, UnitSynonymSource};
use crate::types::Table;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[dictionary]
columns = []

[description]
columns = []

[search]
via_dictionary  = true
direct_fallback = false
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub dictionary: TableConfig,
    #[serde(default)]
    pub description: TableConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Canonical unit → synonyms. `None` means use the built-in table.
    #[serde(default)]
    pub units: Option<BTreeMap<String, Vec<String>>>,
}

/// `[dictionary]` / `[description]` sections.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    /// Explicit 0-based column indices. Empty selects every text column.
    #[serde(default)]
    pub columns: Vec<usize>,
}

impl TableConfig {
    pub fn selection(&self) -> ColumnSelection {
        if self.columns.is_empty() {
            ColumnSelection::Auto
        } else {
            ColumnSelection::Indices(self.columns.clone())
        }
    }
}

/// `[search]` section.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    #[serde(default = "default_via_dictionary")]
    pub via_dictionary: bool,
    #[serde(default)]
    pub direct_fallback: bool,
}

fn default_via_dictionary() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            via_dictionary: default_via_dictionary(),
            direct_fallback: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load `path` (or the default location) layered on top of the built-in
    /// defaults. The default location is created with defaults if missing;
    /// an explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (config_path(), false),
        };

        if !required && !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(required))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Parse a TOML document layered on top of the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    pub fn columns(&self) -> ColumnConfig {
        ColumnConfig {
            dictionary: self.dictionary.selection(),
            description: self.description.selection(),
        }
    }
}

impl UnitSynonymSource for Config {
    fn canonical_to_synonyms(&self) -> Vec<(String, Vec<String>)> {
        match &self.units {
            Some(units) => units
                .iter()
                .map(|(canonical, synonyms)| (canonical.clone(), synonyms.clone()))
                .collect(),
            None => BuiltinUnits.canonical_to_synonyms(),
        }
    }
}

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// Which columns of a table a search targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnSelection {
    /// Every text or mixed column.
    #[default]
    Auto,
    Indices(Vec<usize>),
}

impl ColumnSelection {
    /// Resolve against `table`. Duplicate indices keep their first position.
    pub fn resolve(&self, table: &Table, role: TableRole) -> Result<Vec<usize>> {
        let columns: Vec<usize> = match self {
            ColumnSelection::Auto => (0..table.width())
                .filter(|&c| table.kind(c).is_some_and(|k| k.is_textual()))
                .collect(),
            ColumnSelection::Indices(indices) => {
                let mut out = Vec::with_capacity(indices.len());
                for &index in indices {
                    if index >= table.width() {
                        return Err(Error::ColumnOutOfRange {
                            table: role,
                            index,
                            len: table.width(),
                        });
                    }
                    if !out.contains(&index) {
                        out.push(index);
                    }
                }
                out
            }
        };
        if columns.is_empty() {
            return Err(Error::NoUsableColumns { table: role });
        }
        Ok(columns)
    }
}

/// Column selections for both tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnConfig {
    pub dictionary: ColumnSelection,
    pub description: ColumnSelection,
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("tabmatch")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::UnitSynonymTable;

    fn table() -> Table {
        Table::new(
            vec!["code".into(), "price".into(), "desc".into()],
            vec![vec![Some("A".into()), Some("10".into()), Some("uno".into())]],
        )
    }

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert!(cfg.search.via_dictionary);
        assert!(!cfg.search.direct_fallback);
        assert!(cfg.dictionary.columns.is_empty());
        assert_eq!(cfg.units, None);
        assert_eq!(cfg.columns(), ColumnConfig::default());
    }

    #[test]
    fn toml_overrides_layer_on_defaults() {
        let cfg = Config::from_toml_str(
            "[description]\ncolumns = [2, 0]\n\n[search]\ndirect_fallback = true\n",
        )
        .expect("valid toml");
        assert!(cfg.search.via_dictionary);
        assert!(cfg.search.direct_fallback);
        assert_eq!(cfg.description.selection(), ColumnSelection::Indices(vec![2, 0]));
        assert_eq!(cfg.dictionary.selection(), ColumnSelection::Auto);
    }

    #[test]
    fn configured_units_replace_builtin() {
        let cfg =
            Config::from_toml_str("[units]\nVATIOS = [\"W\", \"WATTS\"]\n").expect("valid toml");
        let table = UnitSynonymTable::from_source(&cfg);
        assert_eq!(table.resolve("watts").map(|u| u.to_string()), Some("VATIOS".into()));
        assert_eq!(table.resolve("kg"), None);
    }

    #[test]
    fn missing_units_fall_back_to_builtin() {
        let table = UnitSynonymTable::from_source(&Config::defaults());
        assert!(table.resolve("kg").is_some());
    }

    #[test]
    fn auto_selects_text_columns() {
        let cols = ColumnSelection::Auto
            .resolve(&table(), TableRole::Dictionary)
            .expect("text columns exist");
        assert_eq!(cols, vec![0, 2]);
    }

    #[test]
    fn explicit_indices_dedupe_and_check_range() {
        let cols = ColumnSelection::Indices(vec![1, 1, 0])
            .resolve(&table(), TableRole::Description)
            .expect("in range");
        assert_eq!(cols, vec![1, 0]);

        let err = ColumnSelection::Indices(vec![5])
            .resolve(&table(), TableRole::Description)
            .unwrap_err();
        assert!(matches!(err, Error::ColumnOutOfRange { index: 5, len: 3, .. }));
    }

    #[test]
    fn numeric_only_table_has_no_usable_columns() {
        let t = Table::new(vec!["n".into()], vec![vec![Some("1".into())]]);
        let err = ColumnSelection::Auto.resolve(&t, TableRole::Dictionary).unwrap_err();
        assert!(matches!(err, Error::NoUsableColumns { .. }));
    }
}
