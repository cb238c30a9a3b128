//! Test builders: ergonomic constructors for tables, snapshots and searchers.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use tabmatch_core::config::ColumnConfig;
use tabmatch_core::{Snapshot, Table, UnitSynonymTable};

// ---------------------------------------------------------------------------
// TableBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Table`] fixtures. An empty string cell is stored as
/// an empty cell.
///
/// # Example
///
/// ```rust
/// let table = TableBuilder::new(&["code", "desc"])
///     .row(&["SW-24P", "switch 24 puertos gestionable"])
///     .build();
/// ```
pub struct TableBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl TableBuilder {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, cells: &[&str]) -> Self {
        self.rows.push(
            cells
                .iter()
                .map(|c| (!c.is_empty()).then(|| c.to_string()))
                .collect(),
        );
        self
    }

    pub fn rows(self, rows: &[&[&str]]) -> Self {
        rows.iter().fold(self, |b, r| b.row(r))
    }

    pub fn build(self) -> Table {
        Table::new(self.columns, self.rows)
    }
}

/// A one-column table named `text` with one row per line.
pub fn text_table(lines: &[&str]) -> Table {
    lines
        .iter()
        .fold(TableBuilder::new(&["text"]), |b, l| b.row(&[*l]))
        .build()
}

// ---------------------------------------------------------------------------
// Snapshot helpers
// ---------------------------------------------------------------------------

pub fn units(entries: &[(&str, &[&str])]) -> UnitSynonymTable {
    UnitSynonymTable::build(entries.iter().map(|(c, s)| (*c, s.iter().copied())))
}

pub fn snapshot(dictionary: Table, descriptions: Table, units: UnitSynonymTable) -> Snapshot {
    Snapshot {
        dictionary,
        descriptions,
        units,
    }
}

/// Column configuration that lets both tables pick their text columns.
pub fn auto_columns() -> ColumnConfig {
    ColumnConfig::default()
}
