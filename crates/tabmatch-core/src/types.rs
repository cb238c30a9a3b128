//! Core types for tabmatch-core.
//!
//! This module defines the data the engine works on: the [`TableSource`]
//! collaborator interface, the immutable [`Table`] snapshot built from it, and
//! the [`RowSelection`] bitset produced by every mask operation.

use crate::normalizer::{fold, normalize};
use crate::number::parse_number;

/// Inferred content type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Text,
    Numeric,
    Mixed,
}

impl ColumnKind {
    /// All non-empty cells numeric → `Numeric`; none numeric (or no cells) →
    /// `Text`; otherwise `Mixed`.
    pub fn infer<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let (mut numeric, mut text) = (0usize, 0usize);
        for cell in cells.into_iter().flatten() {
            if cell.trim().is_empty() {
                continue;
            }
            if parse_number(cell).is_some() {
                numeric += 1;
            } else {
                text += 1;
            }
        }
        match (numeric, text) {
            (0, _) => ColumnKind::Text,
            (_, 0) => ColumnKind::Numeric,
            _ => ColumnKind::Mixed,
        }
    }

    /// Whether string terms are evaluated against this column by default.
    pub fn is_textual(self) -> bool {
        matches!(self, ColumnKind::Text | ColumnKind::Mixed)
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Mixed => write!(f, "mixed"),
        }
    }
}

/// Tabular data owned by the surrounding application.
pub trait TableSource {
    fn columns(&self) -> Vec<String>;
    fn column_kind(&self, col: usize) -> ColumnKind;
    fn row_count(&self) -> usize;
    fn cell(&self, row: usize, col: usize) -> Option<String>;
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Cell {
    raw: String,
    folded: String,
    normalized: String,
}

impl Cell {
    fn new(raw: String) -> Self {
        Self {
            folded: fold(&raw),
            normalized: normalize(&raw),
            raw,
        }
    }
}

/// Immutable in-memory snapshot of a table.
///
/// Folded and normalized forms of every cell are computed once here so that
/// mask evaluation never re-normalizes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    rows: Vec<Vec<Option<Cell>>>,
}

impl Table {
    /// Build from headers and rows, inferring column kinds. Short rows are
    /// padded with empty cells; extra cells are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows: Vec<Vec<Option<Cell>>> = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<Cell>> = row
                    .into_iter()
                    .take(width)
                    .map(|c| c.filter(|s| !s.is_empty()).map(Cell::new))
                    .collect();
                cells.resize(width, None);
                cells
            })
            .collect();
        let kinds = (0..width)
            .map(|col| {
                ColumnKind::infer(
                    rows.iter()
                        .map(|r| r[col].as_ref().map(|c| c.raw.as_str())),
                )
            })
            .collect();
        Self {
            columns,
            kinds,
            rows,
        }
    }

    /// Snapshot any [`TableSource`], keeping the kinds it reports.
    pub fn from_source(source: &dyn TableSource) -> Self {
        let columns = source.columns();
        let width = columns.len();
        let rows = (0..source.row_count())
            .map(|row| {
                (0..width)
                    .map(|col| source.cell(row, col).filter(|s| !s.is_empty()).map(Cell::new))
                    .collect()
            })
            .collect();
        let kinds = (0..width).map(|col| source.column_kind(col)).collect();
        Self {
            columns,
            kinds,
            rows,
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn kind(&self, col: usize) -> Option<ColumnKind> {
        self.kinds.get(col).copied()
    }

    pub fn raw(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_ref(row, col).map(|c| c.raw.as_str())
    }

    pub fn folded(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_ref(row, col).map(|c| c.folded.as_str())
    }

    pub fn normalized(&self, row: usize, col: usize) -> Option<&str> {
        self.cell_ref(row, col).map(|c| c.normalized.as_str())
    }

    /// Raw values of one row, in column order.
    pub fn row(&self, row: usize) -> Option<Vec<Option<&str>>> {
        self.rows
            .get(row)
            .map(|cells| cells.iter().map(|c| c.as_ref().map(|c| c.raw.as_str())).collect())
    }

    fn cell_ref(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }
}

impl TableSource for Table {
    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }

    fn column_kind(&self, col: usize) -> ColumnKind {
        self.kinds.get(col).copied().unwrap_or(ColumnKind::Text)
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, row: usize, col: usize) -> Option<String> {
        self.raw(row, col).map(str::to_string)
    }
}

// ---------------------------------------------------------------------------
// RowSelection
// ---------------------------------------------------------------------------

/// Bitset aligned to a table's row index.
///
/// Combinators never mutate: every `and`/`or`/`not` returns a new selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowSelection {
    bits: Vec<bool>,
}

impl RowSelection {
    pub fn all(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    pub fn none(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    pub fn from_indices(len: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut bits = vec![false; len];
        for i in indices {
            if let Some(b) = bits.get_mut(i) {
                *b = true;
            }
        }
        Self { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.bits.get(row).copied().unwrap_or(false)
    }

    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    /// True when no row is selected (regardless of length).
    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.then_some(i))
    }

    pub fn and(&self, other: &RowSelection) -> RowSelection {
        debug_assert_eq!(self.len(), other.len());
        self.zip_with(other, |a, b| a && b)
    }

    pub fn or(&self, other: &RowSelection) -> RowSelection {
        debug_assert_eq!(self.len(), other.len());
        self.zip_with(other, |a, b| a || b)
    }

    pub fn not(&self) -> RowSelection {
        Self {
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    fn zip_with(&self, other: &RowSelection, f: impl Fn(bool, bool) -> bool) -> RowSelection {
        Self {
            bits: self
                .bits
                .iter()
                .zip(other.bits.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }
}
