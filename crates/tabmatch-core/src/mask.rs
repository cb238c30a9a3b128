//! Row mask evaluator: turns atomic terms into [`RowSelection`]s.
//!
//! String terms match whole words of the normalized cell text. Numeric terms
//! scan the folded cell text for every embedded `NUMBER UNIT?` and match if
//! any occurrence satisfies the operator and the unit. Matches are ORed
//! across the targeted columns.
//!
//! Negation is not part of the OR/AND algebra: [`RowMaskEvaluator::apply_negation`]
//! computes the rows that survive the negated terms, and every positive mask
//! is evaluated inside that surviving set.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result, TableRole};
use crate::normalizer::{normalize, UnitSynonymTable};
use crate::query::{ParsedQuery, Segment};
use crate::term::{AtomicTerm, TermKind};
use crate::types::{RowSelection, Table};

static CELL_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<num>\d+(?:[.,]\d+)*)\s*(?P<unit>[^\W\d_][\w/]*)?")
        .expect("cell number pattern is valid")
});

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Word boundary between two adjacent chars, `None` standing for the edge of
/// the text. Same rule as regex `\b`.
fn is_boundary(before: Option<char>, after: Option<char>) -> bool {
    before.is_some_and(is_word_char) != after.is_some_and(is_word_char)
}

/// Whether `word` occurs in `cell` with a word boundary on both sides.
fn contains_word(cell: &str, word: &str) -> bool {
    let (Some(first), Some(last)) = (word.chars().next(), word.chars().next_back()) else {
        return false;
    };
    cell.match_indices(word).any(|(start, _)| {
        let before = cell[..start].chars().next_back();
        let after = cell[start + word.len()..].chars().next();
        is_boundary(before, Some(first)) && is_boundary(Some(last), after)
    })
}

/// Evaluates terms against a fixed set of columns of one table.
#[derive(Debug, Clone, Copy)]
pub struct RowMaskEvaluator<'a> {
    table: &'a Table,
    columns: &'a [usize],
    units: &'a UnitSynonymTable,
}

impl<'a> RowMaskEvaluator<'a> {
    /// Fails with [`Error::MissingColumn`] if any column is not in the table.
    pub fn new(
        table: &'a Table,
        columns: &'a [usize],
        units: &'a UnitSynonymTable,
        role: TableRole,
    ) -> Result<Self> {
        if let Some(&column) = columns.iter().find(|&&c| c >= table.width()) {
            return Err(Error::MissingColumn {
                table: role,
                column,
            });
        }
        Ok(Self {
            table,
            columns,
            units,
        })
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn all(&self) -> RowSelection {
        RowSelection::all(self.table.len())
    }

    pub fn none(&self) -> RowSelection {
        RowSelection::none(self.table.len())
    }

    pub fn mask_for_term(&self, term: &AtomicTerm) -> RowSelection {
        let bits = match &term.kind {
            TermKind::Str(text) => self.word_bits(text),
            TermKind::Compare { .. } | TermKind::Range { .. } => (0..self.table.len())
                .map(|row| self.row_has_number(row, term))
                .collect(),
        };
        let mask = RowSelection::from_bits(bits);
        if term.negate {
            mask.not()
        } else {
            mask
        }
    }

    /// Intersection of the per-term masks. An empty term list selects every
    /// row.
    pub fn mask_for_and_segment(&self, terms: &[AtomicTerm]) -> RowSelection {
        let mut running = self.all();
        for term in terms {
            running = running.and(&self.mask_for_term(term));
            if running.is_empty() {
                return self.none();
            }
        }
        running
    }

    /// Union of the per-segment masks. A segment without terms contributes
    /// nothing, and so does an empty segment list.
    pub fn mask_for_or_segments(&self, segments: &[Segment]) -> RowSelection {
        segments
            .iter()
            .filter(|s| !s.terms.is_empty())
            .fold(self.none(), |acc, s| acc.or(&self.mask_for_and_segment(&s.terms)))
    }

    /// Rows that do not whole-word-match any negated term in any targeted
    /// column.
    pub fn apply_negation(&self, negated_terms: &BTreeSet<String>) -> RowSelection {
        negated_terms
            .iter()
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
            .fold(self.all(), |keep, term| {
                keep.and(&RowSelection::from_bits(self.word_bits(&term)).not())
            })
    }

    /// Negation pre-filter, then the OR of AND segments inside the survivors.
    /// With no segments at all the survivors are the result.
    pub fn mask_for_query(
        &self,
        parsed: &ParsedQuery,
        negated_terms: &BTreeSet<String>,
    ) -> RowSelection {
        let keep = self.apply_negation(negated_terms);
        if parsed.segments.is_empty() {
            return keep;
        }
        if keep.is_empty() {
            return keep;
        }
        keep.and(&self.mask_for_or_segments(&parsed.segments))
    }

    fn word_bits(&self, text: &str) -> Vec<bool> {
        (0..self.table.len())
            .map(|row| {
                self.columns.iter().any(|&col| {
                    self.table
                        .normalized(row, col)
                        .is_some_and(|cell| contains_word(cell, text))
                })
            })
            .collect()
    }

    fn row_has_number(&self, row: usize, term: &AtomicTerm) -> bool {
        self.columns.iter().any(|&col| {
            self.table
                .folded(row, col)
                .is_some_and(|cell| self.cell_has_number(cell, term))
        })
    }

    fn cell_has_number(&self, cell: &str, term: &AtomicTerm) -> bool {
        CELL_NUMBER_RE.captures_iter(cell).any(|caps| {
            let Some(value) = caps
                .name("num")
                .and_then(|m| crate::number::parse_number(m.as_str()))
            else {
                return false;
            };
            term.accepts(value) && self.unit_matches(caps.name("unit").map(|m| m.as_str()), term)
        })
    }

    fn unit_matches(&self, cell_unit: Option<&str>, term: &AtomicTerm) -> bool {
        let Some(required) = &term.unit else {
            return true;
        };
        let Some(cell_unit) = cell_unit else {
            return false;
        };
        match self.units.resolve(cell_unit) {
            Some(resolved) => &resolved == required,
            None => normalize(cell_unit) == required.as_str(),
        }
    }
}
