//! Rendering of search results for the terminal and for `--json`.

use serde::Serialize;
use tabmatch_core::{SearchResponse, Table};

/// One matched Description row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub index: usize,
    pub cells: Vec<Option<String>>,
}

/// Serializable summary of one search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub query: String,
    pub outcome: &'static str,
    pub message: String,
    pub negation_only: bool,
    pub offers_direct_fallback: bool,
    /// Indices of the matched Dictionary rows, when the dictionary was used.
    pub dictionary_matches: Option<Vec<usize>>,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub error: Option<String>,
}

impl Report {
    pub fn new(query: &str, response: &SearchResponse, descriptions: &Table) -> Self {
        let rows = response
            .rows
            .indices()
            .filter_map(|index| {
                descriptions.row(index).map(|cells| ReportRow {
                    index,
                    cells: cells.into_iter().map(|c| c.map(str::to_string)).collect(),
                })
            })
            .collect();
        Self {
            query: query.to_string(),
            outcome: response.outcome.label(),
            message: response.outcome.to_string(),
            negation_only: response.outcome.is_negation_only(),
            offers_direct_fallback: response.outcome.offers_direct_fallback(),
            dictionary_matches: response
                .dictionary_matches
                .as_ref()
                .map(|m| m.indices().collect()),
            columns: descriptions.column_names().to_vec(),
            rows,
            error: response.error.clone(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Tab-separated rendering: a status header, then the column names and
    /// one line per matched row.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("outcome: {} ({})\n", self.message, self.outcome));
        if let Some(matches) = &self.dictionary_matches {
            out.push_str(&format!("dictionary matches: {}\n", matches.len()));
        }
        if self.offers_direct_fallback {
            out.push_str("hint: rerun with --direct to search the descriptions directly\n");
        }
        if self.rows.is_empty() {
            return out;
        }
        out.push_str(&format!("row\t{}\n", self.columns.join("\t")));
        for row in &self.rows {
            let cells: Vec<&str> = row
                .cells
                .iter()
                .map(|c| c.as_deref().unwrap_or(""))
                .collect();
            out.push_str(&format!("{}\t{}\n", row.index, cells.join("\t")));
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
