//! Search layer: the two-stage dictionary → description pipeline.
//!
//! A query is first run against the Dictionary table. Significant words from
//! the matching dictionary rows become a derived OR query which is then run
//! against the Description table. Queries with a top-level `+` are handled
//! part by part: each AND-part gets its own dictionary pass and narrows the
//! running description result in turn.
//!
//! A direct pass skips the dictionary and runs the query straight against
//! the Description table.
//!
//! ```text
//! query ──► negation ──► decompose ──► Dictionary masks ──► extract terms
//!                                                                │
//!            Description rows ◄── Description masks ◄── derived OR query
//! ```

use std::collections::BTreeSet;

use crate::config::{ColumnConfig, SearchConfig};
use crate::error::{Error, ErrorKind, Result, TableRole};
use crate::mask::RowMaskEvaluator;
use crate::query::{and_parts, decompose, quote_term, Query};
use crate::store::Snapshot;
use crate::types::{RowSelection, Table};

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// How a search resolved.
///
/// `negation_only` marks the dictionary variants reached by a query made of
/// negations alone.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Empty query: every description row, no dictionary involvement.
    MatchAll,
    DictionaryNoMatch {
        negation_only: bool,
    },
    DictionaryMatchNoTermsExtracted {
        dictionary_rows: usize,
        negation_only: bool,
    },
    DictionaryMatchNoDescriptionHits {
        terms: usize,
        negation_only: bool,
    },
    DictionaryMatchWithDescriptionHits {
        rows: RowSelection,
        terms: usize,
        negation_only: bool,
    },
    DirectDescriptionHits {
        rows: RowSelection,
    },
    DirectDescriptionNoHits,
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl SearchOutcome {
    /// Stable snake-case name of the variant.
    pub fn label(&self) -> &'static str {
        match self {
            SearchOutcome::MatchAll => "match_all",
            SearchOutcome::DictionaryNoMatch { .. } => "dictionary_no_match",
            SearchOutcome::DictionaryMatchNoTermsExtracted { .. } => {
                "dictionary_match_no_terms_extracted"
            }
            SearchOutcome::DictionaryMatchNoDescriptionHits { .. } => {
                "dictionary_match_no_description_hits"
            }
            SearchOutcome::DictionaryMatchWithDescriptionHits { .. } => {
                "dictionary_match_with_description_hits"
            }
            SearchOutcome::DirectDescriptionHits { .. } => "direct_description_hits",
            SearchOutcome::DirectDescriptionNoHits => "direct_description_no_hits",
            SearchOutcome::Error { .. } => "error",
        }
    }

    /// True for the dictionary outcomes that found nothing in the
    /// Description table. Only these offer the direct pass.
    pub fn offers_direct_fallback(&self) -> bool {
        matches!(
            self,
            SearchOutcome::DictionaryNoMatch { .. }
                | SearchOutcome::DictionaryMatchNoTermsExtracted { .. }
                | SearchOutcome::DictionaryMatchNoDescriptionHits { .. }
        )
    }

    pub fn is_negation_only(&self) -> bool {
        match self {
            SearchOutcome::DictionaryNoMatch { negation_only }
            | SearchOutcome::DictionaryMatchNoTermsExtracted { negation_only, .. }
            | SearchOutcome::DictionaryMatchNoDescriptionHits { negation_only, .. }
            | SearchOutcome::DictionaryMatchWithDescriptionHits { negation_only, .. } => {
                *negation_only
            }
            _ => false,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SearchOutcome::Error { .. })
    }
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchOutcome::MatchAll => write!(f, "no query: showing every row"),
            SearchOutcome::DictionaryNoMatch { .. } => {
                write!(f, "no dictionary row matched")
            }
            SearchOutcome::DictionaryMatchNoTermsExtracted { dictionary_rows, .. } => write!(
                f,
                "{dictionary_rows} dictionary rows matched but yielded no search terms"
            ),
            SearchOutcome::DictionaryMatchNoDescriptionHits { terms, .. } => write!(
                f,
                "{terms} dictionary terms matched no description rows"
            ),
            SearchOutcome::DictionaryMatchWithDescriptionHits { rows, terms, .. } => write!(
                f,
                "{} description rows matched via {terms} dictionary terms",
                rows.count()
            ),
            SearchOutcome::DirectDescriptionHits { rows } => {
                write!(f, "{} description rows matched directly", rows.count())
            }
            SearchOutcome::DirectDescriptionNoHits => {
                write!(f, "no description row matched directly")
            }
            SearchOutcome::Error { kind, message } => write!(f, "{kind} error: {message}"),
        }?;
        if self.is_negation_only() {
            write!(f, " (negation only)")?;
        }
        Ok(())
    }
}

/// Everything a caller needs to render a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// Selected Description rows. Empty on no-hit and error outcomes.
    pub rows: RowSelection,
    pub outcome: SearchOutcome,
    /// Dictionary rows that matched, for highlighting.
    pub dictionary_matches: Option<RowSelection>,
    pub error: Option<String>,
}

impl SearchResponse {
    fn new(
        rows: RowSelection,
        outcome: SearchOutcome,
        dictionary_matches: Option<RowSelection>,
    ) -> Self {
        Self {
            rows,
            outcome,
            dictionary_matches,
            error: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Term extraction
// ---------------------------------------------------------------------------

fn is_numeric_token(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
        && token.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
}

/// Significant words of the selected rows: normalized, whitespace-split
/// tokens longer than one character that are not purely numeric. Numeric
/// tokens are returned only when no word qualifies.
pub fn extract_terms(table: &Table, columns: &[usize], rows: &RowSelection) -> Vec<String> {
    let mut words = BTreeSet::new();
    let mut numbers = BTreeSet::new();
    for row in rows.indices() {
        for &col in columns {
            let Some(cell) = table.normalized(row, col) else {
                continue;
            };
            for token in cell.split_whitespace() {
                if is_numeric_token(token) {
                    numbers.insert(token.to_string());
                } else if token.chars().count() > 1 {
                    words.insert(token.to_string());
                }
            }
        }
    }
    let terms = if words.is_empty() { numbers } else { words };
    terms.into_iter().collect()
}

/// OR-join of extracted terms, phrase-quoted where needed.
pub fn derived_query(terms: &[String]) -> String {
    terms
        .iter()
        .map(|t| quote_term(t))
        .collect::<Vec<_>>()
        .join(" | ")
}

// ---------------------------------------------------------------------------
// Searcher
// ---------------------------------------------------------------------------

/// Runs queries against one [`Snapshot`].
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    snapshot: &'a Snapshot,
    columns: &'a ColumnConfig,
}

struct Stage<'a> {
    evaluator: RowMaskEvaluator<'a>,
    columns: &'a [usize],
}

impl<'a> Searcher<'a> {
    pub fn new(snapshot: &'a Snapshot, columns: &'a ColumnConfig) -> Self {
        Self { snapshot, columns }
    }

    /// Run `query`, either through the dictionary or directly. Never fails:
    /// errors become [`SearchOutcome::Error`].
    pub fn search(&self, query: &str, via_dictionary: bool) -> SearchResponse {
        let result = self.try_search(query, via_dictionary);
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    query,
                    via_dictionary,
                    error = %err,
                    kind = %err.kind(),
                    "search failed"
                );
                let message = err.to_string();
                SearchResponse {
                    rows: RowSelection::none(self.snapshot.descriptions.len()),
                    outcome: SearchOutcome::Error {
                        kind: err.kind(),
                        message: message.clone(),
                    },
                    dictionary_matches: None,
                    error: Some(message),
                }
            }
        };
        tracing::info!(
            query,
            via_dictionary,
            outcome = response.outcome.label(),
            rows = response.rows.count(),
            "search resolved"
        );
        response
    }

    /// Search through the dictionary and, on a no-hit outcome, run the direct
    /// pass. The dictionary matches of the first pass are kept.
    pub fn search_with_fallback(&self, query: &str) -> SearchResponse {
        let first = self.search(query, true);
        if !first.outcome.offers_direct_fallback() {
            return first;
        }
        tracing::debug!(query, first = first.outcome.label(), "falling back to direct search");
        let mut direct = self.search(query, false);
        if direct.dictionary_matches.is_none() {
            direct.dictionary_matches = first.dictionary_matches;
        }
        direct
    }

    /// Search the way `config` asks for.
    pub fn run(&self, query: &str, config: &SearchConfig) -> SearchResponse {
        match (config.via_dictionary, config.direct_fallback) {
            (true, true) => self.search_with_fallback(query),
            (via_dictionary, _) => self.search(query, via_dictionary),
        }
    }

    fn try_search(&self, query: &str, via_dictionary: bool) -> Result<SearchResponse> {
        let descriptions = &self.snapshot.descriptions;
        if query.trim().is_empty() {
            return Ok(SearchResponse::new(
                RowSelection::all(descriptions.len()),
                SearchOutcome::MatchAll,
                None,
            ));
        }

        let desc_columns = self
            .columns
            .description
            .resolve(descriptions, TableRole::Description)?;
        let desc = self.stage(descriptions, &desc_columns, TableRole::Description)?;

        let parsed = Query::parse(query, &self.snapshot.units);
        if parsed.is_invalid() {
            return Err(Error::TermInvalid {
                query: query.to_string(),
            });
        }

        if !via_dictionary {
            return Ok(self.direct(&desc, &parsed));
        }

        let dictionary = &self.snapshot.dictionary;
        let dict_columns = self
            .columns
            .dictionary
            .resolve(dictionary, TableRole::Dictionary)?;
        let dict = self.stage(dictionary, &dict_columns, TableRole::Dictionary)?;

        Ok(match and_parts(&parsed.negation.positive_remainder) {
            Some(parts) => self.and_of_or(&dict, &desc, &parsed, &parts),
            None => self.single(&dict, &desc, &parsed),
        })
    }

    fn stage<'s>(
        &'s self,
        table: &'s Table,
        columns: &'s [usize],
        role: TableRole,
    ) -> Result<Stage<'s>> {
        Ok(Stage {
            evaluator: RowMaskEvaluator::new(table, columns, &self.snapshot.units, role)?,
            columns,
        })
    }

    fn direct(&self, desc: &Stage<'_>, query: &Query) -> SearchResponse {
        let rows = desc
            .evaluator
            .mask_for_query(&query.parsed, &query.negation.negated_terms);
        let outcome = if rows.is_empty() {
            SearchOutcome::DirectDescriptionNoHits
        } else {
            SearchOutcome::DirectDescriptionHits { rows: rows.clone() }
        };
        SearchResponse::new(rows, outcome, None)
    }

    /// Dictionary pass for the whole positive query (or the negation alone),
    /// then one derived OR query against the descriptions.
    fn single(&self, dict: &Stage<'_>, desc: &Stage<'_>, query: &Query) -> SearchResponse {
        let negated = &query.negation.negated_terms;
        let negation_only = query.negation.is_negation_only();
        let none = desc.evaluator.none();

        let dict_rows = dict.evaluator.mask_for_query(&query.parsed, negated);
        tracing::debug!(dictionary_rows = dict_rows.count(), negation_only, "dictionary pass");
        if dict_rows.is_empty() {
            return SearchResponse::new(
                none,
                SearchOutcome::DictionaryNoMatch { negation_only },
                Some(dict_rows),
            );
        }

        let terms = extract_terms(dict.evaluator.table(), dict.columns, &dict_rows);
        if terms.is_empty() {
            return SearchResponse::new(
                none,
                SearchOutcome::DictionaryMatchNoTermsExtracted {
                    dictionary_rows: dict_rows.count(),
                    negation_only,
                },
                Some(dict_rows),
            );
        }

        let rows = desc
            .evaluator
            .apply_negation(negated)
            .and(&self.derived_mask(desc, &terms));
        self.classify_hits(rows, terms.len(), negation_only, dict_rows)
    }

    /// One dictionary pass per `+` part; each part's derived OR query narrows
    /// the running description selection left to right.
    fn and_of_or(
        &self,
        dict: &Stage<'_>,
        desc: &Stage<'_>,
        query: &Query,
        parts: &[String],
    ) -> SearchResponse {
        let negated = &query.negation.negated_terms;
        let none = desc.evaluator.none();
        let mut running = desc.evaluator.apply_negation(negated);
        let mut matched = dict.evaluator.none();
        let mut total_terms = 0usize;

        for part in parts {
            let part_query = decompose(part, &self.snapshot.units);
            if !part_query.is_valid() {
                tracing::debug!(part, "AND part has no searchable terms; skipped");
                continue;
            }

            let dict_rows = dict.evaluator.mask_for_query(&part_query, negated);
            matched = matched.or(&dict_rows);
            tracing::debug!(
                part,
                dictionary_rows = dict_rows.count(),
                "dictionary pass for AND part"
            );
            if dict_rows.is_empty() {
                return SearchResponse::new(
                    none,
                    SearchOutcome::DictionaryNoMatch {
                        negation_only: false,
                    },
                    Some(matched),
                );
            }

            let terms = extract_terms(dict.evaluator.table(), dict.columns, &dict_rows);
            if terms.is_empty() {
                return SearchResponse::new(
                    none,
                    SearchOutcome::DictionaryMatchNoTermsExtracted {
                        dictionary_rows: matched.count(),
                        negation_only: false,
                    },
                    Some(matched),
                );
            }
            total_terms += terms.len();

            running = running.and(&self.derived_mask(desc, &terms));
            tracing::debug!(
                part,
                terms = terms.len(),
                remaining = running.count(),
                "narrowed descriptions"
            );
            if running.is_empty() {
                break;
            }
        }

        self.classify_hits(running, total_terms, false, matched)
    }

    fn derived_mask(&self, desc: &Stage<'_>, terms: &[String]) -> RowSelection {
        let derived = decompose(&derived_query(terms), &self.snapshot.units);
        desc.evaluator.mask_for_or_segments(&derived.segments)
    }

    fn classify_hits(
        &self,
        rows: RowSelection,
        terms: usize,
        negation_only: bool,
        dict_rows: RowSelection,
    ) -> SearchResponse {
        let outcome = if rows.is_empty() {
            SearchOutcome::DictionaryMatchNoDescriptionHits { terms, negation_only }
        } else {
            SearchOutcome::DictionaryMatchWithDescriptionHits {
                rows: rows.clone(),
                terms,
                negation_only,
            }
        };
        SearchResponse::new(rows, outcome, Some(dict_rows))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::UnitSynonymTable;
    use pretty_assertions::assert_eq;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Some(c.to_string())).collect())
                .collect(),
        )
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            dictionary: table(
                &["code", "desc"],
                &[
                    &["SW-24P", "switch 24 puertos gestionable"],
                    &["AP-01", "punto de acceso wifi"],
                    &["CB-6", "cable cat6"],
                ],
            ),
            descriptions: table(
                &["text"],
                &[
                    &["Switch Catalyst con 24 puertos y gestión remota"],
                    &["Access point WIFI 6 exterior"],
                    &["Bobina cable UTP cat6 305 m"],
                ],
            ),
            units: UnitSynonymTable::default(),
        }
    }

    #[test]
    fn extract_terms_skips_short_and_numeric_tokens() {
        let s = snapshot();
        let rows = RowSelection::from_indices(3, [0]);
        assert_eq!(
            extract_terms(&s.dictionary, &[0, 1], &rows),
            vec!["GESTIONABLE", "PUERTOS", "SW-24P", "SWITCH"]
        );
    }

    #[test]
    fn extract_terms_falls_back_to_numbers() {
        let t = table(&["c"], &[&["24 x 1.000"]]);
        let rows = RowSelection::all(1);
        assert_eq!(extract_terms(&t, &[0], &rows), vec!["1.000", "24"]);
    }

    #[test]
    fn derived_query_joins_with_pipe() {
        let terms = vec!["A B".to_string(), "C".to_string()];
        assert_eq!(derived_query(&terms), "\"A B\" | C");
    }

    #[test]
    fn empty_query_matches_all() {
        let s = snapshot();
        let cols = ColumnConfig::default();
        let resp = Searcher::new(&s, &cols).search("   ", true);
        assert_eq!(resp.outcome, SearchOutcome::MatchAll);
        assert_eq!(resp.rows.count(), 3);
        assert_eq!(resp.dictionary_matches, None);
    }

    #[test]
    fn via_dictionary_hits() {
        let s = snapshot();
        let cols = ColumnConfig::default();
        let resp = Searcher::new(&s, &cols).search("wifi", true);
        assert_eq!(resp.rows.indices().collect::<Vec<_>>(), vec![1]);
        assert!(matches!(
            resp.outcome,
            SearchOutcome::DictionaryMatchWithDescriptionHits { negation_only: false, .. }
        ));
        assert_eq!(
            resp.dictionary_matches.map(|m| m.indices().collect::<Vec<_>>()),
            Some(vec![1])
        );
    }

    #[test]
    fn invalid_term_is_an_error_outcome() {
        let s = snapshot();
        let cols = ColumnConfig::default();
        let resp = Searcher::new(&s, &cols).search(" | ", true);
        assert!(matches!(
            resp.outcome,
            SearchOutcome::Error { kind: ErrorKind::TermInvalid, .. }
        ));
        assert!(resp.error.is_some());
        assert!(!resp.outcome.offers_direct_fallback());
    }

    #[test]
    fn fallback_runs_direct_only_on_no_hits() {
        let s = snapshot();
        let cols = ColumnConfig::default();
        let searcher = Searcher::new(&s, &cols);
        let resp = searcher.search("exterior", true);
        assert_eq!(
            resp.outcome,
            SearchOutcome::DictionaryNoMatch {
                negation_only: false
            }
        );
        assert!(resp.outcome.offers_direct_fallback());

        let resp = searcher.search_with_fallback("exterior");
        assert_eq!(
            resp.outcome,
            SearchOutcome::DirectDescriptionHits {
                rows: RowSelection::from_indices(3, [1])
            }
        );
    }

    #[test]
    fn labels_and_display() {
        let outcome = SearchOutcome::DictionaryNoMatch {
            negation_only: true,
        };
        assert_eq!(outcome.label(), "dictionary_no_match");
        assert_eq!(outcome.to_string(), "no dictionary row matched (negation only)");
        assert!(outcome.is_negation_only());
        assert!(!SearchOutcome::MatchAll.is_error());
    }
}
