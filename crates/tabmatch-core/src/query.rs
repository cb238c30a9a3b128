//! Query decomposer: the mini-language front end.
//!
//! A raw query goes through three passes:
//!
//! 1. **Negation extraction**: `#word` / `#"a phrase"` tokens are pulled out
//!    into a set of normalized negated terms.
//! 2. **OR split**: the remainder is split on `|`, unless it contains a
//!    top-level `+`, in which case the whole remainder is a single AND
//!    segment and `|` stays literal.
//! 3. **AND split**: each segment is split on `+`; every piece is one atomic
//!    token handed to [`classify`].
//!
//! All three passes share one [`scan`] so that operators inside quotes are
//! never mistaken for operators.
//!
//! | Token | Meaning |
//! |---|---|
//! | `word`, `"multi word phrase"` | whole-word / whole-phrase match |
//! | `a + b` | AND |
//! | `a \| b` | OR (`/` is plain text) |
//! | `#term`, `#"phrase"` | exclude rows matching `term` |
//! | `>N`, `<N`, `>=N`, `<=N`, `=N` [unit] | numeric comparison |
//! | `N1-N2` [unit] | inclusive numeric range |

use std::collections::BTreeSet;

use crate::normalizer::{normalize, UnitSynonymTable};
use crate::term::{classify, unquote, AtomicTerm};

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// One lexical unit of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lexeme<'a> {
    /// Literal text between operators, quotes included, whitespace untrimmed.
    Text(&'a str),
    And,
    Or,
    /// Payload of a `#` negation, without the `#` and without quotes.
    Not(&'a str),
}

/// What the scanner is currently inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Text,
    Quoted,
    /// Just read a `#` at the start of a token.
    NegationMark,
    Negation,
    NegationQuoted,
}

fn ends_negation(c: char) -> bool {
    c.is_whitespace() || c == '+' || c == '|'
}

fn flush_text<'a>(out: &mut Vec<Lexeme<'a>>, query: &'a str, from: usize, to: usize) {
    if from < to {
        out.push(Lexeme::Text(&query[from..to]));
    }
}

/// Split a query into lexemes. `+`, `|` and `#` are only operators outside
/// quotes; `#` additionally has to start a token, so `C#` stays literal.
pub fn scan(query: &str) -> Vec<Lexeme<'_>> {
    let chars: Vec<(usize, char)> = query.char_indices().collect();
    let mut out = Vec::new();
    let mut state = ScanState::Text;
    let mut start = 0usize;
    let mut token_start = true;
    let mut i = 0usize;

    while i < chars.len() {
        let (pos, c) = chars[i];
        match state {
            ScanState::Text => {
                match c {
                    '"' => state = ScanState::Quoted,
                    '+' | '|' => {
                        flush_text(&mut out, query, start, pos);
                        out.push(if c == '+' { Lexeme::And } else { Lexeme::Or });
                        start = pos + 1;
                    }
                    '#' if token_start => {
                        flush_text(&mut out, query, start, pos);
                        state = ScanState::NegationMark;
                        start = pos + 1;
                    }
                    _ => {}
                }
                token_start = ends_negation(c);
                i += 1;
            }
            ScanState::Quoted => {
                if c == '"' {
                    state = ScanState::Text;
                }
                token_start = false;
                i += 1;
            }
            ScanState::NegationMark => {
                if c == '"' {
                    state = ScanState::NegationQuoted;
                    start = pos + 1;
                    i += 1;
                } else if ends_negation(c) {
                    // bare `#`: dropped, the terminator is rescanned as text
                    state = ScanState::Text;
                    start = pos;
                    token_start = true;
                } else {
                    state = ScanState::Negation;
                    start = pos;
                    i += 1;
                }
            }
            ScanState::Negation => {
                if ends_negation(c) {
                    out.push(Lexeme::Not(&query[start..pos]));
                    state = ScanState::Text;
                    start = pos;
                    token_start = true;
                } else {
                    i += 1;
                }
            }
            ScanState::NegationQuoted => {
                if c == '"' {
                    out.push(Lexeme::Not(&query[start..pos]));
                    state = ScanState::Text;
                    start = pos + 1;
                    token_start = true;
                }
                i += 1;
            }
        }
    }

    match state {
        ScanState::Text | ScanState::Quoted => flush_text(&mut out, query, start, query.len()),
        ScanState::Negation | ScanState::NegationQuoted => out.push(Lexeme::Not(&query[start..])),
        ScanState::NegationMark => {}
    }
    out
}

// ---------------------------------------------------------------------------
// Pass 1: negation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NegationOutcome {
    /// The query with every negation removed and whitespace collapsed.
    pub positive_remainder: String,
    /// Normalized negated terms.
    pub negated_terms: BTreeSet<String>,
}

impl NegationOutcome {
    pub fn is_negation_only(&self) -> bool {
        self.positive_remainder.is_empty() && !self.negated_terms.is_empty()
    }
}

pub fn extract_negations(query: &str) -> NegationOutcome {
    let mut remainder = String::with_capacity(query.len());
    let mut negated_terms = BTreeSet::new();
    for lexeme in scan(query) {
        match lexeme {
            Lexeme::Text(text) => remainder.push_str(text),
            Lexeme::And => remainder.push('+'),
            Lexeme::Or => remainder.push('|'),
            Lexeme::Not(payload) => {
                let term = normalize(payload);
                if !term.is_empty() {
                    negated_terms.insert(term);
                }
                remainder.push(' ');
            }
        }
    }
    NegationOutcome {
        positive_remainder: collapse_whitespace(&remainder),
        negated_terms,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Passes 2 and 3: OR / AND split
// ---------------------------------------------------------------------------

/// Whether the text contains a `+` outside quotes.
pub fn has_top_level_and(text: &str) -> bool {
    scan(text).iter().any(|l| matches!(l, Lexeme::And))
}

/// The `+`-separated parts of a remainder, with `|` kept literally inside
/// each part. `None` when there is no top-level `+`.
pub fn and_parts(remainder: &str) -> Option<Vec<String>> {
    let lexemes = scan(remainder);
    if !lexemes.iter().any(|l| matches!(l, Lexeme::And)) {
        return None;
    }
    Some(split_on(&lexemes, |l| matches!(l, Lexeme::And)))
}

/// The `|`-separated segments of a remainder without a top-level `+`.
fn or_parts(lexemes: &[Lexeme<'_>]) -> Vec<String> {
    split_on(lexemes, |l| matches!(l, Lexeme::Or))
}

fn split_on(lexemes: &[Lexeme<'_>], is_separator: impl Fn(&Lexeme<'_>) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    for lexeme in lexemes {
        if is_separator(lexeme) {
            parts.push(std::mem::take(&mut current));
            continue;
        }
        match lexeme {
            Lexeme::Text(text) => current.push_str(text),
            Lexeme::And => current.push('+'),
            Lexeme::Or => current.push('|'),
            Lexeme::Not(_) => {}
        }
    }
    parts.push(current);
    parts
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// One OR segment: its terms are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub source: String,
    pub terms: Vec<AtomicTerm>,
}

/// OR of AND segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedQuery {
    pub segments: Vec<Segment>,
}

impl ParsedQuery {
    /// At least one segment carries a term.
    pub fn is_valid(&self) -> bool {
        self.segments.iter().any(|s| !s.terms.is_empty())
    }
}

/// Decompose a negation-free remainder into OR segments of atomic terms.
pub fn decompose(remainder: &str, units: &UnitSynonymTable) -> ParsedQuery {
    let lexemes = scan(remainder);
    let conjunctive = lexemes.iter().any(|l| matches!(l, Lexeme::And));

    let segment_sources = if conjunctive {
        let whole = remainder.trim();
        if whole.is_empty() {
            Vec::new()
        } else {
            vec![whole.to_string()]
        }
    } else {
        or_parts(&lexemes)
    };

    let segments: Vec<Segment> = segment_sources
        .into_iter()
        .map(|source| {
            let tokens = split_on(&scan(&source), |l| {
                conjunctive && matches!(l, Lexeme::And)
            });
            let terms = tokens
                .iter()
                .filter_map(|token| classify(token, units))
                .collect();
            Segment { source, terms }
        })
        .collect();

    tracing::debug!(
        remainder,
        conjunctive,
        segments = segments.len(),
        terms = segments.iter().map(|s| s.terms.len()).sum::<usize>(),
        "decomposed query"
    );
    ParsedQuery { segments }
}

/// A query after all three passes.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub raw: String,
    pub negation: NegationOutcome,
    pub parsed: ParsedQuery,
}

impl Query {
    pub fn parse(raw: &str, units: &UnitSynonymTable) -> Self {
        let negation = extract_negations(raw);
        let parsed = decompose(&negation.positive_remainder, units);
        Self {
            raw: raw.to_string(),
            negation,
            parsed,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    pub fn has_positive(&self) -> bool {
        !self.negation.positive_remainder.is_empty()
    }

    /// Non-empty input that leaves neither searchable terms nor negations.
    pub fn is_invalid(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.has_positive() {
            !self.parsed.is_valid()
        } else {
            self.negation.negated_terms.is_empty()
        }
    }
}

/// Quote a term for inclusion in a derived query if it contains spaces.
pub fn quote_term(term: &str) -> String {
    if term.contains(char::is_whitespace) && unquote(term).is_none() {
        format!("\"{term}\"")
    } else {
        term.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
