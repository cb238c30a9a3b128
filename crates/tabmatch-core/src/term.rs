//! Term classifier: turns one atomic query token into an [`AtomicTerm`].
//!
//! A token is tried, in order, as a comparison (`>=10 kg`), a range
//! (`10-20 W`) and finally a plain string. Wrapping a token in double quotes
//! forces the plain-string reading.

use std::sync::LazyLock;

use regex::Regex;

use crate::normalizer::{normalize, UnitId, UnitSynonymTable};
use crate::number::parse_number;

const NUMBER: &str = r"\d+(?:[.,]\d+)*\.?";
const UNIT: &str = r"[^\d\s<>=\-][^\s]*";

static COMPARISON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<op>>=|<=|>|<|=)\s*(?P<num>{NUMBER})\s*(?P<unit>{UNIT})?$"
    ))
    .expect("comparison pattern is valid")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?P<lo>{NUMBER})\s*-\s*(?P<hi>{NUMBER})\s*(?P<unit>{UNIT})?$"
    ))
    .expect("range pattern is valid")
});

/// Comparison operator of a numeric term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl CmpOp {
    fn parse(op: &str) -> Option<Self> {
        match op {
            ">" => Some(CmpOp::Gt),
            "<" => Some(CmpOp::Lt),
            ">=" => Some(CmpOp::Ge),
            "<=" => Some(CmpOp::Le),
            "=" => Some(CmpOp::Eq),
            _ => None,
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            CmpOp::Gt => lhs > rhs,
            CmpOp::Lt => lhs < rhs,
            CmpOp::Ge => lhs >= rhs,
            CmpOp::Le => lhs <= rhs,
            CmpOp::Eq => (lhs - rhs).abs() < f64::EPSILON * lhs.abs().max(rhs.abs()).max(1.0),
        }
    }
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Eq => "=",
        };
        f.write_str(s)
    }
}

/// What an atomic term tests.
#[derive(Debug, Clone, PartialEq)]
pub enum TermKind {
    /// Whole-word match of normalized text.
    Str(String),
    Compare { op: CmpOp, value: f64 },
    /// Inclusive range, `lo <= hi`.
    Range { lo: f64, hi: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomicTerm {
    /// The token exactly as it appeared in the query.
    pub original: String,
    pub kind: TermKind,
    /// Required unit. `None` when the term carries no unit or the unit did
    /// not resolve.
    pub unit: Option<UnitId>,
    pub negate: bool,
}

impl AtomicTerm {
    pub fn is_numeric(&self) -> bool {
        !matches!(self.kind, TermKind::Str(_))
    }

    /// The same term with its selection complemented.
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// Whether a number found in a cell satisfies this term's operator or
    /// range. Always false for string terms.
    pub fn accepts(&self, value: f64) -> bool {
        match self.kind {
            TermKind::Str(_) => false,
            TermKind::Compare { op, value: rhs } => op.holds(value, rhs),
            TermKind::Range { lo, hi } => lo <= value && value <= hi,
        }
    }
}

/// Strip exactly one layer of surrounding double quotes.
pub fn unquote(token: &str) -> Option<&str> {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
}

/// Classify one token. Returns `None` when nothing searchable remains
/// (a token made only of punctuation).
pub fn classify(token: &str, units: &UnitSynonymTable) -> Option<AtomicTerm> {
    let trimmed = token.trim();
    if let Some(phrase) = unquote(trimmed) {
        return string_term(token, phrase);
    }

    if let Some(caps) = COMPARISON_RE.captures(trimmed) {
        let op = caps.name("op").and_then(|m| CmpOp::parse(m.as_str()));
        let value = caps.name("num").and_then(|m| parse_number(m.as_str()));
        if let (Some(op), Some(value)) = (op, value) {
            return Some(AtomicTerm {
                original: token.to_string(),
                kind: TermKind::Compare { op, value },
                unit: resolve_unit(caps.name("unit").map(|m| m.as_str()), units),
                negate: false,
            });
        }
    }

    if let Some(caps) = RANGE_RE.captures(trimmed) {
        let lo = caps.name("lo").and_then(|m| parse_number(m.as_str()));
        let hi = caps.name("hi").and_then(|m| parse_number(m.as_str()));
        if let (Some(lo), Some(hi)) = (lo, hi) {
            let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            return Some(AtomicTerm {
                original: token.to_string(),
                kind: TermKind::Range { lo, hi },
                unit: resolve_unit(caps.name("unit").map(|m| m.as_str()), units),
                negate: false,
            });
        }
    }

    string_term(token, trimmed)
}

fn string_term(original: &str, text: &str) -> Option<AtomicTerm> {
    let text = normalize(text);
    if text.is_empty() {
        return None;
    }
    Some(AtomicTerm {
        original: original.to_string(),
        kind: TermKind::Str(text),
        unit: None,
        negate: false,
    })
}

fn resolve_unit(unit: Option<&str>, units: &UnitSynonymTable) -> Option<UnitId> {
    let unit = unit?;
    let resolved = units.resolve(unit);
    if resolved.is_none() {
        tracing::debug!(unit, "unit not recognised; term is unit-agnostic");
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn units() -> UnitSynonymTable {
        UnitSynonymTable::build(vec![("VATIOS", vec!["W", "WATTS"]), ("KG", vec!["KILOS"])])
    }

    fn kind(token: &str) -> TermKind {
        classify(token, &units()).expect("term").kind
    }

    #[rstest]
    #[case(">100", CmpOp::Gt, 100.0)]
    #[case("<5", CmpOp::Lt, 5.0)]
    #[case(">= 2,5", CmpOp::Ge, 2.5)]
    #[case("<=10.000", CmpOp::Le, 10000.0)]
    #[case("=24", CmpOp::Eq, 24.0)]
    fn comparisons(#[case] token: &str, #[case] op: CmpOp, #[case] value: f64) {
        assert_eq!(kind(token), TermKind::Compare { op, value });
    }

    #[test]
    fn comparison_with_known_unit() {
        let term = classify(">100W", &units()).expect("term");
        assert_eq!(
            term.kind,
            TermKind::Compare {
                op: CmpOp::Gt,
                value: 100.0
            }
        );
        assert_eq!(term.unit.as_ref().map(|u| u.to_string()), Some("VATIOS".into()));
    }

    #[test]
    fn unknown_unit_is_dropped() {
        let term = classify(">100 parsecs", &units()).expect("term");
        assert!(term.is_numeric());
        assert_eq!(term.unit, None);
    }

    #[test]
    fn range_is_ordered_and_inclusive() {
        let term = classify("20-10 kilos", &units()).expect("term");
        assert_eq!(term.kind, TermKind::Range { lo: 10.0, hi: 20.0 });
        assert_eq!(term.unit.as_ref().map(|u| u.to_string()), Some("KG".into()));
        assert!(term.accepts(10.0));
        assert!(term.accepts(20.0));
        assert!(!term.accepts(20.5));
    }

    #[rstest]
    #[case("switch", "SWITCH")]
    #[case("SW-24P", "SW-24P")]
    #[case("\">100\"", ">100")]
    #[case("\"multi word\"", "MULTI WORD")]
    #[case("24", "24")]
    #[case("Gestión", "GESTION")]
    fn strings(#[case] token: &str, #[case] expected: &str) {
        // ">100" normalizes to "100" once quoted
        let expected = normalize(expected);
        assert_eq!(kind(token), TermKind::Str(expected));
    }

    #[test]
    fn original_is_preserved() {
        for token in ["switch", ">100W", "10-20", "SW-24P"] {
            assert_eq!(classify(token, &units()).expect("term").original, token);
        }
    }

    #[test]
    fn punctuation_only_is_none() {
        assert_eq!(classify("!!!", &units()), None);
        assert_eq!(classify("\"\"", &units()), None);
    }

    #[test]
    fn negated_flips() {
        let term = classify("x", &units()).expect("term");
        assert!(!term.negate);
        assert!(term.clone().negated().negate);
        assert!(!term.negated().negated().negate);
    }

    #[test]
    fn string_terms_accept_no_numbers() {
        assert!(!classify("x", &units()).expect("term").accepts(1.0));
    }
}
