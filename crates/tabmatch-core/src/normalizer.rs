//! Normalizer: case/diacritic folding and unit-synonym resolution.
//!
//! Every comparison in the engine happens on normalized text: table cells are
//! normalized once when a [`Table`](crate::Table) is built, query terms are
//! normalized when they are classified. Units are resolved through a
//! [`UnitSynonymTable`] that maps every known spelling of a unit to one
//! canonical id.

use std::collections::HashMap;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Text normalization
// ---------------------------------------------------------------------------

/// Uppercase and strip combining diacritics, leaving every other character
/// in place. Cell scans for numbers run on this form so decimal commas
/// survive.
pub fn fold(text: &str) -> String {
    text.to_uppercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Fold, replace every character that is not alphanumeric or one of
/// `. - _ /` with a space, and collapse runs of whitespace.
///
/// Total: never fails, and returns an empty string for input with nothing
/// worth keeping.
pub fn normalize(text: &str) -> String {
    let folded = fold(text);
    let mut out = String::with_capacity(folded.len());
    for word in folded
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | '/')))
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

// ---------------------------------------------------------------------------
// Unit synonyms
// ---------------------------------------------------------------------------

/// Canonical unit id: the normalized form of a canonical unit name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(String);

impl UnitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplies canonical unit names with their synonyms.
///
/// Entries are returned in source order; when two canonical forms claim the
/// same synonym the later one wins.
pub trait UnitSynonymSource {
    fn canonical_to_synonyms(&self) -> Vec<(String, Vec<String>)>;
}

impl UnitSynonymSource for Vec<(String, Vec<String>)> {
    fn canonical_to_synonyms(&self) -> Vec<(String, Vec<String>)> {
        self.clone()
    }
}

/// Immutable lookup from any normalized unit spelling to its canonical id.
///
/// Rebuilt wholesale whenever the dictionary is reloaded; never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSynonymTable {
    map: HashMap<String, UnitId>,
}

impl UnitSynonymTable {
    pub fn build<I, S, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let mut map: HashMap<String, UnitId> = HashMap::new();
        for (canonical, synonyms) in entries {
            let id = normalize(canonical.as_ref());
            if id.is_empty() {
                tracing::warn!(
                    canonical = canonical.as_ref(),
                    "skipping unit with empty canonical form"
                );
                continue;
            }
            let id = UnitId(id);
            let forms = std::iter::once(id.0.clone())
                .chain(synonyms.into_iter().map(|s| normalize(s.as_ref())))
                .filter(|f| !f.is_empty());
            for form in forms {
                if let Some(previous) = map.insert(form.clone(), id.clone()) {
                    if previous != id {
                        tracing::warn!(
                            synonym = %form,
                            previous = %previous,
                            replacement = %id,
                            "unit synonym claimed by two canonical units; keeping the later one"
                        );
                    }
                }
            }
        }
        Self { map }
    }

    pub fn from_source(source: &dyn UnitSynonymSource) -> Self {
        Self::build(source.canonical_to_synonyms())
    }

    /// Resolve a raw unit spelling. `None` for empty or unknown text.
    pub fn resolve(&self, text: &str) -> Option<UnitId> {
        let key = normalize(text);
        if key.is_empty() {
            return None;
        }
        self.map.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Built-in synonyms
// ---------------------------------------------------------------------------

/// Synonyms used when the configuration provides none. Values are
/// `|`-separated spellings.
static BUILTIN_UNITS: phf::OrderedMap<&'static str, &'static str> = phf::phf_ordered_map! {
    "VATIOS" => "W|WATT|WATTS|VATIO|WATIO|WATIOS",
    "KILOVATIOS" => "KW|KILOWATT|KILOWATTS|KILOVATIO",
    "VOLTIOS" => "V|VOLT|VOLTS|VOLTIO|VAC|VDC",
    "AMPERIOS" => "A|AMP|AMPS|AMPERE|AMPERIO",
    "METROS" => "M|MT|MTS|METRO|METER|METERS",
    "CENTIMETROS" => "CM|CENTIMETRO|CMS",
    "MILIMETROS" => "MM|MILIMETRO",
    "KILOGRAMOS" => "KG|KGS|KILO|KILOS|KILOGRAMO",
    "GRAMOS" => "G|GR|GRS|GRAMO",
    "LITROS" => "L|LT|LTS|LITRO",
    "PULGADAS" => "IN|INCH|INCHES|PULG|PULGADA",
    "MEGABYTES" => "MB|MEGABYTE",
    "GIGABYTES" => "GB|GIGABYTE|GIGA|GIGAS",
    "TERABYTES" => "TB|TERABYTE",
    "HERCIOS" => "HZ|HERTZ|HERCIO",
    "MEGAHERCIOS" => "MHZ|MEGAHERTZ",
    "GIGAHERCIOS" => "GHZ|GIGAHERTZ",
};

/// The built-in unit synonyms as a [`UnitSynonymSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinUnits;

impl UnitSynonymSource for BuiltinUnits {
    fn canonical_to_synonyms(&self) -> Vec<(String, Vec<String>)> {
        BUILTIN_UNITS
            .entries()
            .map(|(canonical, synonyms)| {
                (
                    canonical.to_string(),
                    synonyms.split('|').map(str::to_string).collect(),
                )
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("gestión remota", "GESTION REMOTA")]
    #[case("  Switch\t24   puertos ", "SWITCH 24 PUERTOS")]
    #[case("SW-24P", "SW-24P")]
    #[case("a/b_c.d", "A/B_C.D")]
    #[case("¡Años, niño!", "ANOS NINO")]
    #[case("", "")]
    #[case("!!! ???", "")]
    fn normalize_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn fold_keeps_punctuation() {
        assert_eq!(fold("1.234,56 mé"), "1.234,56 ME");
    }

    #[test]
    fn build_maps_canonical_and_synonyms() {
        let table = UnitSynonymTable::build(vec![("Vatios", vec!["W", "watts"])]);
        let id = table.resolve("w").expect("w resolves");
        assert_eq!(id.as_str(), "VATIOS");
        assert_eq!(table.resolve("Watts"), Some(id.clone()));
        assert_eq!(table.resolve("vatios"), Some(id));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn later_canonical_wins_on_conflict() {
        let table = UnitSynonymTable::build(vec![
            ("METROS", vec!["M"]),
            ("MINUTOS", vec!["M", "MIN"]),
        ]);
        assert_eq!(table.resolve("m").map(|u| u.to_string()), Some("MINUTOS".into()));
        assert_eq!(table.resolve("metros").map(|u| u.to_string()), Some("METROS".into()));
    }

    #[test]
    fn resolve_unknown_or_empty_is_none() {
        let table = UnitSynonymTable::from_source(&BuiltinUnits);
        assert_eq!(table.resolve(""), None);
        assert_eq!(table.resolve("   "), None);
        assert_eq!(table.resolve("PARSECS"), None);
    }

    #[test]
    fn builtin_units_resolve() {
        let table = UnitSynonymTable::from_source(&BuiltinUnits);
        assert_eq!(table.resolve("W").map(|u| u.to_string()), Some("VATIOS".into()));
        assert_eq!(table.resolve("kg").map(|u| u.to_string()), Some("KILOGRAMOS".into()));
    }
}
