//! Static table corpora used across harnesses.
//!
//! The dictionary rows follow the shape of a product catalogue (code plus a
//! free-text description); the description rows are the shop listings the
//! searches are meant to find.

use tabmatch_core::{Snapshot, Table};

use super::builders::{snapshot, units, TableBuilder};

pub const DICTIONARY_COLUMNS: &[&str] = &["code", "desc"];

pub const DICTIONARY_ROWS: &[&[&str]] = &[
    &["SW-24P", "switch 24 puertos gestionable"],
    &["SW-8", "switch 8 puertos no gestionable"],
    &["AP-01", "punto de acceso wifi"],
    &["PS-150", "fuente alimentación 150 W"],
    &["CB-6", "cable red cat6"],
];

pub const DESCRIPTION_COLUMNS: &[&str] = &["text", "price"];

pub const DESCRIPTION_ROWS: &[&[&str]] = &[
    &["Switch Catalyst con 24 puertos y gestión remota", "1.234,56"],
    &["Switchera industrial 8 puertos", "99"],
    &["Access point WIFI 6 exterior", "180"],
    &["Fuente conmutada 150 W max", "45,5"],
    &["Bobina cable UTP cat6 305 m", "120"],
    &["Fuente 60 vatios", "20"],
];

pub const UNIT_SYNONYMS: &[(&str, &[&str])] = &[
    ("VATIOS", &["W", "WATT", "WATTS"]),
    ("METROS", &["M", "MTS"]),
];

pub fn dictionary() -> Table {
    TableBuilder::new(DICTIONARY_COLUMNS).rows(DICTIONARY_ROWS).build()
}

pub fn descriptions() -> Table {
    TableBuilder::new(DESCRIPTION_COLUMNS).rows(DESCRIPTION_ROWS).build()
}

/// The catalogue fixture with the unit synonyms above.
pub fn catalogue() -> Snapshot {
    snapshot(dictionary(), descriptions(), units(UNIT_SYNONYMS))
}

pub const DICTIONARY_CSV: &str = "code,desc
SW-24P,switch 24 puertos gestionable
AP-01,punto de acceso wifi
PS-150,fuente alimentación 150 W
";

pub const DESCRIPTIONS_CSV: &str = "text,price
Switch Catalyst con 24 puertos y gestión remota,\"1.234,56\"
Access point WIFI 6 exterior,180
Fuente conmutada 150 W max,\"45,5\"
";

pub const UNITS_JSON: &str = r#"{ "VATIOS": ["W", "WATTS"], "METROS": "M" }"#;

/// Write `contents` to `name` inside `dir` and return the path.
pub fn write_fixture(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}
