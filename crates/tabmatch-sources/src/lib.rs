//! tabmatch-sources: table and unit-synonym source adapters for tabmatch.
//!
//! Each adapter reads one kind of file and hands the engine either a
//! [`tabmatch_core::Table`] snapshot or a [`tabmatch_core::UnitSynonymSource`].

pub mod error;
pub mod file;
pub mod synonyms;

pub use error::SourceError;
pub use file::CsvSource;
pub use synonyms::{load_unit_synonyms, UnitSynonyms};

/// Trait implemented by each table source.
pub trait TableLoader {
    fn load(&self) -> Result<tabmatch_core::Table, SourceError>;
}
