//! tabmatch-core: query engine for dictionary-mediated table search.
//!
//! This crate exposes the engine layers as public modules, plus the shared
//! types used across all layers.
//!
//! # Architecture
//!
//! ```text
//! query ──► Query (negation → OR split → AND split) ──► classify terms
//!                                                           │
//!   Catalog ──► Snapshot ──► RowMaskEvaluator ◄─────────────┘
//!                               │
//!                               └──► Searcher (dictionary → descriptions)
//! ```
//!
//! Everything is synchronous and pure over an immutable [`Snapshot`]; reloads
//! swap the snapshot held by the [`Catalog`].

pub mod config;
pub mod error;
pub mod mask;
pub mod normalizer;
pub mod number;
pub mod query;
pub mod search;
pub mod store;
pub mod term;
pub mod types;

pub use error::{Error, ErrorKind, Result, TableRole};
pub use normalizer::{normalize, UnitId, UnitSynonymSource, UnitSynonymTable};
pub use search::{SearchOutcome, SearchResponse, Searcher};
pub use store::{Catalog, Snapshot};
pub use types::{ColumnKind, RowSelection, Table, TableSource};
