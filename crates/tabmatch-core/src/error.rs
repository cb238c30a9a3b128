//! Error taxonomy for the query engine.
//!
//! Empty results are never errors. Only configuration problems, queries that
//! decompose to nothing, and internal evaluation failures end up here.

use thiserror::Error;

/// Which table a configuration error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRole {
    Dictionary,
    Description,
}

impl std::fmt::Display for TableRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableRole::Dictionary => write!(f, "dictionary"),
            TableRole::Description => write!(f, "description"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{table} table has no usable text columns")]
    NoUsableColumns { table: TableRole },

    #[error("{table} column index {index} is out of range (table has {len} columns)")]
    ColumnOutOfRange {
        table: TableRole,
        index: usize,
        len: usize,
    },

    #[error("invalid term: {query:?} contains no searchable terms")]
    TermInvalid { query: String },

    #[error("{table} column {column} disappeared during evaluation")]
    MissingColumn { table: TableRole, column: usize },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification surfaced to callers in [`SearchOutcome::Error`](crate::search::SearchOutcome::Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    TermInvalid,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::TermInvalid => write!(f, "termino_invalido"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoUsableColumns { .. }
            | Error::ColumnOutOfRange { .. }
            | Error::Config(_)
            | Error::Io(_) => ErrorKind::Configuration,
            Error::TermInvalid { .. } => ErrorKind::TermInvalid,
            Error::MissingColumn { .. } => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
