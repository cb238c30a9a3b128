//! tabmatch: dictionary-mediated boolean search over tabular data.
//!
//! The engine lives in `tabmatch-core` and the file adapters in
//! `tabmatch-sources`. This crate holds the command-line front end and the
//! [`report`] module that turns a [`SearchResponse`](tabmatch_core::SearchResponse)
//! into text or JSON.
//!
//! # Architecture
//!
//! ```text
//! CSV / JSON ──► Catalog ──► Searcher ──► Report ──► stdout
//! ```

pub mod report;

pub use report::Report;
