//! Domain-specific assertion macros for tabmatch harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which rows or which outcome were expected.

/// Assert that a `RowSelection` selects exactly the given row indices.
///
/// ```rust
/// assert_rows!(selection, [0, 3]);
/// ```
#[macro_export]
macro_rules! assert_rows {
    ($selection:expr, [$($row:expr),* $(,)?]) => {{
        let selection: &tabmatch_core::RowSelection = &$selection;
        let actual: Vec<usize> = selection.indices().collect();
        let expected: Vec<usize> = vec![$($row),*];
        pretty_assertions::assert_eq!(actual, expected, "selected rows differ");
    }};
}

/// Assert that a `SearchResponse` resolved to the given outcome pattern.
///
/// ```rust
/// assert_outcome!(response, SearchOutcome::DictionaryNoMatch { .. });
/// ```
#[macro_export]
macro_rules! assert_outcome {
    ($response:expr, $pattern:pat) => {{
        let response: &tabmatch_core::SearchResponse = &$response;
        if !matches!(response.outcome, $pattern) {
            panic!(
                "assert_outcome! failed:\n  expected: {}\n  actual:   {:?}\n  rows: {:?}",
                stringify!($pattern),
                response.outcome,
                response.rows.indices().collect::<Vec<_>>()
            );
        }
    }};
}

/// Assert that every selected row of `table` satisfies `pred` on its raw
/// cells.
pub fn assert_rows_all<F>(
    table: &tabmatch_core::Table,
    selection: &tabmatch_core::RowSelection,
    pred: F,
) where
    F: Fn(&[Option<&str>]) -> bool,
{
    let failing: Vec<usize> = selection
        .indices()
        .filter(|&i| !table.row(i).is_some_and(|cells| pred(&cells)))
        .collect();
    assert!(
        failing.is_empty(),
        "assert_rows_all failed: rows {:?} did not satisfy the predicate",
        failing
    );
}
