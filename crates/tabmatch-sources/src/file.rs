//! CSV file source.
//!
//! The first record is the header row. Rows may be ragged; cells are trimmed
//! and empty cells become `None`. Column kinds are inferred by
//! [`Table::new`].

use std::fs::File;
use std::path::PathBuf;

use csv::{ReaderBuilder, Trim};
use tabmatch_core::Table;

use crate::{SourceError, TableLoader};

#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    /// Use `;` for spreadsheet exports from comma-decimal locales.
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn csv_err(&self, source: csv::Error) -> SourceError {
        SourceError::Csv {
            path: self.path.clone(),
            source,
        }
    }
}

impl TableLoader for CsvSource {
    fn load(&self) -> Result<Table, SourceError> {
        let file = File::open(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| self.csv_err(e))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            return Err(SourceError::Empty {
                path: self.path.clone(),
            });
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| self.csv_err(e))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect(),
            );
        }

        let table = Table::new(headers, rows);
        tracing::debug!(
            path = %self.path.display(),
            rows = table.len(),
            columns = table.width(),
            "loaded csv table"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tabmatch_core::ColumnKind;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn loads_headers_rows_and_kinds() {
        let file = write("code,desc,price\nSW-24P, switch 24 puertos ,\"1.234,56\"\nAP-1,,99\n");
        let table = CsvSource::new(file.path()).load().expect("loads");
        assert_eq!(table.column_names(), &["code", "desc", "price"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.raw(0, 1), Some("switch 24 puertos"));
        assert_eq!(table.raw(1, 1), None);
        assert_eq!(table.kind(2), Some(ColumnKind::Numeric));
    }

    #[test]
    fn semicolon_delimiter_and_ragged_rows() {
        let file = write("a;b\n1;x\n2\n");
        let table = CsvSource::new(file.path()).delimiter(b';').load().expect("loads");
        assert_eq!(table.row(1), Some(vec![Some("2"), None]));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvSource::new("/definitely/not/here.csv").load().unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = write("");
        let err = CsvSource::new(file.path()).load().unwrap_err();
        assert!(matches!(err, SourceError::Empty { .. }));
    }
}
