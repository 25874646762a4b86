//! CSV decoding for fetched object payloads.
//!
//! The first record is the header. Cells stay as raw text; empty cells become
//! `None` so loaders can store them as SQL NULL.

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use thiserror::Error;

/// A single decoded data row, padded to the header's width.
pub type Row = Vec<Option<String>>;

/// Reasons a payload cannot be read as CSV.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabularError {
    /// The payload has no header record.
    #[error("CSV payload has no header row")]
    Empty,
    /// The payload is not valid UTF-8.
    #[error("CSV payload is not valid UTF-8 (line {line})")]
    Encoding {
        /// 1-based line of the offending record.
        line: u64,
    },
    /// The CSV reader rejected the payload.
    #[error("CSV payload is malformed: {message}")]
    Malformed {
        /// Reader diagnostic.
        message: String,
    },
    /// A data row has more cells than the header.
    #[error("CSV line {line} has {found} fields but the header has {expected}")]
    RaggedRow {
        /// 1-based line of the offending record.
        line: u64,
        /// Number of cells found on the line.
        found: usize,
        /// Number of header cells.
        expected: usize,
    },
}

/// Decoded CSV table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl CsvTable {
    /// Decode `payload`, treating the first record as the header.
    ///
    /// Rows shorter than the header are padded with `None`; longer rows are
    /// rejected.
    ///
    /// # Errors
    /// Returns [`TabularError`] when the payload is empty, not UTF-8, not
    /// well-formed CSV or contains a row wider than the header.
    ///
    /// # Examples
    /// ```
    /// use worker::domain::CsvTable;
    ///
    /// let table = CsvTable::parse(b"id,name\n1,\n2,Bo\n").expect("valid csv");
    /// assert_eq!(table.header(), ["id", "name"]);
    /// assert_eq!(table.rows()[0], [Some("1".to_owned()), None]);
    /// ```
    pub fn parse(payload: &[u8]) -> Result<Self, TabularError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(payload);

        let header: Vec<String> = reader
            .headers()
            .map_err(map_csv_error)?
            .iter()
            .map(str::to_owned)
            .collect();
        if header.is_empty() {
            return Err(TabularError::Empty);
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result.map_err(map_csv_error)?;
            rows.push(decode_row(&record, header.len())?);
        }
        Ok(Self { header, rows })
    }

    /// Header cells as they appeared in the payload.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Data rows, each exactly as wide as the header.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the table, returning its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

fn decode_row(record: &StringRecord, width: usize) -> Result<Row, TabularError> {
    if record.len() > width {
        return Err(TabularError::RaggedRow {
            line: record.position().map_or(0, csv::Position::line),
            found: record.len(),
            expected: width,
        });
    }
    let mut row: Row = record
        .iter()
        .map(|cell| (!cell.is_empty()).then(|| cell.to_owned()))
        .collect();
    row.resize(width, None);
    Ok(row)
}

fn map_csv_error(error: csv::Error) -> TabularError {
    match error.kind() {
        ErrorKind::Utf8 { pos, .. } => TabularError::Encoding {
            line: pos.as_ref().map_or(0, csv::Position::line),
        },
        _ => TabularError::Malformed {
            message: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn cell(value: &str) -> Option<String> {
        Some(value.to_owned())
    }

    #[test]
    fn keeps_raw_text_and_header_order() {
        let table = CsvTable::parse(b"Order Id,Amount\n007,10.50\n008,3\n").expect("valid");
        assert_eq!(table.header(), ["Order Id", "Amount"]);
        assert_eq!(
            table.rows(),
            [vec![cell("007"), cell("10.50")], vec![cell("008"), cell("3")]]
        );
    }

    #[test]
    fn quoted_cells_may_contain_commas_and_newlines() {
        let table = CsvTable::parse(b"a,b\n\"x, y\",\"line\nbreak\"\n").expect("valid");
        assert_eq!(table.rows(), [vec![cell("x, y"), cell("line\nbreak")]]);
    }

    #[test]
    fn empty_cells_and_short_rows_become_none() {
        let table = CsvTable::parse(b"a,b,c\n1,,3\n4\n").expect("valid");
        assert_eq!(
            table.rows(),
            [vec![cell("1"), None, cell("3")], vec![cell("4"), None, None]]
        );
    }

    #[test]
    fn header_only_payload_has_no_rows() {
        let table = CsvTable::parse(b"a,b\n").expect("valid");
        assert_eq!(table.header().len(), 2);
        assert!(table.into_rows().is_empty());
    }

    #[test]
    fn wide_rows_are_rejected_with_their_line() {
        let err = CsvTable::parse(b"a,b\n1,2\n3,4,5\n").expect_err("ragged");
        assert_eq!(
            err,
            TabularError::RaggedRow {
                line: 3,
                found: 3,
                expected: 2,
            }
        );
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert_eq!(CsvTable::parse(b""), Err(TabularError::Empty));
    }

    #[rstest]
    #[case(b"a,\"b\n".as_slice())]
    #[case(b"a,b\n\"1,2\n".as_slice())]
    fn unterminated_quotes_do_not_panic(#[case] payload: &[u8]) {
        let _outcome = CsvTable::parse(payload);
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let err = CsvTable::parse(b"a,b\n1,\xff\xfe\n").expect_err("not utf-8");
        assert!(matches!(err, TabularError::Encoding { .. }), "{err:?}");
    }
}
