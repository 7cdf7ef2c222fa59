//! CSV parsing for the inventory dataset.
//!
//! The parser is tolerant: quoted fields may contain delimiters, rows may be
//! ragged and blank rows are dropped. Problems that do not make the whole
//! file unusable are collected as warnings instead of aborting the load.

use csv::{ReaderBuilder, Trim};

use super::vehicles_model::{ColumnIndex, VehicleRecord};
use crate::errors::Error;
use crate::Result;

/// Result of parsing a CSV file.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    /// Headers extracted from the first non-blank row
    pub headers: Vec<String>,
    /// Data rows, each normalized to the header width
    pub rows: Vec<Vec<String>>,
    /// Data row number of each entry in `rows`
    pub row_numbers: Vec<usize>,
    /// Recoverable problems found along the way
    pub warnings: Vec<ParseWarning>,
}

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based data row the warning refers to, if any. The header and blank
    /// rows are not counted.
    pub row: Option<usize>,
    pub kind: WarningKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    Encoding,
    Parse,
    Structure,
    Skipped,
}

impl ParseWarning {
    fn new(row: Option<usize>, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            row,
            kind,
            message: message.into(),
        }
    }
}

/// Vehicles parsed from a dataset plus the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct ParsedInventory {
    pub records: Vec<VehicleRecord>,
    pub warnings: Vec<ParseWarning>,
}

/// Parses raw CSV bytes into header and data rows.
pub fn parse_csv(content: &[u8], delimiter: u8) -> Result<ParsedCsv> {
    let mut warnings = Vec::new();
    let content_str = decode_content(content, &mut warnings);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false) // Header handled manually so blank leading rows are skipped
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content_str.as_bytes());

    // Every non-blank record takes a number, the header being row 0
    let mut all_records: Vec<(usize, Vec<String>)> = Vec::new();
    let mut next_row = 0usize;
    for result in reader.records() {
        match result {
            Ok(record) => {
                let row: Vec<String> = record.iter().map(|s| s.to_string()).collect();
                if row.iter().all(|cell| cell.is_empty()) {
                    continue;
                }
                all_records.push((next_row, row));
            }
            Err(e) => {
                let row = (next_row > 0).then_some(next_row);
                warnings.push(ParseWarning::new(
                    row,
                    WarningKind::Parse,
                    format!("Failed to parse row {}: {}", next_row, e),
                ));
            }
        }
        next_row += 1;
    }

    let mut records = all_records.into_iter();
    let (_, headers) = records
        .next()
        .ok_or_else(|| Error::Parse("CSV file is empty or has no header row".to_string()))?;

    let header_count = headers.len();
    let mut rows = Vec::new();
    let mut row_numbers = Vec::new();
    for (number, mut row) in records {
        if row.len() < header_count {
            row.resize(header_count, String::new());
        } else if row.len() > header_count {
            warnings.push(ParseWarning::new(
                Some(number),
                WarningKind::Structure,
                format!(
                    "Row {} has {} columns, expected {}. Extra columns ignored.",
                    number,
                    row.len(),
                    header_count
                ),
            ));
            row.truncate(header_count);
        }
        rows.push(row);
        row_numbers.push(number);
    }

    Ok(ParsedCsv {
        headers,
        rows,
        row_numbers,
        warnings,
    })
}

/// Parses a comma-delimited inventory file into vehicle records.
///
/// Fails when the file has no header or lacks a required column. Rows that
/// cannot be addressed by VIN are skipped with a warning.
pub fn parse_inventory(content: &[u8]) -> Result<ParsedInventory> {
    let ParsedCsv {
        headers,
        rows,
        row_numbers,
        mut warnings,
    } = parse_csv(content, b',')?;
    let index = ColumnIndex::new(&headers)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, &number) in rows.iter().zip(&row_numbers) {
        match VehicleRecord::from_row(&index, row) {
            Some(record) => records.push(record),
            None => warnings.push(ParseWarning::new(
                Some(number),
                WarningKind::Skipped,
                format!("Row {} has no VIN and was skipped", number),
            )),
        }
    }

    Ok(ParsedInventory { records, warnings })
}

/// Decodes content bytes to UTF-8, stripping a BOM if present.
fn decode_content(content: &[u8], warnings: &mut Vec<ParseWarning>) -> String {
    let content_without_bom = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);

    match std::str::from_utf8(content_without_bom) {
        Ok(s) => s.to_string(),
        Err(e) => {
            warnings.push(ParseWarning::new(
                None,
                WarningKind::Encoding,
                format!(
                    "Invalid UTF-8 encoding at byte {}. Some characters may be replaced.",
                    e.valid_up_to()
                ),
            ));
            String::from_utf8_lossy(content_without_bom).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_csv() {
        let content = b"VIN,Year,Make\nA,2024,Honda\nB,2023,Ford";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.headers, vec!["VIN", "Year", "Make"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[1], vec!["B", "2023", "Ford"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_quoted_fields_keep_delimiters() {
        let content = b"VIN,Comments\nA,\"Clean, one owner\"\nB,\"Line1\nLine2\"";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.rows[0], vec!["A", "Clean, one owner"]);
        assert_eq!(result.rows[1], vec!["B", "Line1\nLine2"]);
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let content = b"\nVIN,Year\nA,2024\n\n,\nB,2023\n";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.headers, vec!["VIN", "Year"]);
        assert_eq!(result.rows.len(), 2);
    }

    #[test]
    fn test_uneven_columns() {
        let content = b"a,b,c\n1,2\n3,4,5,6";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.rows[0], vec!["1", "2", ""]);
        assert_eq!(result.rows[1], vec!["3", "4", "5"]);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Structure && w.row == Some(2)));
    }

    #[test]
    fn test_warning_kinds_share_row_numbering() {
        // Blank rows and the header do not count
        let content = b"\nVIN,Year\nA,2024\n\n,2023\nB,2023,extra\n";

        let parsed = parse_inventory(content).unwrap();

        assert_eq!(parsed.records.len(), 2);
        let rows_of = |kind| {
            parsed
                .warnings
                .iter()
                .filter(|w| w.kind == kind)
                .map(|w| w.row)
                .collect::<Vec<_>>()
        };
        assert_eq!(rows_of(WarningKind::Skipped), vec![Some(2)]);
        assert_eq!(rows_of(WarningKind::Structure), vec![Some(3)]);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let content = b" VIN , Year \n  A ,2024 ";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.headers, vec!["VIN", "Year"]);
        assert_eq!(result.rows[0], vec!["A", "2024"]);
    }

    #[test]
    fn test_utf8_bom() {
        let content = b"\xEF\xBB\xBFVIN,Year\nA,2024";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.headers, vec!["VIN", "Year"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let content = b"VIN,Make\nA,Citro\xEBn";

        let result = parse_csv(content, b',').unwrap();

        assert_eq!(result.rows.len(), 1);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Encoding));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv(b"", b','), Err(Error::Parse(_))));
        assert!(matches!(parse_csv(b"\n\n", b','), Err(Error::Parse(_))));
    }

    #[test]
    fn test_parse_inventory_skips_rows_without_vin() {
        let content = b"VIN,Year,Price\nA,2024,10000\n,2023,5000\nC,2023,oops";

        let parsed = parse_inventory(content).unwrap();

        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[0].vin, "A");
        assert_eq!(parsed.records[1].price, "0");
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::Skipped && w.row == Some(2)));
    }

    #[test]
    fn test_parse_inventory_header_only() {
        let parsed = parse_inventory(b"VIN,Year,Make\n").unwrap();
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_parse_inventory_requires_vin_column() {
        let err = parse_inventory(b"Stock #,Year\n1,2024").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
