use crate::error::{ReportAnalystError, Result};
use csv::{ReaderBuilder, Trim};
use log::debug;
use serde::{Deserialize, Serialize};

/// A parsed tabular block: header row plus data rows, all kept as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StructuredTable {
    /// Parses a CSV-like block produced by the model.
    ///
    /// The block is handled line by line so one malformed row never takes
    /// down the whole parse: rows with a dangling quote or more fields than
    /// the header are skipped, rows with fewer fields are padded with empty
    /// strings. Quoted fields (including embedded delimiters) and leading
    /// whitespace after a delimiter are tolerated. Fails only when no
    /// usable header row exists.
    pub fn parse(block: &str) -> Result<Self> {
        let mut lines = block.lines().filter(|line| !line.trim().is_empty());

        let headers = lines
            .next()
            .and_then(parse_line)
            .ok_or_else(|| ReportAnalystError::ExtractionMismatch {
                tag: "csv".to_string(),
                details: "block has no usable header row".to_string(),
            })?;

        let width = headers.len();
        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            match parse_line(line) {
                Some(mut fields) if fields.len() <= width => {
                    fields.resize(width, String::new());
                    rows.push(fields);
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {} malformed rows while parsing tabular block", skipped);
        }

        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Re-encodes the table as CSV text, quoting fields that need it.
    pub fn to_csv(&self) -> String {
        let mut out = encode_row(&self.headers);
        for row in &self.rows {
            out.push('\n');
            out.push_str(&encode_row(row));
        }
        out
    }
}

fn encode_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| encode_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

fn encode_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn parse_line(line: &str) -> Option<Vec<String>> {
    // A dangling quote makes the lenient reader swallow everything after it
    // into one field; treat the row as malformed instead.
    if line.matches('"').count() % 2 != 0 {
        return None;
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => Some(record.iter().map(str::to_string).collect()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let table = StructuredTable::parse("a,b,c\n1,2,3\n4,5,6").unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["4", "5", "6"]);
    }

    #[test]
    fn test_parse_quoted_fields_and_leading_space() {
        let table = StructuredTable::parse("Concepto,Valor\n\"Caja, Bancos\", 100").unwrap();
        assert_eq!(table.rows[0], vec!["Caja, Bancos", "100"]);
    }

    #[test]
    fn test_unbalanced_quote_skips_row_only() {
        let block = "a,b,c\n\"bad,row\n1,2,3";
        let table = StructuredTable::parse(block).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_overlong_row_skipped_short_row_padded() {
        let block = "a,b\n1,2,3\n4";
        let table = StructuredTable::parse(block).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows[0], vec!["4", ""]);
    }

    #[test]
    fn test_empty_block_is_error() {
        assert!(StructuredTable::parse("").is_err());
        assert!(StructuredTable::parse("\n  \n").is_err());
    }

    #[test]
    fn test_round_trip_with_embedded_delimiters() {
        let table = StructuredTable {
            headers: vec!["Concepto".into(), "Detalle".into(), "Valor".into()],
            rows: vec![
                vec!["Caja".into(), "Caja, Bancos y \"otros\"".into(), "100.50".into()],
                vec!["Total".into(), String::new(), "-90".into()],
            ],
        };

        let decoded = StructuredTable::parse(&table.to_csv()).unwrap();
        assert_eq!(decoded, table);
    }
}
