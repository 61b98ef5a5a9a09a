use crate::error::{ReportAnalystError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use log::debug;
use std::fmt;
use std::io::{Cursor, Read, Seek};

/// Declared format of an uploaded document, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Xlsx,
    Xls,
    Pdf,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" => Ok(DocumentKind::Xlsx),
            "xls" => Ok(DocumentKind::Xls),
            "pdf" => Ok(DocumentKind::Pdf),
            other => Err(ReportAnalystError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_filename(filename: &str) -> Result<Self> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| ReportAnalystError::UnsupportedFormat(filename.to_string()))?;
        Self::from_extension(extension)
    }

    pub fn is_spreadsheet(self) -> bool {
        matches!(self, DocumentKind::Xlsx | DocumentKind::Xls)
    }

    /// Human-readable label used when describing the source format to the model.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Xlsx | DocumentKind::Xls => "Excel",
            DocumentKind::Pdf => "PDF",
        }
    }
}

/// A single spreadsheet cell, owned and decoupled from the decoding backend.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Bool(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(v) => CellValue::Number(*v),
            Data::Int(v) => CellValue::Number(*v as f64),
            Data::Bool(v) => CellValue::Bool(*v),
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// One worksheet: a dense table of values plus the formulas found on it.
///
/// `first_row` is the 1-based Excel row number of `values[0]`, so rendered
/// row indices line up with what the user sees in a spreadsheet tool.
/// `formulas` pairs A1-style coordinates with `=`-prefixed formula source;
/// it is empty for legacy `.xls` files or when extraction fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub first_row: u32,
    pub values: Vec<Vec<CellValue>>,
    pub formulas: Vec<(String, String)>,
}

impl Sheet {
    pub fn row_count(&self) -> usize {
        self.values.len()
    }

    /// Excel row number (1-based) for a 0-based index into `values`.
    pub fn excel_row(&self, index: usize) -> u32 {
        self.first_row + index as u32
    }

    /// Renders one row for a prompt payload, prefixed with its Excel row
    /// number so the model can cite exact coordinates.
    pub fn render_row(&self, index: usize) -> String {
        let cells = self.values[index]
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{:>4} | {}", self.excel_row(index), cells)
    }
}

/// In-memory representation of an uploaded document. Exactly one variant
/// is produced per upload; sheet order follows the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedDocument {
    Spreadsheet(Vec<Sheet>),
    Text(String),
}

/// Decodes raw uploaded bytes into a [`ParsedDocument`].
///
/// The whole payload is held in memory; there is no streaming decode.
pub fn read_document(bytes: &[u8], kind: DocumentKind) -> Result<ParsedDocument> {
    match kind {
        DocumentKind::Pdf => read_pdf(bytes),
        DocumentKind::Xlsx | DocumentKind::Xls => read_spreadsheet(bytes, kind),
    }
}

fn read_pdf(bytes: &[u8]) -> Result<ParsedDocument> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ReportAnalystError::Decode(e.to_string()))?;
    debug!("Extracted {} characters of PDF text", text.len());
    Ok(ParsedDocument::Text(text))
}

fn read_spreadsheet(bytes: &[u8], kind: DocumentKind) -> Result<ParsedDocument> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| ReportAnalystError::Decode(e.to_string()))?;

    let names = workbook.sheet_names().to_owned();
    let mut sheets = Vec::with_capacity(names.len());

    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ReportAnalystError::Decode(e.to_string()))?;

        let first_row = range.start().map(|(row, _)| row + 1).unwrap_or(1);
        let values: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();

        // Formula extraction is only attempted for the modern format; legacy
        // .xls files simply yield an empty map.
        let formulas = if kind == DocumentKind::Xlsx {
            extract_formulas(&mut workbook, &name)
        } else {
            Vec::new()
        };

        debug!(
            "Decoded sheet '{}': {} rows, {} formulas",
            name,
            values.len(),
            formulas.len()
        );

        sheets.push(Sheet {
            name,
            first_row,
            values,
            formulas,
        });
    }

    Ok(ParsedDocument::Spreadsheet(sheets))
}

fn extract_formulas<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    sheet_name: &str,
) -> Vec<(String, String)> {
    let Ok(range) = workbook.worksheet_formula(sheet_name) else {
        return Vec::new();
    };

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    range
        .used_cells()
        .filter(|(_, _, formula)| !formula.is_empty())
        .map(|(row, col, formula)| {
            let coordinate = cell_reference(start_row + row as u32, start_col + col as u32);
            (coordinate, format!("={}", formula))
        })
        .collect()
}

/// Converts 0-based (row, col) indices to an A1-style coordinate string.
pub fn cell_reference(row: u32, col: u32) -> String {
    let mut letters = String::new();
    let mut n = col;
    loop {
        letters.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    format!("{}{}", letters, row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_reference() {
        assert_eq!(cell_reference(0, 0), "A1");
        assert_eq!(cell_reference(9, 1), "B10");
        assert_eq!(cell_reference(0, 25), "Z1");
        assert_eq!(cell_reference(0, 26), "AA1");
        assert_eq!(cell_reference(44, 27), "AB45");
    }

    #[test]
    fn test_kind_from_filename() {
        assert_eq!(
            DocumentKind::from_filename("balance_2023.XLSX").unwrap(),
            DocumentKind::Xlsx
        );
        assert_eq!(
            DocumentKind::from_filename("legacy.xls").unwrap(),
            DocumentKind::Xls
        );
        assert_eq!(
            DocumentKind::from_filename("informe.pdf").unwrap(),
            DocumentKind::Pdf
        );
        assert!(matches!(
            DocumentKind::from_filename("notes.txt"),
            Err(ReportAnalystError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            DocumentKind::from_filename("no_extension"),
            Err(ReportAnalystError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Number(1500.0).to_string(), "1500");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::Text("Activos".into()).to_string(), "Activos");
        assert_eq!(CellValue::Bool(true).to_string(), "TRUE");
    }

    #[test]
    fn test_excel_row_offset() {
        let sheet = Sheet {
            name: "Hoja1".into(),
            first_row: 3,
            values: vec![vec![CellValue::Text("Caja".into())]],
            formulas: Vec::new(),
        };
        assert_eq!(sheet.excel_row(0), 3);
        assert_eq!(sheet.excel_row(4), 7);
    }
}
