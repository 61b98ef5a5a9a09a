use crate::completion::{CompletionRequest, CompletionService};
use crate::document::{DocumentKind, ParsedDocument, Sheet};
use crate::prompts;
use log::{info, warn};

/// Sheets larger than this are sampled instead of rendered in full.
pub const ROW_SAMPLE_THRESHOLD: usize = 300;
/// Rows rendered from the top of an oversized sheet.
pub const HEAD_ROWS: usize = 200;
/// Rows rendered from the bottom of an oversized sheet.
pub const TAIL_ROWS: usize = 50;
/// At most this many formulas are listed per sheet.
pub const FORMULA_SAMPLE: usize = 200;
/// Character budget for text documents. Analysis gets a larger budget than
/// scanning because it needs the data, not just structural cues.
pub const ANALYSIS_CHAR_BUDGET: usize = 400_000;

pub const HIDDEN_ROWS_MARKER: &str = "... [Filas ocultas] ...";
pub const TRUNCATED_TEXT_MARKER: &str = "... [Texto truncado por longitud] ...";

/// Runs the full extraction prompt against the document, optionally scoped
/// to one selected report, and returns the raw model text.
///
/// Scoping is prompt-level only: the exclusion constraint is prepended and
/// the model is trusted to honor it. Completion failures are converted to a
/// textual error stand-in, same policy as the scanner.
pub async fn analyze_report<C: CompletionService>(
    document: &ParsedDocument,
    kind: DocumentKind,
    completion: &C,
    focus: Option<&str>,
) -> String {
    let payload = render_document_payload(document);
    let prompt = prompts::build_analysis_prompt(kind, focus, &payload);
    info!(
        "Analyzing document ({} prompt bytes, focus: {})",
        prompt.len(),
        focus.unwrap_or("ninguno")
    );

    let request = CompletionRequest::new(prompt).with_system(prompts::SYSTEM_PROMPT_ANALYST);

    match completion.complete(request).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Document analysis failed: {}", e);
            format!("Error comunicándose con el servicio de análisis: {}", e)
        }
    }
}

/// Serializes the document content for the analysis prompt body.
///
/// Sheets are rendered with their Excel row numbers; oversized sheets show
/// the first [`HEAD_ROWS`] and last [`TAIL_ROWS`] rows around an explicit
/// gap marker so both the start and end of large tables stay visible
/// within the completion service's input limits.
pub fn render_document_payload(document: &ParsedDocument) -> String {
    match document {
        ParsedDocument::Text(text) => match text.char_indices().nth(ANALYSIS_CHAR_BUDGET) {
            Some((byte_index, _)) => {
                format!("{}\n{}", &text[..byte_index], TRUNCATED_TEXT_MARKER)
            }
            None => text.clone(),
        },
        ParsedDocument::Spreadsheet(sheets) => {
            let mut payload = String::new();
            for sheet in sheets {
                render_sheet(&mut payload, sheet);
            }
            payload
        }
    }
}

fn render_sheet(payload: &mut String, sheet: &Sheet) {
    payload.push_str(&format!("\n--- Hoja: {} ---\n", sheet.name));

    let rows = sheet.row_count();
    if rows > ROW_SAMPLE_THRESHOLD {
        payload.push_str(&format!(
            "Valores (primeras {} filas y últimas {} filas; los índices coinciden con las filas de Excel):\n",
            HEAD_ROWS, TAIL_ROWS
        ));
        for index in 0..HEAD_ROWS {
            payload.push_str(&sheet.render_row(index));
            payload.push('\n');
        }
        payload.push_str(&format!("\n{}\n\n", HIDDEN_ROWS_MARKER));
        for index in rows - TAIL_ROWS..rows {
            payload.push_str(&sheet.render_row(index));
            payload.push('\n');
        }
    } else {
        payload.push_str("Valores (los índices coinciden con las filas de Excel):\n");
        for index in 0..rows {
            payload.push_str(&sheet.render_row(index));
            payload.push('\n');
        }
    }

    if sheet.formulas.is_empty() {
        payload.push_str("\nNo se detectaron fórmulas en esta hoja.\n");
    } else {
        payload.push_str(&format!(
            "\nFórmulas encontradas (muestra de las primeras {}):\n",
            FORMULA_SAMPLE
        ));
        for (coordinate, formula) in sheet.formulas.iter().take(FORMULA_SAMPLE) {
            payload.push_str(&format!("{}: {}\n", coordinate, formula));
        }
        if sheet.formulas.len() > FORMULA_SAMPLE {
            payload.push_str(&format!(
                "... y {} fórmulas más.\n",
                sheet.formulas.len() - FORMULA_SAMPLE
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CellValue;

    fn sheet_with_rows(rows: usize) -> Sheet {
        Sheet {
            name: "Datos".into(),
            first_row: 1,
            values: (0..rows)
                .map(|i| vec![CellValue::Text(format!("concepto{}", i)), CellValue::Number(i as f64)])
                .collect(),
            formulas: Vec::new(),
        }
    }

    #[test]
    fn test_small_sheet_rendered_in_full() {
        let doc = ParsedDocument::Spreadsheet(vec![sheet_with_rows(10)]);
        let payload = render_document_payload(&doc);
        assert!(payload.contains("concepto0"));
        assert!(payload.contains("concepto9"));
        assert!(!payload.contains(HIDDEN_ROWS_MARKER));
    }

    #[test]
    fn test_oversized_sheet_sampled_head_and_tail() {
        let doc = ParsedDocument::Spreadsheet(vec![sheet_with_rows(400)]);
        let payload = render_document_payload(&doc);

        // Head up to row 200, tail from row 351, gap marked in between.
        assert!(payload.contains("concepto0"));
        assert!(payload.contains(&format!("concepto{}", HEAD_ROWS - 1)));
        assert!(payload.contains("concepto399"));
        assert!(payload.contains(&format!("concepto{}", 400 - TAIL_ROWS)));
        assert!(!payload.contains("concepto250 |"));
        assert!(!payload.contains(&format!("concepto{} ", HEAD_ROWS)));
        assert!(payload.contains(HIDDEN_ROWS_MARKER));

        // Excel row numbers, not 0-based indices.
        assert!(payload.contains("   1 | concepto0"));
        assert!(payload.contains(" 400 | concepto399"));
    }

    #[test]
    fn test_formula_listing_bounded() {
        let mut sheet = sheet_with_rows(5);
        sheet.formulas = (0..FORMULA_SAMPLE + 30)
            .map(|i| (format!("B{}", i + 1), format!("=SUM(A1:A{})", i + 1)))
            .collect();
        let payload = render_document_payload(&ParsedDocument::Spreadsheet(vec![sheet]));

        assert!(payload.contains("B1: =SUM(A1:A1)"));
        assert!(payload.contains(&format!("B{}: ", FORMULA_SAMPLE)));
        assert!(!payload.contains(&format!("B{}: ", FORMULA_SAMPLE + 1)));
        assert!(payload.contains("... y 30 fórmulas más."));
    }

    #[test]
    fn test_no_formula_note_for_legacy_sheets() {
        let payload = render_document_payload(&ParsedDocument::Spreadsheet(vec![sheet_with_rows(3)]));
        assert!(payload.contains("No se detectaron fórmulas en esta hoja."));
    }

    #[test]
    fn test_long_text_truncated_with_marker() {
        let text = "a".repeat(ANALYSIS_CHAR_BUDGET + 5);
        let payload = render_document_payload(&ParsedDocument::Text(text));
        assert!(payload.ends_with(TRUNCATED_TEXT_MARKER));

        let short = ParsedDocument::Text("texto breve".into());
        assert_eq!(render_document_payload(&short), "texto breve");
    }
}
