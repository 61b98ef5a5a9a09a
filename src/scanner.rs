use crate::completion::{CompletionRequest, CompletionService};
use crate::document::ParsedDocument;
use crate::prompts;
use log::{info, warn};

/// Character budget for scan payloads. Scanning only needs structural cues,
/// so it gets a smaller budget than full analysis.
pub const SCAN_CHAR_BUDGET: usize = 100_000;

/// Rows of each sheet included in the spreadsheet scan preview.
pub const SCAN_SHEET_PREVIEW_ROWS: usize = 40;

/// Appended to a payload that was cut at the budget, so the model does not
/// assume it saw the complete document.
pub const TRUNCATION_MARKER: &str = "...";

/// Asks the completion service to enumerate the distinct reports embedded
/// in the document, returning the raw model text.
///
/// A completion failure is not propagated: it is converted into a textual
/// error stand-in so the interface can display it in place of the result.
pub async fn scan_reports<C: CompletionService>(
    document: &ParsedDocument,
    completion: &C,
) -> String {
    let payload = render_scan_payload(document);
    let prompt = prompts::build_scan_prompt(&payload);
    info!("Scanning document for embedded reports ({} prompt bytes)", prompt.len());

    let request = CompletionRequest::new(prompt)
        .with_system(prompts::SYSTEM_PROMPT_SCAN)
        .with_temperature(0.0);

    match completion.complete(request).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Document scan failed: {}", e);
            format!("Error al escanear el documento: {}", e)
        }
    }
}

/// Serializes the document into the scan payload: truncated raw text for
/// PDFs, a compact per-sheet preview for spreadsheets.
pub fn render_scan_payload(document: &ParsedDocument) -> String {
    match document {
        ParsedDocument::Text(text) => truncate_chars(text, SCAN_CHAR_BUDGET),
        ParsedDocument::Spreadsheet(sheets) => {
            let mut payload = String::new();
            for sheet in sheets {
                payload.push_str(&format!("--- Hoja: {} ---\n", sheet.name));
                let shown = sheet.row_count().min(SCAN_SHEET_PREVIEW_ROWS);
                for index in 0..shown {
                    payload.push_str(&sheet.render_row(index));
                    payload.push('\n');
                }
                if sheet.row_count() > shown {
                    payload.push_str(&format!("... ({} filas más)\n", sheet.row_count() - shown));
                }
                payload.push('\n');
            }
            truncate_chars(&payload, SCAN_CHAR_BUDGET)
        }
    }
}

/// Cuts `text` at `budget` characters, appending the truncation marker when
/// anything was dropped.
pub(crate) fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}
