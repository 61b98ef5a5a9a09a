use crate::analyzer::analyze_report;
use crate::completion::CompletionService;
use crate::document::{read_document, DocumentKind, ParsedDocument};
use crate::extract::{extract_fenced, extract_report_candidates, ReportCandidate, ScanOutcome};
use crate::scanner::scan_reports;
use crate::session::{AnalysisRecord, SessionStore};
use crate::table::StructuredTable;
use chrono::Local;
use log::{info, warn};

/// State machine for one uploaded document: decode, then optionally scan
/// for embedded reports, select a focus, and analyze.
///
/// Scan results and the focus selection live only as long as the session;
/// opening a new document starts fresh. Analysis history is kept in a
/// caller-owned [`SessionStore`] passed into [`DocumentSession::analyze`].
#[derive(Debug)]
pub struct DocumentSession {
    filename: String,
    kind: DocumentKind,
    document: ParsedDocument,
    candidates: Vec<ReportCandidate>,
    focus: Option<String>,
}

impl DocumentSession {
    /// Decodes uploaded bytes and opens a session for them. The format is
    /// taken from the filename's extension.
    pub fn open(filename: impl Into<String>, bytes: &[u8]) -> crate::Result<Self> {
        let filename = filename.into();
        let kind = DocumentKind::from_filename(&filename)?;
        let document = read_document(bytes, kind)?;
        info!("Opened document '{}' ({:?})", filename, kind);
        Ok(Self::from_parsed(filename, kind, document))
    }

    /// Reads a local file fully into memory and opens a session for it.
    pub fn open_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let bytes = std::fs::read(path)?;
        Self::open(filename, &bytes)
    }

    /// Opens a session over an already-decoded document.
    pub fn from_parsed(
        filename: impl Into<String>,
        kind: DocumentKind,
        document: ParsedDocument,
    ) -> Self {
        Self {
            filename: filename.into(),
            kind,
            document,
            candidates: Vec::new(),
            focus: None,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn document(&self) -> &ParsedDocument {
        &self.document
    }

    /// Candidates from the most recent successful scan, if any.
    pub fn candidates(&self) -> &[ReportCandidate] {
        &self.candidates
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    /// Scans the document for embedded reports. On a parsed result the
    /// candidate list is cached on the session for later selection;
    /// otherwise the raw response is surfaced for display.
    pub async fn scan<C: CompletionService>(&mut self, completion: &C) -> ScanOutcome {
        let raw = scan_reports(&self.document, completion).await;
        let outcome = extract_report_candidates(&raw);
        if let ScanOutcome::Reports(reports) = &outcome {
            info!("Scan found {} candidate reports", reports.len());
            self.candidates = reports.clone();
        }
        outcome
    }

    /// Sets or clears the focus for subsequent analyses. `None` means
    /// "analyze the entire document".
    pub fn select_focus(&mut self, title: Option<String>) {
        self.focus = title;
    }

    /// Runs the analysis, parses the structured block out of the response,
    /// and appends the resulting record to `history`.
    ///
    /// Partial success is preserved: a missing or unparsable tabular block
    /// never discards the narrative text, and a block that fails to parse
    /// stays available as raw text on the record.
    pub async fn analyze<C: CompletionService>(
        &self,
        completion: &C,
        history: &mut SessionStore,
    ) -> AnalysisRecord {
        let analysis_text =
            analyze_report(&self.document, self.kind, completion, self.focus.as_deref()).await;

        let structured_block = extract_fenced(&analysis_text, "csv");
        if structured_block.is_none() {
            warn!("Analysis response contained no fenced csv block");
        }

        let structured_table = structured_block.as_deref().and_then(|block| {
            StructuredTable::parse(block)
                .map_err(|e| warn!("Structured block did not parse as a table: {}", e))
                .ok()
        });

        let filename = match &self.focus {
            Some(focus) => format!("{} [{}]", self.filename, focus),
            None => self.filename.clone(),
        };

        let record = AnalysisRecord {
            timestamp: Local::now(),
            filename,
            analysis_text,
            structured_block,
            structured_table,
        };
        history.append(record.clone());
        info!("Analysis recorded ({} total in history)", history.len());
        record
    }
}
