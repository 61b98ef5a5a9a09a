//! # Financial Report Analyst
//!
//! A library for turning uploaded financial documents (Excel or PDF) into
//! structured, traceable tabular data plus a narrative summary, by way of a
//! remote completion service.
//!
//! ## Core Concepts
//!
//! - **ParsedDocument**: normalized in-memory form of an upload — ordered
//!   sheets with values and formulas for spreadsheets, flat text for PDFs
//! - **Report scan**: a first, cheap model call that enumerates the distinct
//!   reports embedded in a document so the user can pick one
//! - **Focus selection**: an optional constraint limiting the analysis to
//!   one of the scanned reports (enforced by prompt, not locally)
//! - **Analysis**: the main model call; its response carries a narrative
//!   plus one fenced CSV block that is parsed tolerantly into a table
//! - **SessionStore**: caller-owned, append-only history of analyses,
//!   discarded with the session
//!
//! The hierarchy inference, numeric normalization, and arithmetic checks
//! are performed by the completion service under detailed instructions;
//! this crate transports those instructions and parses what comes back.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_report_analyst::*;
//!
//! let client = OpenAiClient::new(std::env::var("OPENAI_API_KEY")?);
//! let mut history = SessionStore::new();
//!
//! let bytes = std::fs::read("balance_2023.xlsx")?;
//! let mut session = DocumentSession::open("balance_2023.xlsx", &bytes)?;
//!
//! if let ScanOutcome::Reports(reports) = session.scan(&client).await {
//!     session.select_focus(Some(reports[0].title.clone()));
//! }
//!
//! let record = session.analyze(&client, &mut history).await;
//! println!("{}", record.analysis_text);
//! if let Some(block) = &record.structured_block {
//!     std::fs::write(export_filename(&record.filename), export_bytes(block))?;
//! }
//! ```

pub mod analyzer;
pub mod completion;
pub mod document;
pub mod error;
pub mod export;
pub mod extract;
pub mod pipeline;
pub mod prompts;
pub mod scanner;
pub mod session;
pub mod table;

pub use analyzer::{analyze_report, render_document_payload};
pub use completion::{CompletionRequest, CompletionService, OpenAiClient};
pub use document::{
    cell_reference, read_document, CellValue, DocumentKind, ParsedDocument, Sheet,
};
pub use error::{ReportAnalystError, Result};
pub use export::{export_bytes, export_filename};
pub use extract::{
    extract_fenced, extract_report_candidates, require_fenced, ReportCandidate, ScanOutcome,
};
pub use pipeline::DocumentSession;
pub use scanner::{render_scan_payload, scan_reports};
pub use session::{AnalysisRecord, SessionStore};
pub use table::StructuredTable;
