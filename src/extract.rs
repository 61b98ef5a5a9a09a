use crate::error::{ReportAnalystError, Result};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One report discovered by a document scan. Ephemeral: lives only for the
/// current document's session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCandidate {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub description: String,
}

/// Result of interpreting a scan response.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Reports(Vec<ReportCandidate>),
    /// No parseable candidate list. The raw response is kept so it can be
    /// shown to the user as diagnostic output instead of being dropped.
    Unstructured {
        raw: String,
        error: Option<String>,
    },
}

/// Pulls the inner content of a fenced block opened with `tag` out of
/// free-form model text.
///
/// The upstream format is not contractually guaranteed, so an ordered list
/// of grammars is tried: fence with a trailing newline, fence with CRLF
/// line endings, fence with no newline at all. First match wins; the inner
/// content is returned trimmed.
pub fn extract_fenced(text: &str, tag: &str) -> Option<String> {
    let tag = regex::escape(tag);
    let patterns = [
        format!(r"(?s)```{tag}[ \t]*\n(.*?)\n```"),
        format!(r"(?s)```{tag}[ \t]*\r?\n(.*?)\r?\n```"),
        format!(r"(?s)```{tag}(.*?)```"),
    ];

    patterns
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .find_map(|re| {
            re.captures(text)
                .map(|caps| caps[1].trim().to_string())
        })
}

/// [`extract_fenced`], but absence is an error instead of `None`.
pub fn require_fenced(text: &str, tag: &str) -> Result<String> {
    extract_fenced(text, tag).ok_or_else(|| ReportAnalystError::ExtractionMismatch {
        tag: tag.to_string(),
        details: "no fenced block found in response".to_string(),
    })
}

/// Interprets a scan response as a list of [`ReportCandidate`]s.
///
/// A fenced `json` block is tried first. If the block fails to decode, the
/// raw response is preserved alongside the decode error. If no block is
/// found at all, the entire response is tried as bare JSON (models
/// sometimes omit the fencing) before giving up.
pub fn extract_report_candidates(text: &str) -> ScanOutcome {
    if let Some(block) = extract_fenced(text, "json") {
        return match serde_json::from_str::<Vec<ReportCandidate>>(&block) {
            Ok(reports) => {
                debug!("Scan response contained {} report candidates", reports.len());
                ScanOutcome::Reports(reports)
            }
            Err(e) => ScanOutcome::Unstructured {
                raw: text.to_string(),
                error: Some(e.to_string()),
            },
        };
    }

    match serde_json::from_str::<Vec<ReportCandidate>>(text.trim()) {
        Ok(reports) => {
            debug!(
                "Scan response was bare JSON with {} report candidates",
                reports.len()
            );
            ScanOutcome::Reports(reports)
        }
        Err(_) => ScanOutcome::Unstructured {
            raw: text.to_string(),
            error: None,
        },
    }
}
