//! Output formatting - plaintext and JSON.

use serde::Serialize;

use crate::ingest::BatchOutcome;

/// One row of the call table in the JSON report.
#[derive(Debug, Serialize)]
pub struct CallRow<'a> {
    pub name: &'a str,
    pub added: usize,
    pub removed: usize,
    pub common: usize,
}

/// A skipped file in the JSON report.
#[derive(Debug, Serialize)]
pub struct FailureRow {
    pub path: Option<String>,
    pub message: String,
}

/// Serializable view of a [`BatchOutcome`].
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub files: Vec<&'a str>,
    pub hunk_count: usize,
    pub lines_added: usize,
    pub lines_deleted: usize,
    pub calls: Vec<CallRow<'a>>,
    pub files_processed: usize,
    pub failures: Vec<FailureRow>,
}

impl<'a> JsonReport<'a> {
    pub fn new(outcome: &'a BatchOutcome) -> Self {
        let result = &outcome.result;
        Self {
            files: result.file_names().iter().map(String::as_str).collect(),
            hunk_count: result.hunk_count(),
            lines_added: result.lines_added(),
            lines_deleted: result.lines_deleted(),
            calls: result
                .calls_by_frequency()
                .into_iter()
                .map(|(name, counts)| CallRow {
                    name,
                    added: counts.added,
                    removed: counts.removed,
                    common: counts.common,
                })
                .collect(),
            files_processed: outcome.files_processed,
            failures: outcome
                .failures
                .iter()
                .map(|err| FailureRow {
                    path: err.path().map(|p| p.display().to_string()),
                    message: err.to_string(),
                })
                .collect(),
        }
    }
}

/// Renders the batch as the plain-text report.
pub fn render_plain(outcome: &BatchOutcome) -> String {
    let mut out = outcome.result.to_string();
    if outcome.has_failures() {
        out.push_str(&format!("FAILED FILES ({}):\n", outcome.failures.len()));
        for err in &outcome.failures {
            out.push_str(&format!("- {}\n", err));
        }
    }
    out
}

/// Renders the batch as pretty-printed JSON.
pub fn render_json(outcome: &BatchOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport::new(outcome))
}

/// Prints the batch in plain text format.
pub fn print_plain(outcome: &BatchOutcome) {
    print!("{}", render_plain(outcome));
}

/// Prints the batch in JSON format.
///
/// Falls back to the plain report if serialization fails.
pub fn print_json(outcome: &BatchOutcome) {
    match render_json(outcome) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("[WARN] JSON serialization failed: {}", e);
            print_plain(outcome);
        }
    }
}
