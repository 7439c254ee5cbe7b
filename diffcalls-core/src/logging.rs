//! Structured logging using **tracing**.
//!
//! Events are emitted as JSON on stderr so stdout stays clean for the report.
//! Rayon workers log per-file outcomes through the same global subscriber.

use tracing::warn;

use crate::error::DiffcallsError;

/// Initializes the global tracing collector (subscriber).
///
/// Call *once* at the beginning of the application's runtime.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=diffcalls_core=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Logs a per-file failure that was recovered by skipping the file.
pub fn log_file_failure(err: &DiffcallsError) {
    match err.path() {
        Some(path) => warn!(path = %path.display(), error = %err, "skipping diff file"),
        None => warn!(error = %err, "skipping diff file"),
    }
}
