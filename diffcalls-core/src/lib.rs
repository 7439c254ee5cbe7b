//! diffcalls-core: statistics and function-call frequencies for unified diffs
//!
//! This library reads a batch of unified-diff files and reports which files
//! they touch, how many hunks and added/deleted lines they contain, and how
//! often each function name is called on added, removed and context lines.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use diffcalls_core::prelude::*;
//!
//! let outcome = DiffCalls::new("./diffs").run()?;
//!
//! for (name, counts) in outcome.result.calls_by_frequency() {
//!     println!("{}: +{} -{} ={}", name, counts.added, counts.removed, counts.common);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`classify`]: Per-line diff classification
//! - [`hunk`]: "Inside a hunk" state per file
//! - [`extract`]: Call-name extraction from line content
//! - [`aggregate`]: Batch statistics and partition merging
//! - [`scan`]: Deterministic diff file discovery
//! - [`ingest`]: Streaming files through the aggregator, in parallel
//! - [`builder`]: Fluent builder API for configuration
//! - [`report`]: Plain text and JSON output
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `vardecl` (default): Variable declarations from serialized syntax trees

// Core modules (always available)
pub mod aggregate;
pub mod builder;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod hunk;
pub mod ingest;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod scan;

// Feature-gated modules
#[cfg(feature = "vardecl")]
pub mod vardecl;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DiffcallsError, DiffcallsResult, IoResultExt};

// Builder API
pub use builder::DiffCalls;

// Configuration
pub use config::{
    load_config, load_config_file, CallsConfig, DiffcallsConfig, OutputConfig, ScanConfig,
    CONFIG_FILE_NAME,
};

// Line classification
pub use classify::{classify_line, LineKind};
pub use hunk::HunkState;

// Call extraction
pub use extract::{
    extract_calls, is_excluded_line, CallExtractor, CallToken, Keywords, LineRole,
    DEFAULT_KEYWORDS,
};

// Aggregation
pub use aggregate::{Aggregator, CallCounts, ContextPolicy, DiffBatchResult};

// Ingestion
pub use ingest::{process_file, process_files, process_reader, BatchOutcome};

// Logging
pub use logging::{init_structured_logging, log_file_failure};

// Reporting
pub use report::{print_json, print_plain, render_json, render_plain, JsonReport};

// File scanning
pub use scan::{gather_diff_files, DiscoveredFiles, ScanOptions};

// Feature-gated re-exports
#[cfg(feature = "vardecl")]
pub use vardecl::{
    collect_variable_declarations, load_syntax_tree, parse_syntax_tree, render_declarations,
    SyntaxDocument, SyntaxNode, VariableDecl,
};
