//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use diffcalls_core::prelude::*;
//! ```

// Core result types
pub use crate::aggregate::{CallCounts, ContextPolicy, DiffBatchResult};
pub use crate::error::{DiffcallsError, DiffcallsResult};
pub use crate::ingest::BatchOutcome;

// Line-level building blocks
pub use crate::classify::{classify_line, LineKind};
pub use crate::extract::{extract_calls, CallExtractor, Keywords, LineRole};

// Configuration
pub use crate::config::{load_config, DiffcallsConfig};

// Builder API
pub use crate::builder::DiffCalls;
