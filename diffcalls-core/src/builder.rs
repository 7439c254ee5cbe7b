//! Builder pattern API for diff batch statistics.
//!
//! Provides a fluent interface for configuring and running a batch:
//!
//! ```rust,ignore
//! use diffcalls_core::prelude::*;
//!
//! let outcome = DiffCalls::new("./diffs")
//!     .recursive(true)
//!     .keywords(["sizeof"])
//!     .context_policy(ContextPolicy::Neither)
//!     .run()?;
//!
//! println!("{}", outcome.result);
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::ContextPolicy;
use crate::config::DiffcallsConfig;
use crate::extract::{CallExtractor, Keywords};
use crate::ingest::{process_files, BatchOutcome};
use crate::logging::log_file_failure;
use crate::scan::{gather_diff_files, ScanOptions};

/// Builder for configuring a diff batch.
#[derive(Debug, Clone)]
pub struct DiffCalls {
    /// Directory holding the diff files
    root: PathBuf,

    /// Discovery options
    scan: ScanOptions,

    /// Keywords added to the built-in reserved set
    extra_keywords: Vec<String>,

    /// How context-line calls are tallied
    policy: ContextPolicy,

    /// Process files across the rayon pool
    parallel: bool,
}

impl DiffCalls {
    /// Create a new batch builder for the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            scan: ScanOptions::default(),
            extra_keywords: Vec::new(),
            policy: ContextPolicy::default(),
            parallel: true,
        }
    }

    /// Apply every value set in a configuration file.
    pub fn with_config(mut self, config: &DiffcallsConfig) -> Self {
        if let Some(scan) = &config.scan {
            if let Some(extensions) = &scan.extensions {
                self.scan.extensions = extensions.clone();
            }
            if let Some(recursive) = scan.recursive {
                self.scan.recursive = recursive;
            }
            if let Some(exclude) = &scan.exclude {
                self.scan.exclude.extend(exclude.iter().cloned());
            }
        }
        if let Some(calls) = &config.calls {
            if let Some(keywords) = &calls.keywords {
                self.extra_keywords.extend(keywords.iter().cloned());
            }
            if let Some(policy) = calls.context_policy {
                self.policy = policy;
            }
        }
        self
    }

    /// Replace the accepted extensions; an empty list accepts every file.
    pub fn extensions(mut self, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scan.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Descend into subdirectories.
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.scan.recursive = enabled;
        self
    }

    /// Add directories to prune from the walk.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.scan.exclude.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add reserved keywords that are never reported as calls.
    pub fn keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_keywords.extend(keywords.into_iter().map(Into::into));
        self
    }

    pub fn context_policy(mut self, policy: ContextPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Process files in parallel (default) or one after another.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Extractor built from the configured keywords.
    pub fn extractor(&self) -> CallExtractor {
        CallExtractor::new(Keywords::with_extra(self.extra_keywords.iter().cloned()))
    }

    /// Discover and process every diff file under the root.
    ///
    /// Fails only when the root cannot be listed; unreadable files end up in
    /// [`BatchOutcome::failures`].
    pub fn run(&self) -> Result<BatchOutcome> {
        let started = Instant::now();
        info!(
            root = %self.root.display(),
            recursive = self.scan.recursive,
            parallel = self.parallel,
            "starting diff batch"
        );

        let discovered = gather_diff_files(&self.root, &self.scan)
            .with_context(|| format!("Failed to list diff files in {}", self.root.display()))?;

        let extractor = self.extractor();
        let mut outcome = process_files(&discovered.files, &extractor, self.policy, self.parallel);

        for err in &discovered.errors {
            log_file_failure(err);
        }
        let mut failures = discovered.errors;
        failures.append(&mut outcome.failures);
        outcome.failures = failures;

        info!(
            files = outcome.files_processed,
            failures = outcome.failures.len(),
            hunks = outcome.result.hunk_count(),
            calls = outcome.result.call_counts().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "diff batch complete"
        );
        Ok(outcome)
    }
}
