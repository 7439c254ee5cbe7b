//! Streaming diff files through the classifier and aggregator.
//!
//! Each file is read line by line into its own [`DiffBatchResult`]
//! partition; partitions are merged in discovery order once every file has
//! been processed. The file handle lives only inside [`process_file`], so it
//! is released on every exit path before the partition is merged.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::aggregate::{Aggregator, ContextPolicy, DiffBatchResult};
use crate::error::{DiffcallsError, DiffcallsResult, IoResultExt};
use crate::extract::CallExtractor;
use crate::logging::log_file_failure;

/// Result of a batch run: merged statistics plus the files that failed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub result: DiffBatchResult,
    /// One entry per file (or directory entry) that was skipped.
    pub failures: Vec<DiffcallsError>,
    /// Number of files whose statistics made it into `result`.
    pub files_processed: usize,
}

impl BatchOutcome {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Aggregate every line of `reader` into a fresh partition.
///
/// Lines are split on `\n`, a trailing `\r` is dropped, and invalid UTF-8 is
/// replaced rather than rejected.
pub fn process_reader<R: BufRead>(
    mut reader: R,
    extractor: &CallExtractor,
    policy: ContextPolicy,
) -> std::io::Result<DiffBatchResult> {
    let mut aggregator = Aggregator::new(extractor, policy);
    let mut buf: Vec<u8> = Vec::with_capacity(256);

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let raw: &[u8] = buf.as_slice();
        let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        aggregator.push_line(&String::from_utf8_lossy(raw));
    }

    Ok(aggregator.finish())
}

/// Aggregate a single diff file.
pub fn process_file(
    path: &Path,
    extractor: &CallExtractor,
    policy: ContextPolicy,
) -> DiffcallsResult<DiffBatchResult> {
    let file = File::open(path).with_path(path)?;
    let partial = process_reader(BufReader::new(file), extractor, policy).with_path(path)?;
    debug!(
        path = %path.display(),
        hunks = partial.hunk_count(),
        added = partial.lines_added(),
        deleted = partial.lines_deleted(),
        "processed diff file"
    );
    Ok(partial)
}

/// Aggregate a list of files, optionally across the rayon pool.
///
/// Failed files are logged and reported in [`BatchOutcome::failures`]; a
/// file that fails part-way contributes nothing to the result. Parallel and
/// sequential runs produce identical outcomes.
pub fn process_files(
    files: &[PathBuf],
    extractor: &CallExtractor,
    policy: ContextPolicy,
    parallel: bool,
) -> BatchOutcome {
    let run = |path: &PathBuf| process_file(path, extractor, policy);
    let partitions: Vec<DiffcallsResult<DiffBatchResult>> = if parallel {
        files.par_iter().map(run).collect()
    } else {
        files.iter().map(run).collect()
    };

    let mut outcome = BatchOutcome::default();
    for partition in partitions {
        match partition {
            Ok(partial) => {
                outcome.result.merge(partial);
                outcome.files_processed += 1;
            }
            Err(err) => {
                log_file_failure(&err);
                outcome.failures.push(err);
            }
        }
    }
    outcome
}
