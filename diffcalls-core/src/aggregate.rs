//! Accumulation of classifier and extractor output into batch statistics.
//!
//! A [`DiffBatchResult`] is built per file by [`Aggregator`] and partitions
//! are merged at the end of a batch, so nothing is shared between files
//! while they are being processed.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::AddAssign;

use serde::Deserialize;

use crate::classify::LineKind;
use crate::extract::{CallExtractor, CallToken, LineRole};
use crate::hunk::HunkState;

/// How calls seen on context lines are tallied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextPolicy {
    /// Count in the common tally and in both the added and removed tallies.
    #[default]
    Both,
    /// Count in the common tally only.
    #[serde(alias = "none")]
    Neither,
}

impl std::str::FromStr for ContextPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "both" => Ok(Self::Both),
            "neither" | "none" => Ok(Self::Neither),
            other => Err(format!(
                "unknown context policy '{}' (expected 'both' or 'neither')",
                other
            )),
        }
    }
}

/// Per-name call tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub added: usize,
    pub removed: usize,
    pub common: usize,
}

impl CallCounts {
    /// Sum of all three tallies.
    pub fn total(&self) -> usize {
        self.added + self.removed + self.common
    }

    fn merge(&mut self, other: &CallCounts) {
        self.added += other.added;
        self.removed += other.removed;
        self.common += other.common;
    }
}

/// Aggregate statistics for a batch of diff files.
///
/// Read-only for callers; built by [`Aggregator`] and combined with
/// [`DiffBatchResult::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffBatchResult {
    file_names: BTreeSet<String>,
    hunk_count: usize,
    lines_added: usize,
    lines_deleted: usize,
    call_counts: BTreeMap<String, CallCounts>,
}

impl DiffBatchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Files referenced by diff headers, deduplicated.
    pub fn file_names(&self) -> &BTreeSet<String> {
        &self.file_names
    }

    pub fn hunk_count(&self) -> usize {
        self.hunk_count
    }

    pub fn lines_added(&self) -> usize {
        self.lines_added
    }

    pub fn lines_deleted(&self) -> usize {
        self.lines_deleted
    }

    pub fn call_counts(&self) -> &BTreeMap<String, CallCounts> {
        &self.call_counts
    }

    pub fn calls_for(&self, name: &str) -> Option<&CallCounts> {
        self.call_counts.get(name)
    }

    /// Call table ordered by total tally descending, then name ascending.
    pub fn calls_by_frequency(&self) -> Vec<(&str, &CallCounts)> {
        let mut calls: Vec<(&str, &CallCounts)> = self
            .call_counts
            .iter()
            .map(|(name, counts)| (name.as_str(), counts))
            .collect();
        calls.sort_by(|(a_name, a), (b_name, b)| {
            b.total()
                .cmp(&a.total())
                .then_with(|| a_name.cmp(b_name))
        });
        calls
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Fold another partition into this one.
    pub fn merge(&mut self, other: DiffBatchResult) {
        self.file_names.extend(other.file_names);
        self.hunk_count += other.hunk_count;
        self.lines_added += other.lines_added;
        self.lines_deleted += other.lines_deleted;
        for (name, counts) in other.call_counts {
            self.call_counts.entry(name).or_default().merge(&counts);
        }
    }

    fn add_file_name(&mut self, name: &str) {
        if !self.file_names.contains(name) {
            self.file_names.insert(name.to_string());
        }
    }

    fn record_call(&mut self, token: &CallToken<'_>, policy: ContextPolicy) {
        let counts = self.call_counts.entry(token.name.to_string()).or_default();
        match token.role {
            LineRole::Added => counts.added += 1,
            LineRole::Removed => counts.removed += 1,
            LineRole::Context => {
                counts.common += 1;
                if policy == ContextPolicy::Both {
                    counts.added += 1;
                    counts.removed += 1;
                }
            }
        }
    }
}

impl AddAssign for DiffBatchResult {
    fn add_assign(&mut self, other: DiffBatchResult) {
        self.merge(other);
    }
}

impl fmt::Display for DiffBatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FILES ({}):", self.file_names.len())?;
        for file in &self.file_names {
            writeln!(f, "- {}", file)?;
        }
        writeln!(f, "Regions: {}", self.hunk_count)?;
        writeln!(f, "Lines added: {}", self.lines_added)?;
        writeln!(f, "Lines deleted: {}", self.lines_deleted)?;
        writeln!(f, "FUNCTION CALLS ({}):", self.call_counts.len())?;
        for (name, counts) in self.calls_by_frequency() {
            writeln!(
                f,
                "- {}: added={} removed={} common={}",
                name, counts.added, counts.removed, counts.common
            )?;
        }
        Ok(())
    }
}

/// Streams the lines of one diff file into a [`DiffBatchResult`] partition.
///
/// Owns the file's [`HunkState`], so a fresh aggregator per file gives the
/// "closed at stream open" starting state.
#[derive(Debug)]
pub struct Aggregator<'e> {
    extractor: &'e CallExtractor,
    policy: ContextPolicy,
    state: HunkState,
    result: DiffBatchResult,
}

impl<'e> Aggregator<'e> {
    pub fn new(extractor: &'e CallExtractor, policy: ContextPolicy) -> Self {
        Self {
            extractor,
            policy,
            state: HunkState::new(),
            result: DiffBatchResult::default(),
        }
    }

    pub fn in_hunk(&self) -> bool {
        self.state.in_hunk()
    }

    /// Classify one raw line and fold its effects into the partition.
    pub fn push_line(&mut self, line: &str) {
        let kind = self.state.classify(line);
        match &kind {
            LineKind::FileHeader { .. } => {
                for path in kind.header_paths() {
                    self.result.add_file_name(path);
                }
            }
            LineKind::HunkHeader => self.result.hunk_count += 1,
            LineKind::Addition(_) => self.result.lines_added += 1,
            LineKind::Deletion(_) => self.result.lines_deleted += 1,
            LineKind::Context(_) | LineKind::Ignored => {}
        }

        if let Some((role, content)) = kind.call_source() {
            for token in self.extractor.extract(content, role) {
                self.result.record_call(&token, self.policy);
            }
        }
    }

    pub fn finish(self) -> DiffBatchResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate(lines: &[&str], policy: ContextPolicy) -> DiffBatchResult {
        let extractor = CallExtractor::default();
        let mut agg = Aggregator::new(&extractor, policy);
        for line in lines {
            agg.push_line(line);
        }
        agg.finish()
    }

    fn in_hunk(lines: &[&str]) -> DiffBatchResult {
        let mut all = vec!["@@ -1,3 +1,4 @@"];
        all.extend_from_slice(lines);
        aggregate(&all, ContextPolicy::Both)
    }

    #[test]
    fn test_hunk_header_alone() {
        let result = aggregate(&["@@ -1,3 +1,4 @@"], ContextPolicy::Both);
        assert_eq!(result.hunk_count(), 1);
        assert_eq!(result.lines_added(), 0);
        assert_eq!(result.lines_deleted(), 0);
        assert!(result.call_counts().is_empty());
        assert!(result.file_names().is_empty());
    }

    #[test]
    fn test_added_call() {
        let result = in_hunk(&["+foo(bar)"]);
        assert_eq!(result.lines_added(), 1);
        assert_eq!(
            result.calls_for("foo"),
            Some(&CallCounts {
                added: 1,
                removed: 0,
                common: 0
            })
        );
    }

    #[test]
    fn test_removed_call() {
        let result = in_hunk(&["-foo(bar)"]);
        assert_eq!(result.lines_deleted(), 1);
        assert_eq!(
            result.calls_for("foo"),
            Some(&CallCounts {
                added: 0,
                removed: 1,
                common: 0
            })
        );
    }

    #[test]
    fn test_context_call_counts_both_sides() {
        let result = in_hunk(&["foo(bar)"]);
        assert_eq!(result.lines_added(), 0);
        assert_eq!(result.lines_deleted(), 0);
        assert_eq!(
            result.calls_for("foo"),
            Some(&CallCounts {
                added: 1,
                removed: 1,
                common: 1
            })
        );
    }

    #[test]
    fn test_context_policy_neither() {
        let result = aggregate(&["@@ -1 +1 @@", " foo(bar)"], ContextPolicy::Neither);
        assert_eq!(
            result.calls_for("foo"),
            Some(&CallCounts {
                added: 0,
                removed: 0,
                common: 1
            })
        );
    }

    #[test]
    fn test_lines_outside_hunk_are_not_counted() {
        let result = aggregate(
            &["diff --git a/x.c b/x.c", "+foo(x)", "-bar(y)", "@@ -1 +1 @@", "+baz()"],
            ContextPolicy::Both,
        );
        assert_eq!(result.lines_added(), 1);
        assert_eq!(result.lines_deleted(), 0);
        assert!(result.calls_for("foo").is_none());
        assert!(result.calls_for("bar").is_none());
        assert!(result.calls_for("baz").is_some());
    }

    #[test]
    fn test_file_names_deduplicated() {
        let result = aggregate(
            &[
                "diff --git a/x.c b/x.c",
                "--- a/x.c",
                "+++ b/x.c",
                "@@ -1 +1 @@",
                "@@ -9 +9 @@",
                "diff --git a/y.c b/z.c",
            ],
            ContextPolicy::Both,
        );
        let names: Vec<&str> = result.file_names().iter().map(String::as_str).collect();
        assert_eq!(names, vec!["x.c", "y.c", "z.c"]);
        assert_eq!(result.hunk_count(), 2);
    }

    #[test]
    fn test_file_header_resets_eligibility_not_totals() {
        let result = aggregate(
            &[
                "diff --git a/a.c b/a.c",
                "@@ -1 +1 @@",
                "+one",
                "diff --git a/b.c b/b.c",
                "+not counted",
                "@@ -1 +1 @@",
                "+two",
            ],
            ContextPolicy::Both,
        );
        assert_eq!(result.lines_added(), 2);
    }

    #[test]
    fn test_macro_line_counts_line_but_no_calls() {
        let result = in_hunk(&["+#define MAX(a,b) foo(a,b)"]);
        assert_eq!(result.lines_added(), 1);
        assert!(result.call_counts().is_empty());
    }

    #[test]
    fn test_merge_partitions() {
        let mut left = in_hunk(&["+foo(x)", "-bar(y)"]);
        let right = aggregate(
            &["diff --git a/r.c b/r.c", "@@ -1 +1 @@", "+foo(z)", " foo(w)"],
            ContextPolicy::Both,
        );
        left += right;

        assert_eq!(left.hunk_count(), 2);
        assert_eq!(left.lines_added(), 2);
        assert_eq!(left.lines_deleted(), 1);
        assert!(left.file_names().contains("r.c"));
        assert_eq!(
            left.calls_for("foo"),
            Some(&CallCounts {
                added: 3,
                removed: 1,
                common: 1
            })
        );
    }

    #[test]
    fn test_merge_with_empty_is_identity() {
        let original = in_hunk(&["+foo(x)"]);
        let mut merged = original.clone();
        merged.merge(DiffBatchResult::empty());
        assert_eq!(merged, original);
    }

    #[test]
    fn test_calls_by_frequency_tie_break() {
        let result = in_hunk(&["+b(x)", "+a(x)", "+c(x)", "+c(y)"]);
        let order: Vec<&str> = result.calls_by_frequency().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_display_report() {
        let result = aggregate(
            &["diff --git a/m.c b/m.c", "@@ -1 +1 @@", "+go(x)"],
            ContextPolicy::Both,
        );
        let text = result.to_string();
        assert!(text.contains("FILES (1):"));
        assert!(text.contains("- m.c"));
        assert!(text.contains("Regions: 1"));
        assert!(text.contains("Lines added: 1"));
        assert!(text.contains("- go: added=1 removed=0 common=0"));
    }

    #[test]
    fn test_context_policy_from_str() {
        assert_eq!("both".parse::<ContextPolicy>(), Ok(ContextPolicy::Both));
        assert_eq!("Neither".parse::<ContextPolicy>(), Ok(ContextPolicy::Neither));
        assert!("sometimes".parse::<ContextPolicy>().is_err());
    }
}
