//! Per-file "inside a hunk" tracking.

use crate::classify::{classify_line, LineKind};

/// Whether the current diff file has an open hunk.
///
/// Created closed when a file stream opens, closed again by every file
/// header and opened by every hunk header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HunkState {
    in_hunk: bool,
}

impl HunkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_hunk(&self) -> bool {
        self.in_hunk
    }

    /// Classify `line` against the current state, then apply the transition
    /// its kind implies.
    pub fn classify<'a>(&mut self, line: &'a str) -> LineKind<'a> {
        let kind = classify_line(line, self.in_hunk);
        self.observe(&kind);
        kind
    }

    fn observe(&mut self, kind: &LineKind<'_>) {
        match kind {
            LineKind::FileHeader { .. } => self.in_hunk = false,
            LineKind::HunkHeader => self.in_hunk = true,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        assert!(!HunkState::new().in_hunk());
    }

    #[test]
    fn test_hunk_header_opens_and_file_header_closes() {
        let mut state = HunkState::new();
        assert_eq!(state.classify("@@ -1,3 +1,4 @@"), LineKind::HunkHeader);
        assert!(state.in_hunk());

        assert_eq!(state.classify("+added"), LineKind::Addition("added"));
        assert!(state.in_hunk());

        state.classify("diff --git a/b.c b/b.c");
        assert!(!state.in_hunk());
        assert_eq!(state.classify("+after header"), LineKind::Ignored);
    }

    #[test]
    fn test_marker_line_closes_hunk() {
        let mut state = HunkState::new();
        state.classify("@@ -1 +1 @@");
        state.classify("+++ b/other.c");
        assert!(!state.in_hunk());
    }

    #[test]
    fn test_consecutive_hunks_stay_open() {
        let mut state = HunkState::new();
        state.classify("@@ -1 +1 @@");
        state.classify(" ctx");
        state.classify("@@ -10 +10 @@");
        assert!(state.in_hunk());
    }

    #[test]
    fn test_ignored_lines_do_not_change_state() {
        let mut state = HunkState::new();
        state.classify("index 1234..5678");
        assert!(!state.in_hunk());
        state.classify("@@ -1 +1 @@");
        state.classify("");
        assert!(state.in_hunk());
    }
}
