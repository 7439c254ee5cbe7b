//! Unified-diff line classification.
//!
//! [`classify_line`] is a pure function of the raw line and the current
//! "inside a hunk" flag. The state transitions that follow from its answer
//! live in [`crate::hunk::HunkState`].
//!
//! Ordering matters: `diff --git` and the `+++`/`---` markers are checked
//! before the generic `+`/`-` rules (longest prefix wins), and the hunk
//! marker before the in-hunk body rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::LineRole;

/// Loose hunk marker: only the leading and a closing `@@` are required, so
/// `@@ -1 +1 @@`, `@@-3,0 +4,2@@` and `@@ @@` are all accepted.
static HUNK_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@.*@@").expect("hunk header pattern is valid"));

const GIT_HEADER_PREFIX: &str = "diff --git";
const NEW_FILE_MARKER: &str = "+++";
const OLD_FILE_MARKER: &str = "---";
const DEV_NULL: &str = "/dev/null";

/// The role a single diff line plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `diff --git a/<old> b/<new>`, `--- <old>` or `+++ <new>`.
    FileHeader {
        old_path: Option<String>,
        new_path: Option<String>,
    },
    /// `@@ ... @@`
    HunkHeader,
    /// `+content` inside a hunk
    Addition(&'a str),
    /// `-content` inside a hunk
    Deletion(&'a str),
    /// Any other non-empty line inside a hunk
    Context(&'a str),
    /// Empty lines, the no-newline marker, and non-header lines outside a hunk
    Ignored,
}

impl<'a> LineKind<'a> {
    /// Source fragment eligible for call extraction, with its role.
    pub fn call_source(&self) -> Option<(LineRole, &'a str)> {
        match *self {
            Self::Addition(content) => Some((LineRole::Added, content)),
            Self::Deletion(content) => Some((LineRole::Removed, content)),
            Self::Context(content) => Some((LineRole::Context, content)),
            _ => None,
        }
    }

    /// Paths named by a file header, old path first.
    pub fn header_paths(&self) -> impl Iterator<Item = &str> {
        let (old, new) = match self {
            Self::FileHeader { old_path, new_path } => (old_path.as_deref(), new_path.as_deref()),
            _ => (None, None),
        };
        old.into_iter().chain(new)
    }
}

/// Classify one raw diff line given whether a hunk is currently open.
///
/// Never panics: every prefix test is a `starts_with`/`strip_prefix`, so
/// zero-length and truncated lines fall through to [`LineKind::Ignored`].
pub fn classify_line(line: &str, in_hunk: bool) -> LineKind<'_> {
    if line.is_empty() {
        return LineKind::Ignored;
    }

    if let Some(rest) = line.strip_prefix(GIT_HEADER_PREFIX) {
        if rest.is_empty() || rest.starts_with(' ') {
            let (old_path, new_path) = match split_git_paths(rest.trim_start()) {
                Some((old, new)) => (Some(old), Some(new)),
                None => (None, None),
            };
            return LineKind::FileHeader { old_path, new_path };
        }
    }

    if let Some(rest) = line.strip_prefix(NEW_FILE_MARKER) {
        return LineKind::FileHeader {
            old_path: None,
            new_path: marker_path(rest),
        };
    }

    if let Some(rest) = line.strip_prefix(OLD_FILE_MARKER) {
        return LineKind::FileHeader {
            old_path: marker_path(rest),
            new_path: None,
        };
    }

    if HUNK_HEADER.is_match(line) {
        return LineKind::HunkHeader;
    }

    if !in_hunk {
        return LineKind::Ignored;
    }

    if let Some(content) = line.strip_prefix('+') {
        LineKind::Addition(content)
    } else if let Some(content) = line.strip_prefix('-') {
        LineKind::Deletion(content)
    } else if let Some(content) = line.strip_prefix(' ') {
        LineKind::Context(content)
    } else if line.starts_with('\\') {
        // "\ No newline at end of file"
        LineKind::Ignored
    } else {
        LineKind::Context(line)
    }
}

/// Split `a/<old> b/<new>` into its two paths.
///
/// Paths may contain spaces, so when several ` b/` separators exist the one
/// that makes both sides equal wins, falling back to the last one.
fn split_git_paths(rest: &str) -> Option<(String, String)> {
    let rest = rest.strip_prefix("a/")?;
    let separators: Vec<usize> = rest.match_indices(" b/").map(|(i, _)| i).collect();
    let split = separators
        .iter()
        .copied()
        .find(|&i| rest[..i] == rest[i + 3..])
        .or_else(|| separators.last().copied())?;

    let old = &rest[..split];
    let new = &rest[split + 3..];
    if old.is_empty() || new.is_empty() {
        return None;
    }
    Some((old.to_string(), new.to_string()))
}

/// Path following a `---`/`+++` marker, without prefix, quotes or timestamp.
fn marker_path(rest: &str) -> Option<String> {
    let raw = rest.trim_start().split('\t').next().unwrap_or("").trim_end();
    let raw = raw.trim_matches('"');
    if raw.is_empty() || raw == DEV_NULL {
        return None;
    }

    let path = raw
        .strip_prefix("a/")
        .or_else(|| raw.strip_prefix("b/"))
        .unwrap_or(raw);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
