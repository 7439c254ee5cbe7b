//! Function-call extraction from source fragments embedded in diff lines.
//!
//! Diff lines carry arbitrary, often truncated, source text, so there is no
//! grammar to lean on. The scanner walks the line once, keeping a candidate
//! identifier and a stack of names waiting for their closing parenthesis:
//!
//! - a delimiter discards the candidate
//! - `(` right after a candidate that does not start with a digit pushes it
//! - `)` right after an argument pops the innermost pending name
//! - whatever is still pending at end of line is drained
//!
//! Every pushed name is therefore reported exactly once per line, unless it
//! is a reserved keyword. Lines that open a macro definition, a block
//! comment, or consist of a line comment are skipped as a whole.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::RegexSet;

/// Keywords that look like calls (`if (`, `for(`) but never are.
pub const DEFAULT_KEYWORDS: &[&str] = &["for", "while", "if", "try", "catch", "switch", "return"];

/// Characters that end a candidate identifier.
const DELIMITERS: &[char] = &[
    ' ', '\t', '\r', '\n', '\x0c', '.', '"', '\'', '`', ',', ';', ':', '=', '+', '-', '*', '/',
    '%', '&', '|', '^', '!', '~', '<', '>', '?', '[', ']', '{', '}', '#', '@', '\\',
];

/// Structural contexts in which `name(` is not a call.
static EXCLUDED_LINES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        // #define MAX(a, b) ...
        r"#\s*define\s.*\w\s*\(",
        // /* see frobnicate(x) */, but not code after a closed comment
        r"/\*(?:[^*]|\*+[^*/])*\w\s*\(",
        // // frobnicate(x) is gone
        r"^\s*//",
    ])
    .expect("exclusion patterns are valid")
});

/// Which side of the diff a call was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRole {
    /// `+` line: present after the change
    Added,
    /// `-` line: present before the change
    Removed,
    /// unprefixed line: present on both sides
    Context,
}

/// A call name observed on one diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallToken<'a> {
    pub name: &'a str,
    pub role: LineRole,
}

/// Reserved-keyword set consulted before a call name is emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keywords {
    set: HashSet<String>,
}

impl Default for Keywords {
    fn default() -> Self {
        Self {
            set: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Keywords {
    /// Built-in keywords plus `extra`.
    pub fn with_extra(extra: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut keywords = Self::default();
        keywords.extend(extra);
        keywords
    }

    pub fn extend(&mut self, extra: impl IntoIterator<Item = impl Into<String>>) {
        self.set
            .extend(extra.into_iter().map(Into::into).filter(|k: &String| !k.is_empty()));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.set.contains(name)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// Call extractor configured with a keyword set.
#[derive(Debug, Clone, Default)]
pub struct CallExtractor {
    keywords: Keywords,
}

impl CallExtractor {
    pub fn new(keywords: Keywords) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    /// Extract call tokens from one line's content, labelled with `role`.
    ///
    /// Total over all inputs: empty strings, delimiter-only strings and
    /// unbalanced parentheses all produce a (possibly empty) token list.
    pub fn extract<'a>(&self, content: &'a str, role: LineRole) -> Vec<CallToken<'a>> {
        if content.is_empty() || is_excluded_line(content) {
            return Vec::new();
        }

        scan_call_names(content)
            .into_iter()
            .filter(|name| !self.keywords.contains(name))
            .map(|name| CallToken { name, role })
            .collect()
    }
}

/// Extract call tokens using the built-in keyword set.
pub fn extract_calls(content: &str, role: LineRole) -> Vec<CallToken<'_>> {
    CallExtractor::default().extract(content, role)
}

/// True when the line is a macro definition, opens a block comment before a
/// call-like name, or is a line comment.
pub fn is_excluded_line(content: &str) -> bool {
    EXCLUDED_LINES.is_match(content)
}

#[inline]
fn is_delimiter(c: char) -> bool {
    c.is_whitespace() || DELIMITERS.contains(&c)
}

/// An identifier tail: something that can end a call argument.
#[inline]
fn closes_argument(c: char) -> bool {
    c == ')' || (c != '(' && !is_delimiter(c))
}

#[inline]
fn is_call_name(candidate: &str) -> bool {
    candidate
        .chars()
        .next()
        .is_some_and(|first| !first.is_ascii_digit())
}

/// Bracket-matching scan returning candidate names in emission order,
/// keywords included.
fn scan_call_names(content: &str) -> Vec<&str> {
    let mut pending: Vec<&str> = Vec::new();
    let mut names: Vec<&str> = Vec::new();
    let mut buffer_start: Option<usize> = None;
    let mut prev: Option<char> = None;

    for (i, c) in content.char_indices() {
        match c {
            '(' => {
                let follows_identifier = prev.is_some_and(|p| p != ')' && closes_argument(p));
                if let Some(start) = buffer_start.take() {
                    let candidate = &content[start..i];
                    if follows_identifier && is_call_name(candidate) {
                        pending.push(candidate);
                    }
                }
            }
            ')' => {
                buffer_start = None;
                if prev.is_some_and(closes_argument) {
                    if let Some(name) = pending.pop() {
                        names.push(name);
                    }
                }
            }
            c if is_delimiter(c) => buffer_start = None,
            _ => {
                buffer_start.get_or_insert(i);
            }
        }
        prev = Some(c);
    }

    // Calls whose closing parenthesis is on a later line.
    while let Some(name) = pending.pop() {
        names.push(name);
    }
    names
}
