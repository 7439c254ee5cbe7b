//! Typed error handling for diffcalls.
//!
//! Per-file failures are collected as data alongside the batch result, so
//! every variant carries enough context to be reported on its own.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for diffcalls operations.
#[derive(Error, Debug)]
pub enum DiffcallsError {
    /// I/O error when opening, walking or reading an input
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file errors
    #[error("Config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Serialized syntax tree could not be decoded
    #[error("Syntax tree error in {path}: {message}")]
    SyntaxTree { path: PathBuf, message: String },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl DiffcallsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create an I/O error that has no underlying `std::io::Error`.
    pub fn io_message(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a syntax tree decoding error.
    pub fn syntax_tree(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::SyntaxTree {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error (the batch can continue).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::SyntaxTree { .. })
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::SyntaxTree { path, .. } => Some(path),
            Self::InvalidArgument { .. } => None,
        }
    }
}

/// Convenience type alias for diffcalls results.
pub type DiffcallsResult<T> = Result<T, DiffcallsError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> DiffcallsResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> DiffcallsResult<T> {
        self.map_err(|e| DiffcallsError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error() {
        let err = DiffcallsError::io(
            PathBuf::from("/diffs/a.diff"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        );
        assert!(matches!(err, DiffcallsError::Io { .. }));
        assert_eq!(err.path(), Some(&PathBuf::from("/diffs/a.diff")));
        assert!(err.to_string().contains("/diffs/a.diff"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(DiffcallsError::io_message("/x.diff", "unreadable").is_recoverable());
        assert!(DiffcallsError::syntax_tree("/ast.json", "eof").is_recoverable());
        assert!(!DiffcallsError::config("/diffcalls.toml", "bad key").is_recoverable());
        assert!(!DiffcallsError::invalid_argument("no input").is_recoverable());
    }

    #[test]
    fn test_invalid_argument_has_no_path() {
        assert!(DiffcallsError::invalid_argument("x").path().is_none());
    }

    #[test]
    fn test_io_result_ext() {
        let result: std::io::Result<()> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        let converted = result.with_path("/missing/file.diff");
        match converted {
            Err(DiffcallsError::Io { path, source, .. }) => {
                assert_eq!(path, PathBuf::from("/missing/file.diff"));
                assert!(source.is_some());
            }
            other => panic!("Expected Io error, got {:?}", other),
        }
    }
}
