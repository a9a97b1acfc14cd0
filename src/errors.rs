//! Shared error types for preprocessing.
//!
//! Only failures that cross an API boundary are errors here. Per-file
//! problems found during a batch (conflicting prefixes, unparsable files)
//! are reported through the [`DiagnosticsSink`](crate::diagnostics::DiagnosticsSink)
//! instead, so a batch always runs to completion.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for preprocessing operations
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// A source or configuration file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed mapping properties
    #[error("Invalid mapping entry on line {line}: {message}")]
    Properties { line: usize, message: String },
}

impl PreprocessError {
    /// Create an I/O error with path context
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a properties parse error for a 1-indexed line
    pub fn properties(line: usize, message: impl Into<String>) -> Self {
        Self::Properties {
            line,
            message: message.into(),
        }
    }

    /// Whether this error came from the file system.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Result type alias for preprocessing operations
pub type Result<T> = std::result::Result<T, PreprocessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_path() {
        let err = PreprocessError::io(
            "src/com/acme/Foo.java",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        let message = err.to_string();
        assert!(message.contains("src/com/acme/Foo.java"));
        assert!(message.contains("No such file or directory"));
        assert!(err.is_io());
    }

    #[test]
    fn test_properties_error_display() {
        let err = PreprocessError::properties(3, "missing separator");
        assert_eq!(
            err.to_string(),
            "Invalid mapping entry on line 3: missing separator"
        );
        assert!(!err.is_io());
    }
}
