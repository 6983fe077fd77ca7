//! Error types for brdgen.
//!
//! Library crates use [`BrdError`] via `thiserror`.
//! The CLI app wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all brdgen operations.
#[derive(Debug, thiserror::Error)]
pub enum BrdError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Input document parse or validation error (fatal tier).
    #[error("input error: {message}")]
    Input { message: String },

    /// Content generation error (transport, API status, or response shape).
    #[error("generation error: {0}")]
    Generation(String),

    /// CSV-to-table conversion error (recoverable at the point of use).
    #[error("table error: {0}")]
    Table(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BrdError>;

impl BrdError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an input error from any displayable message.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BrdError::config("missing generation endpoint");
        assert_eq!(err.to_string(), "config error: missing generation endpoint");

        let err = BrdError::input("top-level document is not a JSON object");
        assert!(err.to_string().contains("not a JSON object"));
    }

    #[test]
    fn table_error_displays_cause() {
        let err = BrdError::Table("unequal row lengths".into());
        assert_eq!(err.to_string(), "table error: unequal row lengths");
    }
}
