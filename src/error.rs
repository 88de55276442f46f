//! Error types for record processing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AwkError>;

/// Errors raised by the engine, records and string utilities.
#[derive(Error, Debug)]
pub enum AwkError {
    /// An input file could not be opened or read. Aborts the run.
    #[error("cannot read input '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The output sink could not be opened or written.
    #[error("cannot write output '{path}': {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Positional field access outside `0..len`.
    #[error("field index {index} out of range (record has {len} fields)")]
    FieldIndex { index: usize, len: usize },

    /// A rule or separator pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A name-style field key that resolves to no integer index.
    #[error("unknown field name '{0}'")]
    UnknownName(String),

    /// A rule that can never be evaluated, or selector text that does not parse.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// printf-style formatting failed.
    #[error("format error: {0}")]
    Format(String),
}

impl AwkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AwkError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_index_message() {
        let err = AwkError::FieldIndex { index: 10, len: 3 };
        assert_eq!(
            err.to_string(),
            "field index 10 out of range (record has 3 fields)"
        );
    }

    #[test]
    fn test_io_message_names_path() {
        let err = AwkError::io(
            "missing.txt",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("missing.txt"));
    }
}
