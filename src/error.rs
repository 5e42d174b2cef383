//! Error types for declaration scanning, compilation and directive checks.

use thiserror::Error;

/// The declaration scanner could not make sense of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct SourceError {
    pub line: usize,
    pub message: String,
}

impl SourceError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Failures of the top-level compilation entry points.
///
/// A `Command` is either returned whole or not at all.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source text could not be turned into a declaration set.
    #[error("failed to parse {file}: {source}")]
    SourceUnparsable {
        file: String,
        #[source]
        source: SourceError,
    },

    /// The named type is absent, or it is not a struct.
    #[error("type not found: {type_name} in {file}")]
    TypeNotFound { file: String, type_name: String },

    /// The source text could not be read.
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Why a directive inside an annotation was rejected.
///
/// Rejected directives are treated as absent by the accessors on
/// [`Tag`](crate::tag::Tag); these reasons only feed diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("directive is present but has no value")]
    Empty,

    #[error("malformed value {0:?}")]
    Malformed(String),

    #[error("negative argument position in {0:?}")]
    Negative(String),

    #[error("range end must be greater than its start in {0:?}")]
    InvalidRange(String),
}
