//! Error types for the conversion library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for track conversion operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed command line invocation
    #[error("{0}")]
    Argument(String),

    /// File open/seek/read/write/close failure
    #[error("Failed to {op} file {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes were read than the file claimed to contain
    #[error("Failed to read input file {}: expected {expected} bytes, read {actual}", path.display())]
    ShortRead {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    /// Binary blob rejected by the codec validator or decoder
    #[error("Invalid binary ACL data: {0}")]
    InvalidBinary(String),

    /// Text document could not be parsed
    #[error("Error on line {line} column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// Text document parsed but its content is inconsistent
    #[error("Invalid SJSON content: {0}")]
    InvalidText(String),

    /// Input uses a feature this converter declines to handle
    #[error("{0} not supported yet")]
    UnsupportedFeature(&'static str),

    /// No known revision recognized the input
    #[error("Unknown source format/revision for {}: {diagnostic}", path.display())]
    UnrecognizedFormat { path: PathBuf, diagnostic: String },

    /// Attempt to write a collection whose revision is unknown
    #[error("Unknown ACL version used in input file")]
    UnknownVersion,

    /// No writer exists for the requested revision
    #[error("Unsupported target version: {0}")]
    UnsupportedTarget(String),

    /// Conversion input and output name the same file
    #[error("Input and output cannot be the same file")]
    SameFile,

    /// Sample or description accessed through the wrong variant
    #[error("Kind mismatch: expected {expected}, got {actual}")]
    KindMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    /// Track or sample index out of bounds
    #[error("Index {index} out of bounds (count: {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    /// Codec refused to encode the native track list
    #[error("Failed to convert tracks: {0}")]
    Encode(String),
}

impl Error {
    /// Create an I/O error tagged with the failing operation and path.
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    /// Create an invalid binary error.
    pub fn invalid_binary(msg: impl Into<String>) -> Self {
        Self::InvalidBinary(msg.into())
    }

    /// Create an invalid text content error.
    pub fn invalid_text(msg: impl Into<String>) -> Self {
        Self::InvalidText(msg.into())
    }

    /// Create an encode error.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
