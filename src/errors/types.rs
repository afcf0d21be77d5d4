//! Error type definitions for the EPG filter
//!
//! Fatal conditions surface as [`AppError`] and terminate a run. Recoverable
//! conditions (malformed exclusion terms, unparsable timestamps, skipped
//! subtrees) are never raised as errors; they are recorded as warnings in
//! [`crate::diagnostics::Diagnostics`].

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// A required input file does not exist
    #[error("{kind} file '{}' not found", path.display())]
    InputNotFound { kind: InputKind, path: PathBuf },

    /// Source document or input file handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Invalid arguments or input content
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Filesystem errors other than a missing input
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The kind of input a missing or unreadable file was expected to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Source,
    ChannelList,
    Playlist,
    ExclusionList,
    Config,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            InputKind::Source => "Input",
            InputKind::ChannelList => "Channel",
            InputKind::Playlist => "M3U",
            InputKind::ExclusionList => "Exclusion",
            InputKind::Config => "Config",
        };
        f.write_str(label)
    }
}

/// Source document specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// The document could not be parsed, even after lenient recovery
    #[error("Parse error: {source_type} - {message}")]
    ParseError { source_type: String, message: String },

    /// The document parsed but contained no root element
    #[error("No root element found in {source_type} document")]
    MissingRoot { source_type: String },

    /// Writing the filtered document failed
    #[error("Write error: {message}")]
    WriteError { message: String },
}

/// Reasons a single exclusion sub-term is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeParseError {
    /// More than one range separator, e.g. `1-2-3`
    #[error("expected exactly two range boundaries, found {count}")]
    TooManyBoundaries { count: usize },

    /// The range would expand to more numbers than allowed
    #[error("range {low}-{high} spans more than {limit} numbers")]
    TooWide { low: u64, high: u64, limit: u64 },

    /// A boundary's digits do not fit an integer
    #[error("boundary '{boundary}' is not a valid number: {source}")]
    InvalidBoundary {
        boundary: String,
        #[source]
        source: ParseIntError,
    },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a missing input error
    pub fn input_not_found<P: Into<PathBuf>>(kind: InputKind, path: P) -> Self {
        Self::InputNotFound {
            kind,
            path: path.into(),
        }
    }

    /// Wrap an I/O error, promoting `NotFound` to [`AppError::InputNotFound`]
    pub fn from_io<P: Into<PathBuf>>(kind: InputKind, path: P, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::InputNotFound { kind, path }
        } else {
            Self::Io { path, source }
        }
    }

    /// True for the missing-input category
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }
}

impl SourceError {
    /// Create a parse error
    pub fn parse_error<S: Into<String>, M: Into<String>>(source_type: S, message: M) -> Self {
        Self::ParseError {
            source_type: source_type.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write_error<M: Into<String>>(message: M) -> Self {
        Self::WriteError {
            message: message.into(),
        }
    }
}
