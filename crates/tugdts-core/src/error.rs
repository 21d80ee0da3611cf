//! Error types and error code constants for tugdts.
//!
//! This module provides a unified error type (`DtsError`) that bridges
//! domain-specific errors from the parser, the transformers and the
//! processor pipeline into a common format suitable for JSON output.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or configuration (bad input from caller)
//! - `3`: Input errors (file not found, declaration source failed to parse)
//! - `4`: Processing aborted (a pipeline processor failed)
//! - `10`: Internal errors (I/O failures, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `DtsError` is the single error type for CLI output
//! - **Bridging**: each crate implements `From<ItsError> for DtsError`
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

pub use crate::types::Location;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments or configuration from caller.
    InvalidArguments = 2,
    /// Input could not be read or parsed.
    InputError = 3,
    /// A pipeline processor failed and the run was aborted.
    ProcessingAborted = 4,
    /// Internal errors (bugs, unexpected state, I/O).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum DtsError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// Configuration file could not be loaded or is invalid.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Declaration source failed to parse.
    #[error("parse error at {location}: {message}")]
    Parse {
        location: Location,
        message: String,
        /// Rendered source snippet, when available.
        snippet: Option<String>,
    },

    /// A processor failed; the remaining pipeline did not run.
    #[error("processor '{processor}' (#{index}) failed: {message}")]
    ProcessingAborted {
        processor: String,
        index: usize,
        message: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&DtsError> for OutputErrorCode {
    fn from(err: &DtsError) -> Self {
        match err {
            DtsError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            DtsError::Config { .. } => OutputErrorCode::InvalidArguments,
            DtsError::FileNotFound { .. } => OutputErrorCode::InputError,
            DtsError::Parse { .. } => OutputErrorCode::InputError,
            DtsError::ProcessingAborted { .. } => OutputErrorCode::ProcessingAborted,
            DtsError::Io { .. } => OutputErrorCode::InternalError,
            DtsError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<DtsError> for OutputErrorCode {
    fn from(err: DtsError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl DtsError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        DtsError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        DtsError::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error for `path`.
    pub fn io(path: impl fmt::Display, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return DtsError::FileNotFound {
                path: path.to_string(),
            };
        }
        DtsError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        DtsError::InternalError {
            message: message.into(),
        }
    }

    /// Location attached to this error, if any.
    pub fn location(&self) -> Option<&Location> {
        match self {
            DtsError::Parse { location, .. } => Some(location),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
