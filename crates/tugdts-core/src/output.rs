//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Nullable vs absent:** absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{DtsError, OutputErrorCode};
use crate::log::LogRecord;

pub use crate::types::Location;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Response
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Where the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl ErrorInfo {
    /// Create from a DtsError.
    pub fn from_error(err: &DtsError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            location: err.location().cloned(),
        }
    }
}

/// Response emitted when a command fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a DtsError.
    pub fn from_error(err: &DtsError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Process Response
// ============================================================================

/// Per-file summary of a processed declaration tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileSummary {
    /// File name as parsed.
    pub name: String,
    /// Number of top-level statements after processing.
    pub statements: usize,
}

/// Details of a processor that aborted the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AbortInfo {
    pub processor: String,
    pub index: usize,
    pub message: String,
}

/// Response for `tugdts process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Status: "ok" or "aborted".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Processed files in bundle order.
    pub files: Vec<FileSummary>,
    /// Where the rendered tree was written, if not stdout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    /// Rendered tree, when no output path was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Warnings and errors logged during the run.
    pub diagnostics: Vec<LogRecord>,
    /// Set when a processor aborted the pipeline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<AbortInfo>,
}

impl ProcessResponse {
    pub fn new(files: Vec<FileSummary>, diagnostics: Vec<LogRecord>) -> Self {
        ProcessResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            files,
            output_path: None,
            output: None,
            diagnostics,
            aborted: None,
        }
    }

    /// Record that the rendered tree was written to `path`.
    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Carry the rendered tree inline.
    pub fn with_output(mut self, text: impl Into<String>) -> Self {
        self.output = Some(text.into());
        self
    }

    /// Mark the response as aborted by `info`.
    pub fn with_abort(mut self, info: AbortInfo) -> Self {
        self.status = "aborted".to_string();
        self.aborted = Some(info);
        self
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
///
/// This is the single output path for CLI, ensuring consistency.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
