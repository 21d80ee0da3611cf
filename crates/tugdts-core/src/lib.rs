//! Core infrastructure for tugdts.
//!
//! This crate provides the pieces shared by every other tugdts crate:
//! - Error types and exit codes
//! - Spans and locations into declaration source text
//! - Text position utilities
//! - The injected [`log::Logger`] collaborator
//! - JSON output types for CLI responses

pub mod error;
pub mod log;
pub mod output;
pub mod text;
pub mod types;
