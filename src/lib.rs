//! tugdts - declaration file post-processing.
//!
//! This crate provides the `tugdts` CLI binary and re-exports the library
//! crates it is built from.
//!
//! ## Modules
//!
//! - `cli` - Operations behind the CLI subcommands
//! - `config` - `tugdts.toml` loading
//!
//! ## Crates
//!
//! - [`tugdts_core`] - Errors, logging, JSON output types
//! - [`tugdts_ast`] - Declaration tree, parser, code generation, transformers
//! - [`tugdts_graph`] - Inheritance graph, inheritDoc propagation, pipeline

pub mod cli;
pub mod config;
mod error_bridges;

pub use tugdts_ast;
pub use tugdts_core;
pub use tugdts_graph;

// Re-export core types for convenience
pub use tugdts_core::error::{DtsError, OutputErrorCode};
pub use tugdts_core::log::{LogLevel, Logger, MemoryLogger, TracingLogger};
pub use tugdts_core::output::{ErrorInfo, ErrorResponse, ProcessResponse, SCHEMA_VERSION};
