// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declaration tree model, parser and transformers for TypeScript
//! declaration (`.d.ts`) files.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_source`] turns declaration text into a
//!   [`SourceFile`]; [`parse_bundle`] builds a multi-file tree.
//! - **Code Generation**: [`render_file`] and [`render_tree`] print a tree
//!   back to declaration text.
//! - **Comments**: [`parse_leading_comments`] reads the documentation
//!   comments in front of a node.
//! - **Transformers**: the [`visitor`] module provides the comment-driven
//!   transformer framework plus the tag filter and the `@implements`
//!   import synthesizer.
//!
//! # Quick Start
//!
//! ```
//! use tugdts_ast::{parse_source, render_file};
//!
//! let file = parse_source("index.d.ts", "export declare class A { run(): void }").unwrap();
//! assert_eq!(render_file(&file), "export declare class A {\n    run(): void;\n}\n");
//! ```

pub mod codegen;
pub mod comments;
pub mod errors;
pub mod jsdoc;
pub mod nodes;
pub mod parser;
pub mod tokenizer;
pub mod visitor;

pub use codegen::{render_file, render_tree, Codegen, CodegenState};
pub use comments::{parse_leading_comments, LeadingComments};
pub use errors::ParseError;
pub use jsdoc::{parse_comment, CommentBlock, TagEntry};
pub use nodes::{DeclarationTree, Node, NodeKind, NodeType, SourceFile};
pub use parser::{parse_bundle, parse_source};
