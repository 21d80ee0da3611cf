// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Comment-driven tree transformers.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order**: a node's handler runs before its children
//! - Children are visited in source order
//! - Each file of a bundle is walked on its own; a handler never sees nodes
//!   of another file during one file's walk
//!
//! # Building a Transformer
//!
//! [`make_transformer`] wraps a handler that inspects each node together
//! with its parsed leading comments and answers with a [`Directive`]:
//!
//! ```
//! use tugdts_ast::visitor::{make_transformer, Directive, TreeTransformer};
//! use tugdts_ast::parser::parse_source;
//! use tugdts_ast::nodes::DeclarationTree;
//!
//! let file = parse_source("a.d.ts", "/** @beta */\nexport declare const x: number;").unwrap();
//! let mut strip_beta = make_transformer("strip-beta", |ctx, _state: &mut ()| {
//!     if ctx.comments.active_has_tag("beta") {
//!         Directive::Delete
//!     } else {
//!         Directive::Keep
//!     }
//! });
//! let tree = strip_beta.transform(DeclarationTree::single(file));
//! assert_eq!(tree.statement_count(), 0);
//! ```
//!
//! Per-run state (`S: Default`) is created fresh for each `transform` call
//! and handed to the optional post handler once the walk is complete.

pub mod implements;
pub mod meta;
pub mod tag_filter;
pub mod traits;

pub use implements::{synthesize_implements_imports, ImplementsImports};
pub use meta::{make_transformer, MetaTransformer};
pub use tag_filter::{filter_by_tags, TransformConfigError};
pub use traits::{Directive, NodeContext, TreeTransformer};
