// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Transformer trait and handler result types.

use crate::comments::LeadingComments;
use crate::jsdoc::CommentBlock;
use crate::nodes::{DeclarationTree, Node, NodeType};

/// What a handler wants done with the node it was shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Directive {
    /// Keep the node and continue into its children.
    #[default]
    Keep,
    /// Remove the node and its subtree.
    Delete,
    /// Put this node in place of the original. The original subtree is not
    /// walked.
    Replace(Node),
}

impl Directive {
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, Self::Replace(_))
    }
}

impl From<Node> for Directive {
    fn from(node: Node) -> Self {
        Directive::Replace(node)
    }
}

/// Everything a handler or node test sees about the current node.
#[derive(Debug)]
pub struct NodeContext<'a> {
    pub node: &'a Node,
    /// Name of the file being walked.
    pub file_name: &'a str,
    /// Text of the file being walked.
    pub source: &'a str,
    pub comments: LeadingComments<'a>,
    /// Nesting depth; top-level statements are at 0.
    pub depth: usize,
}

impl NodeContext<'_> {
    pub fn node_type(&self) -> NodeType {
        self.node.node_type()
    }

    /// The active comment block, if any.
    pub fn last_parsed(&self) -> Option<&CommentBlock> {
        self.comments.last_parsed.as_ref()
    }
}

/// A whole-tree transformation.
pub trait TreeTransformer {
    /// Identifier used in logs and pipeline errors.
    fn name(&self) -> &str;

    /// Consume a tree and produce the transformed tree.
    fn transform(&mut self, tree: DeclarationTree) -> DeclarationTree;
}

impl<T: TreeTransformer + ?Sized> TreeTransformer for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn transform(&mut self, tree: DeclarationTree) -> DeclarationTree {
        (**self).transform(tree)
    }
}
