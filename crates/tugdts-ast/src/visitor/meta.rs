// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Generic comment-driven transformer.

use std::fmt;

use crate::comments::parse_leading_comments;
use crate::nodes::{DeclarationTree, Node, SourceFile};
use crate::visitor::traits::{Directive, NodeContext, TreeTransformer};

type Handler<S> = Box<dyn FnMut(&NodeContext<'_>, &mut S) -> Directive>;
type PostHandler<S> = Box<dyn FnMut(DeclarationTree, S) -> DeclarationTree>;
type NodeTest = Box<dyn Fn(&NodeContext<'_>) -> bool>;

/// A transformer assembled from a per-node handler, an optional node test
/// and an optional post handler.
pub struct MetaTransformer<S> {
    name: String,
    handler: Handler<S>,
    post_handler: Option<PostHandler<S>>,
    node_test: Option<NodeTest>,
}

/// Build a transformer that calls `handler` on every node.
pub fn make_transformer<S, F>(name: impl Into<String>, handler: F) -> MetaTransformer<S>
where
    S: Default,
    F: FnMut(&NodeContext<'_>, &mut S) -> Directive + 'static,
{
    MetaTransformer {
        name: name.into(),
        handler: Box::new(handler),
        post_handler: None,
        node_test: None,
    }
}

impl<S: Default> MetaTransformer<S> {
    /// Run `post` once after the walk with the final tree and state. The
    /// returned tree replaces the walked one.
    pub fn with_post_handler<P>(mut self, post: P) -> Self
    where
        P: FnMut(DeclarationTree, S) -> DeclarationTree + 'static,
    {
        self.post_handler = Some(Box::new(post));
        self
    }

    /// Only call the handler for nodes passing `test`. Other nodes are kept
    /// and their children are still walked.
    pub fn with_node_test<T>(mut self, test: T) -> Self
    where
        T: Fn(&NodeContext<'_>) -> bool + 'static,
    {
        self.node_test = Some(Box::new(test));
        self
    }

    /// Walk `tree` with fresh state.
    pub fn run(&mut self, tree: DeclarationTree) -> DeclarationTree {
        let mut state = S::default();
        let files = tree
            .files
            .into_iter()
            .map(|file| {
                let SourceFile {
                    name,
                    text,
                    statements,
                } = file;
                let statements = self.walk_list(statements, &name, &text, 0, &mut state);
                SourceFile {
                    name,
                    text,
                    statements,
                }
            })
            .collect();
        let tree = DeclarationTree { files };
        match self.post_handler.as_mut() {
            Some(post) => post(tree, state),
            None => tree,
        }
    }

    fn walk_list(
        &mut self,
        nodes: Vec<Node>,
        file_name: &str,
        source: &str,
        depth: usize,
        state: &mut S,
    ) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(node) = self.walk_node(node, file_name, source, depth, state) {
                out.push(node);
            }
        }
        out
    }

    fn walk_node(
        &mut self,
        mut node: Node,
        file_name: &str,
        source: &str,
        depth: usize,
        state: &mut S,
    ) -> Option<Node> {
        let directive = {
            let ctx = NodeContext {
                node: &node,
                file_name,
                source,
                comments: parse_leading_comments(&node, source),
                depth,
            };
            let selected = self.node_test.as_ref().is_none_or(|test| test(&ctx));
            if selected {
                (self.handler)(&ctx, state)
            } else {
                Directive::Keep
            }
        };

        match directive {
            Directive::Keep => {
                let children = std::mem::take(&mut node.children);
                node.children = self.walk_list(children, file_name, source, depth + 1, state);
                Some(node)
            }
            Directive::Delete => None,
            Directive::Replace(replacement) => Some(replacement),
        }
    }
}

impl<S: Default> TreeTransformer for MetaTransformer<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&mut self, tree: DeclarationTree) -> DeclarationTree {
        self.run(tree)
    }
}

impl<S> fmt::Debug for MetaTransformer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaTransformer")
            .field("name", &self.name)
            .field("post_handler", &self.post_handler.is_some())
            .field("node_test", &self.node_test.is_some())
            .finish()
    }
}
