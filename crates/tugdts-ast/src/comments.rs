// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Leading comment extraction for declaration nodes.

use crate::jsdoc::{parse_comment, CommentBlock};
use crate::nodes::Node;

/// The comments directly preceding a node and their parsed forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadingComments<'a> {
    /// Raw text of every leading comment, in source order.
    pub comments: Vec<&'a str>,
    /// Blocks of the comments that parsed, in source order.
    pub parsed: Vec<CommentBlock>,
    /// Raw text of the last comment that parsed.
    pub last_comment: Option<&'a str>,
    /// The active block: the parsed comment closest to the node.
    pub last_parsed: Option<CommentBlock>,
}

impl LeadingComments<'_> {
    /// True if the active block carries `tag`.
    pub fn active_has_tag(&self, tag: &str) -> bool {
        self.last_parsed
            .as_ref()
            .is_some_and(|block| block.has_tag(tag))
    }
}

/// Collect and parse the leading comments of `node`.
///
/// Only the node's own comment ranges are read. Ranges that fall outside
/// `source` are skipped.
pub fn parse_leading_comments<'a>(node: &Node, source: &'a str) -> LeadingComments<'a> {
    let mut result = LeadingComments::default();
    for range in &node.leading_comments {
        let Some(raw) = range.span.slice(source) else {
            continue;
        };
        result.comments.push(raw);
        if let Some(block) = parse_comment(raw) {
            result.parsed.push(block);
            result.last_comment = Some(raw);
        }
    }
    result.last_parsed = result.parsed.last().cloned();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{CommentKind, CommentRange, Heritage, Span};

    fn node_with_comments(source: &str, raws: &[&str]) -> Node {
        let mut node = Node::class("A", Heritage::default(), Vec::new());
        node.leading_comments = raws
            .iter()
            .map(|raw| {
                let start = source.find(raw).unwrap();
                CommentRange::new(Span::new(start, start + raw.len()), CommentKind::Block)
            })
            .collect();
        node
    }

    #[test]
    fn last_parsed_is_closest_block() {
        let source = "/** @internal */\n/** @public */\nclass A {}";
        let node = node_with_comments(source, &["/** @internal */", "/** @public */"]);
        let leading = parse_leading_comments(&node, source);
        assert_eq!(leading.comments.len(), 2);
        assert_eq!(leading.parsed.len(), 2);
        assert_eq!(leading.last_comment, Some("/** @public */"));
        assert!(leading.active_has_tag("public"));
        assert!(!leading.active_has_tag("internal"));
    }

    #[test]
    fn unparsable_comments_are_discarded() {
        let source = "/** @internal */\n/* plain */\nclass A {}";
        let node = node_with_comments(source, &["/** @internal */", "/* plain */"]);
        let leading = parse_leading_comments(&node, source);
        assert_eq!(leading.comments.len(), 2);
        assert_eq!(leading.parsed.len(), 1);
        assert_eq!(leading.last_comment, Some("/** @internal */"));
        assert!(leading.active_has_tag("internal"));
    }

    #[test]
    fn no_comments_means_no_active_block() {
        let node = Node::class("A", Heritage::default(), Vec::new());
        let leading = parse_leading_comments(&node, "class A {}");
        assert_eq!(leading, LeadingComments::default());
        assert!(leading.last_parsed.is_none());
    }

    #[test]
    fn out_of_range_comments_are_skipped() {
        let mut node = Node::class("A", Heritage::default(), Vec::new());
        node.leading_comments = vec![CommentRange::new(Span::new(50, 60), CommentKind::Block)];
        let leading = parse_leading_comments(&node, "short");
        assert!(leading.comments.is_empty());
    }
}
