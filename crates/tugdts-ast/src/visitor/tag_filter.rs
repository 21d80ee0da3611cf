// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Remove declarations by documentation tag.

use std::collections::BTreeSet;

use thiserror::Error;
use tugdts_core::error::DtsError;

use crate::visitor::meta::{make_transformer, MetaTransformer};
use crate::visitor::traits::Directive;

/// Invalid transformer configuration, reported before any tree is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformConfigError {
    #[error("no tags configured for filtering")]
    EmptyTagSet,
    #[error("tag #{index} is blank")]
    BlankTag { index: usize },
}

impl From<TransformConfigError> for DtsError {
    fn from(err: TransformConfigError) -> Self {
        DtsError::invalid_args(err.to_string())
    }
}

/// Build a transformer deleting every node whose active comment block
/// carries one of `tags`.
///
/// Tag names may be given with or without a leading `@`. Earlier comment
/// blocks of a node are never consulted.
pub fn filter_by_tags<I, T>(tags: I) -> Result<MetaTransformer<()>, TransformConfigError>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut names = BTreeSet::new();
    for (index, tag) in tags.into_iter().enumerate() {
        let tag = tag.as_ref().trim();
        let tag = tag.strip_prefix('@').unwrap_or(tag).trim();
        if tag.is_empty() {
            return Err(TransformConfigError::BlankTag { index });
        }
        names.insert(tag.to_string());
    }
    if names.is_empty() {
        return Err(TransformConfigError::EmptyTagSet);
    }

    Ok(make_transformer("filter-by-tags", move |ctx, _: &mut ()| {
        let matched = ctx
            .last_parsed()
            .is_some_and(|block| block.tags.iter().any(|entry| names.contains(&entry.tag)));
        if matched {
            Directive::Delete
        } else {
            Directive::Keep
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::render_tree;
    use crate::nodes::DeclarationTree;
    use crate::parser::parse_source;
    use crate::visitor::traits::TreeTransformer;

    fn tree(text: &str) -> DeclarationTree {
        DeclarationTree::single(parse_source("t.d.ts", text).unwrap())
    }

    #[test]
    fn removes_tagged_declarations_and_members() {
        let input = tree(
            "/** @internal */\nexport declare function hidden(): void;\n\
             export declare class Api {\n    /** @hidden */\n    secret(): void;\n    open(): void;\n}\n",
        );
        let mut filter = filter_by_tags(["internal", "@hidden"]).unwrap();
        let out = filter.transform(input);
        assert_eq!(
            render_tree(&out),
            "export declare class Api {\n    open(): void;\n}\n"
        );
    }

    #[test]
    fn only_last_block_is_consulted() {
        let input = tree("/** @internal */\n/** Public API. */\nexport declare const v: number;");
        let mut filter = filter_by_tags(["internal"]).unwrap();
        let out = filter.transform(input);
        assert_eq!(out.statement_count(), 1);
    }

    #[test]
    fn unparsable_last_comment_falls_back_to_last_parsed() {
        let input = tree("/** @internal */\n// note\nexport declare const v: number;");
        let mut filter = filter_by_tags(["internal"]).unwrap();
        assert_eq!(filter.transform(input).statement_count(), 0);
    }

    #[test]
    fn filtering_is_idempotent() {
        let input = tree(
            "/** @alpha */\ndeclare const a: 1;\n/** @beta */\ndeclare const b: 2;\ndeclare const c: 3;",
        );
        let mut filter = filter_by_tags(["alpha", "beta"]).unwrap();
        let once = filter.transform(input);
        let twice = filter.transform(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.statement_count(), 1);
    }

    #[test]
    fn configuration_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(
            filter_by_tags(empty).unwrap_err(),
            TransformConfigError::EmptyTagSet
        );
        assert_eq!(
            filter_by_tags(["internal", " @ "]).unwrap_err(),
            TransformConfigError::BlankTag { index: 1 }
        );
        let err: DtsError = TransformConfigError::EmptyTagSet.into();
        assert!(matches!(err, DtsError::InvalidArguments { .. }));
    }
}
