// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Chained transformers over parsed bundles.

use tugdts_ast::visitor::{
    filter_by_tags, make_transformer, synthesize_implements_imports, Directive, TreeTransformer,
};
use tugdts_ast::{parse_bundle, parse_comment, render_tree, DeclarationTree, NodeType};

fn bundle() -> DeclarationTree {
    parse_bundle(vec![
        (
            "shapes.d.ts",
            "/** @beta */\nexport declare function experimental(): void;\n\
             /** @implements {import('./base').Drawable} */\n\
             export declare class Circle {\n    /** @internal */\n    radius: number;\n    draw(): void;\n}\n",
        ),
        (
            "util.d.ts",
            "/** Utility. */\nexport declare const PI: number;\n",
        ),
    ])
    .unwrap()
}

#[test]
fn filter_then_synthesize() {
    let mut chain: Vec<Box<dyn TreeTransformer>> = vec![
        Box::new(filter_by_tags(["beta", "internal"]).unwrap()),
        Box::new(synthesize_implements_imports()),
    ];
    let mut tree = bundle();
    for transformer in chain.iter_mut() {
        tree = transformer.transform(tree);
    }
    assert_eq!(
        render_tree(&tree),
        "import type { Drawable } from './base';\n\
         /** @implements {import('./base').Drawable} */\n\
         export declare class Circle implements Drawable {\n    draw(): void;\n}\n\
         \n\
         /** Utility. */\n\
         export declare const PI: number;\n"
    );
}

#[test]
fn custom_transformer_sees_parsed_blocks() {
    let mut collect = make_transformer("collect", |ctx, names: &mut Vec<String>| {
        if let Some(block) = ctx.last_parsed() {
            names.push(format!("{}:{}", ctx.node.display_name(), block.description));
        }
        Directive::Keep
    })
    .with_node_test(|ctx| ctx.node_type() != NodeType::Parameter)
    .with_post_handler(|tree, names| {
        assert_eq!(
            names,
            vec![
                "experimental:",
                "Circle:",
                "radius:",
                "PI:Utility.",
            ]
        );
        tree
    });
    let tree = bundle();
    let out = collect.transform(tree.clone());
    assert_eq!(out, tree);
}

#[test]
fn comment_parser_is_public() {
    let block = parse_comment("/**\n * Sum.\n * @param {number} [a=1] - first\n */").unwrap();
    assert_eq!(block.description, "Sum.");
    let entry = &block.tags[0];
    assert_eq!(entry.tag, "param");
    assert_eq!(entry.name.as_deref(), Some("a"));
    assert_eq!(entry.default_value.as_deref(), Some("1"));
    assert!(entry.optional);
    assert_eq!(entry.description.as_deref(), Some("first"));
}
