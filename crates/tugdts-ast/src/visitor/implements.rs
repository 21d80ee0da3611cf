// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Turn `@implements {import('mod').Name}` tags into real heritage.
//!
//! A class documented with
//!
//! ```text
//! /** @implements {import('./shapes').Shape} */
//! export declare class Circle { ... }
//! ```
//!
//! is rewritten to `class Circle implements Shape`, and a matching
//! `import type { Shape } from './shapes';` is added at the top of the
//! first file.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::nodes::{
    DeclarationTree, HeritageClause, ImportDecl, ImportSpecifier, Node, NodeKind, NodeType,
};
use crate::visitor::meta::{make_transformer, MetaTransformer};
use crate::visitor::traits::Directive;

/// `import('module').Identifier[.Qualifier]`
static IMPORT_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"import\(\s*(?:'([^']*)'|"([^"]*)")\s*\)\.([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)?)"#,
    )
    .expect("import type pattern is valid")
});

/// Modules and identifiers collected during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImplementsImports {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl ImplementsImports {
    pub fn record(&mut self, module: &str, identifier: &str) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(identifier.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Module to identifiers, both sorted.
    pub fn modules(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.modules
    }

    /// Type-only import statements for everything recorded, sorted by
    /// module then identifier, skipping identifiers `existing` already
    /// imports from the same module.
    pub fn import_statements(&self, existing: &[Node]) -> Vec<Node> {
        let imported: Vec<&ImportDecl> = existing
            .iter()
            .filter_map(|node| match &node.kind {
                NodeKind::Import(decl) => Some(decl),
                _ => None,
            })
            .collect();

        self.modules
            .iter()
            .filter_map(|(module, identifiers)| {
                let names: Vec<ImportSpecifier> = identifiers
                    .iter()
                    .filter(|ident| {
                        !imported
                            .iter()
                            .any(|decl| decl.module == *module && decl.imports_name(ident))
                    })
                    .map(|ident| ImportSpecifier::named(ident.as_str()))
                    .collect();
                if names.is_empty() {
                    return None;
                }
                Some(Node::new(
                    NodeKind::Import(ImportDecl {
                        type_only: true,
                        names,
                        module: module.clone(),
                        ..ImportDecl::default()
                    }),
                    None,
                ))
            })
            .collect()
    }

    /// Prepend the import statements to the first file of `tree`.
    pub fn prepend_to(&self, tree: &mut DeclarationTree) {
        let Some(file) = tree.files.first_mut() else {
            return;
        };
        let mut statements = self.import_statements(&file.statements);
        if statements.is_empty() {
            return;
        }
        statements.append(&mut file.statements);
        file.statements = statements;
    }
}

/// `(module, qualified name)` for every import type reference in `text`.
pub fn import_type_references(text: &str) -> Vec<(String, String)> {
    IMPORT_TYPE
        .captures_iter(text)
        .filter_map(|caps| {
            let module = caps.get(1).or_else(|| caps.get(2))?.as_str();
            let qualified = caps.get(3)?.as_str();
            Some((module.to_string(), qualified.to_string()))
        })
        .collect()
}

/// Build the `@implements` import synthesizer.
pub fn synthesize_implements_imports() -> MetaTransformer<ImplementsImports> {
    make_transformer("implements-imports", |ctx, imports: &mut ImplementsImports| {
        let Some(block) = ctx.last_parsed() else {
            return Directive::Keep;
        };

        let mut names: Vec<String> = Vec::new();
        for entry in block.tags_named("implements") {
            let Some(type_expr) = entry.type_expr.as_deref() else {
                continue;
            };
            for (module, qualified) in import_type_references(type_expr) {
                let top_level = qualified.split('.').next().unwrap_or(&qualified);
                imports.record(&module, top_level);
                if !names.contains(&qualified) {
                    names.push(qualified);
                }
            }
        }
        if names.is_empty() {
            return Directive::Keep;
        }

        let mut node = ctx.node.clone();
        match node.heritage_mut() {
            Some(heritage) => {
                heritage.implements = names.into_iter().map(HeritageClause::new).collect();
                Directive::Replace(node)
            }
            None => Directive::Keep,
        }
    })
    .with_node_test(|ctx| ctx.node_type() == NodeType::Class)
    .with_post_handler(|mut tree, imports| {
        imports.prepend_to(&mut tree);
        tree
    })
}
