// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Rendering declaration trees back to source text.
//!
//! Output is canonical rather than a byte-for-byte round trip: four-space
//! indentation, one declaration per line, every member terminated by `;`.
//! Type texts, raw statements and leading comments are copied verbatim from
//! the owning file, with comment continuation lines re-indented to the new
//! nesting level.

use std::fmt;

use crate::nodes::{
    Accessor, CommentKind, DeclarationTree, ImportDecl, Modifiers, NamespaceKeyword, Node,
    NodeKind, Signature, SourceFile,
};

/// Output buffer with an indentation stack.
#[derive(Debug)]
pub struct CodegenState<'a> {
    pub default_newline: &'a str,
    pub default_indent: &'a str,
    pub indent_tokens: Vec<&'a str>,
    pub tokens: String,
    /// Text of the file being rendered; comment ranges index into it.
    pub source: &'a str,
}

impl Default for CodegenState<'_> {
    fn default() -> Self {
        CodegenState {
            default_newline: "\n",
            default_indent: "    ",
            indent_tokens: Vec::new(),
            tokens: String::new(),
            source: "",
        }
    }
}

impl<'a> CodegenState<'a> {
    pub fn indent(&mut self) {
        self.indent_tokens.push(self.default_indent);
    }

    pub fn dedent(&mut self) {
        self.indent_tokens.pop();
    }

    pub fn add_indent(&mut self) {
        for token in &self.indent_tokens {
            self.tokens.push_str(token);
        }
    }

    pub fn add_token(&mut self, token: &str) {
        self.tokens.push_str(token);
    }

    pub fn add_newline(&mut self) {
        self.tokens.push_str(self.default_newline);
    }

    fn current_indent(&self) -> String {
        self.indent_tokens.concat()
    }
}

impl fmt::Display for CodegenState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens)
    }
}

pub trait Codegen<'a> {
    fn codegen(&'a self, state: &mut CodegenState<'a>);
}

/// Render one file.
pub fn render_file(file: &SourceFile) -> String {
    let mut state = CodegenState::default();
    file.codegen(&mut state);
    state.to_string()
}

/// Render every file of a tree, separated by a blank line.
pub fn render_tree(tree: &DeclarationTree) -> String {
    tree.files
        .iter()
        .map(render_file)
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'a> Codegen<'a> for SourceFile {
    fn codegen(&'a self, state: &mut CodegenState<'a>) {
        state.source = &self.text;
        for statement in &self.statements {
            statement.codegen(state);
        }
    }
}

impl<'a> Codegen<'a> for Node {
    fn codegen(&'a self, state: &mut CodegenState<'a>) {
        emit_comments(self, state);
        state.add_indent();
        match &self.kind {
            NodeKind::Class(decl) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token("class");
                emit_opt_name(self, state);
                emit_opt(state, "", decl.type_params.as_deref());
                let heritage = &decl.heritage;
                if !heritage.extends.is_empty() {
                    state.add_token(" extends ");
                    emit_list(state, heritage.extends.iter().map(|c| c.text.as_str()));
                }
                if !heritage.implements.is_empty() {
                    state.add_token(" implements ");
                    emit_list(state, heritage.implements.iter().map(|c| c.text.as_str()));
                }
                emit_body(&self.children, state);
            }
            NodeKind::Interface(decl) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token("interface");
                emit_opt_name(self, state);
                emit_opt(state, "", decl.type_params.as_deref());
                if !decl.heritage.extends.is_empty() {
                    state.add_token(" extends ");
                    emit_list(state, decl.heritage.extends.iter().map(|c| c.text.as_str()));
                }
                emit_body(&self.children, state);
            }
            NodeKind::Function(signature) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token("function");
                emit_opt_name(self, state);
                emit_signature(signature, &self.children, state);
                state.add_token(";");
            }
            NodeKind::Method(signature) => {
                emit_modifiers(&self.modifiers, state);
                match signature.accessor {
                    Some(Accessor::Get) => state.add_token("get "),
                    Some(Accessor::Set) => state.add_token("set "),
                    None => {}
                }
                state.add_token(self.display_name());
                if self.modifiers.optional {
                    state.add_token("?");
                }
                emit_signature(signature, &self.children, state);
                state.add_token(";");
            }
            NodeKind::Constructor(signature) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token("constructor");
                emit_signature(signature, &self.children, state);
                state.add_token(";");
            }
            NodeKind::Property(decl) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token(self.display_name());
                if self.modifiers.optional {
                    state.add_token("?");
                }
                emit_opt(state, ": ", decl.type_text.as_deref());
                state.add_token(";");
            }
            NodeKind::Parameter(_) => emit_param(self, state),
            NodeKind::Variable(decl) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token(decl.keyword.as_str());
                emit_opt_name(self, state);
                emit_opt(state, ": ", decl.type_text.as_deref());
                state.add_token(";");
            }
            NodeKind::TypeAlias(decl) => {
                emit_modifiers(&self.modifiers, state);
                state.add_token("type");
                emit_opt_name(self, state);
                emit_opt(state, "", decl.type_params.as_deref());
                state.add_token(" = ");
                state.add_token(&decl.type_text);
                state.add_token(";");
            }
            NodeKind::Import(decl) => emit_import(decl, state),
            NodeKind::Namespace(decl) => {
                emit_modifiers(&self.modifiers, state);
                match decl.keyword {
                    NamespaceKeyword::Namespace => state.add_token("namespace"),
                    NamespaceKeyword::Module => state.add_token("module"),
                    NamespaceKeyword::Global => state.add_token("global"),
                }
                if decl.keyword != NamespaceKeyword::Global {
                    emit_opt_name(self, state);
                }
                emit_body(&self.children, state);
            }
            NodeKind::Raw(text) => state.add_token(text),
        }
        state.add_newline();
    }
}

fn emit_comments<'a>(node: &'a Node, state: &mut CodegenState<'a>) {
    let indent = state.current_indent();
    for range in &node.leading_comments {
        let Some(text) = range.span.slice(state.source) else {
            continue;
        };
        state.add_indent();
        match range.kind {
            CommentKind::Line => state.add_token(text.trim_end()),
            CommentKind::Block => {
                let mut lines = text.lines();
                if let Some(first) = lines.next() {
                    state.add_token(first.trim_end());
                }
                for line in lines {
                    state.add_newline();
                    let line = line.trim();
                    state.add_token(&indent);
                    if line.starts_with('*') {
                        state.add_token(" ");
                    }
                    state.add_token(line);
                }
            }
        }
        state.add_newline();
    }
}

fn emit_modifiers(modifiers: &Modifiers, state: &mut CodegenState<'_>) {
    if modifiers.export {
        state.add_token("export ");
    }
    if modifiers.default {
        state.add_token("default ");
    }
    if modifiers.declare {
        state.add_token("declare ");
    }
    if let Some(accessibility) = modifiers.accessibility {
        state.add_token(accessibility.as_str());
        state.add_token(" ");
    }
    if modifiers.is_static {
        state.add_token("static ");
    }
    if modifiers.is_abstract {
        state.add_token("abstract ");
    }
    if modifiers.is_override {
        state.add_token("override ");
    }
    if modifiers.readonly {
        state.add_token("readonly ");
    }
}

fn emit_opt_name(node: &Node, state: &mut CodegenState<'_>) {
    if let Some(name) = node.name() {
        state.add_token(" ");
        state.add_token(name);
    }
}

fn emit_opt(state: &mut CodegenState<'_>, prefix: &str, text: Option<&str>) {
    if let Some(text) = text {
        state.add_token(prefix);
        state.add_token(text);
    }
}

fn emit_list<'t>(state: &mut CodegenState<'_>, items: impl Iterator<Item = &'t str>) {
    for (idx, item) in items.enumerate() {
        if idx > 0 {
            state.add_token(", ");
        }
        state.add_token(item);
    }
}

fn emit_body<'a>(children: &'a [Node], state: &mut CodegenState<'a>) {
    state.add_token(" {");
    state.add_newline();
    state.indent();
    for child in children {
        child.codegen(state);
    }
    state.dedent();
    state.add_indent();
    state.add_token("}");
}

fn emit_signature(signature: &Signature, params: &[Node], state: &mut CodegenState<'_>) {
    emit_opt(state, "", signature.type_params.as_deref());
    state.add_token("(");
    for (idx, param) in params.iter().enumerate() {
        if idx > 0 {
            state.add_token(", ");
        }
        emit_param(param, state);
    }
    state.add_token(")");
    emit_opt(state, ": ", signature.return_type.as_deref());
}

fn emit_param(param: &Node, state: &mut CodegenState<'_>) {
    let NodeKind::Parameter(decl) = &param.kind else {
        if let NodeKind::Raw(text) = &param.kind {
            state.add_token(text);
        }
        return;
    };
    emit_modifiers(&param.modifiers, state);
    if decl.rest {
        state.add_token("...");
    }
    state.add_token(param.display_name());
    if decl.optional {
        state.add_token("?");
    }
    emit_opt(state, ": ", decl.type_text.as_deref());
}

fn emit_import(decl: &ImportDecl, state: &mut CodegenState<'_>) {
    state.add_token("import ");
    if decl.default_binding.is_none() && decl.namespace.is_none() && decl.names.is_empty() {
        state.add_token(&format!("'{}';", decl.module));
        return;
    }
    if decl.type_only {
        state.add_token("type ");
    }
    let mut clauses = Vec::new();
    if let Some(binding) = &decl.default_binding {
        clauses.push(binding.clone());
    }
    if let Some(namespace) = &decl.namespace {
        clauses.push(format!("* as {}", namespace));
    }
    if !decl.names.is_empty() {
        let names: Vec<String> = decl
            .names
            .iter()
            .map(|spec| {
                let mut text = String::new();
                if spec.type_only {
                    text.push_str("type ");
                }
                text.push_str(&spec.name);
                if let Some(alias) = &spec.alias {
                    text.push_str(" as ");
                    text.push_str(alias);
                }
                text
            })
            .collect();
        clauses.push(format!("{{ {} }}", names.join(", ")));
    }
    state.add_token(&clauses.join(", "));
    state.add_token(&format!(" from '{}';", decl.module));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Heritage, HeritageClause, ImportSpecifier};
    use crate::parser::parse_source;

    fn roundtrip(text: &str) -> String {
        render_file(&parse_source("t.d.ts", text).unwrap())
    }

    #[test]
    fn class_layout() {
        let out = roundtrip(
            "export declare class Dog extends Animal implements Pet {\n  private name: string\n  constructor(name: string)\n  bark(times?: number): void\n}",
        );
        assert_eq!(
            out,
            "export declare class Dog extends Animal implements Pet {\n    private name: string;\n    constructor(name: string);\n    bark(times?: number): void;\n}\n"
        );
    }

    #[test]
    fn empty_class_body() {
        assert_eq!(roundtrip("declare class A {}"), "declare class A {\n}\n");
    }

    #[test]
    fn comments_are_reindented() {
        let out = roundtrip(
            "declare namespace N {\n/**\n     * Deep doc.\n     * @internal\n     */\nfunction f(): void;\n}",
        );
        assert_eq!(
            out,
            "declare namespace N {\n    /**\n     * Deep doc.\n     * @internal\n     */\n    function f(): void;\n}\n"
        );
    }

    #[test]
    fn statements_and_imports() {
        let out = roundtrip(
            "import { A, type B as C } from \"./ab\";\nimport * as ns from './ns';\nexport type T<X> = X | null;\nexport declare const v: number;\nexport { A };",
        );
        assert_eq!(
            out,
            "import { A, type B as C } from './ab';\nimport * as ns from './ns';\nexport type T<X> = X | null;\nexport declare const v: number;\nexport { A };\n"
        );
    }

    #[test]
    fn accessors_and_rest_params() {
        let out = roundtrip(
            "declare class A {\n    static get size(): number;\n    log(...args: any[]): void;\n    protected readonly x?: string;\n}",
        );
        assert_eq!(
            out,
            "declare class A {\n    static get size(): number;\n    log(...args: any[]): void;\n    protected readonly x?: string;\n}\n"
        );
    }

    #[test]
    fn synthesized_nodes_render() {
        let import = Node::new(
            NodeKind::Import(ImportDecl {
                type_only: true,
                names: vec![ImportSpecifier::named("X"), ImportSpecifier::named("Y")],
                module: "./m".to_string(),
                ..ImportDecl::default()
            }),
            None,
        );
        let class = Node::class(
            "C",
            Heritage {
                extends: Vec::new(),
                implements: vec![HeritageClause::new("X.Inner")],
            },
            vec![Node::method("run", vec![Node::param("a", Some("number"))], Some("void"))],
        );
        let file = SourceFile::new("out.d.ts", "", vec![import, class]);
        assert_eq!(
            render_file(&file),
            "import type { X, Y } from './m';\nclass C implements X.Inner {\n    run(a: number): void;\n}\n"
        );
    }

    #[test]
    fn bundle_files_separated_by_blank_line() {
        let tree = DeclarationTree::bundle(vec![
            parse_source("a.d.ts", "declare const a: 1;").unwrap(),
            parse_source("b.d.ts", "declare const b: 2;").unwrap(),
        ]);
        assert_eq!(
            render_tree(&tree),
            "declare const a: 1;\n\ndeclare const b: 2;\n"
        );
    }
}
