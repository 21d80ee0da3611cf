// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declaration tree node types.
//!
//! # Shape
//!
//! A [`DeclarationTree`] is one or more [`SourceFile`]s. A tree with several
//! files is a *bundle*; every file owns its source text and its top-level
//! statements, and the comment ranges of its nodes index into that text.
//!
//! Every [`Node`] carries a closed [`NodeKind`] with the data specific to
//! that declaration kind, plus the generic parts shared by all kinds: name,
//! modifiers, children, span and leading comment ranges. Children are:
//!
//! - class / interface members
//! - function / method / constructor parameters
//! - namespace body statements
//!
//! Nodes are plain owned values. Transformations build new child lists
//! instead of mutating shared nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

pub use tugdts_core::types::Span;

// ============================================================================
// Node Type (discriminant)
// ============================================================================

/// Fieldless discriminant of [`NodeKind`], used for kind filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Class,
    Interface,
    Function,
    Variable,
    TypeAlias,
    Method,
    Property,
    Constructor,
    Parameter,
    Import,
    Namespace,
    Raw,
}

impl NodeType {
    /// Stable lowercase name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Class => "class",
            NodeType::Interface => "interface",
            NodeType::Function => "function",
            NodeType::Variable => "variable",
            NodeType::TypeAlias => "type_alias",
            NodeType::Method => "method",
            NodeType::Property => "property",
            NodeType::Constructor => "constructor",
            NodeType::Parameter => "parameter",
            NodeType::Import => "import",
            NodeType::Namespace => "namespace",
            NodeType::Raw => "raw",
        }
    }

    /// Parse a name produced by [`NodeType::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        let ty = match s {
            "class" => NodeType::Class,
            "interface" => NodeType::Interface,
            "function" => NodeType::Function,
            "variable" => NodeType::Variable,
            "type_alias" => NodeType::TypeAlias,
            "method" => NodeType::Method,
            "property" => NodeType::Property,
            "constructor" => NodeType::Constructor,
            "parameter" => NodeType::Parameter,
            "import" => NodeType::Import,
            "namespace" => NodeType::Namespace,
            "raw" => NodeType::Raw,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Syntax of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`, including `/** ... */` documentation comments.
    Block,
}

/// A comment preceding a node, as a range into the owning file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommentRange {
    pub span: Span,
    pub kind: CommentKind,
}

impl CommentRange {
    pub fn new(span: Span, kind: CommentKind) -> Self {
        CommentRange { span, kind }
    }
}

// ============================================================================
// Modifiers
// ============================================================================

/// `public`, `protected` or `private`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Public,
    Protected,
    Private,
}

impl Accessibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Accessibility::Public => "public",
            Accessibility::Protected => "protected",
            Accessibility::Private => "private",
        }
    }
}

/// Declaration and member modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub export: bool,
    pub default: bool,
    pub declare: bool,
    pub is_abstract: bool,
    pub is_static: bool,
    pub is_override: bool,
    pub readonly: bool,
    /// Member declared with `?`.
    pub optional: bool,
    pub accessibility: Option<Accessibility>,
}

// ============================================================================
// Heritage
// ============================================================================

/// One entry of an `extends` or `implements` clause, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeritageClause {
    /// Expression text, e.g. `Base<T>` or `ns.Base`.
    pub text: String,
}

impl HeritageClause {
    pub fn new(text: impl Into<String>) -> Self {
        HeritageClause { text: text.into() }
    }

    /// The referenced name with type arguments stripped (`Base<T>` -> `Base`).
    pub fn base_name(&self) -> &str {
        let text = self.text.trim();
        match text.find('<') {
            Some(idx) => text[..idx].trim_end(),
            None => text,
        }
    }

    /// True if [`base_name`](Self::base_name) is a dotted identifier path.
    pub fn is_resolvable(&self) -> bool {
        let name = self.base_name();
        !name.is_empty() && name.split('.').all(is_identifier)
    }
}

/// `extends` and `implements` clauses of a class or interface.
///
/// Classes carry at most one `extends` entry; interfaces may carry several
/// and never carry `implements`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heritage {
    pub extends: Vec<HeritageClause>,
    pub implements: Vec<HeritageClause>,
}

impl Heritage {
    pub fn is_empty(&self) -> bool {
        self.extends.is_empty() && self.implements.is_empty()
    }
}

/// True if `s` is a valid identifier (ASCII letters, digits, `_`, `$`, or
/// any alphabetic char; not starting with a digit).
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
}

// ============================================================================
// Kind-specific Data
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDecl {
    /// Type parameter list including brackets, e.g. `<T>`.
    pub type_params: Option<String>,
    pub heritage: Heritage,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub type_params: Option<String>,
    pub heritage: Heritage,
}

/// `get` / `set` accessor marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessor {
    Get,
    Set,
}

/// Signature data of functions, methods and constructors.
/// Parameters are the node's children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    pub type_params: Option<String>,
    pub return_type: Option<String>,
    pub accessor: Option<Accessor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKeyword {
    Const,
    Let,
    Var,
}

impl VarKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            VarKeyword::Const => "const",
            VarKeyword::Let => "let",
            VarKeyword::Var => "var",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDecl {
    pub keyword: VarKeyword,
    pub type_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAliasDecl {
    pub type_params: Option<String>,
    pub type_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDecl {
    pub type_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDecl {
    pub type_text: Option<String>,
    pub optional: bool,
    pub rest: bool,
}

/// One `name` or `name as alias` entry of a named import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
    /// `import { type X }`.
    pub type_only: bool,
}

impl ImportSpecifier {
    pub fn named(name: impl Into<String>) -> Self {
        ImportSpecifier {
            name: name.into(),
            alias: None,
            type_only: false,
        }
    }

    /// Name bound in the importing module.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDecl {
    /// `import type ...`.
    pub type_only: bool,
    pub default_binding: Option<String>,
    /// `* as ns`.
    pub namespace: Option<String>,
    pub names: Vec<ImportSpecifier>,
    /// Module specifier without quotes.
    pub module: String,
}

impl ImportDecl {
    /// True if this import binds `name` from its module under the same name.
    pub fn imports_name(&self, name: &str) -> bool {
        self.names
            .iter()
            .any(|spec| spec.name == name && spec.local_name() == name)
            || self.default_binding.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceKeyword {
    Namespace,
    Module,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub keyword: NamespaceKeyword,
    /// `declare module 'name'` (name was a string literal).
    pub quoted: bool,
}

// ============================================================================
// Node
// ============================================================================

/// Kind of a declaration node with its kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Function(Signature),
    Variable(VariableDecl),
    TypeAlias(TypeAliasDecl),
    Method(Signature),
    Property(PropertyDecl),
    Constructor(Signature),
    Parameter(ParamDecl),
    Import(ImportDecl),
    Namespace(NamespaceDecl),
    /// Statement or member kept verbatim.
    Raw(String),
}

impl NodeKind {
    pub fn node_type(&self) -> NodeType {
        match self {
            NodeKind::Class(_) => NodeType::Class,
            NodeKind::Interface(_) => NodeType::Interface,
            NodeKind::Function(_) => NodeType::Function,
            NodeKind::Variable(_) => NodeType::Variable,
            NodeKind::TypeAlias(_) => NodeType::TypeAlias,
            NodeKind::Method(_) => NodeType::Method,
            NodeKind::Property(_) => NodeType::Property,
            NodeKind::Constructor(_) => NodeType::Constructor,
            NodeKind::Parameter(_) => NodeType::Parameter,
            NodeKind::Import(_) => NodeType::Import,
            NodeKind::Namespace(_) => NodeType::Namespace,
            NodeKind::Raw(_) => NodeType::Raw,
        }
    }
}

/// A node of the declaration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub name: Option<String>,
    pub modifiers: Modifiers,
    pub children: Vec<Node>,
    pub span: Span,
    pub leading_comments: Vec<CommentRange>,
}

impl Node {
    /// Create a node with no children, no comments and an empty span.
    pub fn new(kind: NodeKind, name: Option<String>) -> Self {
        Node {
            kind,
            name,
            modifiers: Modifiers::default(),
            children: Vec::new(),
            span: Span::default(),
            leading_comments: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>, heritage: Heritage, members: Vec<Node>) -> Self {
        Node::new(
            NodeKind::Class(ClassDecl {
                type_params: None,
                heritage,
            }),
            Some(name.into()),
        )
        .with_children(members)
    }

    pub fn interface(name: impl Into<String>, extends: Vec<HeritageClause>, members: Vec<Node>) -> Self {
        Node::new(
            NodeKind::Interface(InterfaceDecl {
                type_params: None,
                heritage: Heritage {
                    extends,
                    implements: Vec::new(),
                },
            }),
            Some(name.into()),
        )
        .with_children(members)
    }

    pub fn method(name: impl Into<String>, params: Vec<Node>, return_type: Option<&str>) -> Self {
        Node::new(
            NodeKind::Method(Signature {
                return_type: return_type.map(str::to_string),
                ..Signature::default()
            }),
            Some(name.into()),
        )
        .with_children(params)
    }

    pub fn constructor(params: Vec<Node>) -> Self {
        Node::new(NodeKind::Constructor(Signature::default()), None).with_children(params)
    }

    pub fn param(name: impl Into<String>, type_text: Option<&str>) -> Self {
        Node::new(
            NodeKind::Parameter(ParamDecl {
                type_text: type_text.map(str::to_string),
                ..ParamDecl::default()
            }),
            Some(name.into()),
        )
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn node_type(&self) -> NodeType {
        self.kind.node_type()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for diagnostics: the declared name, `constructor`, or the kind.
    pub fn display_name(&self) -> &str {
        match (&self.name, &self.kind) {
            (Some(name), _) => name,
            (None, NodeKind::Constructor(_)) => "constructor",
            (None, kind) => kind.node_type().as_str(),
        }
    }

    pub fn heritage(&self) -> Option<&Heritage> {
        match &self.kind {
            NodeKind::Class(decl) => Some(&decl.heritage),
            NodeKind::Interface(decl) => Some(&decl.heritage),
            _ => None,
        }
    }

    pub fn heritage_mut(&mut self) -> Option<&mut Heritage> {
        match &mut self.kind {
            NodeKind::Class(decl) => Some(&mut decl.heritage),
            NodeKind::Interface(decl) => Some(&mut decl.heritage),
            _ => None,
        }
    }

    /// Parameter children of a function-like node, in order.
    pub fn params(&self) -> impl Iterator<Item = &Node> {
        self.children
            .iter()
            .filter(|child| child.node_type() == NodeType::Parameter)
    }

    pub fn params_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.children
            .iter_mut()
            .filter(|child| child.node_type() == NodeType::Parameter)
    }

    /// Number of declared parameters.
    pub fn arity(&self) -> usize {
        self.params().count()
    }

    /// Declared type text of a parameter node.
    pub fn param_type(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Parameter(decl) => decl.type_text.as_deref(),
            _ => None,
        }
    }

    /// Overwrite the declared type text of a parameter node.
    ///
    /// Returns `false` (and does nothing) for non-parameter nodes.
    pub fn set_param_type(&mut self, type_text: Option<String>) -> bool {
        match &mut self.kind {
            NodeKind::Parameter(decl) => {
                decl.type_text = type_text;
                true
            }
            _ => false,
        }
    }

    /// Walk this node and its descendants in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }
}

// ============================================================================
// Files and Trees
// ============================================================================

/// One declaration file: its name, its source text and its statements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub text: String,
    pub statements: Vec<Node>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>, statements: Vec<Node>) -> Self {
        SourceFile {
            name: name.into(),
            text: text.into(),
            statements,
        }
    }

    /// Top-level statement named `name`, last declaration wins.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.statements.iter().rev().find(|n| n.name() == Some(name))
    }
}

/// A single declaration file or a bundle of several.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationTree {
    pub files: Vec<SourceFile>,
}

impl DeclarationTree {
    pub fn single(file: SourceFile) -> Self {
        DeclarationTree { files: vec![file] }
    }

    pub fn bundle(files: Vec<SourceFile>) -> Self {
        DeclarationTree { files }
    }

    pub fn is_bundle(&self) -> bool {
        self.files.len() > 1
    }

    /// All top-level statements with their `(file, index)` position, in
    /// bundle order.
    pub fn top_level(&self) -> impl Iterator<Item = (usize, usize, &Node)> {
        self.files.iter().enumerate().flat_map(|(file_idx, file)| {
            file.statements
                .iter()
                .enumerate()
                .map(move |(idx, node)| (file_idx, idx, node))
        })
    }

    pub fn statement(&self, file: usize, index: usize) -> Option<&Node> {
        self.files.get(file)?.statements.get(index)
    }

    pub fn statement_mut(&mut self, file: usize, index: usize) -> Option<&mut Node> {
        self.files.get_mut(file)?.statements.get_mut(index)
    }

    /// Top-level statement named `name` anywhere in the tree.
    pub fn find(&self, name: &str) -> Option<&Node> {
        self.files.iter().rev().find_map(|f| f.find(name))
    }

    pub fn statement_count(&self) -> usize {
        self.files.iter().map(|f| f.statements.len()).sum()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_names_roundtrip() {
        for ty in [
            NodeType::Class,
            NodeType::Interface,
            NodeType::TypeAlias,
            NodeType::Constructor,
            NodeType::Raw,
        ] {
            assert_eq!(NodeType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(NodeType::parse("enum"), None);
    }

    #[test]
    fn heritage_base_name_strips_type_arguments() {
        assert_eq!(HeritageClause::new("Base<T, U>").base_name(), "Base");
        assert_eq!(HeritageClause::new(" ns.Base ").base_name(), "ns.Base");
        assert!(HeritageClause::new("ns.Base<T>").is_resolvable());
        assert!(!HeritageClause::new("mixin(Base)").is_resolvable());
        assert!(!HeritageClause::new("").is_resolvable());
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("_private$"));
        assert!(is_identifier("Ünicode"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn params_and_arity() {
        let method = Node::method(
            "foo",
            vec![Node::param("a", Some("number")), Node::param("b", None)],
            Some("void"),
        );
        assert_eq!(method.arity(), 2);
        let types: Vec<_> = method.params().map(|p| p.param_type()).collect();
        assert_eq!(types, vec![Some("number"), None]);
    }

    #[test]
    fn set_param_type_only_on_parameters() {
        let mut param = Node::param("a", Some("any"));
        assert!(param.set_param_type(Some("string".to_string())));
        assert_eq!(param.param_type(), Some("string"));

        let mut method = Node::method("m", Vec::new(), None);
        assert!(!method.set_param_type(Some("string".to_string())));
    }

    #[test]
    fn display_name_falls_back() {
        assert_eq!(Node::constructor(Vec::new()).display_name(), "constructor");
        assert_eq!(Node::method("go", Vec::new(), None).display_name(), "go");
        let raw = Node::new(NodeKind::Raw("export {};".to_string()), None);
        assert_eq!(raw.display_name(), "raw");
    }

    #[test]
    fn import_decl_imports_name() {
        let decl = ImportDecl {
            names: vec![
                ImportSpecifier::named("A"),
                ImportSpecifier {
                    name: "B".to_string(),
                    alias: Some("C".to_string()),
                    type_only: false,
                },
            ],
            module: "./m".to_string(),
            ..ImportDecl::default()
        };
        assert!(decl.imports_name("A"));
        assert!(!decl.imports_name("B"));
        assert!(!decl.imports_name("C"));
    }

    #[test]
    fn tree_top_level_positions_and_find() {
        let a = SourceFile::new(
            "a.d.ts",
            "",
            vec![Node::class("A", Heritage::default(), Vec::new())],
        );
        let b = SourceFile::new(
            "b.d.ts",
            "",
            vec![
                Node::interface("I", Vec::new(), Vec::new()),
                Node::class("B", Heritage::default(), Vec::new()),
            ],
        );
        let tree = DeclarationTree::bundle(vec![a, b]);
        assert!(tree.is_bundle());
        let positions: Vec<_> = tree
            .top_level()
            .map(|(f, i, n)| (f, i, n.display_name().to_string()))
            .collect();
        assert_eq!(
            positions,
            vec![
                (0, 0, "A".to_string()),
                (1, 0, "I".to_string()),
                (1, 1, "B".to_string())
            ]
        );
        assert_eq!(tree.find("I").map(|n| n.node_type()), Some(NodeType::Interface));
        assert_eq!(tree.statement_count(), 3);
    }
}
