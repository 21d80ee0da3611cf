// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recursive descent parser for TypeScript declaration files.
//!
//! The parser understands the declaration forms the transformers operate
//! on: classes, interfaces, functions, variables, type aliases, imports and
//! namespaces, with their members and parameters. Type expressions are not
//! modelled; they are captured verbatim as source text.
//!
//! Statements and members it does not model (enums, export lists,
//! `import x = require(..)`, index and call signatures, multi-declarator
//! variables, ...) are kept as [`NodeKind::Raw`] with their exact text, so
//! they survive a parse and print cycle unchanged.
//!
//! Semicolons may be omitted where a line break ends the declaration.

use crate::errors::ParseError;
use crate::nodes::{
    Accessibility, Accessor, ClassDecl, CommentRange, DeclarationTree, Heritage, HeritageClause,
    ImportDecl, ImportSpecifier, InterfaceDecl, Modifiers, NamespaceDecl, NamespaceKeyword, Node,
    NodeKind, ParamDecl, PropertyDecl, Signature, SourceFile, Span, TypeAliasDecl, VarKeyword,
    VariableDecl,
};
use crate::tokenizer::{tokenize, TokKind, Token};

type PResult<T> = Result<T, ParseError>;

/// Parse one declaration file.
pub fn parse_source(name: impl Into<String>, text: impl Into<String>) -> PResult<SourceFile> {
    let name = name.into();
    let text = text.into();
    let statements = {
        let mut parser = Parser::new(&name, &text)?;
        parser.parse_statements(false)?
    };
    Ok(SourceFile::new(name, text, statements))
}

/// Parse several files into a bundle, keeping their order.
pub fn parse_bundle<I, N, T>(files: I) -> PResult<DeclarationTree>
where
    I: IntoIterator<Item = (N, T)>,
    N: Into<String>,
    T: Into<String>,
{
    let files = files
        .into_iter()
        .map(|(name, text)| parse_source(name, text))
        .collect::<PResult<Vec<_>>>()?;
    Ok(DeclarationTree::bundle(files))
}

/// Keywords that begin a new statement after a line break.
const STATEMENT_KEYWORDS: &[&str] = &[
    "export",
    "declare",
    "class",
    "interface",
    "function",
    "const",
    "let",
    "var",
    "type",
    "namespace",
    "module",
    "import",
    "enum",
    "abstract",
    "global",
];

/// Identifiers after which a type expression continues on the next line.
const TYPE_CONTINUATION_WORDS: &[&str] = &[
    "extends", "keyof", "typeof", "is", "infer", "readonly", "new", "unique", "asserts",
];

/// Identifiers that continue a type expression when they start a line.
const TYPE_CONTINUING_WORDS: &[&str] = &["extends", "is", "as"];

struct Parser<'a> {
    file: &'a str,
    text: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(file: &'a str, text: &'a str) -> PResult<Self> {
        let tokens =
            tokenize(text).map_err(|err| ParseError::from_tok_error(file, text, &err))?;
        Ok(Parser {
            file,
            text,
            tokens,
            pos: 0,
        })
    }

    // ------------------------------------------------------------------
    // Token access
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token<'a> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token<'a> {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokKind::Eof
    }

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    /// Text of the current token, then advance.
    fn bump_text(&mut self) -> &'a str {
        let text = self.peek().text;
        self.bump();
        text
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek().is_punct(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.peek().is_ident(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, c: char) -> PResult<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected `{}`", c)))
        }
    }

    fn expect_ident(&mut self, word: &str) -> PResult<()> {
        if self.eat_ident(word) {
            Ok(())
        } else {
            Err(self.error_here(&format!("expected `{}`", word)))
        }
    }

    fn expect_name(&mut self, what: &str) -> PResult<String> {
        if self.peek().kind == TokKind::Ident {
            Ok(self.bump_text().to_string())
        } else {
            Err(self.error_here(&format!("expected {}", what)))
        }
    }

    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(idx) => self.tokens[idx].span.end,
            None => 0,
        }
    }

    fn start_offset(&self) -> usize {
        self.peek().span.start
    }

    fn slice_from(&self, start: usize) -> &'a str {
        let end = self.prev_end().max(start);
        &self.text[start..end]
    }

    fn leading_comments(&self) -> Vec<CommentRange> {
        self.peek().comments.clone()
    }

    fn error_here(&self, message: &str) -> ParseError {
        let tok = self.peek();
        let found = match tok.kind {
            TokKind::Eof => "end of input".to_string(),
            _ => format!("`{}`", tok.text),
        };
        ParseError::new(
            self.file,
            self.text,
            tok.span,
            format!("{}, found {}", message, found),
        )
    }

    fn finish(&self, mut node: Node, start: usize, comments: Vec<CommentRange>) -> Node {
        node.span = Span::new(start, self.prev_end().max(start));
        node.leading_comments = comments;
        node
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statements(&mut self, in_block: bool) -> PResult<Vec<Node>> {
        let mut statements = Vec::new();
        loop {
            if self.at_eof() {
                if in_block {
                    return Err(self.error_here("expected `}`"));
                }
                break;
            }
            if in_block && self.peek().is_punct('}') {
                break;
            }
            if self.eat_punct(';') {
                continue;
            }
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> PResult<Node> {
        let checkpoint = self.pos;
        let comments = self.leading_comments();
        let start = self.start_offset();

        let mut modifiers = Modifiers::default();
        loop {
            let next_is_word = self.peek_nth(1).kind == TokKind::Ident;
            let tok = self.peek();
            if tok.is_ident("export") && !modifiers.export {
                modifiers.export = true;
            } else if tok.is_ident("default") && modifiers.export && !modifiers.default {
                modifiers.default = true;
            } else if tok.is_ident("declare") && next_is_word && !modifiers.declare {
                modifiers.declare = true;
            } else if tok.is_ident("abstract") && self.peek_nth(1).is_ident("class") {
                modifiers.is_abstract = true;
            } else {
                break;
            }
            self.bump();
        }

        let keyword = match self.peek().kind {
            TokKind::Ident => self.peek().text,
            _ => "",
        };
        let next_kind = self.peek_nth(1).kind;
        let next_is_enum = self.peek_nth(1).is_ident("enum");
        let parsed = match keyword {
            "class" => Some(self.parse_class()?),
            "interface" if next_kind == TokKind::Ident => Some(self.parse_interface()?),
            "function" => Some(self.parse_function()?),
            "const" if next_is_enum => None,
            "const" | "let" | "var" if next_kind == TokKind::Ident => self.parse_variable()?,
            "type" if next_kind == TokKind::Ident => self.parse_type_alias()?,
            "namespace" | "module" if matches!(next_kind, TokKind::Ident | TokKind::String) => {
                self.parse_namespace()?
            }
            "global" if next_kind == TokKind::Punct('{') => self.parse_namespace()?,
            "import" if modifiers == Modifiers::default() => self.parse_import()?,
            _ => None,
        };

        match parsed {
            Some(mut node) => {
                node.modifiers = Modifiers {
                    is_abstract: modifiers.is_abstract || node.modifiers.is_abstract,
                    ..modifiers
                };
                Ok(self.finish(node, start, comments))
            }
            None => {
                self.pos = checkpoint;
                self.parse_raw_statement(start, comments)
            }
        }
    }

    fn end_statement(&mut self) -> PResult<()> {
        if self.eat_punct(';') {
            return Ok(());
        }
        let tok = self.peek();
        if tok.kind == TokKind::Eof || tok.is_punct('}') || tok.newline_before {
            Ok(())
        } else {
            Err(self.error_here("expected `;`"))
        }
    }

    fn parse_raw_statement(&mut self, start: usize, comments: Vec<CommentRange>) -> PResult<Node> {
        let mut depth = 0usize;
        let mut consumed = 0usize;
        loop {
            let tok = self.peek();
            let kind = tok.kind;
            if kind == TokKind::Eof {
                if depth > 0 {
                    return Err(self.error_here("unbalanced brackets"));
                }
                break;
            }
            if depth == 0 && consumed > 0 && tok.newline_before && starts_statement(tok) {
                break;
            }
            match kind {
                TokKind::Punct('{') | TokKind::Punct('(') | TokKind::Punct('[') => depth += 1,
                TokKind::Punct(c @ ('}' | ')' | ']')) => {
                    if depth == 0 {
                        if consumed == 0 {
                            return Err(self.error_here("unexpected closing bracket"));
                        }
                        break;
                    }
                    depth -= 1;
                    self.bump();
                    consumed += 1;
                    if depth == 0 && c == '}' {
                        if self.eat_punct(';') {
                            break;
                        }
                        let next = self.peek();
                        if next.newline_before || next.kind == TokKind::Eof || next.is_punct('}') {
                            break;
                        }
                    }
                    continue;
                }
                TokKind::Punct(';') if depth == 0 => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            self.bump();
            consumed += 1;
        }

        let text = self.slice_from(start).to_string();
        let node = Node::new(NodeKind::Raw(text), None);
        Ok(self.finish(node, start, comments))
    }

    fn parse_class(&mut self) -> PResult<Node> {
        self.expect_ident("class")?;
        let tok = self.peek();
        let has_name =
            tok.kind == TokKind::Ident && !tok.is_ident("extends") && !tok.is_ident("implements");
        let name = if has_name {
            Some(self.bump_text().to_string())
        } else {
            None
        };
        let type_params = self.parse_type_params()?;

        let mut heritage = Heritage::default();
        loop {
            if self.eat_ident("extends") {
                heritage.extends = self.parse_heritage_list()?;
            } else if self.eat_ident("implements") {
                heritage.implements = self.parse_heritage_list()?;
            } else {
                break;
            }
        }

        let members = self.parse_members()?;
        self.eat_punct(';');
        Ok(Node::new(
            NodeKind::Class(ClassDecl {
                type_params,
                heritage,
            }),
            name,
        )
        .with_children(members))
    }

    fn parse_interface(&mut self) -> PResult<Node> {
        self.expect_ident("interface")?;
        let name = self.expect_name("interface name")?;
        let type_params = self.parse_type_params()?;
        let extends = if self.eat_ident("extends") {
            self.parse_heritage_list()?
        } else {
            Vec::new()
        };
        let members = self.parse_members()?;
        self.eat_punct(';');
        Ok(Node::new(
            NodeKind::Interface(InterfaceDecl {
                type_params,
                heritage: Heritage {
                    extends,
                    implements: Vec::new(),
                },
            }),
            Some(name),
        )
        .with_children(members))
    }

    fn parse_heritage_list(&mut self) -> PResult<Vec<HeritageClause>> {
        let mut clauses = Vec::new();
        loop {
            let text = self.capture_type(|tok| {
                tok.is_punct(',')
                    || tok.is_punct('{')
                    || tok.is_ident("implements")
                    || tok.is_ident("extends")
            })?;
            match text {
                Some(text) => clauses.push(HeritageClause::new(text)),
                None => return Err(self.error_here("expected a type reference")),
            }
            if !self.eat_punct(',') {
                break;
            }
        }
        Ok(clauses)
    }

    fn parse_function(&mut self) -> PResult<Node> {
        self.expect_ident("function")?;
        let name = if self.peek().kind == TokKind::Ident {
            Some(self.bump_text().to_string())
        } else {
            None
        };
        let (signature, params) = self.parse_signature()?;
        self.end_statement()?;
        Ok(Node::new(NodeKind::Function(signature), name).with_children(params))
    }

    fn parse_variable(&mut self) -> PResult<Option<Node>> {
        let keyword = match self.bump_text() {
            "const" => VarKeyword::Const,
            "let" => VarKeyword::Let,
            _ => VarKeyword::Var,
        };
        let name = self.expect_name("variable name")?;
        let type_text = if self.eat_punct(':') {
            self.capture_type(|tok| tok.is_punct(';') || tok.is_punct(',') || tok.is_punct('='))?
        } else {
            None
        };
        if self.peek().is_punct(',') || self.peek().is_punct('=') {
            return Ok(None);
        }
        self.end_statement()?;
        Ok(Some(Node::new(
            NodeKind::Variable(VariableDecl { keyword, type_text }),
            Some(name),
        )))
    }

    fn parse_type_alias(&mut self) -> PResult<Option<Node>> {
        self.expect_ident("type")?;
        let name = self.expect_name("type name")?;
        let type_params = self.parse_type_params()?;
        if !self.eat_punct('=') {
            return Ok(None);
        }
        let type_text = match self.capture_type(|tok| tok.is_punct(';'))? {
            Some(text) => text,
            None => return Err(self.error_here("expected a type")),
        };
        self.end_statement()?;
        Ok(Some(Node::new(
            NodeKind::TypeAlias(TypeAliasDecl {
                type_params,
                type_text,
            }),
            Some(name),
        )))
    }

    fn parse_namespace(&mut self) -> PResult<Option<Node>> {
        let (keyword, name, quoted) = match self.bump_text() {
            "global" => (NamespaceKeyword::Global, None, false),
            word => {
                let keyword = if word == "module" {
                    NamespaceKeyword::Module
                } else {
                    NamespaceKeyword::Namespace
                };
                if self.peek().kind == TokKind::String {
                    (keyword, Some(self.bump_text().to_string()), true)
                } else {
                    let mut name = self.expect_name("namespace name")?;
                    while self.eat_punct('.') {
                        name.push('.');
                        name.push_str(&self.expect_name("namespace name")?);
                    }
                    (keyword, Some(name), false)
                }
            }
        };
        if !self.peek().is_punct('{') {
            return Ok(None);
        }
        self.bump();
        let statements = self.parse_statements(true)?;
        self.expect_punct('}')?;
        Ok(Some(
            Node::new(NodeKind::Namespace(NamespaceDecl { keyword, quoted }), name)
                .with_children(statements),
        ))
    }

    fn parse_import(&mut self) -> PResult<Option<Node>> {
        self.expect_ident("import")?;
        let mut decl = ImportDecl::default();

        if self.peek().kind == TokKind::String {
            decl.module = unquote(self.bump_text());
            self.end_statement()?;
            return Ok(Some(Node::new(NodeKind::Import(decl), None)));
        }

        let after_type = self.peek_nth(1);
        if self.peek().is_ident("type")
            && (after_type.is_punct('{')
                || after_type.is_punct('*')
                || (after_type.kind == TokKind::Ident && !after_type.is_ident("from")))
        {
            decl.type_only = true;
            self.bump();
        }

        let mut needs_clause = true;
        if self.peek().kind == TokKind::Ident && !self.peek().is_ident("from") {
            decl.default_binding = Some(self.bump_text().to_string());
            if self.peek().is_punct('=') {
                return Ok(None);
            }
            needs_clause = self.eat_punct(',');
        }

        if needs_clause {
            if self.eat_punct('*') {
                self.expect_ident("as")?;
                decl.namespace = Some(self.expect_name("namespace binding")?);
            } else if self.eat_punct('{') {
                decl.names = self.parse_import_specifiers()?;
            } else {
                return Err(self.error_here("expected import clause"));
            }
        }

        self.expect_ident("from")?;
        if self.peek().kind != TokKind::String {
            return Err(self.error_here("expected module specifier"));
        }
        decl.module = unquote(self.bump_text());
        if !self.peek().is_punct(';')
            && !self.peek().newline_before
            && self.peek().kind != TokKind::Eof
            && !self.peek().is_punct('}')
        {
            return Ok(None);
        }
        self.end_statement()?;
        Ok(Some(Node::new(NodeKind::Import(decl), None)))
    }

    fn parse_import_specifiers(&mut self) -> PResult<Vec<ImportSpecifier>> {
        let mut names = Vec::new();
        loop {
            if self.eat_punct('}') {
                break;
            }
            let after = self.peek_nth(1);
            let type_only = self.peek().is_ident("type")
                && after.kind == TokKind::Ident
                && !after.is_ident("as");
            if type_only {
                self.bump();
            }
            let name = self.expect_name("imported name")?;
            let alias = if self.eat_ident("as") {
                Some(self.expect_name("import alias")?)
            } else {
                None
            };
            names.push(ImportSpecifier {
                name,
                alias,
                type_only,
            });
            if !self.eat_punct(',') {
                self.expect_punct('}')?;
                break;
            }
        }
        Ok(names)
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn parse_members(&mut self) -> PResult<Vec<Node>> {
        self.expect_punct('{')?;
        let mut members = Vec::new();
        loop {
            if self.eat_punct('}') {
                break;
            }
            if self.at_eof() {
                return Err(self.error_here("expected `}`"));
            }
            if self.eat_punct(';') || self.eat_punct(',') {
                continue;
            }
            members.push(self.parse_member()?);
        }
        Ok(members)
    }

    fn parse_member(&mut self) -> PResult<Node> {
        let checkpoint = self.pos;
        let comments = self.leading_comments();
        let start = self.start_offset();

        let mut modifiers = Modifiers::default();
        loop {
            let next = self.peek_nth(1);
            if !starts_property_name(next) || next.newline_before {
                break;
            }
            match self.peek().text {
                "public" => modifiers.accessibility = Some(Accessibility::Public),
                "protected" => modifiers.accessibility = Some(Accessibility::Protected),
                "private" => modifiers.accessibility = Some(Accessibility::Private),
                "static" => modifiers.is_static = true,
                "abstract" => modifiers.is_abstract = true,
                "readonly" => modifiers.readonly = true,
                "override" => modifiers.is_override = true,
                "declare" => modifiers.declare = true,
                _ => break,
            }
            self.bump();
        }

        let mut accessor = None;
        let next = self.peek_nth(1);
        if starts_property_name(next) && !next.newline_before {
            if self.peek().is_ident("get") {
                accessor = Some(Accessor::Get);
            } else if self.peek().is_ident("set") {
                accessor = Some(Accessor::Set);
            }
            if accessor.is_some() {
                self.bump();
            }
        }

        let parsed = if accessor.is_none()
            && self.peek().is_ident("constructor")
            && self.peek_nth(1).is_punct('(')
        {
            self.bump();
            let (signature, params) = self.parse_signature()?;
            Some(Node::new(NodeKind::Constructor(signature), None).with_children(params))
        } else if starts_property_name(self.peek()) {
            let name = self.bump_text().to_string();
            modifiers.optional = self.eat_punct('?');
            if !modifiers.optional {
                self.eat_punct('!');
            }
            if self.peek().is_punct('(') || self.peek().is_punct('<') {
                let (mut signature, params) = self.parse_signature()?;
                signature.accessor = accessor;
                Some(Node::new(NodeKind::Method(signature), Some(name)).with_children(params))
            } else if accessor.is_some() {
                None
            } else if self.eat_punct(':') {
                let type_text =
                    self.capture_type(|tok| tok.is_punct(';') || tok.is_punct(','))?;
                if type_text.is_none() {
                    return Err(self.error_here("expected a type"));
                }
                Some(Node::new(
                    NodeKind::Property(PropertyDecl { type_text }),
                    Some(name),
                ))
            } else if self.at_member_end() {
                Some(Node::new(
                    NodeKind::Property(PropertyDecl::default()),
                    Some(name),
                ))
            } else {
                None
            }
        } else {
            None
        };

        match parsed {
            Some(node) if self.at_member_end() => {
                if !self.eat_punct(';') {
                    self.eat_punct(',');
                }
                let node = node.with_modifiers(modifiers);
                Ok(self.finish(node, start, comments))
            }
            Some(_) => Err(self.error_here("expected `;`")),
            None => {
                self.pos = checkpoint;
                self.parse_raw_member(start, comments)
            }
        }
    }

    fn at_member_end(&self) -> bool {
        let tok = self.peek();
        tok.is_punct(';')
            || tok.is_punct(',')
            || tok.is_punct('}')
            || tok.newline_before
            || tok.kind == TokKind::Eof
    }

    fn parse_raw_member(&mut self, start: usize, comments: Vec<CommentRange>) -> PResult<Node> {
        let mut depth = 0usize;
        let mut consumed = 0usize;
        loop {
            let tok = self.peek();
            if tok.kind == TokKind::Eof {
                return Err(self.error_here("expected `}`"));
            }
            if depth == 0 {
                if tok.is_punct('}') || (consumed > 0 && tok.newline_before) {
                    break;
                }
                if tok.is_punct(';') || tok.is_punct(',') {
                    self.bump();
                    break;
                }
            }
            match tok.kind {
                TokKind::Punct('{') | TokKind::Punct('(') | TokKind::Punct('[') => depth += 1,
                TokKind::Punct('}') | TokKind::Punct(')') | TokKind::Punct(']') => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.bump();
            consumed += 1;
        }
        let text = self.slice_from(start).to_string();
        Ok(self.finish(Node::new(NodeKind::Raw(text), None), start, comments))
    }

    // ------------------------------------------------------------------
    // Signatures and parameters
    // ------------------------------------------------------------------

    fn parse_signature(&mut self) -> PResult<(Signature, Vec<Node>)> {
        let type_params = self.parse_type_params()?;
        let params = self.parse_params()?;
        let return_type = if self.eat_punct(':') {
            match self.capture_type(|tok| tok.is_punct(';') || tok.is_punct(','))? {
                Some(text) => Some(text),
                None => return Err(self.error_here("expected a return type")),
            }
        } else {
            None
        };
        Ok((
            Signature {
                type_params,
                return_type,
                accessor: None,
            },
            params,
        ))
    }

    fn parse_params(&mut self) -> PResult<Vec<Node>> {
        self.expect_punct('(')?;
        let mut params = Vec::new();
        loop {
            if self.eat_punct(')') {
                break;
            }
            params.push(self.parse_param()?);
            if !self.eat_punct(',') {
                self.expect_punct(')')?;
                break;
            }
        }
        Ok(params)
    }

    fn parse_param(&mut self) -> PResult<Node> {
        let comments = self.leading_comments();
        let start = self.start_offset();

        let mut modifiers = Modifiers::default();
        loop {
            let next = self.peek_nth(1);
            let binds = matches!(next.kind, TokKind::Ident | TokKind::Ellipsis)
                || next.is_punct('{')
                || next.is_punct('[');
            if !binds {
                break;
            }
            match self.peek().text {
                "public" => modifiers.accessibility = Some(Accessibility::Public),
                "protected" => modifiers.accessibility = Some(Accessibility::Protected),
                "private" => modifiers.accessibility = Some(Accessibility::Private),
                "readonly" => modifiers.readonly = true,
                "override" => modifiers.is_override = true,
                _ => break,
            }
            self.bump();
        }

        let rest = if self.peek().kind == TokKind::Ellipsis {
            self.bump();
            true
        } else {
            false
        };
        let name = match self.peek().kind {
            TokKind::Ident => self.bump_text().to_string(),
            TokKind::Punct('{') | TokKind::Punct('[') => self.capture_balanced()?,
            _ => return Err(self.error_here("expected parameter name")),
        };
        let optional = self.eat_punct('?');
        let type_text = if self.eat_punct(':') {
            match self.capture_type(|tok| tok.is_punct(',') || tok.is_punct('='))? {
                Some(text) => Some(text),
                None => return Err(self.error_here("expected a parameter type")),
            }
        } else {
            None
        };
        if self.peek().is_punct('=') {
            return Err(self.error_here("parameter initializers are not allowed in declarations"));
        }

        let node = Node::new(
            NodeKind::Parameter(ParamDecl {
                type_text,
                optional,
                rest,
            }),
            Some(name),
        )
        .with_modifiers(modifiers);
        Ok(self.finish(node, start, comments))
    }

    fn parse_type_params(&mut self) -> PResult<Option<String>> {
        if self.peek().is_punct('<') {
            Ok(Some(self.capture_balanced()?))
        } else {
            Ok(None)
        }
    }

    // ------------------------------------------------------------------
    // Verbatim capture
    // ------------------------------------------------------------------

    /// Capture a bracketed group starting at the current token, up to and
    /// including its matching close.
    fn capture_balanced(&mut self) -> PResult<String> {
        let (open, close) = match self.peek().kind {
            TokKind::Punct('<') => ('<', '>'),
            TokKind::Punct('(') => ('(', ')'),
            TokKind::Punct('[') => ('[', ']'),
            TokKind::Punct('{') => ('{', '}'),
            _ => return Err(self.error_here("expected an opening bracket")),
        };
        let start = self.start_offset();
        let mut depth = 0usize;
        loop {
            let tok = self.peek();
            if tok.kind == TokKind::Eof {
                return Err(self.error_here(&format!("expected `{}`", close)));
            }
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth -= 1;
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
        Ok(self.slice_from(start).to_string())
    }

    /// Capture a type expression verbatim.
    ///
    /// Stops before a token matching `stop` at bracket depth zero, before
    /// an unmatched closing bracket, or at a line break that ends the
    /// declaration. Returns `None` if nothing was captured.
    fn capture_type(&mut self, stop: impl Fn(&Token<'a>) -> bool) -> PResult<Option<String>> {
        let start_pos = self.pos;
        let start = self.start_offset();
        let mut depth = 0usize;
        loop {
            let tok = self.peek();
            if tok.kind == TokKind::Eof {
                if depth > 0 {
                    return Err(self.error_here("unbalanced brackets in type"));
                }
                break;
            }
            if depth == 0 {
                if stop(tok) || is_closer(tok) {
                    break;
                }
                if self.pos > start_pos
                    && tok.newline_before
                    && ends_type_at_newline(&self.tokens[self.pos - 1], tok)
                {
                    break;
                }
            }
            match tok.kind {
                TokKind::Punct('(' | '[' | '{' | '<') => depth += 1,
                TokKind::Punct(')' | ']' | '}' | '>') => depth -= 1,
                _ => {}
            }
            self.bump();
        }
        if self.pos == start_pos {
            return Ok(None);
        }
        Ok(Some(self.slice_from(start).to_string()))
    }
}

fn starts_statement(tok: &Token<'_>) -> bool {
    tok.kind == TokKind::Ident && STATEMENT_KEYWORDS.contains(&tok.text)
}

fn starts_property_name(tok: &Token<'_>) -> bool {
    matches!(tok.kind, TokKind::Ident | TokKind::String | TokKind::Number)
}

fn is_closer(tok: &Token<'_>) -> bool {
    matches!(tok.kind, TokKind::Punct(')' | ']' | '}' | '>'))
}

/// A line break between `prev` and `next` terminates a type expression.
fn ends_type_at_newline(prev: &Token<'_>, next: &Token<'_>) -> bool {
    let prev_continues = match prev.kind {
        TokKind::Punct(c) => matches!(c, '|' | '&' | ':' | ',' | '?' | '=' | '.' | '<' | '(' | '[' | '{'),
        TokKind::Arrow => true,
        TokKind::Ident => TYPE_CONTINUATION_WORDS.contains(&prev.text),
        _ => false,
    };
    if prev_continues {
        return false;
    }
    match next.kind {
        TokKind::Ident => !TYPE_CONTINUING_WORDS.contains(&next.text),
        TokKind::String | TokKind::Number | TokKind::Punct('[') => true,
        _ => false,
    }
}

fn unquote(literal: &str) -> String {
    let mut chars = literal.chars();
    chars.next();
    chars.next_back();
    chars.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{NodeType, VarKeyword};

    fn parse(text: &str) -> SourceFile {
        parse_source("test.d.ts", text).unwrap()
    }

    fn only(text: &str) -> Node {
        let mut file = parse(text);
        assert_eq!(file.statements.len(), 1, "{:?}", file.statements);
        file.statements.remove(0)
    }

    #[test]
    fn class_with_heritage_and_members() {
        let node = only(
            "export declare class Dog<T> extends Animal<T> implements Pet, import('./x').Named {\n\
             \x20   private readonly name: string;\n\
             \x20   constructor(name: string, age?: number);\n\
             \x20   bark(times: number): void;\n\
             \x20   static create(): Dog<any>;\n\
             }\n",
        );
        assert_eq!(node.name(), Some("Dog"));
        assert!(node.modifiers.export && node.modifiers.declare);
        let NodeKind::Class(decl) = &node.kind else {
            panic!("expected class, got {:?}", node.kind);
        };
        assert_eq!(decl.type_params.as_deref(), Some("<T>"));
        assert_eq!(decl.heritage.extends, vec![HeritageClause::new("Animal<T>")]);
        assert_eq!(
            decl.heritage.implements,
            vec![
                HeritageClause::new("Pet"),
                HeritageClause::new("import('./x').Named")
            ]
        );

        let kinds: Vec<_> = node.children.iter().map(|c| c.node_type()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::Property,
                NodeType::Constructor,
                NodeType::Method,
                NodeType::Method
            ]
        );
        let prop = &node.children[0];
        assert_eq!(prop.modifiers.accessibility, Some(Accessibility::Private));
        assert!(prop.modifiers.readonly);
        let ctor = &node.children[1];
        assert_eq!(ctor.arity(), 2);
        let NodeKind::Parameter(age) = &ctor.children[1].kind else {
            panic!("expected parameter");
        };
        assert!(age.optional);
        assert!(node.children[3].modifiers.is_static);
    }

    #[test]
    fn doc_comments_attach_to_declarations_and_members() {
        let text = "/** A thing. */\nexport class A {\n    /** @inheritDoc */\n    run(x: number): void;\n}\n";
        let file = parse(text);
        let class = &file.statements[0];
        assert_eq!(class.leading_comments.len(), 1);
        assert_eq!(
            class.leading_comments[0].span.slice(text),
            Some("/** A thing. */")
        );
        let method = &class.children[0];
        assert_eq!(
            method.leading_comments[0].span.slice(text),
            Some("/** @inheritDoc */")
        );
    }

    #[test]
    fn function_types_with_arrows_and_generics() {
        let node = only("declare function map<T, U>(xs: T[], f: (x: T) => U): Array<U>;");
        assert_eq!(node.node_type(), NodeType::Function);
        let NodeKind::Function(sig) = &node.kind else {
            panic!("expected function");
        };
        assert_eq!(sig.type_params.as_deref(), Some("<T, U>"));
        assert_eq!(sig.return_type.as_deref(), Some("Array<U>"));
        let types: Vec<_> = node.params().map(|p| p.param_type()).collect();
        assert_eq!(types, vec![Some("T[]"), Some("(x: T) => U")]);
    }

    #[test]
    fn object_types_and_rest_params() {
        let node = only("export function f(opts: { a: string; b?: number }, ...rest: any[]): void;");
        let params: Vec<_> = node.params().collect();
        assert_eq!(params[0].param_type(), Some("{ a: string; b?: number }"));
        let NodeKind::Parameter(rest) = &params[1].kind else {
            panic!("expected parameter");
        };
        assert!(rest.rest);
    }

    #[test]
    fn interfaces_extend_several_bases() {
        let node = only("interface C extends A, B<string> {\n    x: number\n    y?: string\n}");
        let heritage = node.heritage().unwrap();
        assert_eq!(heritage.extends.len(), 2);
        assert_eq!(heritage.extends[1].base_name(), "B");
        assert_eq!(node.children.len(), 2);
        assert!(node.children[1].modifiers.optional);
    }

    #[test]
    fn variables_aliases_and_namespaces() {
        let file = parse(
            "declare const VERSION: string;\n\
             export type Handler<T> = (event: T) => void;\n\
             declare namespace NS.Inner {\n    function g(): void;\n}\n\
             declare module 'pkg' {\n    export class X {}\n}\n",
        );
        let kinds: Vec<_> = file.statements.iter().map(|n| n.node_type()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::Variable,
                NodeType::TypeAlias,
                NodeType::Namespace,
                NodeType::Namespace
            ]
        );
        let NodeKind::Variable(var) = &file.statements[0].kind else {
            panic!("expected variable");
        };
        assert_eq!(var.keyword, VarKeyword::Const);
        assert_eq!(file.statements[2].name(), Some("NS.Inner"));
        assert_eq!(file.statements[3].name(), Some("'pkg'"));
        assert_eq!(file.statements[3].children[0].name(), Some("X"));
    }

    #[test]
    fn import_forms() {
        let file = parse(
            "import type { A, B as C } from './ab';\n\
             import D, * as E from \"de\";\n\
             import './side-effect';\n\
             import F = require('f');\n",
        );
        let NodeKind::Import(first) = &file.statements[0].kind else {
            panic!("expected import");
        };
        assert!(first.type_only);
        assert_eq!(first.module, "./ab");
        assert_eq!(first.names[1].alias.as_deref(), Some("C"));

        let NodeKind::Import(second) = &file.statements[1].kind else {
            panic!("expected import");
        };
        assert_eq!(second.default_binding.as_deref(), Some("D"));
        assert_eq!(second.namespace.as_deref(), Some("E"));

        assert_eq!(file.statements[2].node_type(), NodeType::Import);
        assert_eq!(file.statements[3].node_type(), NodeType::Raw);
    }

    #[test]
    fn unmodelled_statements_are_raw() {
        let text = "export { A, B } from './x';\nexport declare enum Color {\n    Red,\n    Green\n}\nexport = Foo;\n";
        let file = parse(text);
        let raws: Vec<_> = file
            .statements
            .iter()
            .map(|n| match &n.kind {
                NodeKind::Raw(text) => text.as_str(),
                other => panic!("expected raw, got {:?}", other),
            })
            .collect();
        assert_eq!(
            raws,
            vec![
                "export { A, B } from './x';",
                "export declare enum Color {\n    Red,\n    Green\n}",
                "export = Foo;"
            ]
        );
    }

    #[test]
    fn index_signatures_are_raw_members() {
        let node = only("interface Dict {\n    [key: string]: number;\n    size: number;\n}");
        assert_eq!(node.children[0].node_type(), NodeType::Raw);
        assert_eq!(node.children[1].name(), Some("size"));
    }

    #[test]
    fn accessors_are_methods() {
        let node = only("declare class A {\n    get value(): number;\n    set value(v: number);\n}");
        let NodeKind::Method(getter) = &node.children[0].kind else {
            panic!("expected method");
        };
        assert_eq!(getter.accessor, Some(Accessor::Get));
        assert_eq!(node.children[1].arity(), 1);
    }

    #[test]
    fn semicolons_may_be_omitted() {
        let file = parse("declare const a: string\ndeclare const b: A |\n    B\ntype C = D");
        assert_eq!(file.statements.len(), 3);
        let NodeKind::Variable(b) = &file.statements[1].kind else {
            panic!("expected variable");
        };
        assert_eq!(b.type_text.as_deref(), Some("A |\n    B"));
    }

    #[test]
    fn errors_carry_location() {
        let err = parse_source("bad.d.ts", "declare class A {\n    foo(: number);\n}").unwrap_err();
        assert_eq!(err.location.line, 2);
        assert!(err.message.starts_with("expected parameter name"));

        let err = parse_source("open.d.ts", "declare class A {").unwrap_err();
        assert!(err.message.contains("end of input"));
    }

    #[test]
    fn bundle_keeps_file_order() {
        let tree = parse_bundle(vec![
            ("a.d.ts", "export class A {}"),
            ("b.d.ts", "export class B extends A {}"),
        ])
        .unwrap();
        assert!(tree.is_bundle());
        assert_eq!(tree.files[1].name, "b.d.ts");
        assert_eq!(tree.files[1].statements[0].name(), Some("B"));
    }
}
