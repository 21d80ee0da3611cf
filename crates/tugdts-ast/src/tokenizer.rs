// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tokenizer for TypeScript declaration source.
//!
//! Produces a flat token list. Comments are not tokens; each token carries
//! the comments that precede it, so the parser can hand them to the node
//! that starts at that token. Comments after the last real token end up on
//! the [`TokKind::Eof`] token.

use thiserror::Error;

use crate::nodes::{CommentKind, CommentRange, Span};

/// Token classes the parser distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Identifiers and keywords.
    Ident,
    /// `'...'`, `"..."` and template literals.
    String,
    Number,
    /// `=>`
    Arrow,
    /// `...`
    Ellipsis,
    /// Any other single character.
    Punct(char),
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokKind,
    pub text: &'a str,
    pub span: Span,
    /// Comments between the previous token and this one.
    pub comments: Vec<CommentRange>,
    /// A line break occurs between the previous token and this one.
    pub newline_before: bool,
}

impl Token<'_> {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokKind::Punct(c)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokKind::Ident && self.text == word
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokError {
    #[error("unterminated string literal")]
    UnterminatedString { offset: usize },
    #[error("unterminated comment")]
    UnterminatedComment { offset: usize },
}

impl TokError {
    pub fn offset(&self) -> usize {
        match self {
            TokError::UnterminatedString { offset } | TokError::UnterminatedComment { offset } => {
                *offset
            }
        }
    }
}

/// Split `text` into tokens. The last token is always [`TokKind::Eof`].
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, TokError> {
    let mut tokens = Vec::new();
    let mut comments = Vec::new();
    let mut newline_before = false;
    let bytes = text.as_bytes();
    let mut pos = 0usize;

    while pos < text.len() {
        let c = match text[pos..].chars().next() {
            Some(c) => c,
            None => break,
        };

        if c == '\n' {
            newline_before = true;
            pos += 1;
            continue;
        }
        if c.is_whitespace() || c == '\u{feff}' {
            pos += c.len_utf8();
            continue;
        }

        if c == '/' && bytes.get(pos + 1) == Some(&b'/') {
            let end = text[pos..].find('\n').map(|p| pos + p).unwrap_or(text.len());
            comments.push(CommentRange::new(Span::new(pos, end), CommentKind::Line));
            pos = end;
            continue;
        }
        if c == '/' && bytes.get(pos + 1) == Some(&b'*') {
            let end = text[pos + 2..]
                .find("*/")
                .map(|p| pos + 2 + p + 2)
                .ok_or(TokError::UnterminatedComment { offset: pos })?;
            if text[pos..end].contains('\n') {
                newline_before = true;
            }
            comments.push(CommentRange::new(Span::new(pos, end), CommentKind::Block));
            pos = end;
            continue;
        }

        let start = pos;
        let kind = if c == '"' || c == '\'' || c == '`' {
            pos = scan_string(text, pos, c)?;
            TokKind::String
        } else if is_ident_start(c) {
            pos += c.len_utf8();
            while let Some(next) = text[pos..].chars().next() {
                if !is_ident_continue(next) {
                    break;
                }
                pos += next.len_utf8();
            }
            TokKind::Ident
        } else if c.is_ascii_digit() {
            while let Some(next) = text[pos..].chars().next() {
                if !(next.is_ascii_alphanumeric() || next == '.' || next == '_') {
                    break;
                }
                pos += 1;
            }
            TokKind::Number
        } else if text[pos..].starts_with("=>") {
            pos += 2;
            TokKind::Arrow
        } else if text[pos..].starts_with("...") {
            pos += 3;
            TokKind::Ellipsis
        } else {
            pos += c.len_utf8();
            TokKind::Punct(c)
        };

        tokens.push(Token {
            kind,
            text: &text[start..pos],
            span: Span::new(start, pos),
            comments: std::mem::take(&mut comments),
            newline_before,
        });
        newline_before = false;
    }

    tokens.push(Token {
        kind: TokKind::Eof,
        text: "",
        span: Span::empty(text.len()),
        comments,
        newline_before,
    });
    Ok(tokens)
}

/// Scan a string literal starting at `start`; returns the offset after the
/// closing quote.
fn scan_string(text: &str, start: usize, quote: char) -> Result<usize, TokError> {
    let mut chars = text[start + 1..].char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\n' if quote != '`' => break,
            c if c == quote => return Ok(start + 1 + idx + 1),
            _ => {}
        }
    }
    Err(TokError::UnterminatedString { offset: start })
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphanumeric()
}
