// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Documentation comment parser.
//!
//! Parses `/** ... */` comments into a [`CommentBlock`]: the free-text
//! description followed by tag entries.
//!
//! ## Grammar
//!
//! ```text
//! <block>  := <description> <tag>*
//! <tag>    := "@" tag-name ["{" <type> "}"] [<name>] <text>
//! <name>   := identifier | "[" identifier ["=" default] "]"
//! ```
//!
//! A tag starts at a line whose first non-decoration character is `@`.
//! Names are only read for tags that take one (`@param`, `@property`, ...).
//! A comment with an unbalanced type expression or a bare `@` does not parse.

use winnow::ascii::{multispace0, space0};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded, terminated};
use winnow::prelude::*;
use winnow::token::{rest, take, take_till, take_while};
use winnow::ModalResult;

/// Tags whose entries carry a name after the optional type.
const NAMED_TAGS: &[&str] = &[
    "param", "arg", "argument", "property", "prop", "typedef", "callback", "template", "member",
    "var", "name", "alias", "event", "fires", "emits", "listens",
];

/// Parsed form of one documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentBlock {
    /// Text before the first tag, decoration stripped.
    pub description: String,
    pub tags: Vec<TagEntry>,
}

impl CommentBlock {
    /// True if any entry's tag equals `tag` exactly.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|entry| entry.tag == tag)
    }

    /// True if any entry's tag equals `tag` ignoring ASCII case.
    pub fn has_tag_ignore_case(&self, tag: &str) -> bool {
        self.tags
            .iter()
            .any(|entry| entry.tag.eq_ignore_ascii_case(tag))
    }

    /// Entries with tag `tag`, in comment order.
    pub fn tags_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TagEntry> + 'a {
        self.tags.iter().filter(move |entry| entry.tag == tag)
    }
}

/// One `@tag` annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag name without the `@`.
    pub tag: String,
    /// Contents of `{...}` after the tag, trimmed.
    pub type_expr: Option<String>,
    pub name: Option<String>,
    /// Name was written in brackets.
    pub optional: bool,
    /// Default from `[name=default]`.
    pub default_value: Option<String>,
    pub description: Option<String>,
}

/// Parse one raw comment. Returns `None` for anything that is not a well
/// formed documentation comment.
pub fn parse_comment(raw: &str) -> Option<CommentBlock> {
    let body = doc_body(raw)?;
    let lines: Vec<&str> = body.lines().map(strip_decoration).collect();

    let mut description = Vec::new();
    let mut sections: Vec<Vec<&str>> = Vec::new();
    for line in lines {
        if line.trim_start().starts_with('@') {
            sections.push(vec![line.trim_start()]);
        } else if let Some(section) = sections.last_mut() {
            section.push(line);
        } else {
            description.push(line);
        }
    }

    let tags = sections
        .iter()
        .map(|section| tag_entry.parse(section.join("\n").as_str()).ok())
        .collect::<Option<Vec<_>>>()?;

    Some(CommentBlock {
        description: description.join("\n").trim().to_string(),
        tags,
    })
}

/// Inner text of a `/** ... */` comment.
fn doc_body(raw: &str) -> Option<&str> {
    let raw = raw.trim();
    if raw.len() < 5 || raw.starts_with("/***") {
        return None;
    }
    raw.strip_prefix("/**")?.strip_suffix("*/")
}

/// Strip leading whitespace and a `*` gutter from a comment line.
fn strip_decoration(line: &str) -> &str {
    let trimmed = line.trim_start();
    match trimmed.strip_prefix('*') {
        Some(rest) => rest.strip_prefix(' ').unwrap_or(rest).trim_end(),
        None => trimmed.trim_end(),
    }
}

// ============================================================================
// Tag grammar
// ============================================================================

fn tag_entry(input: &mut &str) -> ModalResult<TagEntry> {
    let tag = preceded('@', tag_name).parse_next(input)?;
    let _ = space0.parse_next(input)?;
    let type_expr = opt(type_expression).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;

    let mut entry = TagEntry {
        tag: tag.to_string(),
        type_expr,
        ..TagEntry::default()
    };

    if NAMED_TAGS.contains(&tag) {
        if let Some((name, optional, default_value)) = opt(entry_name).parse_next(input)? {
            entry.name = Some(name);
            entry.optional = optional;
            entry.default_value = default_value;
        }
    }

    let text: &str = rest.parse_next(input)?;
    entry.description = description_text(text);
    Ok(entry)
}

fn tag_name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_' || c == '-').parse_next(input)
}

/// `{type}` with nested braces; an opening brace commits.
fn type_expression(input: &mut &str) -> ModalResult<String> {
    preceded('{', cut_err(terminated(balanced_braces, '}')))
        .map(|s: &str| s.trim().to_string())
        .parse_next(input)
}

/// Everything up to the `}` that closes the current brace level. `take`
/// counts chars, not bytes.
fn balanced_braces<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    let mut depth = 0usize;
    let mut end = input.chars().count();
    for (count, c) in input.chars().enumerate() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => {
                end = count;
                break;
            }
            '}' => depth -= 1,
            _ => {}
        }
    }
    take(end).parse_next(input)
}

/// `name`, `[name]` or `[name=default]`.
fn entry_name(input: &mut &str) -> ModalResult<(String, bool, Option<String>)> {
    alt((
        delimited('[', take_till(1.., |c| c == ']'), ']').map(|inner: &str| {
            match inner.split_once('=') {
                Some((name, default)) => (
                    name.trim().to_string(),
                    true,
                    Some(default.trim().to_string()),
                ),
                None => (inner.trim().to_string(), true, None),
            }
        }),
        take_while(1.., |c: char| !c.is_whitespace() && c != '-')
            .map(|name: &str| (name.to_string(), false, None)),
    ))
    .parse_next(input)
}

fn description_text(text: &str) -> Option<String> {
    let text = text.trim();
    let text = text.strip_prefix('-').map(str::trim_start).unwrap_or(text);
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
