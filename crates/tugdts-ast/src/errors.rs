// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parse errors with source snippets.

use annotate_snippets::{Level, Renderer, Snippet};
use thiserror::Error;
use tugdts_core::error::DtsError;
use tugdts_core::text::line_bounds;
use tugdts_core::types::Location;

use crate::nodes::Span;
use crate::tokenizer::TokError;

/// A declaration file failed to tokenize or parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{location}: {message}")]
pub struct ParseError {
    pub span: Span,
    pub location: Location,
    pub message: String,
    /// Source excerpt with the offending span underlined.
    pub snippet: String,
}

impl ParseError {
    pub fn new(file: &str, text: &str, span: Span, message: impl Into<String>) -> Self {
        let message = message.into();
        let location = Location::from_offset(file, text, span.start);
        let snippet = render_snippet(file, text, span, &message);
        ParseError {
            span,
            location,
            message,
            snippet,
        }
    }

    pub fn from_tok_error(file: &str, text: &str, err: &TokError) -> Self {
        let offset = err.offset();
        ParseError::new(file, text, Span::new(offset, offset + 1), err.to_string())
    }
}

impl From<ParseError> for DtsError {
    fn from(err: ParseError) -> Self {
        DtsError::Parse {
            location: err.location,
            message: err.message,
            snippet: Some(err.snippet),
        }
    }
}

/// Render the lines around `span` with the span underlined.
fn render_snippet(file: &str, text: &str, span: Span, label: &str) -> String {
    let (line_start_offset, _) = line_bounds(text, span.start);
    let (_, line_end_offset) = line_bounds(text, span.end.max(span.start));
    let source = &text[line_start_offset..line_end_offset];
    let line_start = Location::from_offset(file, text, line_start_offset).line as usize;

    let start = span.start.min(text.len()) - line_start_offset;
    let end = (span.end.min(text.len()) - line_start_offset).max(start);
    // Zero-width spans still need a visible marker.
    let end = if start == end {
        (end + 1).min(source.len() + 1)
    } else {
        end
    };

    let message = Level::Error.title(label).snippet(
        Snippet::source(source)
            .line_start(line_start)
            .origin(file)
            .fold(false)
            .annotation(Level::Error.span(start..end).label(label)),
    );
    Renderer::plain().render(message).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_and_snippet() {
        let text = "class A {\n    foo(: number;\n}\n";
        let offset = text.find("(:").unwrap() + 1;
        let err = ParseError::new("a.d.ts", text, Span::new(offset, offset + 1), "expected parameter name");
        assert_eq!(err.location, Location::new("a.d.ts", 2, 9));
        assert!(err.snippet.contains("a.d.ts"));
        assert!(err.snippet.contains("foo(: number;"));
        assert!(err.snippet.contains("expected parameter name"));
        assert_eq!(err.to_string(), "a.d.ts:2:9: expected parameter name");
    }

    #[test]
    fn converts_into_dts_error() {
        let err = ParseError::new("x.d.ts", "}", Span::new(0, 1), "unexpected `}`");
        let dts: DtsError = err.into();
        assert!(matches!(dts, DtsError::Parse { ref snippet, .. } if snippet.is_some()));
    }

    #[test]
    fn end_of_input_span_renders() {
        let text = "class A {";
        let err = ParseError::new("e.d.ts", text, Span::empty(text.len()), "unexpected end of input");
        assert_eq!(err.location.line, 1);
        assert!(err.snippet.contains("class A {"));
    }
}
