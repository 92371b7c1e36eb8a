//! Parse-error reporting
//!
//! Wraps lexer/parser failures in a single `ParseError` and renders them as
//! ariadne reports against the original expression text.

use ariadne::{Color, Label, Report, ReportKind, Source};
use chumsky::error::SimpleReason;
use chumsky::prelude::Simple;

use crate::lexer::{Span, Token};

/// A malformed ranking expression, detected before any evaluation.
///
/// `Display` yields the rendered ariadne report(s), one per underlying
/// lexer/parser error.
#[derive(Clone, Debug)]
pub struct ParseError {
    rendered: String,
}

impl ParseError {
    /// Build from lexer failures
    pub(crate) fn from_lexer(source: &str, errors: Vec<Simple<char>>) -> Self {
        let reports = errors.iter().map(|error| {
            let message = match error.found() {
                Some(c) => format!("unexpected character '{}'", c),
                None => "unexpected end of expression".to_string(),
            };
            (error.span(), message)
        });
        Self {
            rendered: render(source, reports),
        }
    }

    /// Build from parser failures, mapping token spans back to text spans
    pub(crate) fn from_parser(
        source: &str,
        errors: Vec<Simple<Token>>,
        token_spans: &[(Token, Span)],
    ) -> Self {
        let reports = errors.iter().map(|error| {
            (
                char_span(source, token_spans, error.span()),
                describe_parser_error(error),
            )
        });
        Self {
            rendered: render(source, reports),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl std::error::Error for ParseError {}

/// Render one report per error against the source text
fn render(source: &str, reports: impl Iterator<Item = (Span, String)>) -> String {
    let mut output = Vec::new();

    for (span, message) in reports {
        let report = Report::build(ReportKind::Error, (), span.start)
            .with_message("parse error")
            .with_label(
                Label::new(span)
                    .with_message(message)
                    .with_color(Color::Red),
            );
        if report
            .finish()
            .write(Source::from(source), &mut output)
            .is_err()
        {
            return "parse error (report rendering failed)".to_string();
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "parse error (non-utf8 report)".to_string())
}

/// Map a parser error span onto the source text.
///
/// The token stream is built with character spans, so in-stream errors carry
/// the span of the offending token already; anything else is an end-of-input
/// error and points just past the last token.
fn char_span(source: &str, token_spans: &[(Token, Span)], span: Span) -> Span {
    let covers_token = token_spans
        .iter()
        .any(|(_, range)| range.start == span.start && range.end == span.end);
    if covers_token {
        return span;
    }
    match token_spans.last() {
        Some((_, last)) => last.end..last.end,
        None => 0..source.len().min(1),
    }
}

fn describe_parser_error(error: &Simple<Token>) -> String {
    if let SimpleReason::Custom(msg) = error.reason() {
        return msg.clone();
    }

    let found = error
        .found()
        .map(|t| format!("'{}'", t))
        .unwrap_or_else(|| "end of expression".to_string());

    let expected: Vec<String> = error
        .expected()
        .filter_map(|opt| opt.as_ref())
        .map(|t| format!("'{}'", t))
        .collect();

    if expected.is_empty() {
        format!("unexpected {}", found)
    } else {
        format!("unexpected {}, expected one of: {}", found, expected.join(", "))
    }
}
