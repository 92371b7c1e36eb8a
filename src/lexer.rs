//! Lexer for ranking expressions
//!
//! Tokenizes expression text into a stream for the parser.

use chumsky::prelude::*;
use std::ops::Range;

/// Token types for ranking expressions
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// Numeric literal, kept as source text until the parser converts it
    Number(String),

    /// Feature or argument identifier
    Ident(String),

    // Punctuation
    LBrace, // {
    RBrace, // }
    LParen, // (
    RParen, // )
    Colon,  // :
    Comma,  // ,
    Plus,   // +
    Minus,  // -
    Star,   // *
    Slash,  // /
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(s) => write!(f, "{}", s),
            Token::Ident(s) => write!(f, "{}", s),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
        }
    }
}

/// Type alias for spans
pub type Span = Range<usize>;

/// Create a lexer for ranking expressions
pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    // Numbers: 1, 3.5, 2e3, 1.25e-2 (no leading sign; negation is an operator)
    let frac = just('.').chain(text::digits(10));
    let exp = one_of("eE")
        .chain(one_of("+-").or_not())
        .chain::<char, _, _>(text::digits(10));
    let number = text::int(10)
        .chain::<char, _, _>(frac.or_not().flatten())
        .chain::<char, _, _>(exp.or_not().flatten())
        .collect::<String>()
        .map(Token::Number);

    let ident = text::ident().map(Token::Ident);

    let punctuation = choice((
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just('(').to(Token::LParen),
        just(')').to(Token::RParen),
        just(':').to(Token::Colon),
        just(',').to(Token::Comma),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
    ));

    // Comments: # to end of line (handles both mid-text and end-of-text)
    let line_comment = just('#')
        .then(none_of('\n').repeated())
        .then(just('\n').or_not())
        .ignored();

    // Token OR comment - comments produce None, tokens produce Some
    let token_or_skip = line_comment
        .to(None)
        .or(choice((number, ident, punctuation)).map(Some));

    token_or_skip
        .map_with_span(|opt_tok, span| opt_tok.map(|tok| (tok, span)))
        .padded()
        .repeated()
        .then_ignore(end())
        .map(|items| items.into_iter().flatten().collect())
}

// Unit tests live in tests/unit_parsing.rs
