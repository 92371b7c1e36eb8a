//! Parser for ranking expressions
//!
//! Parses token streams into AST.

use chumsky::prelude::*;

use crate::ast::{BinOp, CellExpr, Expr};
use crate::lexer::Token;

/// Create a parser for a complete ranking expression
pub fn parser() -> impl Parser<Token, Expr, Error = Simple<Token>> + Clone {
    expr().then_ignore(end())
}

// ============================================================================
// Helpers
// ============================================================================

fn ident() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! { Token::Ident(s) => s }
}

/// Parse a numeric literal, converting the lexed text to an f64
fn number() -> impl Parser<Token, f64, Error = Simple<Token>> + Clone {
    select! { Token::Number(s) => s }.try_map(|s, span| {
        s.parse::<f64>()
            .map_err(|_| Simple::custom(span, format!("'{}' is not a valid number", s)))
    })
}

/// Parse a feature argument: a bare identifier or a number, kept as text
fn feature_arg() -> impl Parser<Token, String, Error = Simple<Token>> + Clone {
    select! {
        Token::Ident(s) => s,
        Token::Number(s) => s,
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// Parse an expression with standard arithmetic precedence:
/// unary minus binds tightest, then `*` `/`, then `+` `-`.
fn expr() -> impl Parser<Token, Expr, Error = Simple<Token>> + Clone {
    recursive(|expr_rec| {
        // Feature reference: `name(arg, ...)`, e.g. `constant(foo)`
        let feature_ref = ident()
            .then(
                feature_arg()
                    .separated_by(just(Token::Comma))
                    .at_least(1)
                    .delimited_by(just(Token::LParen), just(Token::RParen)),
            )
            .map(|(name, args)| Expr::FeatureRef { name, args });

        // Cell address: `{dim:label, ...}` - at least one binding required
        let address = ident()
            .then_ignore(just(Token::Colon))
            .then(ident())
            .separated_by(just(Token::Comma))
            .at_least(1)
            .delimited_by(just(Token::LBrace), just(Token::RBrace));

        // One tensor cell: `{dim:label, ...}: value`
        let cell = address
            .then_ignore(just(Token::Colon))
            .then(expr_rec.clone())
            .map(|(address, value)| CellExpr { address, value });

        // Tensor literal: `{ {x:a}:3, {x:b}:5 }`
        let tensor_literal = cell
            .separated_by(just(Token::Comma))
            .at_least(1)
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
            .map(Expr::TensorLiteral);

        let paren = expr_rec
            .clone()
            .delimited_by(just(Token::LParen), just(Token::RParen));

        let atom = choice((
            number().map(Expr::Number),
            feature_ref,
            tensor_literal,
            paren,
        ));

        let unary = just(Token::Minus)
            .repeated()
            .then(atom)
            .foldr(|_minus, inner| Expr::Neg(Box::new(inner)));

        let product_op = choice((
            just(Token::Star).to(BinOp::Mul),
            just(Token::Slash).to(BinOp::Div),
        ));
        let product = unary
            .clone()
            .then(product_op.then(unary).repeated())
            .foldl(|lhs, (op, rhs)| Expr::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            });

        let sum_op = choice((
            just(Token::Plus).to(BinOp::Add),
            just(Token::Minus).to(BinOp::Sub),
        ));
        product
            .clone()
            .then(sum_op.then(product).repeated())
            .foldl(|lhs, (op, rhs)| Expr::BinOp {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            })
    })
}
