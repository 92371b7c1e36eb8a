//! Unit tests for lexer and parser

use chumsky::Parser;
use rankexpr::ast::{BinOp, CellExpr, Expr};
use rankexpr::lexer::{lexer, Token};
use rankexpr::parse;

// ============================================================================
// Lexer tests
// ============================================================================

#[test]
fn test_lex_feature_ref() {
    let input = "constant(foo)";
    let result = lexer().parse(input);
    assert!(result.is_ok());
    let tokens: Vec<_> = result.unwrap().into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        tokens,
        vec![
            Token::Ident("constant".to_string()),
            Token::LParen,
            Token::Ident("foo".to_string()),
            Token::RParen,
        ]
    );
}

#[test]
fn test_lex_tensor_literal() {
    let input = "{ {x:a}:3, {x:b}:5 }";
    let result = lexer().parse(input);
    assert!(result.is_ok());
    let tokens: Vec<_> = result.unwrap().into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        tokens,
        vec![
            Token::LBrace,
            Token::LBrace,
            Token::Ident("x".to_string()),
            Token::Colon,
            Token::Ident("a".to_string()),
            Token::RBrace,
            Token::Colon,
            Token::Number("3".to_string()),
            Token::Comma,
            Token::LBrace,
            Token::Ident("x".to_string()),
            Token::Colon,
            Token::Ident("b".to_string()),
            Token::RBrace,
            Token::Colon,
            Token::Number("5".to_string()),
            Token::RBrace,
        ]
    );
}

#[test]
fn test_lex_numbers() {
    let input = "1 3.5 2e3 1.25e-2";
    let tokens: Vec<_> = lexer()
        .parse(input)
        .unwrap()
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    assert_eq!(
        tokens,
        vec![
            Token::Number("1".to_string()),
            Token::Number("3.5".to_string()),
            Token::Number("2e3".to_string()),
            Token::Number("1.25e-2".to_string()),
        ]
    );
}

#[test]
fn test_lex_arithmetic() {
    let input = "1 + 2*x(3) - 4/5";
    let tokens: Vec<_> = lexer()
        .parse(input)
        .unwrap()
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    assert_eq!(
        tokens,
        vec![
            Token::Number("1".to_string()),
            Token::Plus,
            Token::Number("2".to_string()),
            Token::Star,
            Token::Ident("x".to_string()),
            Token::LParen,
            Token::Number("3".to_string()),
            Token::RParen,
            Token::Minus,
            Token::Number("4".to_string()),
            Token::Slash,
            Token::Number("5".to_string()),
        ]
    );
}

#[test]
fn test_lex_skips_comments() {
    let input = "1 + 2 # trailing note";
    let tokens: Vec<_> = lexer()
        .parse(input)
        .unwrap()
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    assert_eq!(
        tokens,
        vec![
            Token::Number("1".to_string()),
            Token::Plus,
            Token::Number("2".to_string()),
        ]
    );
}

// ============================================================================
// Parser tests
// ============================================================================

#[test]
fn test_parse_number() {
    assert_eq!(parse("42").unwrap(), Expr::Number(42.0));
    assert_eq!(parse("3.5").unwrap(), Expr::Number(3.5));
    assert_eq!(parse("2e3").unwrap(), Expr::Number(2000.0));
}

#[test]
fn test_parse_feature_ref() {
    assert_eq!(
        parse("constant(foo)").unwrap(),
        Expr::FeatureRef {
            name: "constant".to_string(),
            args: vec!["foo".to_string()],
        }
    );
}

#[test]
fn test_parse_feature_ref_multiple_args() {
    assert_eq!(
        parse("term(0, weight)").unwrap(),
        Expr::FeatureRef {
            name: "term".to_string(),
            args: vec!["0".to_string(), "weight".to_string()],
        }
    );
}

#[test]
fn test_parse_precedence() {
    // 1 + 2 * 3 groups as 1 + (2 * 3)
    let expr = parse("1 + 2 * 3").unwrap();
    assert_eq!(
        expr,
        Expr::BinOp {
            op: BinOp::Add,
            lhs: Box::new(Expr::Number(1.0)),
            rhs: Box::new(Expr::BinOp {
                op: BinOp::Mul,
                lhs: Box::new(Expr::Number(2.0)),
                rhs: Box::new(Expr::Number(3.0)),
            }),
        }
    );
}

#[test]
fn test_parse_parens_override_precedence() {
    let expr = parse("(1 + 2) * 3").unwrap();
    assert_eq!(
        expr,
        Expr::BinOp {
            op: BinOp::Mul,
            lhs: Box::new(Expr::BinOp {
                op: BinOp::Add,
                lhs: Box::new(Expr::Number(1.0)),
                rhs: Box::new(Expr::Number(2.0)),
            }),
            rhs: Box::new(Expr::Number(3.0)),
        }
    );
}

#[test]
fn test_parse_unary_minus() {
    assert_eq!(
        parse("-constant(foo)").unwrap(),
        Expr::Neg(Box::new(Expr::FeatureRef {
            name: "constant".to_string(),
            args: vec!["foo".to_string()],
        }))
    );
}

#[test]
fn test_parse_tensor_literal() {
    let expr = parse("{ {x:a}:3, {x:b}:5 }").unwrap();
    assert_eq!(
        expr,
        Expr::TensorLiteral(vec![
            CellExpr {
                address: vec![("x".to_string(), "a".to_string())],
                value: Expr::Number(3.0),
            },
            CellExpr {
                address: vec![("x".to_string(), "b".to_string())],
                value: Expr::Number(5.0),
            },
        ])
    );
}

#[test]
fn test_parse_tensor_literal_multi_dimension() {
    let expr = parse("{ {x:a, y:b}:1 }").unwrap();
    assert_eq!(
        expr,
        Expr::TensorLiteral(vec![CellExpr {
            address: vec![
                ("x".to_string(), "a".to_string()),
                ("y".to_string(), "b".to_string()),
            ],
            value: Expr::Number(1.0),
        }])
    );
}

#[test]
fn test_parse_tensor_literal_expression_cell() {
    let expr = parse("{ {x:a}: 1 + 2 }").unwrap();
    assert_eq!(
        expr,
        Expr::TensorLiteral(vec![CellExpr {
            address: vec![("x".to_string(), "a".to_string())],
            value: Expr::BinOp {
                op: BinOp::Add,
                lhs: Box::new(Expr::Number(1.0)),
                rhs: Box::new(Expr::Number(2.0)),
            },
        }])
    );
}

// ============================================================================
// Parse failures
// ============================================================================

#[test]
fn test_parse_error_unbalanced_paren() {
    assert!(parse("constant(foo").is_err());
}

#[test]
fn test_parse_error_unbalanced_brace() {
    assert!(parse("{ {x:a}:3 ").is_err());
    assert!(parse("{ {x:a :3 }").is_err());
}

#[test]
fn test_parse_error_missing_label() {
    assert!(parse("{ {x}:3 }").is_err());
    assert!(parse("{ {x:}:3 }").is_err());
}

#[test]
fn test_parse_error_bare_identifier_as_value() {
    // A bare identifier is not a value; cell values and operands must be
    // numbers, feature references, or tensor literals
    assert!(parse("{ {x:a}:oops }").is_err());
    assert!(parse("1 + oops").is_err());
}

#[test]
fn test_parse_error_trailing_garbage() {
    assert!(parse("1 2").is_err());
    assert!(parse("constant(foo))").is_err());
}

#[test]
fn test_parse_error_empty_input() {
    assert!(parse("").is_err());
}

#[test]
fn test_parse_error_invalid_character() {
    // Characters outside the token set fail at the lexer, before parsing
    assert!(parse("1 @ 2").is_err());
    assert!(parse("constant(foo$)").is_err());
    assert!(parse("{ {x:a}:3; }").is_err());
}

#[test]
fn test_parse_error_is_rendered() {
    let err = parse("constant(foo").unwrap_err();
    let rendered = err.to_string();
    assert!(!rendered.is_empty());
}

#[test]
fn test_lex_error_is_rendered() {
    let err = parse("1 @ 2").unwrap_err();
    let rendered = err.to_string();
    assert!(!rendered.is_empty());
}
