//! Abstract syntax tree for ranking expressions
//!
//! The parser produces this tree; the interpreter lowers it to a linear
//! program (see `interpret`).

use std::fmt;

/// Binary arithmetic operators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinOp {
    /// Apply the operator to two IEEE-754 doubles
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => lhs / rhs,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
        }
    }
}

/// One cell of a tensor literal: an address binding each dimension to a
/// label, and an expression producing the cell value.
#[derive(Clone, Debug, PartialEq)]
pub struct CellExpr {
    /// (dimension, label) pairs as written, e.g. `{x:a, y:b}`
    pub address: Vec<(String, String)>,
    pub value: Expr,
}

/// A ranking expression
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Numeric literal, e.g. `42` or `1.25e-2`
    Number(f64),

    /// Feature reference, e.g. `constant(foo)`
    FeatureRef { name: String, args: Vec<String> },

    /// Unary negation
    Neg(Box<Expr>),

    /// Binary arithmetic, e.g. `a + b`
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// Tensor literal, e.g. `{ {x:a}:3, {x:b}:5 }`
    TensorLiteral(Vec<CellExpr>),
}

impl Expr {
    /// The canonical text of a feature reference, e.g. `constant(foo)`.
    ///
    /// This is the key under which an evaluation context binds the feature's
    /// resolved value. `None` for anything that is not a feature reference.
    pub fn feature_text(&self) -> Option<String> {
        match self {
            Expr::FeatureRef { name, args } => Some(feature_text(name, args)),
            _ => None,
        }
    }
}

/// Render the canonical `name(arg,...)` text of a feature reference
pub fn feature_text(name: &str, args: &[String]) -> String {
    format!("{}({})", name, args.join(","))
}
