//! rankexpr: ranking-expression evaluation core
//!
//! The value-resolution and tensor-expression machinery behind a document-
//! ranking feature framework: tagged scalar/tensor values, sparse labeled
//! tensors, a compile-once/evaluate-many expression interpreter, and the
//! `constant(<name>)` feature that resolves a named value from the query
//! environment once at setup and reuses it for every document.

pub mod ast;
pub mod error;
pub mod feature;
pub mod interpret;
pub mod lexer;
pub mod parser;
pub mod tensor;
pub mod value;

pub use ast::{BinOp, Expr};
pub use error::ParseError;
pub use feature::{
    Blueprint, ConstantBlueprint, ConstantRegistry, FeatureExecutor, RegistryError, SetupError,
};
pub use interpret::{CompileError, Context, EvalError, InterpretedFunction};
pub use lexer::lexer;
pub use parser::parser;
pub use tensor::Tensor;
pub use value::{Value, ValueType};

/// Parse a ranking expression into an AST
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    use chumsky::prelude::*;

    let tokens = lexer::lexer()
        .parse(input)
        .map_err(|errs| ParseError::from_lexer(input, errs))?;

    let token_stream: Vec<_> = tokens.iter().map(|(t, s)| (t.clone(), s.clone())).collect();
    let len = input.len();

    parser::parser()
        .parse(chumsky::Stream::from_iter(
            len..len + 1,
            token_stream.into_iter(),
        ))
        .map_err(|errs| ParseError::from_parser(input, errs, &tokens))
}
