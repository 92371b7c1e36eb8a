//! Compiled expression programs
//!
//! Ranking evaluates one expression against many documents, so parsing and
//! lowering happen once per query plan and only `eval` runs per document.
//! An `InterpretedFunction` is the immutable compiled program; each `eval`
//! call gets a `Context` carrying the per-evaluation state (named-value
//! bindings and the working stack).

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::{BinOp, CellExpr, Expr};
use crate::tensor::{join, map, DimensionMismatch, Tensor};
use crate::value::Value;

/// Error type for lowering an AST into a program
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    /// A tensor literal with no cells; the grammar never produces one, but
    /// the AST can be built directly
    EmptyTensorLiteral,
    /// A tensor-literal cell binds the same dimension twice
    DuplicateCellDimension(String),
    /// A tensor-literal cell addresses a different dimension set than the
    /// literal's first cell
    InconsistentCellAddress {
        expected: Vec<String>,
        got: Vec<String>,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::EmptyTensorLiteral => {
                write!(f, "tensor literal has no cells")
            }
            CompileError::DuplicateCellDimension(dim) => {
                write!(f, "tensor literal cell binds dimension '{}' twice", dim)
            }
            CompileError::InconsistentCellAddress { expected, got } => {
                write!(
                    f,
                    "tensor literal cell addresses dimensions ({}), expected ({})",
                    got.join(","),
                    expected.join(",")
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Error type for evaluating a compiled program
#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    /// Tensor operands with incompatible dimension sets
    DimensionMismatch(DimensionMismatch),
    /// A named reference the context has no binding for
    UnknownSymbol(String),
    /// A tensor-literal cell expression produced a tensor, not a scalar
    CellNotScalar,
    /// Stack protocol violation; indicates a bug in the compiler
    Internal(&'static str),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DimensionMismatch(inner) => write!(f, "{}", inner),
            EvalError::UnknownSymbol(name) => {
                write!(f, "no value bound for '{}' in evaluation context", name)
            }
            EvalError::CellNotScalar => {
                write!(f, "tensor literal cell evaluated to a tensor value")
            }
            EvalError::Internal(msg) => write!(f, "internal evaluation error: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

impl From<DimensionMismatch> for EvalError {
    fn from(inner: DimensionMismatch) -> Self {
        EvalError::DimensionMismatch(inner)
    }
}

/// One instruction of a compiled program
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    /// Push a numeric literal
    PushLiteral(f64),
    /// Push the context's value for the given symbol table entry
    LoadNamed(usize),
    /// Pop two operands, push the combined result
    Apply(BinOp),
    /// Pop one operand, push its negation
    Negate,
    /// Pop one scalar per address (pushed in address order) and assemble a
    /// tensor; addresses are canonical-order label tuples
    ConstructTensor {
        dimensions: Vec<String>,
        addresses: Vec<Vec<String>>,
    },
}

/// Per-evaluation state: named-value bindings plus the working stack.
///
/// Bindings persist across `eval` calls; the stack is private to each call.
#[derive(Clone, Debug, Default)]
pub struct Context {
    bindings: IndexMap<String, Arc<Value>>,
    stack: Vec<Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a named reference (e.g. `constant(foo)`) to a value
    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), Arc::new(value));
    }

    /// Bind a shared value without copying it
    pub fn bind_shared(&mut self, name: impl Into<String>, value: Arc<Value>) {
        self.bindings.insert(name.into(), value);
    }

    /// Look up a bound value by canonical reference text
    pub fn lookup(&self, name: &str) -> Option<&Arc<Value>> {
        self.bindings.get(name)
    }
}

/// A compiled, reusable ranking expression.
///
/// Immutable after `compile`; safe to share across evaluation threads since
/// every `eval` call works on its own `Context`.
#[derive(Clone, Debug, PartialEq)]
pub struct InterpretedFunction {
    program: Vec<Instr>,
    symbols: Vec<String>,
}

impl InterpretedFunction {
    /// Lower an AST into a linear program.
    ///
    /// Tensor-literal shape consistency is checked here, before any
    /// evaluation is attempted.
    pub fn compile(expr: &Expr) -> Result<InterpretedFunction, CompileError> {
        let mut compiler = Compiler {
            program: Vec::new(),
            symbols: Vec::new(),
        };
        compiler.lower(expr)?;
        Ok(InterpretedFunction {
            program: compiler.program,
            symbols: compiler.symbols,
        })
    }

    /// Canonical texts of the named references this program loads, in first-
    /// use order. A host wires these up before evaluating.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// The compiled instruction sequence
    pub fn program(&self) -> &[Instr] {
        &self.program
    }

    /// Execute the program against a context and produce a single value.
    ///
    /// Pure given the context's bindings; may be called any number of times
    /// (once per document) without re-parsing.
    pub fn eval(&self, ctx: &mut Context) -> Result<Value, EvalError> {
        ctx.stack.clear();
        for instr in &self.program {
            match instr {
                Instr::PushLiteral(value) => ctx.stack.push(Value::Double(*value)),
                Instr::LoadNamed(symbol) => {
                    let name = &self.symbols[*symbol];
                    let value = match ctx.lookup(name) {
                        Some(value) => Value::clone(value),
                        None => return Err(EvalError::UnknownSymbol(name.clone())),
                    };
                    ctx.stack.push(value);
                }
                Instr::Apply(op) => {
                    let rhs = pop(&mut ctx.stack)?;
                    let lhs = pop(&mut ctx.stack)?;
                    ctx.stack.push(apply(*op, &lhs, &rhs)?);
                }
                Instr::Negate => {
                    let operand = pop(&mut ctx.stack)?;
                    let negated = match operand {
                        Value::Double(value) => Value::Double(-value),
                        Value::Tensor(tensor) => Value::Tensor(map(&tensor, |v| -v)),
                    };
                    ctx.stack.push(negated);
                }
                Instr::ConstructTensor {
                    dimensions,
                    addresses,
                } => {
                    let mut cell_values = Vec::with_capacity(addresses.len());
                    for _ in addresses {
                        match pop(&mut ctx.stack)? {
                            Value::Double(value) => cell_values.push(value),
                            Value::Tensor(_) => return Err(EvalError::CellNotScalar),
                        }
                    }
                    cell_values.reverse();

                    // Insertion in literal order keeps last-write-wins for
                    // duplicate addresses
                    let mut cells = BTreeMap::new();
                    for (address, value) in addresses.iter().zip(cell_values) {
                        cells.insert(address.clone(), value);
                    }
                    ctx.stack
                        .push(Value::Tensor(Tensor::from_canonical(
                            dimensions.clone(),
                            cells,
                        )));
                }
            }
        }

        let result = pop(&mut ctx.stack)?;
        if !ctx.stack.is_empty() {
            debug_assert!(false, "leftover operands after evaluation");
            return Err(EvalError::Internal("leftover operands after evaluation"));
        }
        Ok(result)
    }
}

fn pop(stack: &mut Vec<Value>) -> Result<Value, EvalError> {
    stack
        .pop()
        .ok_or(EvalError::Internal("operand stack underflow"))
}

/// Combine two values with a binary operator.
///
/// Tensor-with-tensor requires equal dimension sets and joins cell-wise over
/// the union of addresses; a scalar on either side is applied against every
/// stored cell of the tensor operand.
fn apply(op: BinOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    let result = match (lhs, rhs) {
        (Value::Double(a), Value::Double(b)) => Value::Double(op.apply(*a, *b)),
        (Value::Tensor(a), Value::Tensor(b)) => {
            Value::Tensor(join(a, b, |x, y| op.apply(x, y))?)
        }
        (Value::Double(a), Value::Tensor(b)) => Value::Tensor(map(b, |cell| op.apply(*a, cell))),
        (Value::Tensor(a), Value::Double(b)) => Value::Tensor(map(a, |cell| op.apply(cell, *b))),
    };
    Ok(result)
}

struct Compiler {
    program: Vec<Instr>,
    symbols: Vec<String>,
}

impl Compiler {
    fn lower(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Number(value) => self.program.push(Instr::PushLiteral(*value)),
            Expr::FeatureRef { name, args } => {
                let symbol = self.intern(crate::ast::feature_text(name, args));
                self.program.push(Instr::LoadNamed(symbol));
            }
            Expr::Neg(inner) => {
                self.lower(inner)?;
                self.program.push(Instr::Negate);
            }
            Expr::BinOp { op, lhs, rhs } => {
                self.lower(lhs)?;
                self.lower(rhs)?;
                self.program.push(Instr::Apply(*op));
            }
            Expr::TensorLiteral(cells) => self.lower_tensor_literal(cells)?,
        }
        Ok(())
    }

    fn lower_tensor_literal(&mut self, cells: &[CellExpr]) -> Result<(), CompileError> {
        // The first cell fixes the literal's dimension set
        let first = cells.first().ok_or(CompileError::EmptyTensorLiteral)?;
        let dimensions = sorted_dimensions(&first.address)?;

        let mut addresses = Vec::with_capacity(cells.len());
        for cell in cells {
            addresses.push(canonical_tuple(&cell.address, &dimensions)?);
            self.lower(&cell.value)?;
        }

        self.program.push(Instr::ConstructTensor {
            dimensions,
            addresses,
        });
        Ok(())
    }

    fn intern(&mut self, name: String) -> usize {
        match self.symbols.iter().position(|s| *s == name) {
            Some(index) => index,
            None => {
                self.symbols.push(name);
                self.symbols.len() - 1
            }
        }
    }
}

/// Sorted dimension names of a cell address, rejecting duplicates
fn sorted_dimensions(address: &[(String, String)]) -> Result<Vec<String>, CompileError> {
    let mut dims: Vec<String> = address.iter().map(|(dim, _)| dim.clone()).collect();
    dims.sort();
    if let Some(dup) = dims.windows(2).find(|w| w[0] == w[1]) {
        return Err(CompileError::DuplicateCellDimension(dup[0].clone()));
    }
    Ok(dims)
}

/// Canonical-order label tuple for one cell address
fn canonical_tuple(
    address: &[(String, String)],
    dimensions: &[String],
) -> Result<Vec<String>, CompileError> {
    let own = sorted_dimensions(address)?;
    if own != dimensions {
        return Err(CompileError::InconsistentCellAddress {
            expected: dimensions.to_vec(),
            got: own,
        });
    }
    Ok(dimensions
        .iter()
        .map(|dim| {
            address
                .iter()
                .find(|(d, _)| d == dim)
                .map(|(_, label)| label.clone())
                .unwrap()
        })
        .collect())
}
