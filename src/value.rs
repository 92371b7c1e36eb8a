//! Tagged result values
//!
//! Every ranking computation produces either a scalar double or a sparse
//! tensor. The two tags never coerce into each other; extracting the wrong
//! one is a contract violation in the calling feature and fails fast.

use std::collections::BTreeSet;
use std::fmt;

use crate::tensor::Tensor;

/// The result of evaluating a ranking expression or feature
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Double(f64),
    Tensor(Tensor),
}

impl Value {
    pub fn from_double(value: f64) -> Self {
        Value::Double(value)
    }

    pub fn from_tensor(tensor: Tensor) -> Self {
        Value::Tensor(tensor)
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Value::Double(_))
    }

    pub fn is_tensor(&self) -> bool {
        matches!(self, Value::Tensor(_))
    }

    /// Extract the scalar.
    ///
    /// Panics if the value is a tensor: type-correct wiring is established
    /// at setup, so a mismatch here is a bug in the caller, not bad data.
    pub fn as_double(&self) -> f64 {
        match self {
            Value::Double(value) => *value,
            Value::Tensor(_) => panic!("as_double() called on a tensor value"),
        }
    }

    /// Extract the tensor.
    ///
    /// Panics if the value is a double, for the same reason as `as_double`.
    pub fn as_tensor(&self) -> &Tensor {
        match self {
            Value::Tensor(tensor) => tensor,
            Value::Double(_) => panic!("as_tensor() called on a double value"),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<Tensor> for Value {
    fn from(tensor: Tensor) -> Self {
        Value::Tensor(tensor)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Double(value) => write!(f, "{}", value),
            Value::Tensor(tensor) => write!(f, "{}", tensor),
        }
    }
}

/// The declared type of a constant, checked against the value's actual shape
/// when the constant is registered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueType {
    Double,
    Tensor { dimensions: BTreeSet<String> },
}

impl ValueType {
    /// Derive the type from a value's actual shape
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Double(_) => ValueType::Double,
            Value::Tensor(tensor) => ValueType::Tensor {
                dimensions: tensor.dimensions().iter().cloned().collect(),
            },
        }
    }

    /// Check that a value structurally matches this declared type
    pub fn matches(&self, value: &Value) -> bool {
        *self == ValueType::of(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Double => write!(f, "double"),
            ValueType::Tensor { dimensions } => {
                write!(f, "tensor(")?;
                for (i, dim) in dimensions.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", dim)?;
                }
                write!(f, ")")
            }
        }
    }
}
