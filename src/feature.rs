//! The constant ranking feature and its registry
//!
//! Constants are declared by the query environment before any feature setup
//! runs, and are immutable from then on. The `constant(<name>)` feature
//! resolves its name once at setup; per-document execution hands out the
//! same resolved value without touching the registry again.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::Expr;
use crate::tensor::Tensor;
use crate::value::{Value, ValueType};

/// The feature name `constant(<name>)` is registered under
pub const CONSTANT_FEATURE: &str = "constant";

/// Error type for constant registration
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryError {
    /// The name is already registered; collisions are a configuration bug
    /// and are never silently overwritten
    DuplicateConstant(String),
    /// The declared type does not match the value's actual shape
    TypeMismatch {
        name: String,
        declared: ValueType,
        actual: ValueType,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateConstant(name) => {
                write!(f, "constant '{}' is already registered", name)
            }
            RegistryError::TypeMismatch {
                name,
                declared,
                actual,
            } => {
                write!(
                    f,
                    "constant '{}' declared as {} but its value is {}",
                    name, declared, actual
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Error type for feature setup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetupError {
    /// The configured name is not in the registry. This aborts setup of the
    /// whole ranking expression; it is never a per-document failure.
    ConstantNotFound(String),
    /// The expression is not a feature reference this blueprint handles
    UnknownFeature(String),
    /// Wrong number of arguments for the feature
    UnexpectedArity {
        feature: String,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::ConstantNotFound(name) => {
                write!(f, "no constant named '{}' in the environment", name)
            }
            SetupError::UnknownFeature(name) => {
                write!(f, "'{}' is not a constant feature reference", name)
            }
            SetupError::UnexpectedArity {
                feature,
                expected,
                got,
            } => {
                write!(
                    f,
                    "feature '{}' takes {} argument(s), got {}",
                    feature, expected, got
                )
            }
        }
    }
}

impl std::error::Error for SetupError {}

/// A registered constant: its declared type and shared value
#[derive(Clone, Debug)]
pub struct Constant {
    value_type: ValueType,
    value: Arc<Value>,
}

impl Constant {
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    pub fn value(&self) -> &Arc<Value> {
        &self.value
    }
}

/// Named constants supplied by the query environment.
///
/// Populated entirely before feature setup begins; `lookup` takes `&self`
/// and never mutates, so a populated registry is safe to share across
/// concurrently running setup and execution threads.
#[derive(Clone, Debug, Default)]
pub struct ConstantRegistry {
    constants: IndexMap<String, Constant>,
}

impl ConstantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constant under a declared type.
    ///
    /// Fails if the name is taken or the declared type does not structurally
    /// match the value.
    pub fn add_constant(
        &mut self,
        name: impl Into<String>,
        value_type: ValueType,
        value: Value,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.constants.contains_key(&name) {
            return Err(RegistryError::DuplicateConstant(name));
        }
        if !value_type.matches(&value) {
            return Err(RegistryError::TypeMismatch {
                name,
                declared: value_type,
                actual: ValueType::of(&value),
            });
        }
        self.constants.insert(
            name,
            Constant {
                value_type,
                value: Arc::new(value),
            },
        );
        Ok(())
    }

    /// Register a scalar constant, deriving the declared type
    pub fn add_double(&mut self, name: impl Into<String>, value: f64) -> Result<(), RegistryError> {
        self.add_constant(name, ValueType::Double, Value::from_double(value))
    }

    /// Register a tensor constant, deriving the declared type
    pub fn add_tensor(
        &mut self,
        name: impl Into<String>,
        tensor: Tensor,
    ) -> Result<(), RegistryError> {
        let value = Value::from_tensor(tensor);
        self.add_constant(name, ValueType::of(&value), value)
    }

    /// Look up a constant by name; read-only
    pub fn lookup(&self, name: &str) -> Option<&Constant> {
        self.constants.get(name)
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

/// A bound, per-document-executable feature.
///
/// Executors are immutable after setup, so one instance may serve many
/// worker threads at once.
pub trait FeatureExecutor: Send + Sync {
    /// Produce the feature's value for one document.
    ///
    /// Hands out a shared view; implementations must not recompute or deep-
    /// copy per call.
    fn execute(&self, doc_id: u32) -> Arc<Value>;
}

/// A configured-but-unbound feature: setup resolves names against the
/// environment and either installs an executor or fails the whole ranking
/// expression.
pub trait Blueprint {
    fn name(&self) -> &str;

    fn setup(&self, registry: &ConstantRegistry)
        -> Result<Box<dyn FeatureExecutor>, SetupError>;
}

/// Blueprint for `constant(<name>)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstantBlueprint {
    constant_name: String,
}

impl ConstantBlueprint {
    pub fn new(constant_name: impl Into<String>) -> Self {
        Self {
            constant_name: constant_name.into(),
        }
    }

    /// Recognize a parsed `constant(<name>)` reference.
    ///
    /// Anything else (a different feature, or the wrong argument count) is a
    /// setup error, reported before the registry is ever consulted.
    pub fn from_expr(expr: &Expr) -> Result<Self, SetupError> {
        match expr {
            Expr::FeatureRef { name, args } if name == CONSTANT_FEATURE => {
                if args.len() != 1 {
                    return Err(SetupError::UnexpectedArity {
                        feature: CONSTANT_FEATURE.to_string(),
                        expected: 1,
                        got: args.len(),
                    });
                }
                Ok(Self::new(args[0].clone()))
            }
            Expr::FeatureRef { name, .. } => Err(SetupError::UnknownFeature(name.clone())),
            _ => Err(SetupError::UnknownFeature(expr_summary(expr))),
        }
    }

    pub fn constant_name(&self) -> &str {
        &self.constant_name
    }
}

fn expr_summary(expr: &Expr) -> String {
    match expr {
        Expr::Number(value) => value.to_string(),
        Expr::TensorLiteral(_) => "tensor literal".to_string(),
        _ => "composite expression".to_string(),
    }
}

impl Blueprint for ConstantBlueprint {
    fn name(&self) -> &str {
        CONSTANT_FEATURE
    }

    /// Resolve the configured name once.
    ///
    /// The executor shares ownership of the registered value, so the
    /// registry may be dropped after setup without invalidating execution.
    fn setup(
        &self,
        registry: &ConstantRegistry,
    ) -> Result<Box<dyn FeatureExecutor>, SetupError> {
        let constant = registry
            .lookup(&self.constant_name)
            .ok_or_else(|| SetupError::ConstantNotFound(self.constant_name.clone()))?;
        Ok(Box::new(ConstantExecutor {
            value: Arc::clone(constant.value()),
        }))
    }
}

/// Bound `constant` feature: returns the resolved value for every document
#[derive(Clone, Debug)]
pub struct ConstantExecutor {
    value: Arc<Value>,
}

impl FeatureExecutor for ConstantExecutor {
    fn execute(&self, _doc_id: u32) -> Arc<Value> {
        Arc::clone(&self.value)
    }
}
