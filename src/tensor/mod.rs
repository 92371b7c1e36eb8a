//! Sparse labeled tensors
//!
//! A ranking tensor is addressed by per-dimension string labels rather than
//! integer indexes, and stores only the cells that were given explicitly.
//! Absent cells read as zero for numeric composition.
//!
//! # Architecture
//!
//! - **sparse**: tensor storage (sorted dimensions + BTree cell map),
//!   construction and order-independent equality
//! - **algebra**: cell-wise joins between tensors and scalar maps

pub mod algebra;
mod sparse;

pub use algebra::{join, map, DimensionMismatch};
pub use sparse::{ShapeMismatch, Tensor};
