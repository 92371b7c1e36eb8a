//! Cell-wise tensor composition.
//!
//! Tensor operands combine over equal dimension sets only; within that, the
//! result ranges over the union of the two address sets, reading absent
//! cells as zero. There is no broadcasting between different shapes.

use std::collections::BTreeMap;
use std::fmt;

use super::sparse::Tensor;

/// Error type for tensor composition: operand dimension sets differ
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionMismatch {
    pub lhs: Vec<String>,
    pub rhs: Vec<String>,
}

impl fmt::Display for DimensionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tensor dimensions do not match: ({}) vs ({})",
            self.lhs.join(","),
            self.rhs.join(",")
        )
    }
}

impl std::error::Error for DimensionMismatch {}

/// Join two tensors cell-wise with a combining function.
///
/// Both operands must have the same dimension set. The result has a cell for
/// every address present in either operand, with `combine` applied to the
/// two cell values (absent cells contribute 0.0).
pub fn join(
    lhs: &Tensor,
    rhs: &Tensor,
    combine: impl Fn(f64, f64) -> f64,
) -> Result<Tensor, DimensionMismatch> {
    if lhs.dimensions() != rhs.dimensions() {
        return Err(DimensionMismatch {
            lhs: lhs.dimensions().to_vec(),
            rhs: rhs.dimensions().to_vec(),
        });
    }

    let mut cells: BTreeMap<Vec<String>, f64> = BTreeMap::new();
    for (address, &value) in lhs.cells() {
        cells.insert(address.clone(), combine(value, rhs.cell(address)));
    }
    for (address, &value) in rhs.cells() {
        cells
            .entry(address.clone())
            .or_insert_with(|| combine(0.0, value));
    }

    Ok(Tensor::from_canonical(lhs.dimensions().to_vec(), cells))
}

/// Apply a function to every stored cell of a tensor.
///
/// Used for scalar-with-tensor arithmetic and unary negation. Only stored
/// cells are touched; implicit zeros stay implicit.
pub fn map(tensor: &Tensor, apply: impl Fn(f64) -> f64) -> Tensor {
    let cells = tensor
        .cells()
        .iter()
        .map(|(address, &value)| (address.clone(), apply(value)))
        .collect();
    Tensor::from_canonical(tensor.dimensions().to_vec(), cells)
}
