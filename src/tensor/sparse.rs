//! Sparse labeled tensor (materialized).

use std::collections::BTreeMap;
use std::fmt;

/// Error type for tensor construction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShapeMismatch {
    /// No dimensions were declared; zero-dimensional tensors are degenerate
    /// and travel as scalar values instead
    NoDimensions,
    /// The same dimension was declared twice
    DuplicateDimension(String),
    /// A cell address binds a different number of dimensions than declared
    CellArity { expected: usize, got: usize },
    /// A cell address binds a dimension that was not declared
    UndeclaredDimension(String),
    /// A cell address binds the same dimension twice
    DuplicateCellDimension(String),
}

impl fmt::Display for ShapeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeMismatch::NoDimensions => {
                write!(f, "tensor must declare at least one dimension")
            }
            ShapeMismatch::DuplicateDimension(dim) => {
                write!(f, "dimension '{}' declared twice", dim)
            }
            ShapeMismatch::CellArity { expected, got } => {
                write!(
                    f,
                    "cell address binds {} dimensions, tensor declares {}",
                    got, expected
                )
            }
            ShapeMismatch::UndeclaredDimension(dim) => {
                write!(f, "cell address binds undeclared dimension '{}'", dim)
            }
            ShapeMismatch::DuplicateCellDimension(dim) => {
                write!(f, "cell address binds dimension '{}' twice", dim)
            }
        }
    }
}

impl std::error::Error for ShapeMismatch {}

/// A sparse tensor addressed by per-dimension labels.
///
/// Dimensions are held in lexicographic order; every cell address is a tuple
/// with one label per dimension, in that order. Equality is content equality
/// of the dimension set and the cell map, independent of the order cells
/// were supplied in, and exact on cell values (no epsilon).
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// Dimension names, sorted lexicographically
    dims: Vec<String>,
    /// Cell address (one label per dimension, in `dims` order) to cell value
    cells: BTreeMap<Vec<String>, f64>,
}

impl Tensor {
    /// Build a tensor from labeled cells.
    ///
    /// Each cell address is a set of `(dimension, label)` pairs and must bind
    /// exactly the declared dimensions. The declared dimension list may come
    /// in any order; it is canonicalized by sorting. Duplicate addresses:
    /// last write wins.
    pub fn create(
        cells: impl IntoIterator<Item = (Vec<(String, String)>, f64)>,
        mut dimensions: Vec<String>,
    ) -> Result<Tensor, ShapeMismatch> {
        if dimensions.is_empty() {
            return Err(ShapeMismatch::NoDimensions);
        }
        dimensions.sort();
        if let Some(dup) = dimensions.windows(2).find(|w| w[0] == w[1]) {
            return Err(ShapeMismatch::DuplicateDimension(dup[0].clone()));
        }

        let mut cell_map = BTreeMap::new();
        for (address, value) in cells {
            cell_map.insert(canonical_address(&address, &dimensions)?, value);
        }

        Ok(Tensor {
            dims: dimensions,
            cells: cell_map,
        })
    }

    /// Build from addresses already in canonical (sorted-dimension) order.
    ///
    /// The caller must have validated arity against `dims`; used by the
    /// interpreter after compile-time shape checking.
    pub(crate) fn from_canonical(dims: Vec<String>, cells: BTreeMap<Vec<String>, f64>) -> Tensor {
        debug_assert!(dims.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(cells.keys().all(|addr| addr.len() == dims.len()));
        Tensor { dims, cells }
    }

    /// Dimension names in canonical (lexicographic) order
    pub fn dimensions(&self) -> &[String] {
        &self.dims
    }

    /// Cell map, keyed by canonical-order label tuples
    pub fn cells(&self) -> &BTreeMap<Vec<String>, f64> {
        &self.cells
    }

    /// Number of explicitly stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True if no cells are stored (every cell reads as zero)
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read a cell by canonical-order label tuple; absent cells are zero
    pub fn cell(&self, address: &[String]) -> f64 {
        self.cells.get(address).copied().unwrap_or(0.0)
    }

    /// Structural equality: same dimension set, same (address, value) pairs.
    ///
    /// Equivalent to `==`; kept as a named method because call sites read
    /// better in assertions about tensors specifically.
    pub fn equals(&self, other: &Tensor) -> bool {
        self == other
    }
}

/// Translate a written address (any pair order) into the canonical tuple
fn canonical_address(
    address: &[(String, String)],
    dimensions: &[String],
) -> Result<Vec<String>, ShapeMismatch> {
    if address.len() != dimensions.len() {
        return Err(ShapeMismatch::CellArity {
            expected: dimensions.len(),
            got: address.len(),
        });
    }

    let mut tuple = vec![None; dimensions.len()];
    for (dim, label) in address {
        let slot = dimensions
            .iter()
            .position(|d| d == dim)
            .ok_or_else(|| ShapeMismatch::UndeclaredDimension(dim.clone()))?;
        if tuple[slot].is_some() {
            return Err(ShapeMismatch::DuplicateCellDimension(dim.clone()));
        }
        tuple[slot] = Some(label.clone());
    }

    // Arity matched and no dimension repeated, so every slot is filled
    Ok(tuple.into_iter().map(|label| label.unwrap()).collect())
}

impl fmt::Display for Tensor {
    /// Canonical rendering, re-parseable as a tensor literal:
    /// `{ {x:a}:3, {x:b}:5 }` with dimensions and cells in sorted order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ ")?;
        for (i, (address, value)) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{{")?;
            for (j, (dim, label)) in self.dims.iter().zip(address.iter()).enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}:{}", dim, label)?;
            }
            write!(f, "}}:{}", value)?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(dim: &str, label: &str) -> (String, String) {
        (dim.to_string(), label.to_string())
    }

    #[test]
    fn create_rejects_arity_mismatch() {
        let result = Tensor::create(
            vec![(vec![pair("x", "a")], 1.0)],
            vec!["x".to_string(), "y".to_string()],
        );
        assert_eq!(
            result.unwrap_err(),
            ShapeMismatch::CellArity {
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn create_rejects_undeclared_dimension() {
        let result = Tensor::create(vec![(vec![pair("y", "a")], 1.0)], vec!["x".to_string()]);
        assert_eq!(
            result.unwrap_err(),
            ShapeMismatch::UndeclaredDimension("y".to_string())
        );
    }

    #[test]
    fn create_rejects_empty_dimension_list() {
        let result = Tensor::create(vec![], vec![]);
        assert_eq!(result.unwrap_err(), ShapeMismatch::NoDimensions);
    }

    #[test]
    fn address_pair_order_does_not_matter() {
        let dims = vec!["x".to_string(), "y".to_string()];
        let a = Tensor::create(
            vec![(vec![pair("x", "a"), pair("y", "b")], 2.0)],
            dims.clone(),
        )
        .unwrap();
        let b = Tensor::create(vec![(vec![pair("y", "b"), pair("x", "a")], 2.0)], dims).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn absent_cells_read_as_zero() {
        let t = Tensor::create(vec![(vec![pair("x", "a")], 3.0)], vec!["x".to_string()]).unwrap();
        assert_eq!(t.cell(&["a".to_string()]), 3.0);
        assert_eq!(t.cell(&["b".to_string()]), 0.0);
    }

    #[test]
    fn display_is_canonical() {
        let t = Tensor::create(
            vec![
                (vec![pair("x", "b")], 5.0),
                (vec![pair("x", "a")], 3.0),
            ],
            vec!["x".to_string()],
        )
        .unwrap();
        assert_eq!(t.to_string(), "{ {x:a}:3, {x:b}:5 }");
    }
}
