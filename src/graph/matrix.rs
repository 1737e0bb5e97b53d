//! Dense adjacency matrix for directed weighted graphs

use crate::error::{PipelineError, Result};
use ndarray::{Array2, ArrayView2};
use std::mem;

/// Square matrix of directed edge weights.
///
/// Entry (i, j) is the influence of node i on node j. Consumers only get
/// read access; the dimension is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix {
    weights: Array2<f64>,
}

impl AdjacencyMatrix {
    /// All-zero matrix over `node_count` nodes
    pub fn zeros(node_count: usize) -> Self {
        Self {
            weights: Array2::zeros((node_count, node_count)),
        }
    }

    /// Take ownership of an existing array, which must be square
    pub fn from_array(weights: Array2<f64>) -> Result<Self> {
        let (rows, cols) = weights.dim();
        if rows != cols {
            return Err(PipelineError::NonSquareMatrix { rows, cols });
        }
        Ok(Self { weights })
    }

    /// Build from row vectors; every row must have one entry per row
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n = rows.len();
        let mut weights = Array2::zeros((n, n));

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(PipelineError::NonSquareMatrix {
                    rows: n,
                    cols: row.len(),
                });
            }
            for (j, weight) in row.into_iter().enumerate() {
                weights[(i, j)] = weight;
            }
        }

        Ok(Self { weights })
    }

    /// Number of nodes (rows == columns)
    pub fn dim(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weight(&self, src: usize, dst: usize) -> Option<f64> {
        self.weights.get((src, dst)).copied()
    }

    /// Overwrite a single edge weight, e.g. to inject a self-loop
    pub fn set_weight(&mut self, src: usize, dst: usize, weight: f64) -> Result<()> {
        let n = self.dim();
        match self.weights.get_mut((src, dst)) {
            Some(cell) => {
                *cell = weight;
                Ok(())
            }
            None => Err(PipelineError::DimensionMismatch {
                stage: "adjacency matrix",
                expected: n,
                actual: src.max(dst) + 1,
            }),
        }
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Number of off-diagonal entries with a non-zero weight
    pub fn edge_count(&self) -> usize {
        self.weights
            .indexed_iter()
            .filter(|&((i, j), &w)| i != j && w != 0.0)
            .count()
    }

    /// Estimate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        mem::size_of::<Self>() + self.weights.len() * mem::size_of::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_rejects_non_square() {
        let result = AdjacencyMatrix::from_array(Array2::zeros((2, 3)));
        assert_eq!(
            result,
            Err(PipelineError::NonSquareMatrix { rows: 2, cols: 3 })
        );

        let result = AdjacencyMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.3]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_rows_matches_array() {
        let from_rows = AdjacencyMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.3, 1.0]]).unwrap();
        let from_array = AdjacencyMatrix::from_array(array![[1.0, 0.5], [0.3, 1.0]]).unwrap();

        assert_eq!(from_rows, from_array);
        assert_eq!(from_rows.dim(), 2);
        assert_eq!(from_rows.weight(0, 1), Some(0.5));
        assert_eq!(from_rows.weight(2, 0), None);
    }

    #[test]
    fn test_set_weight_bounds() {
        let mut matrix = AdjacencyMatrix::zeros(2);
        matrix.set_weight(1, 1, 0.7).unwrap();
        assert_eq!(matrix.weight(1, 1), Some(0.7));
        assert!(matrix.set_weight(2, 0, 1.0).is_err());
    }

    #[test]
    fn test_edge_count_ignores_diagonal() {
        let matrix = AdjacencyMatrix::from_array(array![[1.0, 0.5], [0.0, 1.0]]).unwrap();
        assert_eq!(matrix.edge_count(), 1);
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = AdjacencyMatrix::from_rows(Vec::new()).unwrap();
        assert_eq!(matrix.dim(), 0);
        assert_eq!(matrix.edge_count(), 0);
    }
}
