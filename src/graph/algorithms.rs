//! Graph algorithms over the adjacency matrix

use crate::graph::AdjacencyMatrix;
use ndarray::{Array2, ArrayView2};

/// Successive matrix powers M^1, M^2, ..., M^max_power.
///
/// Each power is the previous one multiplied by M, so powers are produced
/// strictly in order. The base matrix is only borrowed.
pub struct PowerSequence<'a> {
    base: ArrayView2<'a, f64>,
    current: Option<Array2<f64>>,
    exponent: usize,
    max_power: usize,
}

impl<'a> PowerSequence<'a> {
    pub fn new(matrix: &'a AdjacencyMatrix, max_power: usize) -> Self {
        Self {
            base: matrix.view(),
            current: None,
            exponent: 0,
            max_power,
        }
    }

    /// Exponent of the most recently computed power (0 before the first step)
    pub fn exponent(&self) -> usize {
        self.exponent
    }

    /// Compute the next power, or `None` once `max_power` has been reached
    pub fn next_power(&mut self) -> Option<(usize, ArrayView2<'_, f64>)> {
        if self.exponent >= self.max_power {
            return None;
        }

        let next = match self.current.take() {
            None => self.base.to_owned(),
            Some(previous) => previous.dot(&self.base),
        };

        self.exponent += 1;
        log::debug!("Computed matrix power {}", self.exponent);

        let exponent = self.exponent;
        let current = self.current.insert(next);
        Some((exponent, current.view()))
    }
}
