//! Weighted directed graph representation and construction

pub mod matrix;
pub mod builder;
pub mod algorithms;

pub use matrix::AdjacencyMatrix;
pub use builder::build_matrix;
pub use algorithms::PowerSequence;
