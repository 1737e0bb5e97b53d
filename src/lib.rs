//! Co-occurrence graphs over a vocabulary and power-iteration clustering

pub mod config;
pub mod error;
pub mod data;
pub mod counts;
pub mod graph;
pub mod cluster;
pub mod storage;

pub use cluster::{cluster_graph, ClusterForm, ClusterMapping, ClusterResult};
pub use counts::{count_bigrams, count_unigrams, BigramTable, UnigramTable, Vocabulary};
pub use error::{PipelineError, Result};
pub use graph::{build_matrix, AdjacencyMatrix};
