//! Adjacency matrix construction from occurrence counts

use crate::counts::{BigramTable, UnigramTable, Vocabulary};
use crate::error::{PipelineError, Result};
use crate::graph::AdjacencyMatrix;

const STAGE: &str = "adjacency matrix builder";

/// Build the conditional-probability matrix weight(i -> j) = count(i, j) / count(i).
///
/// Tables may come fresh from counting or from an external cache; missing
/// entries count as 0. A token that was never observed transmits no weight.
/// The diagonal is left at 0.
pub fn build_matrix(
    vocabulary: &Vocabulary,
    unigrams: &UnigramTable,
    bigrams: &BigramTable,
) -> Result<AdjacencyMatrix> {
    let node_count = vocabulary.len();

    log::info!("Building {}x{} adjacency matrix", node_count, node_count);

    if unigrams.len() > node_count {
        return Err(PipelineError::DimensionMismatch {
            stage: STAGE,
            expected: node_count,
            actual: unigrams.len(),
        });
    }

    if let Some(max_index) = bigrams.max_index() {
        if max_index >= node_count {
            return Err(PipelineError::DimensionMismatch {
                stage: STAGE,
                expected: node_count,
                actual: max_index + 1,
            });
        }
    }

    let mut matrix = AdjacencyMatrix::zeros(node_count);
    let mut skipped = 0usize;

    for ((src, dst), count) in bigrams.iter() {
        let denominator = unigrams.get(src);
        if denominator == 0 {
            skipped += 1;
            continue;
        }
        matrix.set_weight(src, dst, count as f64 / denominator as f64)?;
    }

    if skipped > 0 {
        log::debug!("{} pairs had an unobserved source token", skipped);
    }
    log::info!(
        "Adjacency matrix has {} weighted edges ({} bytes)",
        matrix.edge_count(),
        matrix.memory_usage()
    );

    Ok(matrix)
}
