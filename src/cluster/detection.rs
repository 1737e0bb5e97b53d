//! Power-iteration cluster detection

use crate::cluster::{ClusterForm, ClusterMapping, ClusterResult};
use crate::counts::Vocabulary;
use crate::error::{PipelineError, Result};
use crate::graph::{AdjacencyMatrix, PowerSequence};
use ndarray::ArrayView2;
use rayon::prelude::*;
use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};

/// Matrices with at least this many rows are scanned in parallel
const PARALLEL_SCAN_ROWS: usize = 512;

/// Off-diagonal entries of one matrix power that strictly exceed `theta`
fn threshold_crossings(power: ArrayView2<'_, f64>, theta: f64) -> Vec<(usize, usize)> {
    let scan_row = |src: usize| {
        power
            .row(src)
            .indexed_iter()
            .filter(move |&(dst, &value)| dst != src && value > theta)
            .map(move |(dst, _)| (src, dst))
            .collect::<Vec<_>>()
    };

    let rows = power.nrows();
    if rows < PARALLEL_SCAN_ROWS {
        return (0..rows).flat_map(scan_row).collect();
    }

    (0..rows).into_par_iter().flat_map_iter(scan_row).collect()
}

/// Depth to iterate to, or `None` when `k <= 0` requests no clustering
fn iteration_depth(k: i64) -> Option<usize> {
    if k <= 0 {
        log::info!("Clustering depth {} requests no result", k);
        return None;
    }
    Some(usize::try_from(k).unwrap_or(usize::MAX))
}

/// Union of threshold crossings over powers 1..=depth.
///
/// `before_power` runs before each power with the number of powers already
/// completed; an `Err` from it stops the run without a mapping.
fn accumulate_powers<E, F>(
    matrix: &AdjacencyMatrix,
    theta: f64,
    depth: usize,
    mut before_power: F,
) -> std::result::Result<ClusterMapping, E>
where
    F: FnMut(usize) -> std::result::Result<(), E>,
{
    let node_count = matrix.dim();
    log::info!(
        "Clustering {} nodes over matrix powers 1..={} with theta {}",
        node_count,
        depth,
        theta
    );

    let mut mapping = ClusterMapping::with_nodes(node_count);
    let mut powers = PowerSequence::new(matrix, depth);

    loop {
        before_power(powers.exponent())?;

        let Some((exponent, power)) = powers.next_power() else {
            break;
        };

        let mut added = 0usize;
        for (src, dst) in threshold_crossings(power, theta) {
            if mapping.record(src, dst) {
                added += 1;
            }
        }
        log::debug!("Power {} added {} relationships", exponent, added);
    }

    log::info!(
        "Found {} relationships across {} nodes",
        mapping.relationship_count(),
        node_count
    );

    Ok(mapping)
}

/// Find clusters by examining matrix powers 1..=k.
///
/// Node j becomes a partner of node i when some power M^m, 1 <= m <= k, has
/// an entry (i, j) strictly greater than `theta`. Self-relations (i == i) are
/// never recorded. Every node appears in the result, possibly with no
/// partners.
///
/// Returns `None` when `k <= 0`: no clustering was requested, which is
/// different from a mapping where every partner set is empty.
pub fn cluster_graph(
    matrix: &AdjacencyMatrix,
    theta: f64,
    k: i64,
    form: ClusterForm,
) -> Option<ClusterResult> {
    let depth = iteration_depth(k)?;
    let mapping = match accumulate_powers::<Infallible, _>(matrix, theta, depth, |_| Ok(())) {
        Ok(mapping) => mapping,
        Err(never) => match never {},
    };
    Some(ClusterResult::from_mapping(mapping, form))
}

/// [`cluster_graph`] that checks `cancel` before computing each power.
///
/// A cancelled run returns [`PipelineError::Cancelled`] and no partial mapping.
pub fn cluster_graph_cancellable(
    matrix: &AdjacencyMatrix,
    theta: f64,
    k: i64,
    form: ClusterForm,
    cancel: &AtomicBool,
) -> Result<Option<ClusterResult>> {
    let Some(depth) = iteration_depth(k) else {
        return Ok(None);
    };

    let mapping = accumulate_powers(matrix, theta, depth, |completed_powers| {
        if cancel.load(Ordering::Relaxed) {
            return Err(PipelineError::Cancelled { completed_powers });
        }
        Ok(())
    })?;

    Ok(Some(ClusterResult::from_mapping(mapping, form)))
}

/// Cluster a matrix built over `vocabulary`, checking that the sizes agree
pub fn cluster_vocabulary(
    vocabulary: &Vocabulary,
    matrix: &AdjacencyMatrix,
    theta: f64,
    k: i64,
    form: ClusterForm,
) -> Result<Option<ClusterResult>> {
    if matrix.dim() != vocabulary.len() {
        return Err(PipelineError::DimensionMismatch {
            stage: "clustering engine",
            expected: vocabulary.len(),
            actual: matrix.dim(),
        });
    }
    Ok(cluster_graph(matrix, theta, k, form))
}
