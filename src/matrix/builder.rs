use std::collections::{BTreeSet, HashMap};

use bitvec::prelude::*;
use thiserror::Error;
use tracing::info;

use super::DistanceMatrix;
use crate::bindash::{clamp_unit, PairwiseComparison};

/// Added to the largest observed distance to form the missing-pair value.
pub const MISSING_PAIR_PENALTY: f64 = 0.1;

/// Errors raised while building or wrapping a matrix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    /// Fewer than two distinct genomes: nothing to compare or cluster.
    #[error("insufficient data: {genomes} distinct genome(s), at least 2 required")]
    InsufficientData {
        /// Distinct genomes observed.
        genomes: usize,
    },

    /// Raw values do not form a `labels x labels` square.
    #[error("matrix with {labels} labels cannot be filled by {values} values")]
    DimensionMismatch {
        /// Number of labels.
        labels: usize,
        /// Number of values supplied.
        values: usize,
    },
}

/// Placeholder distance for genome pairs that were never compared:
/// worse than anything observed, capped at 1.
pub fn fill_value_for(max_observed: f64) -> f64 {
    (max_observed + MISSING_PAIR_PENALTY).min(1.0)
}

/// Expand comparisons into a complete, symmetric, zero-diagonal matrix.
///
/// Genomes are sorted lexicographically. Each comparison is written to both
/// `[query][target]` and `[target][query]`; a later comparison of the same
/// pair overwrites an earlier one. Cells still empty afterwards receive
/// [`fill_value_for`] the largest observed distance and are flagged as
/// imputed.
pub fn build_distance_matrix(
    comparisons: &[PairwiseComparison],
) -> Result<DistanceMatrix, MatrixError> {
    let genomes: BTreeSet<&str> = comparisons
        .iter()
        .flat_map(|c| [c.query.as_str(), c.target.as_str()])
        .collect();
    let n = genomes.len();
    if n < 2 {
        return Err(MatrixError::InsufficientData { genomes: n });
    }

    let index: HashMap<&str, usize> = genomes
        .iter()
        .enumerate()
        .map(|(idx, genome)| (*genome, idx))
        .collect();

    let mut cells: Vec<Option<f64>> = vec![None; n * n];
    for comparison in comparisons {
        let i = index[comparison.query.as_str()];
        let j = index[comparison.target.as_str()];
        let distance = clamp_unit(comparison.mutation_distance);
        cells[i * n + j] = Some(distance);
        cells[j * n + i] = Some(distance);
    }
    for i in 0..n {
        cells[i * n + i] = Some(0.0);
    }

    let max_observed = comparisons
        .iter()
        .map(|c| clamp_unit(c.mutation_distance))
        .fold(0.0, f64::max);
    let fill_value = fill_value_for(max_observed);

    let mut imputed = bitvec![0; n * n];
    let mut values = Vec::with_capacity(n * n);
    for (idx, cell) in cells.into_iter().enumerate() {
        match cell {
            Some(distance) => values.push(distance),
            None => {
                imputed.set(idx, true);
                values.push(fill_value);
            }
        }
    }

    let matrix = DistanceMatrix::from_parts(
        genomes.into_iter().map(str::to_string).collect(),
        values,
        imputed,
        fill_value,
    );
    info!(
        genomes = n,
        imputed_pairs = matrix.imputed_pairs(),
        fill_value,
        "built distance matrix"
    );
    Ok(matrix)
}
