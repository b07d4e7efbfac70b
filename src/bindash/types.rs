use serde::{Deserialize, Serialize};

/// One canonical pairwise genome comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    /// First genome identifier (normalized file name).
    pub query: String,
    /// Second genome identifier.
    pub target: String,
    /// Estimated per-base divergence in `[0, 1]`.
    pub mutation_distance: f64,
    /// Significance of the distance estimate.
    pub p_value: f64,
    /// Sketch overlap similarity.
    pub jaccard_index: f64,
    /// Average nucleotide identity, always `1 - mutation_distance`.
    pub ani: f64,
}

impl PairwiseComparison {
    /// Build a record, clamping every metric into `[0, 1]` and deriving ANI
    /// from the clamped distance.
    pub fn new(
        query: impl Into<String>,
        target: impl Into<String>,
        mutation_distance: f64,
        p_value: f64,
        jaccard_index: f64,
    ) -> Self {
        let mutation_distance = clamp_unit(mutation_distance);
        Self {
            query: query.into(),
            target: target.into(),
            mutation_distance,
            p_value: clamp_unit(p_value),
            jaccard_index: clamp_unit(jaccard_index),
            ani: clamp_unit(1.0 - mutation_distance),
        }
    }

    /// Whether both sides name the same genome.
    pub fn is_self_pair(&self) -> bool {
        self.query == self.target
    }

    /// Order-independent key for the genome pair.
    pub fn pair_key(&self) -> (&str, &str) {
        if self.query <= self.target {
            (&self.query, &self.target)
        } else {
            (&self.target, &self.query)
        }
    }
}

/// Clamp into `[0, 1]`; NaN collapses to 0.
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
