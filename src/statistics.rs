//! Descriptive statistics over pairwise comparisons.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::bindash::PairwiseComparison;

/// Summary written to `summary_stats.json`.
///
/// Standard deviations use the sample (n - 1) denominator and quantiles
/// interpolate linearly between closest ranks. Figures that are undefined for
/// the input size (any figure with no comparisons, deviations with one) are
/// reported as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Number of comparisons.
    pub total_comparisons: usize,
    /// Distinct genomes on either side.
    pub unique_genomes: usize,
    /// Mean ANI.
    pub mean_ani: f64,
    /// Sample standard deviation of ANI.
    pub std_ani: f64,
    /// Smallest ANI.
    pub min_ani: f64,
    /// Largest ANI.
    pub max_ani: f64,
    /// Mean mutation distance.
    pub mean_mutation_distance: f64,
    /// Sample standard deviation of the mutation distance.
    pub std_mutation_distance: f64,
    /// Mean Jaccard index.
    pub mean_jaccard: f64,
    /// Sample standard deviation of the Jaccard index.
    pub std_jaccard: f64,
    /// Median ANI.
    pub median_ani: f64,
    /// First ANI quartile.
    pub q25_ani: f64,
    /// Third ANI quartile.
    pub q75_ani: f64,
}

/// Summarize a comparison list. Never fails; empty input yields zeros.
pub fn summarize(comparisons: &[PairwiseComparison]) -> SummaryStatistics {
    let unique_genomes = comparisons
        .iter()
        .flat_map(|c| [c.query.as_str(), c.target.as_str()])
        .collect::<BTreeSet<_>>()
        .len();

    let ani: Vec<f64> = comparisons.iter().map(|c| c.ani).collect();
    let distance: Vec<f64> = comparisons.iter().map(|c| c.mutation_distance).collect();
    let jaccard: Vec<f64> = comparisons.iter().map(|c| c.jaccard_index).collect();

    let mut sorted_ani = ani.clone();
    sorted_ani.sort_by(f64::total_cmp);

    SummaryStatistics {
        total_comparisons: comparisons.len(),
        unique_genomes,
        mean_ani: mean(&ani),
        std_ani: sample_std(&ani),
        min_ani: sorted_ani.first().copied().unwrap_or(0.0),
        max_ani: sorted_ani.last().copied().unwrap_or(0.0),
        mean_mutation_distance: mean(&distance),
        std_mutation_distance: sample_std(&distance),
        mean_jaccard: mean(&jaccard),
        std_jaccard: sample_std(&jaccard),
        median_ani: quantile(&sorted_ani, 0.5),
        q25_ani: quantile(&sorted_ani, 0.25),
        q75_ani: quantile(&sorted_ani, 0.75),
    }
}

/// Arithmetic mean, 0 for no values.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation, 0 for fewer than two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linearly interpolated quantile of already sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let position = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = position.floor() as usize;
            let upper = position.ceil() as usize;
            let weight = position - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmp(q: &str, t: &str, d: f64) -> PairwiseComparison {
        PairwiseComparison::new(q, t, d, 0.0, 1.0 - d)
    }

    #[test]
    fn quartiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn sample_standard_deviation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_std(&values) - 2.138089935299395).abs() < 1e-12);
    }

    #[test]
    fn summary_of_three_comparisons() {
        let stats = summarize(&[
            cmp("g1", "g2", 0.1),
            cmp("g1", "g3", 0.2),
            cmp("g2", "g3", 0.3),
        ]);
        assert_eq!(stats.total_comparisons, 3);
        assert_eq!(stats.unique_genomes, 3);
        assert!((stats.mean_ani - 0.8).abs() < 1e-12);
        assert!((stats.median_ani - 0.8).abs() < 1e-12);
        assert!((stats.min_ani - 0.7).abs() < 1e-12);
        assert!((stats.max_ani - 0.9).abs() < 1e-12);
        assert!((stats.std_mutation_distance - 0.1).abs() < 1e-12);
        assert!((stats.q25_ani - 0.75).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_do_not_fail() {
        let empty = summarize(&[]);
        assert_eq!(empty.total_comparisons, 0);
        assert_eq!(empty, SummaryStatistics::default());

        let single = summarize(&[cmp("g1", "g2", 0.05)]);
        assert_eq!(single.total_comparisons, 1);
        assert_eq!(single.unique_genomes, 2);
        assert_eq!(single.std_ani, 0.0);
        assert!((single.median_ani - 0.95).abs() < 1e-12);
    }
}
