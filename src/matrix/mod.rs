//! Complete symmetric distance matrices over the observed genome set.
//!
//! [`build_distance_matrix`] expands pairwise comparisons into a dense
//! matrix, imputing pairs that were never compared. [`sanitize_for_clustering`]
//! prepares the condensed form consumed by clustering and projection.

mod builder;
mod condensed;

use std::io::{self, Write};

use bitvec::prelude::*;

pub use builder::{build_distance_matrix, fill_value_for, MatrixError, MISSING_PAIR_PENALTY};
pub use condensed::{sanitize_for_clustering, CondensedMatrix};

/// Dense square distance matrix indexed by sorted genome labels.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    labels: Vec<String>,
    /// Row-major `n * n` values.
    values: Vec<f64>,
    /// Cells filled with the missing-pair placeholder.
    imputed: BitVec,
    fill_value: f64,
}

impl DistanceMatrix {
    /// Wrap raw row-major values without any symmetry or range checks.
    ///
    /// Matrices built this way carry no imputed cells; they are meant for
    /// values coming from outside the builder.
    pub fn from_square(labels: Vec<String>, values: Vec<f64>) -> Result<Self, MatrixError> {
        let n = labels.len();
        if values.len() != n * n {
            return Err(MatrixError::DimensionMismatch {
                labels: n,
                values: values.len(),
            });
        }
        Ok(Self {
            labels,
            values,
            imputed: bitvec![0; n * n],
            fill_value: 0.0,
        })
    }

    pub(crate) fn from_parts(
        labels: Vec<String>,
        values: Vec<f64>,
        imputed: BitVec,
        fill_value: f64,
    ) -> Self {
        Self {
            labels,
            values,
            imputed,
            fill_value,
        }
    }

    /// Genome labels in row order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of genomes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the matrix has no genomes.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Distance between genomes `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.len() + j]
    }

    /// One row of distances.
    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.len();
        &self.values[i * n..(i + 1) * n]
    }

    /// Row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Position of a genome label.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|name| name == label)
    }

    /// Distance looked up by label.
    pub fn get_by_label(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(self.index_of(a)?, self.index_of(b)?))
    }

    /// Whether cell `(i, j)` holds the missing-pair placeholder.
    pub fn is_imputed(&self, i: usize, j: usize) -> bool {
        self.imputed[i * self.len() + j]
    }

    /// Number of unordered genome pairs that were imputed.
    pub fn imputed_pairs(&self) -> usize {
        self.imputed.count_ones() / 2
    }

    /// Placeholder used for missing pairs.
    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Largest entry.
    pub fn max_distance(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Exact symmetry check.
    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| (i + 1..n).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Whether every diagonal entry is exactly zero.
    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.len()).all(|i| self.get(i, i) == 0.0)
    }

    /// Header line (`\t`-prefixed labels) followed by one line per row.
    fn tsv_lines(&self) -> impl Iterator<Item = String> + '_ {
        let header: String = self.labels.iter().map(|label| format!("\t{label}")).collect();
        let rows = self.labels.iter().enumerate().map(move |(i, label)| {
            let cells: String = self.row(i).iter().map(|value| format!("\t{value}")).collect();
            format!("{label}{cells}")
        });
        std::iter::once(header).chain(rows)
    }

    /// Write the matrix as labelled TSV, the layout the square-matrix parser
    /// reads back.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for line in self.tsv_lines() {
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }

    /// TSV rendering as a string.
    pub fn to_tsv(&self) -> String {
        self.tsv_lines().map(|line| line + "\n").collect()
    }
}
