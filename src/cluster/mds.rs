use std::io::{self, Write};

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Axis};
use serde::Serialize;
use tracing::debug;

use super::ClusterError;
use crate::matrix::CondensedMatrix;

const MAX_EIGEN_ITERATIONS: usize = 10_000;

/// Principal-coordinate embedding of a distance matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    /// Observation labels, one per coordinate row.
    pub labels: Vec<String>,
    /// `coordinates[i][k]`: observation `i` on axis `k`.
    pub coordinates: Vec<Vec<f64>>,
    /// Eigenvalue of each retained axis, descending.
    pub eigenvalues: Vec<f64>,
    /// Share of the positive eigenvalue mass carried by each retained axis.
    pub proportion_explained: Vec<f64>,
}

impl Projection {
    /// Number of retained axes.
    pub fn dimensions(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Coordinates as TSV: a `PC1..PCk` header, one row per observation, a
    /// blank line, then the header again and the `proportion_explained` row.
    pub fn write_tsv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let header: String = (1..=self.dimensions()).map(|pc| format!("\tPC{pc}")).collect();
        writeln!(writer, "{header}")?;
        for (label, row) in self.labels.iter().zip(&self.coordinates) {
            write!(writer, "{label}")?;
            for value in row {
                write!(writer, "\t{value}")?;
            }
            writeln!(writer)?;
        }
        writeln!(writer)?;
        writeln!(writer, "{header}")?;
        write!(writer, "proportion_explained")?;
        for value in &self.proportion_explained {
            write!(writer, "\t{value}")?;
        }
        writeln!(writer)?;
        writer.flush()
    }
}

/// Classical (Torgerson) multidimensional scaling.
///
/// Squared distances are double-centred, the resulting Gram matrix is
/// diagonalised as a symmetric matrix, and the top `dims` axes are
/// scaled by the square root of their (non-negative) eigenvalues. Each axis is
/// oriented so its largest-magnitude component is positive.
pub fn classical_mds(condensed: &CondensedMatrix, dims: usize) -> Result<Projection, ClusterError> {
    let n = condensed.len();
    if n < 2 {
        return Err(ClusterError::TooFewObservations(n));
    }
    let dims = dims.clamp(1, n);

    let gram = double_centre(condensed);
    let (values, vectors) = symmetric_eigen(&gram)?;

    let mut axes: Vec<usize> = (0..n).collect();
    axes.sort_by(|&a, &b| values[b].total_cmp(&values[a]).then(a.cmp(&b)));

    let positive_mass: f64 = values.iter().filter(|v| **v > 0.0).sum();
    let mut coordinates = vec![Vec::with_capacity(dims); n];
    let mut eigenvalues = Vec::with_capacity(dims);
    let mut proportion_explained = Vec::with_capacity(dims);

    for &axis in axes.iter().take(dims) {
        let lambda = values[axis];
        let scale = lambda.max(0.0).sqrt();
        let column = vectors.column(axis);
        let pivot = column
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
        for (row, component) in coordinates.iter_mut().zip(column.iter()) {
            row.push(sign * component * scale);
        }
        eigenvalues.push(lambda);
        proportion_explained.push(if positive_mass > 0.0 {
            lambda.max(0.0) / positive_mass
        } else {
            0.0
        });
    }

    Ok(Projection {
        labels: condensed.labels().to_vec(),
        coordinates,
        eigenvalues,
        proportion_explained,
    })
}

/// `B = -1/2 * J D^2 J` with `J` the centring matrix.
fn double_centre(condensed: &CondensedMatrix) -> Array2<f64> {
    let n = condensed.len();
    let squared = Array2::from_shape_fn((n, n), |(i, j)| condensed.get(i, j).powi(2));
    let row_means: Array1<f64> = squared.sum_axis(Axis(1)) / n as f64;
    let grand_mean = row_means.sum() / n as f64;

    Array2::from_shape_fn((n, n), |(i, j)| {
        -0.5 * (squared[[i, j]] - row_means[i] - row_means[j] + grand_mean)
    })
}

/// Eigenvalues and column eigenvectors of a symmetric matrix.
fn symmetric_eigen(gram: &Array2<f64>) -> Result<(Array1<f64>, Array2<f64>), ClusterError> {
    let (rows, cols) = gram.dim();
    let matrix = DMatrix::from_fn(rows, cols, |i, j| gram[[i, j]]);
    let eigen = SymmetricEigen::try_new(matrix, f64::EPSILON, MAX_EIGEN_ITERATIONS).ok_or(
        ClusterError::NoConvergence {
            iterations: MAX_EIGEN_ITERATIONS,
        },
    )?;
    debug!(dimension = rows, "symmetric eigen-decomposition done");

    let values = Array1::from_iter(eigen.eigenvalues.iter().copied());
    let vectors = Array2::from_shape_fn((rows, cols), |(i, k)| eigen.eigenvectors[(i, k)]);
    Ok((values, vectors))
}
