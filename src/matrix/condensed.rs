use super::DistanceMatrix;

/// Upper-triangular flattening of a symmetric distance matrix, row by row:
/// `(0,1), (0,2), .., (0,n-1), (1,2), ..`.
#[derive(Debug, Clone, PartialEq)]
pub struct CondensedMatrix {
    labels: Vec<String>,
    distances: Vec<f64>,
}

impl CondensedMatrix {
    /// Observation labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Flattened upper triangle.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether there are no observations.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Distance between observations `i` and `j`; zero on the diagonal.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.0;
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        let n = self.len();
        self.distances[n * i - i * (i + 1) / 2 + (j - i - 1)]
    }

    /// Expand back into a dense row-major square.
    pub fn to_square(&self) -> Vec<f64> {
        let n = self.len();
        let mut square = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.get(i, j);
                square[i * n + j] = d;
                square[j * n + i] = d;
            }
        }
        square
    }
}

/// Prepare a matrix for clustering or projection.
///
/// The matrix is averaged with its transpose, the diagonal is dropped (it is
/// implicitly zero in condensed form) and non-finite values are replaced:
/// NaN and +Inf by 1, -Inf by 0.
pub fn sanitize_for_clustering(matrix: &DistanceMatrix) -> CondensedMatrix {
    let n = matrix.len();
    let mut distances = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            let symmetric = (matrix.get(i, j) + matrix.get(j, i)) / 2.0;
            distances.push(scrub(symmetric));
        }
    }
    CondensedMatrix {
        labels: matrix.labels().to_vec(),
        distances,
    }
}

fn scrub(value: f64) -> f64 {
    if value.is_nan() || value == f64::INFINITY {
        1.0
    } else if value == f64::NEG_INFINITY {
        0.0
    } else {
        value
    }
}
