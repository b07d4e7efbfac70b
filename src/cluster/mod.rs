//! Hierarchical clustering and ordination over condensed distances.
//!
//! Everything here consumes a [`CondensedMatrix`](crate::matrix::CondensedMatrix)
//! produced by [`sanitize_for_clustering`](crate::matrix::sanitize_for_clustering),
//! so inputs are symmetric and finite.

mod linkage;
mod mds;
mod newick;

use thiserror::Error;

pub use linkage::{DistanceSort, Linkage, LinkageMethod, Merge, UnknownLinkageMethod};
pub use mds::{classical_mds, Projection};

/// Failures raised by clustering and projection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// Clustering needs at least two observations.
    #[error("clustering requires at least 2 observations, got {0}")]
    TooFewObservations(usize),

    /// Label list does not match the number of leaves.
    #[error("expected {expected} leaf labels, got {actual}")]
    LabelMismatch {
        /// Leaves in the linkage.
        expected: usize,
        /// Labels supplied.
        actual: usize,
    },

    /// A merge produced a NaN or infinite height.
    #[error("{method} linkage produced a non-finite distance at step {step}")]
    NonFiniteMerge {
        /// Method in use.
        method: LinkageMethod,
        /// Offending merge step.
        step: usize,
    },

    /// The eigen solver did not settle.
    #[error("eigen-decomposition did not converge after {iterations} iterations")]
    NoConvergence {
        /// Iteration limit.
        iterations: usize,
    },
}
