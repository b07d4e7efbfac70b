use std::str::FromStr;

use kodama::Method;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::ClusterError;
use crate::matrix::CondensedMatrix;

/// One agglomeration step.
///
/// Cluster ids follow the usual linkage-matrix numbering: leaves are
/// `0..n`, the cluster formed by merge `k` is `n + k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Merge {
    /// Smaller cluster id.
    pub left: usize,
    /// Larger cluster id.
    pub right: usize,
    /// Distance between the two clusters when they were joined.
    pub distance: f64,
    /// Leaves under the new cluster.
    pub size: usize,
}

/// Child ordering used when laying out dendrogram leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceSort {
    /// Keep merge order: left child first.
    Original,
    /// Child with the smaller merge distance first.
    Ascending,
    /// Child with the larger merge distance first.
    #[default]
    Descending,
}

/// Inter-cluster distance used when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkageMethod {
    /// Size-weighted mean of member distances (UPGMA).
    #[default]
    Average,
    /// Largest member distance.
    Complete,
    /// Smallest member distance.
    Single,
    /// Minimum increase in within-cluster variance.
    Ward,
}

impl LinkageMethod {
    /// Every method, in fallback order.
    pub const ALL: [LinkageMethod; 4] = [
        LinkageMethod::Average,
        LinkageMethod::Complete,
        LinkageMethod::Single,
        LinkageMethod::Ward,
    ];

    /// Lower-case name.
    pub fn name(self) -> &'static str {
        match self {
            LinkageMethod::Average => "average",
            LinkageMethod::Complete => "complete",
            LinkageMethod::Single => "single",
            LinkageMethod::Ward => "ward",
        }
    }

    fn kodama(self) -> Method {
        match self {
            LinkageMethod::Average => Method::Average,
            LinkageMethod::Complete => Method::Complete,
            LinkageMethod::Single => Method::Single,
            LinkageMethod::Ward => Method::Ward,
        }
    }

    /// Run `attempt` with `self`, then with the remaining methods in
    /// [`LinkageMethod::ALL`] order until one succeeds.
    ///
    /// Returns the method that worked with its result, or the error of the
    /// preferred method when every method fails.
    pub fn with_fallback<T>(
        self,
        mut attempt: impl FnMut(LinkageMethod) -> Result<T, ClusterError>,
    ) -> Result<(LinkageMethod, T), ClusterError> {
        let first_err = match attempt(self) {
            Ok(value) => return Ok((self, value)),
            Err(err) => err,
        };
        for method in Self::ALL.into_iter().filter(|m| *m != self) {
            match attempt(method) {
                Ok(value) => {
                    warn!(preferred = self.name(), used = method.name(), error = %first_err, "linkage fell back");
                    return Ok((method, value));
                }
                Err(err) => debug!(method = method.name(), error = %err, "linkage method failed"),
            }
        }
        Err(first_err)
    }
}

impl std::fmt::Display for LinkageMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Name that is not a known [`LinkageMethod`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown linkage method `{0}`")]
pub struct UnknownLinkageMethod(pub String);

impl FromStr for LinkageMethod {
    type Err = UnknownLinkageMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LinkageMethod::ALL
            .into_iter()
            .find(|method| method.name() == wanted)
            .ok_or_else(|| UnknownLinkageMethod(s.to_string()))
    }
}

/// Agglomerative clustering result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Linkage {
    method: LinkageMethod,
    leaves: usize,
    merges: Vec<Merge>,
}

impl Linkage {
    /// Cluster the condensed distances with `method`.
    ///
    /// Steps come back in ascending merge distance; within a step the lower
    /// cluster id is on the left. A non-finite merge distance is an error.
    pub fn new(condensed: &CondensedMatrix, method: LinkageMethod) -> Result<Self, ClusterError> {
        let n = condensed.len();
        if n < 2 {
            return Err(ClusterError::TooFewObservations(n));
        }

        let mut dissimilarities = condensed.distances().to_vec();
        let dendrogram = kodama::linkage(&mut dissimilarities, n, method.kodama());

        let mut merges = Vec::with_capacity(n - 1);
        for (step, merge) in dendrogram.steps().iter().enumerate() {
            if !merge.dissimilarity.is_finite() {
                return Err(ClusterError::NonFiniteMerge { method, step });
            }
            let (left, right) = ordered(merge.cluster1, merge.cluster2);
            debug!(step, left, right, distance = merge.dissimilarity, size = merge.size, "merged clusters");
            merges.push(Merge {
                left,
                right,
                distance: merge.dissimilarity,
                size: merge.size,
            });
        }

        Ok(Self {
            method,
            leaves: n,
            merges,
        })
    }

    /// Average linkage (UPGMA).
    pub fn average(condensed: &CondensedMatrix) -> Result<Self, ClusterError> {
        Self::new(condensed, LinkageMethod::Average)
    }

    /// Method the tree was built with.
    pub fn method(&self) -> LinkageMethod {
        self.method
    }

    /// Number of leaves.
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    /// Merge steps in agglomeration order.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Cluster id of the root.
    pub fn root(&self) -> usize {
        if self.merges.is_empty() {
            0
        } else {
            self.leaves + self.merges.len() - 1
        }
    }

    /// Merge distance of a cluster (0 for leaves).
    pub fn distance_of(&self, id: usize) -> f64 {
        if id < self.leaves {
            0.0
        } else {
            self.merges[id - self.leaves].distance
        }
    }

    /// Children of an internal cluster, `None` for leaves.
    pub fn children(&self, id: usize) -> Option<(usize, usize)> {
        (id >= self.leaves).then(|| {
            let merge = &self.merges[id - self.leaves];
            (merge.left, merge.right)
        })
    }

    /// Left-to-right dendrogram leaf order.
    pub fn leaf_order(&self, sort: DistanceSort) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.leaves);
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let Some((left, right)) = self.children(id) else {
                order.push(id);
                continue;
            };
            let (first, second) = match sort {
                DistanceSort::Original => (left, right),
                DistanceSort::Descending if self.distance_of(right) > self.distance_of(left) => {
                    (right, left)
                }
                DistanceSort::Ascending if self.distance_of(right) < self.distance_of(left) => {
                    (right, left)
                }
                _ => (left, right),
            };
            stack.push(second);
            stack.push(first);
        }
        order
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}
