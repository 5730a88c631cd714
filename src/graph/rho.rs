//! Edge appearance probabilities for tree-reweighted message passing.

use rand::Rng;
use tracing::debug;

use super::{Adjacency, UniformSpanningTree};
use crate::error::{FacilityError, Result};

/// Per-edge spanning-tree inclusion frequency ρ, indexed by edge id.
///
/// Every value lies in `(0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RhoTable {
    values: Vec<f64>,
    trees: usize,
}

impl RhoTable {
    /// Exact appearance probability on the complete bipartite graph,
    /// `(C + F − 1) / (C·F)` for every edge.
    ///
    /// Fails unless `adjacency` is complete.
    ///
    /// ```
    /// use u_facility::graph::{Adjacency, RhoTable};
    ///
    /// let rho = RhoTable::uniform(&Adjacency::complete(2, 3)).unwrap();
    /// assert!((rho.get(0) - 4.0 / 6.0).abs() < 1e-12);
    /// ```
    pub fn uniform(adjacency: &Adjacency) -> Result<Self> {
        if !adjacency.is_complete() {
            return Err(FacilityError::InvalidParameter(
                "uniform edge weights need a complete graph; sample them instead".into(),
            ));
        }
        let c = adjacency.city_count() as f64;
        let f = adjacency.facility_count() as f64;
        let rho = (c + f - 1.0) / (c * f);
        Ok(Self {
            values: vec![rho; adjacency.edge_count()],
            trees: 0,
        })
    }

    /// Estimates ρ by drawing uniform spanning forests.
    ///
    /// Draws at least `min_tree_count` forests and keeps drawing until every
    /// edge has appeared in one. Fails with
    /// [`FacilityError::RhoSamplingExhausted`] after `max_tree_count` draws.
    pub fn sampled<R: Rng + ?Sized>(
        adjacency: &Adjacency,
        min_tree_count: usize,
        max_tree_count: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if min_tree_count == 0 || max_tree_count < min_tree_count {
            return Err(FacilityError::InvalidParameter(format!(
                "tree counts must satisfy 1 <= min ({}) <= max ({})",
                min_tree_count, max_tree_count
            )));
        }

        let mut counts = vec![0usize; adjacency.edge_count()];
        let mut uncovered = counts.len();
        let mut sampler = UniformSpanningTree::new(adjacency);
        let mut trees = 0;

        loop {
            for &e in sampler.sample(rng) {
                if counts[e] == 0 {
                    uncovered -= 1;
                }
                counts[e] += 1;
            }
            trees += 1;
            if trees >= min_tree_count && uncovered == 0 {
                break;
            }
            if trees >= max_tree_count {
                return Err(FacilityError::RhoSamplingExhausted { trees, uncovered });
            }
        }

        debug!(trees, edges = counts.len(), "spanning tree sampling finished");
        let n = trees as f64;
        Ok(Self {
            values: counts.into_iter().map(|k| k as f64 / n).collect(),
            trees,
        })
    }

    /// Wraps explicit values after checking they lie in `(0, 1]`.
    pub fn from_values(values: Vec<f64>) -> Result<Self> {
        if let Some((e, v)) = values
            .iter()
            .enumerate()
            .find(|(_, &v)| !(v > 0.0 && v <= 1.0))
        {
            return Err(FacilityError::InvalidParameter(format!(
                "rho of edge {} must lie in (0, 1], got {}",
                e, v
            )));
        }
        Ok(Self { values, trees: 0 })
    }

    #[inline]
    pub fn get(&self, edge: usize) -> f64 {
        self.values[edge]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forests drawn to build the table (0 for closed-form tables).
    pub fn tree_count(&self) -> usize {
        self.trees
    }
}
