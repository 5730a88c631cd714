//! Correction policies for the "sum of other incoming messages" term.
//!
//! | policy | neighbor `u ≠ v` | the edge itself (`u = v`) |
//! |---|---|---|
//! | plain | `1` | excluded |
//! | attenuated | `1/(F − 1)` | excluded |
//! | tree-reweighted | `ρ(u)` | `ρ(v) − 1` |
//!
//! An infeasible incoming message makes the whole sum infeasible, except
//! for a message that is excluded outright.

use crate::cost::{self, INFEASIBLE};
use crate::graph::{Adjacency, RhoTable};

use super::messages::MessageView;

/// How incoming messages are combined at a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Correction {
    /// Ordinary min-sum.
    Plain,
    /// Every sum scaled by `alpha = 1/(F − 1)`.
    Attenuated { alpha: f64 },
    /// Per-edge spanning-tree weights.
    TreeReweighted(RhoTable),
}

impl Correction {
    /// Corrected sum of messages into `facility` at `state`, leaving out
    /// (or, for tree reweighting, down-weighting) the edge at `exclude`.
    ///
    /// `exclude` is a slot in the facility's own list.
    pub fn facility_sum(
        &self,
        adjacency: &Adjacency,
        view: &MessageView<'_>,
        facility: usize,
        exclude: usize,
        state: usize,
    ) -> f64 {
        let degree = adjacency.facility_degree(facility);
        self.combine(degree, exclude, |u| {
            (
                view.to_facility(facility, u)[state],
                adjacency.facility_edge(facility, u),
            )
        })
    }

    /// Corrected sum of messages into `city` at `state`, leaving out the
    /// edge at `exclude` (a slot in the city's own list).
    pub fn city_sum(
        &self,
        adjacency: &Adjacency,
        view: &MessageView<'_>,
        city: usize,
        exclude: usize,
        state: usize,
    ) -> f64 {
        let degree = adjacency.city_degree(city);
        self.combine(degree, exclude, |u| {
            (view.to_city(city, u)[state], adjacency.city_edge(city, u))
        })
    }

    /// Sum of every message into `facility` at `state`, as used for
    /// beliefs. Only tree reweighting applies a weight here.
    pub fn facility_total(
        &self,
        adjacency: &Adjacency,
        view: &MessageView<'_>,
        facility: usize,
        state: usize,
    ) -> f64 {
        let degree = adjacency.facility_degree(facility);
        self.total(degree, |u| {
            (
                view.to_facility(facility, u)[state],
                adjacency.facility_edge(facility, u),
            )
        })
    }

    /// Sum of every message into `city` at `state`, as used for beliefs.
    pub fn city_total(
        &self,
        adjacency: &Adjacency,
        view: &MessageView<'_>,
        city: usize,
        state: usize,
    ) -> f64 {
        let degree = adjacency.city_degree(city);
        self.total(degree, |u| {
            (view.to_city(city, u)[state], adjacency.city_edge(city, u))
        })
    }

    fn combine(&self, degree: usize, exclude: usize, message: impl Fn(usize) -> (f64, usize)) -> f64 {
        match self {
            Correction::Plain => excluded_sum(degree, exclude, &message),
            Correction::Attenuated { alpha } => {
                cost::scale(excluded_sum(degree, exclude, &message), *alpha)
            }
            Correction::TreeReweighted(rho) => {
                let mut sum = 0.0;
                for u in 0..degree {
                    let (m, edge) = message(u);
                    if cost::is_infeasible(m) {
                        return INFEASIBLE;
                    }
                    let mut w = rho.get(edge);
                    if u == exclude {
                        w -= 1.0;
                    }
                    sum += w * m;
                }
                sum
            }
        }
    }

    fn total(&self, degree: usize, message: impl Fn(usize) -> (f64, usize)) -> f64 {
        match self {
            Correction::TreeReweighted(rho) => {
                let mut sum = 0.0;
                for u in 0..degree {
                    let (m, edge) = message(u);
                    if cost::is_infeasible(m) {
                        return INFEASIBLE;
                    }
                    sum += rho.get(edge) * m;
                }
                sum
            }
            _ => cost::sum((0..degree).map(|u| message(u).0)),
        }
    }
}

fn excluded_sum(degree: usize, exclude: usize, message: &impl Fn(usize) -> (f64, usize)) -> f64 {
    cost::sum((0..degree).filter(|&u| u != exclude).map(|u| message(u).0))
}
