//! Min-sum with binary city states and cached beliefs.
//!
//! Each message into a city is a pair: "the city is not served by the
//! sender" and "the city is served by the sender". A city's state is still
//! which neighbor serves it; its belief for neighbor `x` is
//!
//! ```text
//! d(c, x) + Σ_u m_u[not served] + m_x[served] − m_x[not served]
//! ```
//!
//! These beliefs, and the facility beliefs, are cached after every sweep,
//! so each outgoing message costs O(1) per state instead of a fresh sum.
//! Incompatible states carry a large finite penalty (the cost of opening
//! every facility) instead of an infeasible value, so no message is ever
//! infeasible.

use crate::cost::{self, INFEASIBLE};
use crate::error::{MessageSide, Result};
use crate::graph::Adjacency;
use crate::models::{FacilityLocationProblem, FacilitySolver, MinSumSolver};

use super::config::validate_damping;
use super::engine::{finish_block, parallel_sweep, SweepStats};
use super::messages::{MessageStore, MessageView};

/// Sparse min-sum solver with binary per-edge city messages.
///
/// Only finite-distance pairs carry messages.
///
/// # Examples
///
/// ```
/// use u_facility::minsum::FastSparseMinSum;
/// use u_facility::models::{FacilitySolver, MinSumSolver, ProblemInstance};
///
/// let p = ProblemInstance::from_rows(
///     vec![1.0, 1.0],
///     &[vec![0.5, 2.0], vec![2.0, 0.5]],
/// ).unwrap();
/// let mut solver = FastSparseMinSum::new(&p, 0.0).unwrap();
/// for _ in 0..50 {
///     solver.iterate().unwrap();
/// }
/// assert_eq!(solver.objective_value(), 3.0);
/// ```
#[derive(Debug)]
pub struct FastSparseMinSum<'a, P: ?Sized> {
    problem: &'a P,
    damping: f64,
    penalty: f64,
    adjacency: Adjacency,
    messages: MessageStore,
    /// City beliefs by edge id.
    city_belief: Vec<f64>,
    /// Facility beliefs, `[closed, open]`.
    facility_belief: Vec<[f64; 2]>,
    open: Vec<bool>,
    /// Serving slot per city; `None` for a city without neighbors.
    city_action: Vec<Option<usize>>,
    objective: f64,
    bellman_error: f64,
    sum_norm: f64,
}

impl<'a, P> FastSparseMinSum<'a, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    /// Builds the solver. `damping` must lie in `[0, 1)`.
    pub fn new(problem: &'a P, damping: f64) -> Result<Self> {
        validate_damping(damping)?;
        let adjacency = Adjacency::from_problem(problem);
        let messages = MessageStore::binary(&adjacency);
        let mut solver = Self {
            problem,
            damping,
            penalty: problem.all_open_cost(),
            city_belief: vec![0.0; adjacency.edge_count()],
            facility_belief: vec![[0.0; 2]; problem.facility_count()],
            open: vec![false; problem.facility_count()],
            city_action: vec![None; problem.city_count()],
            adjacency,
            messages,
            objective: INFEASIBLE,
            bellman_error: INFEASIBLE,
            sum_norm: 0.0,
        };
        solver.refresh_beliefs();
        solver.refresh_decision();
        Ok(solver)
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Penalty standing in for an incompatible pair of states.
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Serving facility each city's messages point to.
    pub fn city_actions(&self) -> Vec<Option<usize>> {
        self.city_action
            .iter()
            .enumerate()
            .map(|(c, a)| a.map(|x| self.adjacency.city_neighbors(c)[x]))
            .collect()
    }

    fn refresh_beliefs(&mut self) {
        let view = self.messages.view();
        let adj = &self.adjacency;
        for c in 0..adj.city_count() {
            let degree = adj.city_degree(c);
            let rest: f64 = (0..degree).map(|u| view.to_city(c, u)[0]).sum();
            for (x, &f) in adj.city_neighbors(c).iter().enumerate() {
                let m = view.to_city(c, x);
                self.city_belief[adj.city_edge(c, x)] =
                    self.problem.distance(c, f) + rest + m[1] - m[0];
            }
        }
        for (f, belief) in self.facility_belief.iter_mut().enumerate() {
            for (s, b) in belief.iter_mut().enumerate() {
                let local = if s == 1 {
                    self.problem.construction_cost(f)
                } else {
                    0.0
                };
                let incoming: f64 = (0..adj.facility_degree(f))
                    .map(|u| view.to_facility(f, u)[s])
                    .sum();
                *b = local + incoming;
            }
        }
    }

    fn refresh_decision(&mut self) {
        for (o, b) in self.open.iter_mut().zip(&self.facility_belief) {
            *o = b[0] >= b[1];
        }
        let adj = &self.adjacency;
        for (c, action) in self.city_action.iter_mut().enumerate() {
            let mut best: Option<(usize, f64)> = None;
            for x in 0..adj.city_degree(c) {
                let v = self.city_belief[adj.city_edge(c, x)];
                if best.is_none_or(|(_, bv)| v < bv) {
                    best = Some((x, v));
                }
            }
            *action = best.map(|(x, _)| x);
        }

        let mut objective: f64 = (0..self.open.len())
            .filter(|&f| self.open[f])
            .map(|f| self.problem.construction_cost(f))
            .sum();
        for (c, action) in self.city_action.iter().enumerate() {
            match action.map(|x| adj.city_neighbors(c)[x]) {
                Some(f) if self.open[f] => objective += self.problem.distance(c, f),
                _ => {
                    objective = INFEASIBLE;
                    break;
                }
            }
        }
        self.objective = objective;
    }

    /// Joint belief of facility `f` in state `s` and city `c` served by
    /// slot `x`, where `f` sits at slot `k` of `c`'s list.
    fn pairwise_belief(&self, view: &MessageView<'_>, f: usize, s: usize, c: usize, k: usize, x: usize) -> f64 {
        let p = self.adjacency.city_peer_slot(c, k);
        let served = usize::from(x == k);
        let mut v = self.facility_belief[f][s] - view.to_facility(f, p)[s]
            + self.city_belief[self.adjacency.city_edge(c, x)]
            - view.to_city(c, k)[served];
        if served == 1 && s == 0 {
            v += self.penalty;
        }
        v
    }
}

/// Read-only state for one sweep of [`FastSparseMinSum`].
struct FastSweep<'a> {
    adjacency: &'a Adjacency,
    city_belief: &'a [f64],
    facility_belief: &'a [[f64; 2]],
    penalty: f64,
    damping: f64,
}

impl FastSweep<'_> {
    fn update_city(&self, city: usize, block: &mut [f64], view: &MessageView<'_>) -> Result<SweepStats> {
        let adj = self.adjacency;
        for (k, &f) in adj.city_neighbors(city).iter().enumerate() {
            let peer = adj.city_peer_slot(city, k);
            let incoming = view.to_facility(f, peer);
            let excluded = [
                self.facility_belief[f][0] - incoming[0],
                self.facility_belief[f][1] - incoming[1],
            ];
            // Not served: either state. Served: closed pays the penalty.
            block[2 * k] = excluded[0].min(excluded[1]);
            block[2 * k + 1] = (excluded[0] + self.penalty).min(excluded[1]);
        }
        finish_block(
            block,
            view.city_block(city),
            2,
            |_| 0,
            self.damping,
            MessageSide::ToCity,
            city,
        )
    }

    fn update_facility(
        &self,
        facility: usize,
        block: &mut [f64],
        view: &MessageView<'_>,
    ) -> Result<SweepStats> {
        let adj = self.adjacency;
        for (k, &c) in adj.facility_neighbors(facility).iter().enumerate() {
            let peer = adj.facility_peer_slot(facility, k);
            let incoming = view.to_city(c, peer);
            let mut closed = INFEASIBLE;
            let mut open = INFEASIBLE;
            for x in 0..adj.city_degree(c) {
                let belief = self.city_belief[adj.city_edge(c, x)];
                if x == peer {
                    let v = belief - incoming[1];
                    closed = closed.min(v + self.penalty);
                    open = open.min(v);
                } else {
                    let v = belief - incoming[0];
                    closed = closed.min(v);
                    open = open.min(v);
                }
            }
            block[2 * k] = closed;
            block[2 * k + 1] = open;
        }
        finish_block(
            block,
            view.facility_block(facility),
            2,
            |_| 0,
            self.damping,
            MessageSide::ToFacility,
            facility,
        )
    }
}

impl<P> FacilitySolver for FastSparseMinSum<'_, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    fn objective_value(&self) -> f64 {
        self.objective
    }

    fn optimal_facilities(&self) -> &[bool] {
        &self.open
    }

    /// Checks that, on every edge, the decoded joint state minimizes the
    /// pairwise belief up to the tie tolerance. An infeasible decision is
    /// never certified.
    fn is_global_optimum(&self) -> bool {
        if cost::is_infeasible(self.objective) {
            return false;
        }
        let view = self.messages.view();
        let adj = &self.adjacency;
        for c in 0..adj.city_count() {
            let Some(action) = self.city_action[c] else {
                continue;
            };
            for (k, &f) in adj.city_neighbors(c).iter().enumerate() {
                let chosen = self.pairwise_belief(&view, f, usize::from(self.open[f]), c, k, action);
                for x in 0..adj.city_degree(c) {
                    for s in 0..2 {
                        if cost::improves(self.pairwise_belief(&view, f, s, c, k, x), chosen) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

impl<P> MinSumSolver for FastSparseMinSum<'_, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    fn iterate(&mut self) -> Result<()> {
        let sweep = FastSweep {
            adjacency: &self.adjacency,
            city_belief: &self.city_belief,
            facility_belief: &self.facility_belief,
            penalty: self.penalty,
            damping: self.damping,
        };
        let stats = parallel_sweep(
            &mut self.messages,
            |c, block, view| sweep.update_city(c, block, view),
            |f, block, view| sweep.update_facility(f, block, view),
        )?;
        self.messages.swap();
        self.bellman_error = stats.bellman_error;
        self.sum_norm = stats.sum_norm;
        self.refresh_beliefs();
        self.refresh_decision();
        Ok(())
    }

    fn bellman_error(&self) -> f64 {
        self.bellman_error
    }

    fn sum_norm(&self) -> f64 {
        self.sum_norm
    }
}
