//! One synchronous min-sum sweep.
//!
//! # Algorithm
//!
//! For the edge between facility `f` and city `c`:
//!
//! ```text
//! into c, state x:  min over s in {closed, open} of
//!                   bias(f,s) + cost(f)·[s = open] + S_f(s) ,  s = open forced when x = f
//! into f, state s:  min over x of  d(c, x) + S_c(x) ,  x = f excluded when s = closed
//! ```
//!
//! where `S_n` is the corrected sum of the other messages into `n`. Every
//! fresh message is shifted so its reference entry is zero, then blended
//! with the previous one when damping is on. The reference of a message
//! into a city is "served by another facility" (the sender's own slot only
//! when the city has a single neighbor); into a facility it is "open". Both
//! stay feasible whenever the receiving node has any feasible state.
//!
//! Receiving nodes are independent given the previous generation, so each
//! node's block is filled by its own rayon task. Per-node statistics are
//! summed in node order, so results do not depend on scheduling.

use rayon::prelude::*;

use crate::cost::{self, INFEASIBLE};
use crate::error::{FacilityError, MessageSide, Result};
use crate::graph::Adjacency;
use crate::models::FacilityLocationProblem;

use super::correction::Correction;
use super::messages::{MessageStore, MessageView};

/// Bellman error and normalization total of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SweepStats {
    pub bellman_error: f64,
    pub sum_norm: f64,
}

impl SweepStats {
    pub fn merge(self, other: SweepStats) -> SweepStats {
        SweepStats {
            bellman_error: self.bellman_error + other.bellman_error,
            sum_norm: self.sum_norm + other.sum_norm,
        }
    }
}

/// Reference entry of the message into a city of `degree` neighbors from
/// the facility at `slot`.
#[inline]
pub(crate) fn city_reference(degree: usize, slot: usize) -> usize {
    usize::from(degree > 1 && slot == 0)
}

/// Reference entry of a `[closed, open]` message into a facility.
pub(crate) const FACILITY_REFERENCE: usize = 1;

/// Shifts `next` so `next[reference] == 0`, blends it with `prev`, and
/// returns the squared change and the removed constant.
///
/// Returns `None` if `next[reference]` is infeasible. Infeasible entries are
/// left alone; with damping on, an entry whose previous value was
/// infeasible stays infeasible.
pub(crate) fn normalize_and_damp(
    next: &mut [f64],
    prev: &[f64],
    reference: usize,
    damping: f64,
) -> Option<SweepStats> {
    let norm = next[reference];
    if cost::is_infeasible(norm) {
        return None;
    }
    let mut err = 0.0;
    for (n, &p) in next.iter_mut().zip(prev) {
        if cost::is_infeasible(*n) {
            continue;
        }
        *n -= norm;
        if damping > 0.0 {
            *n = if cost::is_infeasible(p) {
                INFEASIBLE
            } else {
                (1.0 - damping) * *n + damping * p
            };
        }
        if cost::is_feasible(p) {
            let dv = p - *n;
            err += dv * dv;
        }
    }
    Some(SweepStats {
        bellman_error: err,
        sum_norm: norm,
    })
}

/// Normalizes every message of one node block. `reference(slot)` names the
/// entry each message is shifted against.
pub(crate) fn finish_block(
    block: &mut [f64],
    prev: &[f64],
    width: usize,
    reference: impl Fn(usize) -> usize,
    damping: f64,
    side: MessageSide,
    node: usize,
) -> Result<SweepStats> {
    let mut stats = SweepStats::default();
    for (slot, (next, prev)) in block
        .chunks_exact_mut(width)
        .zip(prev.chunks_exact(width))
        .enumerate()
    {
        let s = normalize_and_damp(next, prev, reference(slot), damping)
            .ok_or(FacilityError::Normalization { side, node, slot })?;
        stats = stats.merge(s);
    }
    Ok(stats)
}

/// Sums per-node results in node order, failing on the first error.
pub(crate) fn collect_stats(parts: Vec<Result<SweepStats>>) -> Result<SweepStats> {
    let mut total = SweepStats::default();
    for part in parts {
        total = total.merge(part?);
    }
    Ok(total)
}

/// Fills every node block of the shadow buffer, one rayon task per
/// receiving node, reading only the current generation.
pub(crate) fn parallel_sweep<C, F>(store: &mut MessageStore, city: C, facility: F) -> Result<SweepStats>
where
    C: Fn(usize, &mut [f64], &MessageView<'_>) -> Result<SweepStats> + Sync,
    F: Fn(usize, &mut [f64], &MessageView<'_>) -> Result<SweepStats> + Sync,
{
    let bufs = store.sweep_buffers();
    let current = bufs.current;

    let city_parts: Vec<Result<SweepStats>> = bufs
        .next_city
        .into_par_iter()
        .enumerate()
        .map(|(c, block)| city(c, block, &current))
        .collect();
    let facility_parts: Vec<Result<SweepStats>> = bufs
        .next_facility
        .into_par_iter()
        .enumerate()
        .map(|(f, block)| facility(f, block, &current))
        .collect();

    Ok(collect_stats(city_parts)?.merge(collect_stats(facility_parts)?))
}

/// Everything a sweep reads besides the messages.
pub(crate) struct SweepContext<'a, P: ?Sized> {
    pub problem: &'a P,
    pub adjacency: &'a Adjacency,
    pub correction: &'a Correction,
    /// Per-facility `[closed, open]` bias, if decimating.
    pub bias: Option<&'a [[f64; 2]]>,
    pub damping: f64,
}

impl<P> SweepContext<'_, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    /// Local cost of `facility` in `state`, bias included.
    #[inline]
    pub fn facility_local(&self, facility: usize, state: usize) -> f64 {
        let build = if state == 1 {
            self.problem.construction_cost(facility)
        } else {
            0.0
        };
        match self.bias {
            Some(bias) => cost::add(build, bias[facility][state]),
            None => build,
        }
    }

    /// Computes the next generation into the shadow buffer. Does not swap.
    pub fn sweep(&self, store: &mut MessageStore) -> Result<SweepStats> {
        parallel_sweep(
            store,
            |c, block, view| self.update_city(c, block, view),
            |f, block, view| self.update_facility(f, block, view),
        )
    }

    /// Messages into `city` from each adjacent facility.
    fn update_city(&self, city: usize, block: &mut [f64], view: &MessageView<'_>) -> Result<SweepStats> {
        let adj = self.adjacency;
        let degree = adj.city_degree(city);
        for (k, &f) in adj.city_neighbors(city).iter().enumerate() {
            let peer = adj.city_peer_slot(city, k);
            let mut value = [INFEASIBLE; 2];
            for (s, v) in value.iter_mut().enumerate() {
                let local = self.facility_local(f, s);
                if cost::is_infeasible(local) {
                    continue;
                }
                *v = cost::add(local, self.correction.facility_sum(adj, view, f, peer, s));
            }
            let either = cost::min(value[0], value[1]);
            let msg = &mut block[k * degree..(k + 1) * degree];
            for (x, m) in msg.iter_mut().enumerate() {
                *m = if x == k { value[1] } else { either };
            }
        }
        finish_block(
            block,
            view.city_block(city),
            degree.max(1),
            |slot| city_reference(degree, slot),
            self.damping,
            MessageSide::ToCity,
            city,
        )
    }

    /// Messages into `facility` from each adjacent city.
    fn update_facility(
        &self,
        facility: usize,
        block: &mut [f64],
        view: &MessageView<'_>,
    ) -> Result<SweepStats> {
        let adj = self.adjacency;
        for (k, &c) in adj.facility_neighbors(facility).iter().enumerate() {
            let peer = adj.facility_peer_slot(facility, k);
            let mut closed = INFEASIBLE;
            let mut open = INFEASIBLE;
            for (x, &g) in adj.city_neighbors(c).iter().enumerate() {
                let w = cost::add(
                    self.problem.distance(c, g),
                    self.correction.city_sum(adj, view, c, peer, x),
                );
                open = cost::min(open, w);
                if x != peer {
                    closed = cost::min(closed, w);
                }
            }
            block[2 * k] = closed;
            block[2 * k + 1] = open;
        }
        finish_block(
            block,
            view.facility_block(facility),
            2,
            |_| FACILITY_REFERENCE,
            self.damping,
            MessageSide::ToFacility,
            facility,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_sets_reference_to_zero() {
        let mut next = [3.0, 5.0, INFEASIBLE];
        let prev = [0.0, 0.0, 0.0];
        let s = normalize_and_damp(&mut next, &prev, 0, 0.0).unwrap();
        assert_eq!(next, [0.0, 2.0, INFEASIBLE]);
        assert_eq!(s.sum_norm, 3.0);
        assert_eq!(s.bellman_error, 4.0);
    }

    #[test]
    fn test_normalize_rejects_infeasible_reference() {
        let mut next = [INFEASIBLE, 1.0];
        assert!(normalize_and_damp(&mut next, &[0.0, 0.0], 0, 0.5).is_none());
    }

    #[test]
    fn test_damping_blends_and_keeps_infeasible() {
        let mut next = [1.0, 5.0, 3.0];
        let prev = [0.0, 2.0, INFEASIBLE];
        let s = normalize_and_damp(&mut next, &prev, 0, 0.5).unwrap();
        assert_eq!(next[0], 0.0);
        assert_eq!(next[1], 0.5 * 4.0 + 0.5 * 2.0);
        assert!(cost::is_infeasible(next[2]));
        // Only entries with a finite previous value count.
        assert_eq!(s.bellman_error, 1.0);
    }

    #[test]
    fn test_reference_entry() {
        let mut next = [INFEASIBLE, 4.0];
        let s = normalize_and_damp(&mut next, &[INFEASIBLE, 0.0], 1, 0.0).unwrap();
        assert_eq!(next, [INFEASIBLE, 0.0]);
        assert_eq!(s.sum_norm, 4.0);
        assert_eq!(s.bellman_error, 0.0);
    }

    #[test]
    fn test_city_reference_avoids_sender_slot() {
        assert_eq!(city_reference(3, 0), 1);
        assert_eq!(city_reference(3, 2), 0);
        assert_eq!(city_reference(1, 0), 0);
    }

    #[test]
    fn test_finish_block_reports_slot() {
        let mut block = [0.0, 1.0, 2.0, INFEASIBLE];
        let prev = [0.0; 4];
        let err = finish_block(&mut block, &prev, 2, |_| 1, 0.0, MessageSide::ToFacility, 4)
            .unwrap_err();
        assert!(matches!(
            err,
            FacilityError::Normalization {
                side: MessageSide::ToFacility,
                node: 4,
                slot: 1
            }
        ));
    }
}
