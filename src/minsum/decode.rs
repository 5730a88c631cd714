//! Turning beliefs into an open/closed decision.
//!
//! A facility belief is `[closed, open]`: local cost plus the (possibly
//! reweighted) sum of every incoming message at that state.

use crate::cost::{self, INFEASIBLE};
use crate::graph::Adjacency;
use crate::models::{evaluate_objective, FacilityLocationProblem};

use super::decimation::Decimation;

/// Opens a facility iff its open belief is lower by more than the tie
/// tolerance. Ties close.
pub fn decode_beliefs(beliefs: &[[f64; 2]], open: &mut [bool]) {
    for (o, b) in open.iter_mut().zip(beliefs) {
        *o = cost::improves(b[1], b[0]);
    }
}

/// Decimated facilities follow their clamp; the rest follow their beliefs.
pub fn decode_decimated(beliefs: &[[f64; 2]], decimation: &Decimation, open: &mut [bool]) {
    for (f, (o, b)) in open.iter_mut().zip(beliefs).enumerate() {
        *o = decimation
            .fixed_open(f)
            .unwrap_or_else(|| cost::improves(b[1], b[0]));
    }
}

/// How much cheaper opening is than closing, `b(open) − b(closed)`.
///
/// `+∞` if opening is infeasible, `−∞` if only closing is.
pub fn open_advantage(belief: [f64; 2]) -> f64 {
    let [closed, open] = belief;
    if cost::is_infeasible(open) {
        INFEASIBLE
    } else if cost::is_infeasible(closed) {
        f64::NEG_INFINITY
    } else {
        open - closed
    }
}

/// Greedy decoding by open advantage.
///
/// Facilities are opened in increasing order of `score` (ties to the
/// lowest index) for as long as the objective does not increase. The
/// facility that first increases it is closed again and the scan stops.
/// Returns the objective of the final decision.
pub fn decode_greedy<P>(problem: &P, score: &[f64], open: &mut [bool]) -> f64
where
    P: FacilityLocationProblem + ?Sized,
{
    let mut order: Vec<usize> = (0..score.len()).collect();
    order.sort_by(|&a, &b| score[a].total_cmp(&score[b]).then(a.cmp(&b)));

    open.iter_mut().for_each(|o| *o = false);
    let mut last = evaluate_objective(problem, open);
    let mut first = true;
    for f in order {
        open[f] = true;
        let objective = evaluate_objective(problem, open);
        // The first facility is always kept.
        if !first && objective > last {
            open[f] = false;
            break;
        }
        first = false;
        last = objective;
    }
    last
}

/// Opens a facility unless closing it is cheaper by more than the tie
/// tolerance (ties open), then applies [`repair_coverage`].
pub fn decode_tree_reweighted(
    beliefs: &[[f64; 2]],
    adjacency: &Adjacency,
    city_belief: impl Fn(usize, usize) -> f64,
    open: &mut [bool],
) {
    for (o, b) in open.iter_mut().zip(beliefs) {
        *o = !cost::improves(b[0], b[1]);
    }
    repair_coverage(adjacency, city_belief, open);
}

/// Makes sure every city can reach an open facility.
///
/// A city with no open neighbor opens the neighbor minimizing
/// `city_belief(city, slot)`; near-ties go to the lowest slot. Cities are
/// visited in index order, so a facility opened for one city also covers
/// the later ones. Cities with no neighbors are left alone.
pub fn repair_coverage(
    adjacency: &Adjacency,
    city_belief: impl Fn(usize, usize) -> f64,
    open: &mut [bool],
) {
    for c in 0..adjacency.city_count() {
        let neighbors = adjacency.city_neighbors(c);
        if neighbors.is_empty() || neighbors.iter().any(|&f| open[f]) {
            continue;
        }
        let mut best = 0;
        let mut best_value = city_belief(c, 0);
        for x in 1..neighbors.len() {
            let v = city_belief(c, x);
            if cost::improves(v, best_value) {
                best = x;
                best_value = v;
            }
        }
        open[neighbors[best]] = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProblemInstance;

    #[test]
    fn test_decode_beliefs_ties_close() {
        let mut open = [true; 3];
        decode_beliefs(&[[0.0, -1.0], [0.0, 0.0], [INFEASIBLE, INFEASIBLE]], &mut open);
        assert_eq!(open, [true, false, false]);
    }

    #[test]
    fn test_decode_decimated() {
        let mut d = Decimation::new(2);
        d.decimate(|f| if f == 0 { [0.0, 9.0] } else { [0.0, 1.0] });
        let mut open = [true; 2];
        decode_decimated(&[[0.0, -5.0], [0.0, -5.0]], &d, &mut open);
        assert_eq!(open, [false, true]);
    }

    #[test]
    fn test_open_advantage() {
        assert_eq!(open_advantage([2.0, -1.0]), -3.0);
        assert_eq!(open_advantage([INFEASIBLE, 5.0]), f64::NEG_INFINITY);
        assert!(cost::is_infeasible(open_advantage([0.0, INFEASIBLE])));
        assert!(cost::is_infeasible(open_advantage([INFEASIBLE, INFEASIBLE])));
    }

    #[test]
    fn test_greedy_stops_when_objective_rises() {
        let p = ProblemInstance::from_rows(
            vec![1.0, 1.0, 10.0],
            &[vec![0.5, 2.0, 0.1], vec![2.0, 0.5, 0.1]],
        )
        .unwrap();
        let mut open = [false; 3];
        // Ranked 0, 1, 2: {0} = 3.5, {0,1} = 3.0, {0,1,2} = 12.2 > 3.0.
        let obj = decode_greedy(&p, &[-3.0, -2.0, -1.0], &mut open);
        assert_eq!(open, [true, true, false]);
        assert_eq!(obj, 3.0);
    }

    #[test]
    fn test_greedy_keeps_first_even_if_infeasible() {
        let p = ProblemInstance::from_rows(
            vec![1.0, 1.0],
            &[vec![0.5, INFEASIBLE], vec![INFEASIBLE, 0.5]],
        )
        .unwrap();
        let mut open = [false; 2];
        let obj = decode_greedy(&p, &[0.0, 1.0], &mut open);
        assert_eq!(open, [true, true]);
        assert_eq!(obj, 3.0);
    }

    #[test]
    fn test_tree_reweighted_repair() {
        let adj = Adjacency::complete(2, 3);
        let mut open = [false; 3];
        let beliefs = [[0.0, 1.0], [0.0, 0.0], [0.0, 2.0]];
        decode_tree_reweighted(&beliefs, &adj, |_, _| 0.0, &mut open);
        // Facility 1 ties and opens; both cities are covered.
        assert_eq!(open, [false, true, false]);

        let beliefs = [[0.0, 1.0], [0.0, 3.0], [0.0, 2.0]];
        decode_tree_reweighted(&beliefs, &adj, |_, x| [4.0, 1.0, 2.0][x], &mut open);
        assert_eq!(open, [false, true, false]);
    }

    #[test]
    fn test_repair_coverage_breaks_near_ties_low() {
        let adj = Adjacency::complete(2, 2);
        let mut open = [false; 2];
        // Rounding noise on the second slot does not beat the first.
        repair_coverage(&adj, |_, x| [3.75, 3.75 - 1e-12][x], &mut open);
        assert_eq!(open, [true, false]);

        let mut open = [false; 2];
        repair_coverage(&adj, |c, x| if c == 0 { [2.0, 1.0][x] } else { [1.0, 2.0][x] }, &mut open);
        // City 0 opens facility 1, which already covers city 1.
        assert_eq!(open, [false, true]);
    }

    #[test]
    fn test_decode_beliefs_treats_noise_as_tie() {
        let mut open = [true; 2];
        decode_beliefs(&[[5.0 + 4e-9, 5.0], [5.0, 4.0]], &mut open);
        assert_eq!(open, [false, true]);
    }
}
