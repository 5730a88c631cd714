//! Single-move optimality certificate for an open/closed decision.
//!
//! # Algorithm
//!
//! Each city keeps its reachable facilities sorted by distance. For a given
//! decision, the first and second open entries of that list are the city's
//! best and runner-up facility. Every move below is then priced exactly
//! from those two, without re-evaluating the objective:
//!
//! - **add** a closed facility: its construction cost minus what every city
//!   saves by switching to it.
//! - **drop** an open facility: minus its construction cost, plus the extra
//!   distance of each city it served moving to its runner-up (infeasible if
//!   it has none).
//! - **swap with reassignment**: add one and drop another; cities of the
//!   dropped facility take the better of the added one and their runner-up,
//!   every other city may switch to the added one.
//! - **swap**: the same exchange, but cities of the dropped facility must
//!   move to the added one and nobody else changes. This overestimates the
//!   exchange, so it only rejects a subset of what the previous test does.
//!
//! A test passes when no move of its kind strictly lowers the cost.
//!
//! # Complexity
//!
//! O(F·C) for add and drop, O(F²·C) for the swaps, after O(C·F log F)
//! setup.

use serde::{Deserialize, Serialize};

use crate::cost::{self, INFEASIBLE};
use crate::error::{FacilityError, Result};
use crate::models::FacilityLocationProblem;

/// Outcome of every single-move test on one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalOptimumReport {
    pub add: bool,
    pub drop: bool,
    pub swap: bool,
    pub swap_reassign: bool,
}

impl LocalOptimumReport {
    /// No add, drop or exchange improves the decision.
    pub fn is_local_optimum(&self) -> bool {
        self.add && self.drop && self.swap_reassign
    }
}

/// Prices single add/drop/swap moves around a decision.
///
/// # Examples
///
/// ```
/// use u_facility::local_search::LocalOptimumTester;
/// use u_facility::models::ProblemInstance;
///
/// let p = ProblemInstance::from_rows(
///     vec![5.0, 5.0],
///     &[vec![0.5, 2.0], vec![2.0, 0.5]],
/// ).unwrap();
/// let mut tester = LocalOptimumTester::new(&p);
///
/// tester.set_open_facilities(&[true, false]).unwrap();
/// assert!(tester.report().is_local_optimum());
///
/// tester.set_open_facilities(&[true, true]).unwrap();
/// assert!(!tester.is_local_optimum_drop());
/// ```
#[derive(Debug, Clone)]
pub struct LocalOptimumTester<'a, P: ?Sized> {
    problem: &'a P,
    /// Reachable facilities per city, nearest first, ties by index.
    ranked: Vec<Vec<usize>>,
    open: Vec<bool>,
    best: Vec<Option<usize>>,
    second: Vec<Option<usize>>,
    /// Some city has no open reachable facility.
    unserved: bool,
}

impl<'a, P> LocalOptimumTester<'a, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    pub fn new(problem: &'a P) -> Self {
        let ranked = (0..problem.city_count())
            .map(|c| {
                let mut list: Vec<usize> = (0..problem.facility_count())
                    .filter(|&f| cost::is_feasible(problem.distance(c, f)))
                    .collect();
                list.sort_by(|&a, &b| problem.distance(c, a).total_cmp(&problem.distance(c, b)));
                list
            })
            .collect();
        Self {
            problem,
            ranked,
            open: vec![false; problem.facility_count()],
            best: vec![None; problem.city_count()],
            second: vec![None; problem.city_count()],
            unserved: problem.city_count() > 0,
        }
    }

    /// Loads the decision to test.
    pub fn set_open_facilities(&mut self, open: &[bool]) -> Result<()> {
        if open.len() != self.open.len() {
            return Err(FacilityError::DimensionMismatch {
                what: "open facilities",
                expected: self.open.len(),
                found: open.len(),
            });
        }
        self.open.copy_from_slice(open);
        self.unserved = false;
        for (c, list) in self.ranked.iter().enumerate() {
            let mut served = list.iter().copied().filter(|&f| self.open[f]);
            self.best[c] = served.next();
            self.second[c] = served.next();
            self.unserved |= self.best[c].is_none();
        }
        Ok(())
    }

    /// Runs every test on the loaded decision.
    pub fn report(&self) -> LocalOptimumReport {
        LocalOptimumReport {
            add: self.is_local_optimum_add(),
            drop: self.is_local_optimum_drop(),
            swap: self.is_local_optimum_swap(),
            swap_reassign: self.is_local_optimum_swap_reassign(),
        }
    }

    fn best_distance(&self, city: usize) -> f64 {
        self.best[city].map_or(INFEASIBLE, |f| self.problem.distance(city, f))
    }

    /// Savings of every city that would switch to `facility` if it opened.
    fn savings(&self, facility: usize, skip: Option<usize>) -> f64 {
        let mut total = 0.0;
        for c in 0..self.problem.city_count() {
            if skip.is_some() && self.best[c] == skip {
                continue;
            }
            let new = self.problem.distance(c, facility);
            let old = self.best_distance(c);
            if cost::is_feasible(new) && new < old {
                total += old - new;
            }
        }
        total
    }

    /// No closed facility is worth opening.
    pub fn is_local_optimum_add(&self) -> bool {
        if self.unserved {
            return false;
        }
        (0..self.open.len())
            .filter(|&f| !self.open[f])
            .all(|f| self.problem.construction_cost(f) - self.savings(f, None) >= 0.0)
    }

    /// Change in cost from closing `facility`, infeasible if some city
    /// would be left without a facility.
    fn drop_delta(&self, facility: usize) -> f64 {
        let mut delta = -self.problem.construction_cost(facility);
        for c in 0..self.problem.city_count() {
            if self.best[c] != Some(facility) {
                continue;
            }
            match self.second[c] {
                Some(g) => delta += self.problem.distance(c, g) - self.problem.distance(c, facility),
                None => return INFEASIBLE,
            }
        }
        delta
    }

    /// No open facility is worth closing.
    pub fn is_local_optimum_drop(&self) -> bool {
        if self.unserved {
            return false;
        }
        (0..self.open.len())
            .filter(|&f| self.open[f])
            .all(|f| self.drop_delta(f) >= 0.0)
    }

    fn exchanges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let facilities = self.open.len();
        (0..facilities)
            .filter(move |&f| !self.open[f])
            .flat_map(move |add| {
                (0..facilities)
                    .filter(move |&f| self.open[f])
                    .map(move |drop| (add, drop))
            })
    }

    /// No exchange improves the cost when every city picks its best
    /// remaining facility.
    pub fn is_local_optimum_swap_reassign(&self) -> bool {
        if self.unserved {
            return false;
        }
        self.exchanges().all(|(add, drop)| {
            let mut delta = self.problem.construction_cost(add) - self.problem.construction_cost(drop);
            for c in 0..self.problem.city_count() {
                if self.best[c] != Some(drop) {
                    continue;
                }
                let runner_up = self.second[c].map_or(INFEASIBLE, |g| self.problem.distance(c, g));
                let new = cost::min(self.problem.distance(c, add), runner_up);
                if cost::is_infeasible(new) {
                    return true;
                }
                delta += new - self.problem.distance(c, drop);
            }
            delta - self.savings(add, Some(drop)) >= 0.0
        })
    }

    /// No exchange improves the cost when the dropped facility's cities all
    /// move to the added one.
    pub fn is_local_optimum_swap(&self) -> bool {
        if self.unserved {
            return false;
        }
        self.exchanges().all(|(add, drop)| {
            let mut delta = self.problem.construction_cost(add) - self.problem.construction_cost(drop);
            for c in 0..self.problem.city_count() {
                if self.best[c] != Some(drop) {
                    continue;
                }
                let new = self.problem.distance(c, add);
                if cost::is_infeasible(new) {
                    return true;
                }
                delta += new - self.problem.distance(c, drop);
            }
            delta >= 0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{evaluate_objective, ProblemInstance};
    use proptest::prelude::*;

    fn line() -> ProblemInstance {
        // Three cities on a line, facilities at both ends and the middle.
        ProblemInstance::from_rows(
            vec![3.0, 1.0, 3.0],
            &[
                vec![0.0, 1.0, 2.0],
                vec![1.0, 0.0, 1.0],
                vec![2.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    fn tester_for<'a>(p: &'a ProblemInstance, open: &[bool]) -> LocalOptimumTester<'a, ProblemInstance> {
        let mut t = LocalOptimumTester::new(p);
        t.set_open_facilities(open).unwrap();
        t
    }

    #[test]
    fn test_middle_is_optimal() {
        let p = line();
        let report = tester_for(&p, &[false, true, false]).report();
        assert!(report.is_local_optimum());
        assert!(report.swap);
    }

    #[test]
    fn test_add_detected() {
        let p = ProblemInstance::from_rows(vec![1.0, 1.0], &[vec![0.5, 5.0], vec![5.0, 0.5]]).unwrap();
        let t = tester_for(&p, &[true, false]);
        assert!(!t.is_local_optimum_add());
        assert!(t.is_local_optimum_drop());
    }

    #[test]
    fn test_drop_detected() {
        let p = line();
        let t = tester_for(&p, &[true, true, false]);
        assert!(!t.is_local_optimum_drop());
    }

    #[test]
    fn test_swap_variants() {
        let p = line();
        let t = tester_for(&p, &[true, false, false]);
        // Exchanging the end for the middle saves 2 in construction and 1 in
        // distance.
        assert!(!t.is_local_optimum_swap_reassign());
        assert!(!t.is_local_optimum_swap());

        let p = ProblemInstance::from_rows(
            vec![1.0, 1.0, 1.0],
            &[vec![0.0, 9.0, 1.0], vec![9.0, 0.0, 9.0]],
        )
        .unwrap();
        // Each city already sits on its own facility.
        let t = tester_for(&p, &[true, true, false]);
        assert!(t.is_local_optimum_swap());
        assert!(t.is_local_optimum_swap_reassign());
    }

    #[test]
    fn test_restricted_swap_is_weaker() {
        // Dropping facility 0 sends city 0 to facility 1 (already open) in
        // the reassigning test, but to facility 2 in the restricted one.
        let p = ProblemInstance::from_rows(
            vec![4.0, 1.0, 1.0],
            &[vec![0.0, 1.0, 8.0], vec![8.0, 0.0, 8.0], vec![8.0, 8.0, 0.0]],
        )
        .unwrap();
        let t = tester_for(&p, &[true, true, false]);
        assert!(!t.is_local_optimum_swap_reassign());
        assert!(t.is_local_optimum_swap());
    }

    #[test]
    fn test_unserved_city_fails_everything() {
        let p = ProblemInstance::from_rows(vec![1.0, 1.0], &[vec![0.5, INFEASIBLE], vec![2.0, 0.5]]).unwrap();
        let report = tester_for(&p, &[false, true]).report();
        assert_eq!(
            report,
            LocalOptimumReport {
                add: false,
                drop: false,
                swap: false,
                swap_reassign: false
            }
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let p = line();
        let mut t = LocalOptimumTester::new(&p);
        assert!(matches!(
            t.set_open_facilities(&[true]),
            Err(FacilityError::DimensionMismatch { expected: 3, found: 1, .. })
        ));
    }

    fn small_instance() -> impl Strategy<Value = (ProblemInstance, Vec<bool>)> {
        (1usize..=6, 1usize..=6).prop_flat_map(|(c, f)| {
            (
                prop::collection::vec(0u32..32, f),
                prop::collection::vec(prop::collection::vec(0u32..64, f), c),
                prop::collection::vec(any::<bool>(), f),
            )
                .prop_map(|(costs, rows, open)| {
                    let costs = costs.into_iter().map(|v| f64::from(v) / 4.0).collect();
                    let rows: Vec<Vec<f64>> = rows
                        .into_iter()
                        .map(|r| {
                            r.into_iter()
                                .map(|v| if v % 7 == 6 { INFEASIBLE } else { f64::from(v) / 8.0 })
                                .collect()
                        })
                        .collect();
                    (ProblemInstance::from_rows(costs, &rows).unwrap(), open)
                })
        })
    }

    fn improves(p: &ProblemInstance, base: f64, open: &[bool]) -> bool {
        evaluate_objective(p, open) < base
    }

    proptest! {
        #[test]
        fn prop_tests_match_enumeration((p, open) in small_instance()) {
            let base = evaluate_objective(&p, &open);
            prop_assume!(cost::is_feasible(base));
            let report = tester_for(&p, &open).report();
            let f = open.len();

            let mut add_move = false;
            let mut drop_move = false;
            let mut swap_move = false;
            for a in 0..f {
                let mut next = open.clone();
                next[a] = !next[a];
                if open[a] {
                    drop_move |= improves(&p, base, &next);
                } else {
                    add_move |= improves(&p, base, &next);
                }
                for d in (0..f).filter(|&d| !open[a] && open[d]) {
                    let mut next = open.clone();
                    next[a] = true;
                    next[d] = false;
                    swap_move |= improves(&p, base, &next);
                }
            }

            prop_assert_eq!(report.add, !add_move);
            prop_assert_eq!(report.drop, !drop_move);
            prop_assert_eq!(report.swap_reassign, !swap_move);
            if report.swap_reassign {
                prop_assert!(report.swap);
            }
            if report.is_local_optimum() {
                prop_assert!(!add_move && !drop_move && !swap_move);
            }
        }
    }
}
