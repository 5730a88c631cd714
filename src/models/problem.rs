//! Facility location problem trait.

use crate::cost;

/// Read-only view of an uncapacitated facility location instance.
///
/// Solvers borrow the problem for their whole lifetime and never mutate it.
/// Distances equal to [`cost::INFEASIBLE`] mark city/facility pairs that
/// cannot be assigned.
///
/// # Examples
///
/// ```
/// use u_facility::models::FacilityLocationProblem;
///
/// struct TwoByOne;
///
/// impl FacilityLocationProblem for TwoByOne {
///     fn city_count(&self) -> usize { 2 }
///     fn facility_count(&self) -> usize { 1 }
///     fn construction_cost(&self, _facility: usize) -> f64 { 3.0 }
///     fn distance(&self, city: usize, _facility: usize) -> f64 { city as f64 }
/// }
///
/// let p = TwoByOne;
/// assert_eq!(p.total_facility_cost(), 3.0);
/// assert_eq!(p.all_open_cost(), 4.0);
/// ```
pub trait FacilityLocationProblem: Send + Sync {
    /// Number of demand points.
    fn city_count(&self) -> usize;

    /// Number of candidate sites.
    fn facility_count(&self) -> usize;

    /// Cost of opening `facility`.
    fn construction_cost(&self, facility: usize) -> f64;

    /// Cost of serving `city` from `facility`, or [`cost::INFEASIBLE`].
    fn distance(&self, city: usize, facility: usize) -> f64;

    /// Sum of all construction costs.
    fn total_facility_cost(&self) -> f64 {
        (0..self.facility_count())
            .map(|j| self.construction_cost(j))
            .sum()
    }

    /// Objective of opening every facility: all construction costs plus each
    /// city's nearest distance. Cities with no reachable facility are skipped.
    ///
    /// Any feasible solution costs at most this much, which makes it a safe
    /// finite penalty.
    fn all_open_cost(&self) -> f64 {
        let mut total = self.total_facility_cost();
        for i in 0..self.city_count() {
            let nearest = (0..self.facility_count())
                .map(|j| self.distance(i, j))
                .fold(cost::INFEASIBLE, cost::min);
            if cost::is_feasible(nearest) {
                total += nearest;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grid {
        cost: Vec<f64>,
        dist: Vec<Vec<f64>>,
    }

    impl FacilityLocationProblem for Grid {
        fn city_count(&self) -> usize {
            self.dist.len()
        }
        fn facility_count(&self) -> usize {
            self.cost.len()
        }
        fn construction_cost(&self, facility: usize) -> f64 {
            self.cost[facility]
        }
        fn distance(&self, city: usize, facility: usize) -> f64 {
            self.dist[city][facility]
        }
    }

    #[test]
    fn test_default_costs() {
        let p = Grid {
            cost: vec![1.0, 2.0],
            dist: vec![vec![0.5, 3.0], vec![cost::INFEASIBLE, 1.5]],
        };
        assert_eq!(p.total_facility_cost(), 3.0);
        assert!((p.all_open_cost() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_open_cost_skips_unreachable_city() {
        let p = Grid {
            cost: vec![1.0],
            dist: vec![vec![cost::INFEASIBLE], vec![2.0]],
        };
        assert_eq!(p.all_open_cost(), 3.0);
    }
}
