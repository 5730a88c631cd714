//! Objective evaluation for a concrete open/closed decision.

use crate::cost::{self, INFEASIBLE};

use super::FacilityLocationProblem;

/// Nearest open facility to `city` by raw distance, ignoring unreachable ones.
///
/// Ties go to the lowest facility index.
pub fn nearest_open_facility<P>(problem: &P, city: usize, open: &[bool]) -> Option<usize>
where
    P: FacilityLocationProblem + ?Sized,
{
    let mut best: Option<(usize, f64)> = None;
    for (j, _) in open.iter().enumerate().filter(|(_, &o)| o) {
        let d = problem.distance(city, j);
        if cost::is_feasible(d) && best.is_none_or(|(_, bd)| d < bd) {
            best = Some((j, d));
        }
    }
    best.map(|(j, _)| j)
}

/// Total cost of `open`: construction costs of open facilities plus each
/// city's distance to its nearest open facility.
///
/// Returns [`INFEASIBLE`] if some city cannot reach any open facility
/// (in particular when nothing is open and there is at least one city).
///
/// # Examples
///
/// ```
/// use u_facility::models::{evaluate_objective, ProblemInstance};
///
/// let p = ProblemInstance::from_rows(
///     vec![1.0, 1.0],
///     &[vec![0.5, 2.0], vec![2.0, 0.5]],
/// ).unwrap();
/// assert_eq!(evaluate_objective(&p, &[true, true]), 3.0);
/// assert_eq!(evaluate_objective(&p, &[true, false]), 3.5);
/// assert!(evaluate_objective(&p, &[false, false]).is_infinite());
/// ```
pub fn evaluate_objective<P>(problem: &P, open: &[bool]) -> f64
where
    P: FacilityLocationProblem + ?Sized,
{
    let mut total: f64 = open
        .iter()
        .enumerate()
        .filter(|(_, &o)| o)
        .map(|(j, _)| problem.construction_cost(j))
        .sum();
    for i in 0..problem.city_count() {
        match nearest_open_facility(problem, i, open) {
            Some(j) => total += problem.distance(i, j),
            None => return INFEASIBLE,
        }
    }
    total
}

/// 1-based, comma-separated indices of the open facilities.
///
/// ```
/// use u_facility::models::format_open_facilities;
///
/// assert_eq!(format_open_facilities(&[true, false, true]), "1,3");
/// assert_eq!(format_open_facilities(&[false]), "");
/// ```
pub fn format_open_facilities(open: &[bool]) -> String {
    open.iter()
        .enumerate()
        .filter(|(_, &o)| o)
        .map(|(j, _)| (j + 1).to_string())
        .collect::<Vec<_>>()
        .join(",")
}
