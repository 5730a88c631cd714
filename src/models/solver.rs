//! Solver contracts exposed to drivers.

use crate::error::Result;

use super::format_open_facilities;

/// Anything that produces an open/closed decision for every facility.
pub trait FacilitySolver {
    /// Cost of the current decision, or [`crate::cost::INFEASIBLE`].
    fn objective_value(&self) -> f64;

    /// Current decision, one flag per facility (`true` = open).
    fn optimal_facilities(&self) -> &[bool];

    /// Returns `true` if the solver can certify the current decision as a
    /// global optimum.
    fn is_global_optimum(&self) -> bool;

    /// 1-based comma-separated indices of open facilities.
    fn optimal_facilities_string(&self) -> String {
        format_open_facilities(self.optimal_facilities())
    }
}

/// An iterative message-passing solver.
///
/// One call to [`iterate`](MinSumSolver::iterate) is one synchronous sweep.
/// Iteration budgets and tolerances belong to the caller.
pub trait MinSumSolver: FacilitySolver {
    /// Advances one sweep.
    ///
    /// On error the solver state is left as it was before the call.
    fn iterate(&mut self) -> Result<()>;

    /// Sum of squared message changes in the last sweep.
    fn bellman_error(&self) -> f64;

    /// Sum of the normalization constants removed in the last sweep.
    fn sum_norm(&self) -> f64;

    /// Permanently fixes one more facility. Returns the facility fixed, or
    /// `None` if the solver does not decimate or nothing is left.
    fn decimate(&mut self) -> Option<usize> {
        None
    }

    /// Returns `true` once every facility is fixed. Solvers that do not
    /// decimate report `true`.
    fn is_fully_decimated(&self) -> bool {
        true
    }

    /// Returns `true` if this solver decimates when it stalls.
    fn supports_decimation(&self) -> bool {
        false
    }
}
