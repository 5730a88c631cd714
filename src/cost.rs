//! Infeasible-cost sentinel and absorbing arithmetic.
//!
//! A forbidden state carries the cost [`INFEASIBLE`] (`+∞`). Every
//! combination used by the solvers goes through the helpers here, which
//! return [`INFEASIBLE`] as soon as any operand is infeasible. This keeps
//! `0 · ∞` and `∞ − ∞` (both NaN) out of the message arithmetic.
//!
//! # Examples
//!
//! ```
//! use u_facility::cost::{self, INFEASIBLE};
//!
//! assert_eq!(cost::add(1.5, 2.0), 3.5);
//! assert!(cost::is_infeasible(cost::add(1.5, INFEASIBLE)));
//! assert!(cost::is_infeasible(cost::scale(INFEASIBLE, 0.0)));
//! assert_eq!(cost::min(INFEASIBLE, 4.0), 4.0);
//! ```

/// Cost of a combinatorially forbidden state.
pub const INFEASIBLE: f64 = f64::INFINITY;

/// Returns `true` if `value` denotes an infeasible cost.
#[inline]
pub fn is_infeasible(value: f64) -> bool {
    value == INFEASIBLE
}

/// Returns `true` if `value` is a usable (finite) cost.
#[inline]
pub fn is_feasible(value: f64) -> bool {
    value < INFEASIBLE
}

/// Absorbing addition.
#[inline]
pub fn add(a: f64, b: f64) -> f64 {
    if is_infeasible(a) || is_infeasible(b) {
        INFEASIBLE
    } else {
        a + b
    }
}

/// Absorbing scaling. An infeasible value stays infeasible for any weight,
/// including zero.
#[inline]
pub fn scale(value: f64, weight: f64) -> f64 {
    if is_infeasible(value) {
        INFEASIBLE
    } else {
        value * weight
    }
}

/// Minimum of two costs.
#[inline]
pub fn min(a: f64, b: f64) -> f64 {
    if a < b {
        a
    } else {
        b
    }
}

/// Relative gap below which two costs count as tied.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// Returns `true` if `candidate` is cheaper than `incumbent` by more than
/// [`TIE_TOLERANCE`] (relative, with a floor of one). Anything feasible
/// improves on an infeasible incumbent.
#[inline]
pub fn improves(candidate: f64, incumbent: f64) -> bool {
    if is_infeasible(incumbent) {
        return is_feasible(candidate);
    }
    candidate < incumbent - TIE_TOLERANCE * incumbent.abs().max(1.0)
}

/// Absorbing sum over an iterator. Stops at the first infeasible term.
pub fn sum<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    let mut total = 0.0;
    for v in values {
        if is_infeasible(v) {
            return INFEASIBLE;
        }
        total += v;
    }
    total
}
