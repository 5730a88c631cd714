//! Permanent open/closed clamps for stalled iterations.
//!
//! # Algorithm
//!
//! Among facilities not yet fixed, pick the one whose belief most strongly
//! prefers one side, `|b(open) − b(closed)|`, ties to the lowest index.
//! Fix it by giving the preferred side bias 0 and the other side an
//! infeasible bias. A facility whose open belief is infeasible is fixed
//! closed, and vice versa; if both are infeasible it is fixed closed.

use crate::cost::{self, INFEASIBLE};

/// Per-facility decimation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Decimation {
    bias: Vec<[f64; 2]>,
    decimated: Vec<bool>,
}

impl Decimation {
    pub fn new(facilities: usize) -> Self {
        Self {
            bias: vec![[0.0, 0.0]; facilities],
            decimated: vec![false; facilities],
        }
    }

    /// `[closed, open]` bias of every facility.
    pub fn biases(&self) -> &[[f64; 2]] {
        &self.bias
    }

    pub fn is_decimated(&self, facility: usize) -> bool {
        self.decimated[facility]
    }

    pub fn is_fully_decimated(&self) -> bool {
        self.decimated.iter().all(|&d| d)
    }

    pub fn remaining(&self) -> usize {
        self.decimated.iter().filter(|&&d| !d).count()
    }

    /// The fixed decision of `facility`, if it has been decimated.
    pub fn fixed_open(&self, facility: usize) -> Option<bool> {
        self.decimated[facility].then(|| self.bias[facility][0] > self.bias[facility][1])
    }

    /// Fixes one more facility. `belief(f)` returns `[closed, open]`.
    ///
    /// Returns the facility fixed and whether it was fixed open, or `None`
    /// when every facility is already fixed.
    pub fn decimate(&mut self, belief: impl Fn(usize) -> [f64; 2]) -> Option<(usize, bool)> {
        let mut best: Option<(usize, f64, bool)> = None;
        for f in (0..self.decimated.len()).filter(|&f| !self.decimated[f]) {
            let [closed, open] = belief(f);
            let (magnitude, open_side) = match (cost::is_feasible(closed), cost::is_feasible(open)) {
                (true, true) => ((open - closed).abs(), open < closed),
                (true, false) => (INFEASIBLE, false),
                (false, true) => (INFEASIBLE, true),
                (false, false) => (INFEASIBLE, false),
            };
            if best.is_none_or(|(_, m, _)| magnitude > m) {
                best = Some((f, magnitude, open_side));
            }
        }

        let (f, _, open) = best?;
        self.decimated[f] = true;
        self.bias[f] = if open { [INFEASIBLE, 0.0] } else { [0.0, INFEASIBLE] };
        Some((f, open))
    }

    /// Clears every clamp.
    pub fn reset(&mut self) {
        self.bias.iter_mut().for_each(|b| *b = [0.0, 0.0]);
        self.decimated.iter_mut().for_each(|d| *d = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_largest_magnitude() {
        let mut d = Decimation::new(3);
        let beliefs = [[0.0, 1.0], [0.0, -3.0], [0.0, 2.0]];
        assert_eq!(d.decimate(|f| beliefs[f]), Some((1, true)));
        assert_eq!(d.biases()[1], [INFEASIBLE, 0.0]);
        assert_eq!(d.fixed_open(1), Some(true));
        assert_eq!(d.decimate(|f| beliefs[f]), Some((2, false)));
        assert_eq!(d.fixed_open(2), Some(false));
        assert_eq!(d.fixed_open(0), None);
        assert_eq!(d.remaining(), 1);
    }

    #[test]
    fn test_zero_magnitude_still_progresses() {
        let mut d = Decimation::new(2);
        assert_eq!(d.decimate(|_| [0.0, 0.0]), Some((0, false)));
        assert_eq!(d.decimate(|_| [0.0, 0.0]), Some((1, false)));
        assert!(d.is_fully_decimated());
        assert_eq!(d.decimate(|_| [0.0, 0.0]), None);
    }

    #[test]
    fn test_infeasible_beliefs() {
        let mut d = Decimation::new(3);
        let beliefs = [[0.0, 5.0], [INFEASIBLE, 2.0], [0.0, INFEASIBLE]];
        assert_eq!(d.decimate(|f| beliefs[f]), Some((1, true)));
        assert_eq!(d.decimate(|f| beliefs[f]), Some((2, false)));
        assert_eq!(d.decimate(|f| beliefs[f]), Some((0, false)));
    }

    #[test]
    fn test_reset() {
        let mut d = Decimation::new(1);
        d.decimate(|_| [0.0, -1.0]);
        d.reset();
        assert!(!d.is_decimated(0));
        assert_eq!(d.biases()[0], [0.0, 0.0]);
    }
}
