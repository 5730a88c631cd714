//! Combinatorial optimality checks, independent of how a decision was found.
//!
//! - [`LocalOptimumTester`]: prices every single add, drop and exchange move
//! - [`LocalOptimumReport`]: which of those tests passed

mod tester;

pub use tester::{LocalOptimumReport, LocalOptimumTester};
