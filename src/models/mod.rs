//! Domain model types for uncapacitated facility location.
//!
//! Provides the read-only problem abstraction, an explicit instance type,
//! objective evaluation for a concrete decision, and the solver contracts.

mod instance;
mod objective;
mod problem;
mod solver;

pub use instance::ProblemInstance;
pub use objective::{evaluate_objective, format_open_facilities, nearest_open_facility};
pub use problem::FacilityLocationProblem;
pub use solver::{FacilitySolver, MinSumSolver};
