//! City-to-facility distance matrices.
//!
//! Provides a dense rectangular distance matrix where unreachable pairs are
//! marked infeasible.

mod matrix;

pub use matrix::DistanceMatrix;
