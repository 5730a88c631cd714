//! Persisted instance format.

mod text;

pub use text::{from_text, read_problem, to_text, write_problem, INFEASIBLE_MARKER};
