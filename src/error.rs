//! Error types for facility location solvers.

use thiserror::Error;

/// Which message family a normalization failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSide {
    /// Messages directed into cities.
    ToCity,
    /// Messages directed into facilities.
    ToFacility,
}

impl std::fmt::Display for MessageSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageSide::ToCity => write!(f, "city"),
            MessageSide::ToFacility => write!(f, "facility"),
        }
    }
}

/// Errors raised while building or running a solver.
#[derive(Error, Debug)]
pub enum FacilityError {
    /// Input arrays do not agree on the problem dimensions.
    #[error("dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Name of the offending input.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// The attenuated variants require as many cities as facilities.
    #[error("must have same cities and facilities (cities: {cities}, facilities: {facilities})")]
    NotSquare {
        /// City count.
        cities: usize,
        /// Facility count.
        facilities: usize,
    },

    /// Not enough facilities for the requested variant.
    #[error("at least {required} facilities required, found {found}")]
    TooFewFacilities {
        /// Minimum facility count.
        required: usize,
        /// Actual facility count.
        found: usize,
    },

    /// A configuration value or instance datum is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The reference state of a fresh message is infeasible.
    #[error("unable to normalize message into {side} {node} (slot {slot})")]
    Normalization {
        /// Receiving message family.
        side: MessageSide,
        /// Receiving node index.
        node: usize,
        /// Neighbor slot of the sender in the receiver's adjacency list.
        slot: usize,
    },

    /// Spanning-tree sampling exceeded its budget before covering every edge.
    #[error("spanning tree sampling exhausted after {trees} trees ({uncovered} edges never sampled)")]
    RhoSamplingExhausted {
        /// Trees drawn.
        trees: usize,
        /// Edges with zero inclusion count.
        uncovered: usize,
    },

    /// Malformed problem file.
    #[error("unable to parse line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for facility location operations.
pub type Result<T> = std::result::Result<T, FacilityError>;
