//! Min-sum message passing for uncapacitated facility location.
//!
//! - [`BipartiteMinSum`]: one engine for the plain, attenuated, decimated
//!   and tree-reweighted variants, over a dense or sparse [`Layout`]
//! - [`FastSparseMinSum`]: binary city messages with cached beliefs
//! - [`MinSumConfig`]: variant, layout, damping and ρ settings
//! - [`Correction`]: how incoming messages are combined
//! - [`Decimation`]: permanent open/closed clamps
//! - [`MessageStore`]: double-buffered message arena
//!
//! # Reference
//!
//! Lazic, Frey, Aarabi (2010). "Solving the Uncapacitated Facility Location
//! Problem Using Message Passing Algorithms", *AISTATS*.
//!
//! Wainwright, Jaakkola, Willsky (2005). "MAP estimation via agreement on
//! trees: message-passing and linear programming", *IEEE Trans. Inf. Theory*.

mod config;
mod correction;
mod decimation;
pub mod decode;
mod engine;
mod fast;
mod messages;
mod solver;

pub use config::{Layout, MinSumConfig, RhoConfig, RhoSource, Variant};
pub use correction::Correction;
pub use decimation::Decimation;
pub use fast::FastSparseMinSum;
pub use messages::{BlockLayout, MessageStore, MessageView};
pub use solver::BipartiteMinSum;
