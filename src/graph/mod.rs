//! Bipartite city/facility graph structure.
//!
//! - [`Adjacency`]: neighbor lists with peer slots and stable edge ids
//! - [`UniformSpanningTree`]: Aldous–Broder forest sampler
//! - [`RhoTable`]: per-edge appearance probabilities for tree reweighting

mod adjacency;
mod rho;
mod spanning_tree;

pub use adjacency::Adjacency;
pub use rho::RhoTable;
pub use spanning_tree::UniformSpanningTree;
