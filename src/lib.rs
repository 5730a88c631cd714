//! # u-facility
//!
//! Uncapacitated facility location by min-sum message passing, with
//! combinatorial and dual optimality certificates.
//!
//! ## Modules
//!
//! - [`models`]: problem contract, instances, objective, solver traits
//! - [`distance`]: rectangular city × facility distance matrix
//! - [`cost`]: infeasible sentinel and absorbing arithmetic
//! - [`graph`]: bipartite adjacency, spanning-tree sampling, edge weights
//! - [`minsum`]: plain, attenuated, decimated and tree-reweighted solvers
//! - [`local_search`]: add / drop / swap certificate
//! - [`runner`]: iteration loop with convergence and decimation handling
//! - [`io`]: persisted instance text format
//!
//! ## Example
//!
//! ```
//! use u_facility::minsum::{BipartiteMinSum, MinSumConfig};
//! use u_facility::models::ProblemInstance;
//! use u_facility::runner::{RunConfig, Runner};
//!
//! let p = ProblemInstance::from_rows(
//!     vec![5.0, 5.0],
//!     &[vec![0.5, 2.0], vec![2.0, 0.6]],
//! ).unwrap();
//! let config = MinSumConfig::default().with_damping(0.5);
//! let mut solver = BipartiteMinSum::new(&p, config).unwrap();
//! let report = Runner::new(RunConfig::default()).run(&p, &mut solver).unwrap();
//! assert_eq!(report.open_facilities, vec![true, false]);
//! assert_eq!(report.final_objective, 7.5);
//! ```

pub mod cost;
pub mod distance;
pub mod error;
pub mod graph;
pub mod io;
pub mod local_search;
pub mod minsum;
pub mod models;
pub mod runner;

pub use error::{FacilityError, Result};
