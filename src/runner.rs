//! Caller-side iteration loop.
//!
//! Solvers only know how to take one sweep. [`Runner`] drives a solver until
//! the Bellman error falls below a tolerance or an iteration budget runs
//! out, tracks the best objective seen, and optionally certifies the final
//! decision with the [`LocalOptimumTester`].
//!
//! A solver that decimates is not stopped at its first convergence: it fixes
//! one more facility and keeps iterating until everything is fixed.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cost::INFEASIBLE;
use crate::error::{FacilityError, Result};
use crate::local_search::{LocalOptimumReport, LocalOptimumTester};
use crate::models::{FacilityLocationProblem, MinSumSolver};

/// Budget and stopping rule for a [`Runner`].
///
/// # Examples
///
/// ```
/// use u_facility::runner::RunConfig;
///
/// let config = RunConfig::default()
///     .with_max_iterations(500)
///     .with_tolerance(1e-6)
///     .with_test_local_optimum(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Sweeps allowed before giving up.
    pub max_iterations: usize,
    /// Bellman error below which the messages count as converged.
    ///
    /// The error is a sum of squared changes. Instances whose beliefs tie
    /// exactly (symmetric ones) need a much smaller value than the default
    /// before decisions and certificates settle.
    pub tolerance: f64,
    /// Run the single-move certificate on the final decision.
    pub test_local_optimum: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-9,
            test_local_optimum: false,
        }
    }
}

impl RunConfig {
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_test_local_optimum(mut self, enabled: bool) -> Self {
        self.test_local_optimum = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(FacilityError::InvalidParameter(
                "max_iterations must be at least 1".into(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(FacilityError::InvalidParameter(format!(
                "tolerance must be >= 0, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Summary of one [`Runner::run`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Sweeps performed.
    pub iterations: usize,
    /// Stopped on the tolerance rather than the budget.
    pub converged: bool,
    /// Lowest objective over all sweeps.
    pub best_objective: f64,
    /// First sweep (1-based) reaching `best_objective`, if any was feasible.
    pub best_iteration: Option<usize>,
    pub final_objective: f64,
    /// Final decision, one flag per facility.
    pub open_facilities: Vec<bool>,
    /// Some sweep within tolerance certified its decision as a global
    /// optimum.
    pub found_global_optimum: bool,
    /// The final decision is certified as a global optimum.
    pub global_optimum: bool,
    pub bellman_error: f64,
    pub sum_norm: f64,
    /// Facilities fixed by decimation along the way.
    pub decimations: usize,
    pub local_optimum: Option<LocalOptimumReport>,
    pub elapsed: Duration,
    /// Time until `best_iteration` finished.
    pub time_to_best: Duration,
}

/// Drives a [`MinSumSolver`] to convergence.
///
/// # Examples
///
/// ```
/// use u_facility::minsum::{BipartiteMinSum, MinSumConfig};
/// use u_facility::models::ProblemInstance;
/// use u_facility::runner::{RunConfig, Runner};
///
/// let p = ProblemInstance::from_rows(
///     vec![1.0, 1.0],
///     &[vec![0.5, 2.0], vec![2.0, 0.5]],
/// ).unwrap();
/// let mut solver = BipartiteMinSum::new(&p, MinSumConfig::default()).unwrap();
/// let report = Runner::new(RunConfig::default()).run(&p, &mut solver).unwrap();
/// assert!(report.converged);
/// assert_eq!(report.best_objective, 3.0);
/// assert!(report.global_optimum);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Iterates `solver`, which must have been built for `problem`.
    ///
    /// # Errors
    ///
    /// Invalid configuration, a decision length that does not match
    /// `problem`, or any error raised by [`MinSumSolver::iterate`].
    #[tracing::instrument(level = "info", skip_all)]
    pub fn run<P, S>(&self, problem: &P, solver: &mut S) -> Result<RunReport>
    where
        P: FacilityLocationProblem + ?Sized,
        S: MinSumSolver + ?Sized,
    {
        self.config.validate()?;
        let start = Instant::now();

        let mut best_objective = INFEASIBLE;
        let mut best_iteration = None;
        let mut time_to_best = Duration::ZERO;
        let mut found_global_optimum = false;
        let mut decimations = 0;
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.config.max_iterations {
            solver.iterate()?;
            iterations += 1;

            let objective = solver.objective_value();
            if objective < best_objective {
                best_objective = objective;
                best_iteration = Some(iterations);
                time_to_best = start.elapsed();
            }
            let global = solver.is_global_optimum();
            let error = solver.bellman_error();
            debug!(
                iteration = iterations,
                objective,
                bellman_error = error,
                global,
                open = %solver.optimal_facilities_string(),
                "sweep"
            );

            if error < self.config.tolerance {
                // A certificate only means something at a fixed point.
                found_global_optimum |= global;
                if solver.is_fully_decimated() {
                    converged = true;
                    break;
                }
                if let Some(facility) = solver.decimate() {
                    decimations += 1;
                    debug!(iteration = iterations, facility, "decimated after convergence");
                }
            }
        }

        if !converged {
            warn!(
                iterations,
                bellman_error = solver.bellman_error(),
                "iteration budget exhausted before convergence"
            );
        }

        let local_optimum = if self.config.test_local_optimum {
            let mut tester = LocalOptimumTester::new(problem);
            tester.set_open_facilities(solver.optimal_facilities())?;
            Some(tester.report())
        } else {
            None
        };

        let report = RunReport {
            iterations,
            converged,
            best_objective,
            best_iteration,
            final_objective: solver.objective_value(),
            open_facilities: solver.optimal_facilities().to_vec(),
            found_global_optimum,
            global_optimum: solver.is_global_optimum(),
            bellman_error: solver.bellman_error(),
            sum_norm: solver.sum_norm(),
            decimations,
            local_optimum,
            elapsed: start.elapsed(),
            time_to_best,
        };
        info!(
            iterations,
            converged,
            best_objective,
            global_optimum = report.global_optimum,
            decimations,
            "run finished"
        );
        Ok(report)
    }
}
