//! Min-sum solver on the city/facility bipartite graph.
//!
//! Each city chooses which neighbor serves it; each facility chooses
//! whether to open. A city may only pick an open facility. Messages flow
//! along every city/facility edge of the chosen [`Layout`], and the
//! [`Variant`] decides how incoming messages are combined and how the
//! result is decoded.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::cost::{self, INFEASIBLE};
use crate::error::{FacilityError, Result};
use crate::graph::{Adjacency, RhoTable};
use crate::models::{
    evaluate_objective, nearest_open_facility, FacilityLocationProblem, FacilitySolver,
    MinSumSolver,
};

use super::config::{Layout, MinSumConfig, RhoSource, Variant};
use super::correction::Correction;
use super::decimation::Decimation;
use super::decode;
use super::engine::SweepContext;
use super::messages::MessageStore;

/// Configurable min-sum solver for uncapacitated facility location.
///
/// # Examples
///
/// ```
/// use u_facility::minsum::{BipartiteMinSum, MinSumConfig};
/// use u_facility::models::{FacilitySolver, MinSumSolver, ProblemInstance};
///
/// let p = ProblemInstance::from_rows(
///     vec![1.0, 1.0],
///     &[vec![0.5, 2.0], vec![2.0, 0.5]],
/// ).unwrap();
/// let mut solver = BipartiteMinSum::new(&p, MinSumConfig::default()).unwrap();
/// for _ in 0..50 {
///     solver.iterate().unwrap();
/// }
/// assert_eq!(solver.optimal_facilities(), &[true, true]);
/// assert_eq!(solver.objective_value(), 3.0);
/// assert!(solver.is_global_optimum());
/// ```
#[derive(Debug)]
pub struct BipartiteMinSum<'a, P: ?Sized> {
    problem: &'a P,
    config: MinSumConfig,
    adjacency: Adjacency,
    correction: Correction,
    decimation: Option<Decimation>,
    messages: MessageStore,
    open: Vec<bool>,
    objective: f64,
    bellman_error: f64,
    sum_norm: f64,
    iterations: usize,
}

impl<'a, P> BipartiteMinSum<'a, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    /// Builds a solver, sampling ρ first if the configuration asks for it.
    ///
    /// # Errors
    ///
    /// - [`FacilityError::InvalidParameter`] for out-of-range settings, or
    ///   uniform ρ on a sparse instance that is not fully connected.
    /// - [`FacilityError::NotSquare`] / [`FacilityError::TooFewFacilities`]
    ///   for the attenuated variants.
    /// - [`FacilityError::RhoSamplingExhausted`] if spanning-tree sampling
    ///   runs out of budget.
    pub fn new(problem: &'a P, config: MinSumConfig) -> Result<Self> {
        config.validate()?;
        let cities = problem.city_count();
        let facilities = problem.facility_count();

        let adjacency = match config.layout {
            Layout::Dense => Adjacency::complete(cities, facilities),
            Layout::Sparse => Adjacency::from_problem(problem),
        };

        let correction = match config.variant {
            Variant::Plain => Correction::Plain,
            Variant::Attenuated | Variant::DecimatedAttenuated => {
                if cities != facilities {
                    return Err(FacilityError::NotSquare { cities, facilities });
                }
                if facilities < 2 {
                    return Err(FacilityError::TooFewFacilities {
                        required: 2,
                        found: facilities,
                    });
                }
                Correction::Attenuated {
                    alpha: 1.0 / (facilities as f64 - 1.0),
                }
            }
            Variant::TreeReweighted => {
                let rho = match config.rho.source {
                    RhoSource::Uniform => RhoTable::uniform(&adjacency)?,
                    RhoSource::Sampled => {
                        let mut rng = StdRng::seed_from_u64(config.rho.seed);
                        RhoTable::sampled(
                            &adjacency,
                            config.rho.min_tree_count,
                            config.rho.max_tree_count,
                            &mut rng,
                        )?
                    }
                };
                Correction::TreeReweighted(rho)
            }
        };

        let decimation =
            (config.variant == Variant::DecimatedAttenuated).then(|| Decimation::new(facilities));
        let messages = MessageStore::full(&adjacency);

        let mut solver = Self {
            problem,
            config,
            adjacency,
            correction,
            decimation,
            messages,
            open: vec![false; facilities],
            objective: INFEASIBLE,
            bellman_error: INFEASIBLE,
            sum_norm: 0.0,
            iterations: 0,
        };
        solver.refresh_decision();
        Ok(solver)
    }

    /// Returns to the freshly constructed state. Sampled ρ is kept.
    pub fn reset(&mut self) {
        self.messages.clear();
        if let Some(d) = self.decimation.as_mut() {
            d.reset();
        }
        self.bellman_error = INFEASIBLE;
        self.sum_norm = 0.0;
        self.iterations = 0;
        self.refresh_decision();
    }

    pub fn config(&self) -> &MinSumConfig {
        &self.config
    }

    pub fn adjacency(&self) -> &Adjacency {
        &self.adjacency
    }

    /// Current message generation.
    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    /// ρ table, for the tree-reweighted variant.
    pub fn rho(&self) -> Option<&RhoTable> {
        match &self.correction {
            Correction::TreeReweighted(rho) => Some(rho),
            _ => None,
        }
    }

    /// Completed sweeps since construction or [`reset`](Self::reset).
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    fn context(&self) -> SweepContext<'_, P> {
        SweepContext {
            problem: self.problem,
            adjacency: &self.adjacency,
            correction: &self.correction,
            bias: self.decimation.as_ref().map(|d| d.biases()),
            damping: self.config.damping,
        }
    }

    /// `[closed, open]` belief of `facility`: local cost (without bias)
    /// plus the sum of every incoming message.
    pub fn facility_belief(&self, facility: usize) -> [f64; 2] {
        let view = self.messages.view();
        let mut belief = [0.0; 2];
        for (s, b) in belief.iter_mut().enumerate() {
            let build = if s == 1 {
                self.problem.construction_cost(facility)
            } else {
                0.0
            };
            *b = cost::add(
                build,
                self.correction
                    .facility_total(&self.adjacency, &view, facility, s),
            );
        }
        belief
    }

    /// Belief of `city` being served by the facility at `slot` of its list.
    pub fn city_belief(&self, city: usize, slot: usize) -> f64 {
        let view = self.messages.view();
        let f = self.adjacency.city_neighbors(city)[slot];
        cost::add(
            self.problem.distance(city, f),
            self.correction
                .city_total(&self.adjacency, &view, city, slot),
        )
    }

    fn refresh_decision(&mut self) {
        let beliefs: Vec<[f64; 2]> = (0..self.problem.facility_count())
            .map(|f| self.facility_belief(f))
            .collect();
        let mut open = std::mem::take(&mut self.open);
        match self.config.variant {
            Variant::Plain => {
                decode::decode_beliefs(&beliefs, &mut open);
                decode::repair_coverage(&self.adjacency, |c, x| self.city_belief(c, x), &mut open);
            }
            Variant::Attenuated => {
                let score: Vec<f64> = beliefs.iter().copied().map(decode::open_advantage).collect();
                decode::decode_greedy(self.problem, &score, &mut open);
            }
            Variant::DecimatedAttenuated => match &self.decimation {
                Some(d) => decode::decode_decimated(&beliefs, d, &mut open),
                None => decode::decode_beliefs(&beliefs, &mut open),
            },
            Variant::TreeReweighted => decode::decode_tree_reweighted(
                &beliefs,
                &self.adjacency,
                |c, x| self.city_belief(c, x),
                &mut open,
            ),
        }
        self.objective = evaluate_objective(self.problem, &open);
        self.open = open;
    }

    /// Checks that, on every edge, the decoded joint state minimizes the
    /// pairwise belief up to [`cost::TIE_TOLERANCE`]: both endpoints' local
    /// costs plus every other message into them, corrected the same way as
    /// in the update. Each city is taken to use its nearest open facility.
    fn check_global_optimum(&self) -> bool {
        let view = self.messages.view();
        let adj = &self.adjacency;
        let ctx = self.context();
        let mut action = Vec::with_capacity(adj.city_count());
        for c in 0..adj.city_count() {
            let slot = nearest_open_facility(self.problem, c, &self.open)
                .and_then(|f| adj.city_slot_of(c, f));
            match slot {
                Some(slot) => action.push(slot),
                None => return false,
            }
        }

        let mut city_side = Vec::new();
        for c in 0..adj.city_count() {
            let neighbors = adj.city_neighbors(c);
            for (k, &f) in neighbors.iter().enumerate() {
                let p = adj.city_peer_slot(c, k);
                let facility_side = [0, 1].map(|s| {
                    cost::add(
                        ctx.facility_local(f, s),
                        self.correction.facility_sum(adj, &view, f, p, s),
                    )
                });
                city_side.clear();
                city_side.extend(neighbors.iter().enumerate().map(|(x, &g)| {
                    cost::add(
                        self.problem.distance(c, g),
                        self.correction.city_sum(adj, &view, c, k, x),
                    )
                }));
                let joint = |s: usize, x: usize| {
                    if x == k && s == 0 {
                        INFEASIBLE
                    } else {
                        cost::add(facility_side[s], city_side[x])
                    }
                };

                let chosen = joint(usize::from(self.open[f]), action[c]);
                for s in 0..2 {
                    for x in 0..neighbors.len() {
                        if cost::improves(joint(s, x), chosen) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }
}

impl<P> FacilitySolver for BipartiteMinSum<'_, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    fn objective_value(&self) -> f64 {
        self.objective
    }

    fn optimal_facilities(&self) -> &[bool] {
        &self.open
    }

    fn is_global_optimum(&self) -> bool {
        self.check_global_optimum()
    }
}

impl<P> MinSumSolver for BipartiteMinSum<'_, P>
where
    P: FacilityLocationProblem + ?Sized,
{
    fn iterate(&mut self) -> Result<()> {
        let stats = {
            // Field by field: `context()` would borrow all of `self` while
            // `messages` is borrowed mutably.
            let ctx = SweepContext {
                problem: self.problem,
                adjacency: &self.adjacency,
                correction: &self.correction,
                bias: self.decimation.as_ref().map(|d| d.biases()),
                damping: self.config.damping,
            };
            ctx.sweep(&mut self.messages)?
        };
        self.messages.swap();
        self.bellman_error = stats.bellman_error;
        self.sum_norm = stats.sum_norm;
        self.iterations += 1;
        self.refresh_decision();
        Ok(())
    }

    fn bellman_error(&self) -> f64 {
        self.bellman_error
    }

    fn sum_norm(&self) -> f64 {
        self.sum_norm
    }

    fn decimate(&mut self) -> Option<usize> {
        let beliefs: Vec<[f64; 2]> = (0..self.problem.facility_count())
            .map(|f| self.facility_belief(f))
            .collect();
        let (facility, open) = self.decimation.as_mut()?.decimate(|f| beliefs[f])?;
        debug!(facility, open, "facility decimated");
        self.refresh_decision();
        Some(facility)
    }

    fn is_fully_decimated(&self) -> bool {
        self.decimation
            .as_ref()
            .is_none_or(Decimation::is_fully_decimated)
    }

    fn supports_decimation(&self) -> bool {
        self.decimation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageSide;
    use crate::minsum::engine::{city_reference, FACILITY_REFERENCE};
    use crate::minsum::RhoConfig;
    use crate::models::ProblemInstance;
    use proptest::prelude::*;

    fn two_by_two(cost: f64) -> ProblemInstance {
        ProblemInstance::from_rows(vec![cost, cost], &[vec![0.5, 2.0], vec![2.0, 0.5]]).unwrap()
    }

    fn asymmetric() -> ProblemInstance {
        ProblemInstance::from_rows(vec![5.0, 5.0], &[vec![0.5, 2.0], vec![2.0, 0.6]]).unwrap()
    }

    fn three_by_three() -> ProblemInstance {
        ProblemInstance::from_rows(
            vec![2.0, 2.0, 2.0],
            &[
                vec![0.5, 1.0, 3.0],
                vec![1.0, 0.5, 3.0],
                vec![3.0, 3.0, 0.5],
            ],
        )
        .unwrap()
    }

    fn run<P: FacilityLocationProblem + ?Sized>(solver: &mut BipartiteMinSum<'_, P>, n: usize) {
        for _ in 0..n {
            solver.iterate().unwrap();
        }
    }

    fn assert_normalized<P: FacilityLocationProblem + ?Sized>(solver: &BipartiteMinSum<'_, P>) {
        let adj = solver.adjacency();
        let view = solver.messages().view();
        for c in 0..adj.city_count() {
            let degree = adj.city_degree(c);
            for k in 0..degree {
                assert_eq!(view.to_city(c, k)[city_reference(degree, k)], 0.0);
            }
        }
        for f in 0..adj.facility_count() {
            for k in 0..adj.facility_degree(f) {
                assert_eq!(view.to_facility(f, k)[FACILITY_REFERENCE], 0.0);
            }
        }
    }

    #[test]
    fn test_opens_both_when_cheap() {
        let p = two_by_two(1.0);
        for layout in [Layout::Dense, Layout::Sparse] {
            let mut s = BipartiteMinSum::new(&p, MinSumConfig::default().with_layout(layout)).unwrap();
            run(&mut s, 50);
            assert_eq!(s.optimal_facilities(), &[true, true]);
            assert_eq!(s.objective_value(), 3.0);
            assert!(s.bellman_error() < 1e-12);
            assert!(s.is_global_optimum());
            assert_eq!(s.optimal_facilities_string(), "1,2");
            assert_eq!(s.iterations(), 50);
        }
    }

    #[test]
    fn test_opens_one_when_expensive() {
        let p = asymmetric();
        for damping in [0.0, 0.3, 0.5] {
            let mut s = BipartiteMinSum::new(&p, MinSumConfig::default().with_damping(damping)).unwrap();
            run(&mut s, 200);
            assert_eq!(s.optimal_facilities(), &[true, false], "damping {damping}");
            assert_eq!(s.objective_value(), 7.5);
            assert!(s.is_global_optimum());
        }
    }

    #[test]
    fn test_attenuated_breaks_symmetry() {
        let p = two_by_two(5.0);
        let config = MinSumConfig::default()
            .with_variant(Variant::Attenuated)
            .with_damping(0.5);
        let mut s = BipartiteMinSum::new(&p, config).unwrap();
        run(&mut s, 200);
        assert_eq!(s.objective_value(), 7.5);
        assert_eq!(s.optimal_facilities().iter().filter(|&&o| o).count(), 1);
        assert!(s.is_global_optimum());
    }

    #[test]
    fn test_plain_repairs_symmetric_tie() {
        // Both facilities tie at the fixed point; the lowest one opens.
        let p = two_by_two(5.0);
        for layout in [Layout::Dense, Layout::Sparse] {
            for damping in [0.3, 0.5] {
                let config = MinSumConfig::default().with_layout(layout).with_damping(damping);
                let mut s = BipartiteMinSum::new(&p, config).unwrap();
                run(&mut s, 200);
                assert!(s.bellman_error() < 1e-20);
                let [closed, open] = s.facility_belief(0);
                assert!((closed - open).abs() < 1e-9);
                assert_eq!(s.optimal_facilities(), &[true, false], "damping {damping}");
                assert_eq!(s.objective_value(), 7.5);
                assert!(s.is_global_optimum());
            }
        }
    }

    #[test]
    fn test_tree_reweighted_uniform() {
        for (p, open, objective) in [
            (two_by_two(1.0), [true, true], 3.0),
            (asymmetric(), [true, false], 7.5),
        ] {
            let config = MinSumConfig::default()
                .with_variant(Variant::TreeReweighted)
                .with_damping(0.5);
            let mut s = BipartiteMinSum::new(&p, config).unwrap();
            assert_eq!(s.rho().unwrap().get(0), 0.75);
            run(&mut s, 200);
            assert_eq!(s.optimal_facilities(), &open);
            assert_eq!(s.objective_value(), objective);
            assert!(s.is_global_optimum());
        }
    }

    #[test]
    fn test_tree_reweighted_sampled_on_cycle() {
        let p = ProblemInstance::from_rows(
            vec![3.0, 3.0, 3.0],
            &[
                vec![1.0, 2.0, INFEASIBLE],
                vec![INFEASIBLE, 1.0, 2.0],
                vec![2.0, INFEASIBLE, 1.0],
            ],
        )
        .unwrap();
        let config = MinSumConfig::default()
            .with_variant(Variant::TreeReweighted)
            .with_layout(Layout::Sparse)
            .with_damping(0.5)
            .with_rho(RhoConfig::default().with_source(RhoSource::Sampled).with_min_tree_count(500));
        let mut s = BipartiteMinSum::new(&p, config).unwrap();
        let rho = s.rho().unwrap();
        assert_eq!(rho.len(), 6);
        assert!(rho.values().iter().all(|&r| r > 0.0 && r <= 1.0));
        for _ in 0..100 {
            s.iterate().unwrap();
            assert_normalized(&s);
        }
        // Coverage repair leaves every city with an open neighbor.
        assert!(cost::is_feasible(s.objective_value()));
    }

    #[test]
    fn test_uniform_rho_needs_complete_graph() {
        let p = ProblemInstance::from_rows(vec![1.0, 1.0], &[vec![0.5, INFEASIBLE], vec![2.0, 0.5]]).unwrap();
        let config = MinSumConfig::default()
            .with_variant(Variant::TreeReweighted)
            .with_layout(Layout::Sparse);
        assert!(matches!(
            BipartiteMinSum::new(&p, config),
            Err(FacilityError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_attenuated_preconditions() {
        let p = ProblemInstance::from_rows(vec![1.0, 1.0, 1.0], &[vec![0.5, 2.0, 1.0], vec![2.0, 0.5, 1.0]]).unwrap();
        let config = MinSumConfig::default().with_variant(Variant::DecimatedAttenuated);
        assert!(matches!(
            BipartiteMinSum::new(&p, config.clone()),
            Err(FacilityError::NotSquare { cities: 2, facilities: 3 })
        ));

        let single = ProblemInstance::from_rows(vec![1.0], &[vec![0.5]]).unwrap();
        assert!(matches!(
            BipartiteMinSum::new(&single, config),
            Err(FacilityError::TooFewFacilities { required: 2, found: 1 })
        ));
    }

    #[test]
    fn test_invalid_damping() {
        let p = two_by_two(1.0);
        for damping in [-0.1, 1.0, f64::NAN] {
            let config = MinSumConfig::default().with_damping(damping);
            assert!(matches!(
                BipartiteMinSum::new(&p, config),
                Err(FacilityError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_fresh_solver_is_not_certified() {
        let p = two_by_two(1.0);
        let s = BipartiteMinSum::new(&p, MinSumConfig::default()).unwrap();
        assert_eq!(s.optimal_facilities(), &[false, false]);
        assert!(cost::is_infeasible(s.objective_value()));
        assert!(cost::is_infeasible(s.bellman_error()));
        assert!(!s.is_global_optimum());
    }

    #[test]
    fn test_single_reachable_facility_is_forced_open() {
        let p = ProblemInstance::from_rows(vec![1.0, 1.0], &[vec![0.5, INFEASIBLE], vec![2.0, 0.5]]).unwrap();
        for layout in [Layout::Dense, Layout::Sparse] {
            let mut s = BipartiteMinSum::new(&p, MinSumConfig::default().with_layout(layout)).unwrap();
            run(&mut s, 50);
            assert_eq!(s.optimal_facilities(), &[true, true]);
            assert_eq!(s.objective_value(), 3.0);
            assert!(s.is_global_optimum());
        }
    }

    #[test]
    fn test_unreachable_city_aborts_sweep() {
        let p = ProblemInstance::from_rows(
            vec![1.0, 1.0],
            &[vec![INFEASIBLE, INFEASIBLE], vec![2.0, 0.5]],
        )
        .unwrap();
        let mut s = BipartiteMinSum::new(&p, MinSumConfig::default()).unwrap();
        let err = s.iterate().unwrap_err();
        assert!(matches!(
            err,
            FacilityError::Normalization {
                side: MessageSide::ToFacility,
                node: 0,
                slot: 0
            }
        ));
        assert_eq!(s.iterations(), 0);
        assert!(cost::is_infeasible(s.bellman_error()));
        let view = s.messages().view();
        assert!(view.to_facility(0, 0).iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_bellman_error_decreases_with_damping() {
        let p = asymmetric();
        let mut s = BipartiteMinSum::new(&p, MinSumConfig::default().with_damping(0.5)).unwrap();
        run(&mut s, 10);
        let early = s.bellman_error();
        run(&mut s, 190);
        assert!(s.bellman_error() < early);
        assert!(s.bellman_error() < 1e-20);
    }

    #[test]
    fn test_decimation_until_fixed() {
        let p = three_by_three();
        let config = MinSumConfig::default()
            .with_variant(Variant::DecimatedAttenuated)
            .with_damping(0.5);
        let mut s = BipartiteMinSum::new(&p, config).unwrap();
        assert!(s.supports_decimation());
        run(&mut s, 20);

        let mut fixed = Vec::new();
        while !s.is_fully_decimated() {
            let f = s.decimate().unwrap();
            assert!(!fixed.contains(&f));
            fixed.push(f);
            run(&mut s, 20);
        }
        assert_eq!(fixed.len(), 3);
        assert_eq!(s.decimate(), None);
        assert_eq!(s.objective_value(), evaluate_objective(&p, s.optimal_facilities()));

        s.reset();
        assert!(!s.is_fully_decimated());
        assert_eq!(s.iterations(), 0);
    }

    #[test]
    fn test_plain_does_not_decimate() {
        let p = two_by_two(1.0);
        let mut s = BipartiteMinSum::new(&p, MinSumConfig::default()).unwrap();
        assert!(!s.supports_decimation());
        assert!(s.is_fully_decimated());
        assert_eq!(s.decimate(), None);
    }

    #[test]
    fn test_reset_replays_identically() {
        let p = asymmetric();
        let mut s = BipartiteMinSum::new(&p, MinSumConfig::default().with_damping(0.3)).unwrap();
        run(&mut s, 7);
        let first = (s.bellman_error(), s.sum_norm(), s.objective_value());
        run(&mut s, 5);
        s.reset();
        assert_eq!(s.iterations(), 0);
        assert!(cost::is_infeasible(s.bellman_error()));
        run(&mut s, 7);
        assert_eq!((s.bellman_error(), s.sum_norm(), s.objective_value()), first);
    }

    fn complete_instance() -> impl Strategy<Value = ProblemInstance> {
        (2usize..5, 2usize..5).prop_flat_map(|(c, f)| {
            (
                prop::collection::vec(0u32..40, f),
                prop::collection::vec(prop::collection::vec(1u32..80, f), c),
            )
                .prop_map(|(costs, rows)| {
                    let costs = costs.into_iter().map(|v| f64::from(v) / 4.0).collect();
                    let rows: Vec<Vec<f64>> = rows
                        .into_iter()
                        .map(|r| r.into_iter().map(|v| f64::from(v) / 8.0).collect())
                        .collect();
                    ProblemInstance::from_rows(costs, &rows).unwrap()
                })
        })
    }

    fn square_instance() -> impl Strategy<Value = ProblemInstance> {
        (2usize..5).prop_flat_map(|n| {
            (
                prop::collection::vec(0u32..40, n),
                prop::collection::vec(prop::collection::vec(1u32..80, n), n),
            )
                .prop_map(|(costs, rows)| {
                    let costs = costs.into_iter().map(|v| f64::from(v) / 4.0).collect();
                    let rows: Vec<Vec<f64>> = rows
                        .into_iter()
                        .map(|r| r.into_iter().map(|v| f64::from(v) / 8.0).collect())
                        .collect();
                    ProblemInstance::from_rows(costs, &rows).unwrap()
                })
        })
    }

    proptest! {
        #[test]
        fn prop_dense_matches_sparse(p in complete_instance(), damping in prop::sample::select(vec![0.0, 0.5])) {
            let base = MinSumConfig::default().with_damping(damping);
            let mut dense = BipartiteMinSum::new(&p, base.clone().with_layout(Layout::Dense)).unwrap();
            let mut sparse = BipartiteMinSum::new(&p, base.with_layout(Layout::Sparse)).unwrap();
            for _ in 0..15 {
                dense.iterate().unwrap();
                sparse.iterate().unwrap();
                prop_assert_eq!(dense.optimal_facilities(), sparse.optimal_facilities());
                prop_assert_eq!(dense.objective_value(), sparse.objective_value());
                prop_assert_eq!(dense.bellman_error(), sparse.bellman_error());
            }
        }

        #[test]
        fn prop_reference_entries_stay_zero(
            p in square_instance(),
            variant in prop::sample::select(vec![Variant::Plain, Variant::Attenuated, Variant::TreeReweighted]),
            damping in prop::sample::select(vec![0.0, 0.5]),
        ) {
            let config = MinSumConfig::default().with_variant(variant).with_damping(damping);
            let mut s = BipartiteMinSum::new(&p, config).unwrap();
            for _ in 0..8 {
                s.iterate().unwrap();
                assert_normalized(&s);
            }
        }

        #[test]
        fn prop_objective_matches_decision(p in complete_instance()) {
            let mut s = BipartiteMinSum::new(&p, MinSumConfig::default().with_damping(0.5)).unwrap();
            for _ in 0..10 {
                s.iterate().unwrap();
                prop_assert_eq!(s.objective_value(), evaluate_objective(&p, s.optimal_facilities()));
            }
        }
    }
}
