//! Explicit problem instance backed by a distance matrix.

use crate::cost::{self, INFEASIBLE};
use crate::distance::DistanceMatrix;
use crate::error::{FacilityError, Result};

use super::FacilityLocationProblem;

/// A facility location instance with explicit construction costs and a
/// dense city × facility distance matrix.
///
/// # Examples
///
/// ```
/// use u_facility::models::{FacilityLocationProblem, ProblemInstance};
///
/// let p = ProblemInstance::from_rows(
///     vec![1.0, 1.0],
///     &[vec![0.5, 2.0], vec![2.0, 0.5]],
/// ).unwrap();
/// assert_eq!(p.city_count(), 2);
/// assert_eq!(p.facility_count(), 2);
/// assert_eq!(p.distance(1, 0), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInstance {
    construction_cost: Vec<f64>,
    distances: DistanceMatrix,
}

impl ProblemInstance {
    /// Creates an instance after validating costs and distances.
    ///
    /// Construction costs must be finite and non-negative; distances must be
    /// non-negative (infeasible allowed) and not NaN.
    pub fn new(construction_cost: Vec<f64>, distances: DistanceMatrix) -> Result<Self> {
        if construction_cost.len() != distances.facilities() {
            return Err(FacilityError::DimensionMismatch {
                what: "construction costs",
                expected: distances.facilities(),
                found: construction_cost.len(),
            });
        }
        if let Some((j, c)) = construction_cost
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(FacilityError::InvalidParameter(format!(
                "construction cost of facility {} must be finite and >= 0, got {}",
                j + 1,
                c
            )));
        }
        for i in 0..distances.cities() {
            for (j, &d) in distances.row(i).iter().enumerate() {
                if d.is_nan() || d < 0.0 {
                    return Err(FacilityError::InvalidParameter(format!(
                        "distance from city {} to facility {} must be >= 0, got {}",
                        i + 1,
                        j + 1,
                        d
                    )));
                }
            }
        }
        Ok(Self {
            construction_cost,
            distances,
        })
    }

    /// Creates an instance from one distance row per city.
    pub fn from_rows(construction_cost: Vec<f64>, rows: &[Vec<f64>]) -> Result<Self> {
        let distances = if rows.is_empty() {
            DistanceMatrix::new(0, construction_cost.len())
        } else {
            DistanceMatrix::from_rows(rows).ok_or_else(|| {
                FacilityError::InvalidParameter("distance rows have different lengths".into())
            })?
        };
        Self::new(construction_cost, distances)
    }

    /// Keeps, for each city, only its `k` nearest facilities; every other
    /// pair becomes infeasible. `k == 0` leaves the instance unchanged.
    ///
    /// Ties are broken by facility index.
    pub fn keep_closest(mut self, k: usize) -> Self {
        if k == 0 || k >= self.distances.facilities() {
            return self;
        }
        let facilities = self.distances.facilities();
        let mut order: Vec<usize> = Vec::with_capacity(facilities);
        for i in 0..self.distances.cities() {
            order.clear();
            order.extend(0..facilities);
            let row = self.distances.row(i);
            order.sort_by(|&a, &b| row[a].total_cmp(&row[b]).then(a.cmp(&b)));
            for &j in &order[k..] {
                self.distances.set(i, j, INFEASIBLE);
            }
        }
        self
    }

    /// The underlying distance matrix.
    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// All construction costs.
    pub fn construction_costs(&self) -> &[f64] {
        &self.construction_cost
    }

    /// Returns `true` if every city can reach every facility.
    pub fn is_fully_connected(&self) -> bool {
        self.distances.is_complete()
    }

    /// Number of feasible city/facility pairs.
    pub fn edge_count(&self) -> usize {
        (0..self.distances.cities())
            .map(|i| {
                self.distances
                    .row(i)
                    .iter()
                    .filter(|&&d| cost::is_feasible(d))
                    .count()
            })
            .sum()
    }
}

impl FacilityLocationProblem for ProblemInstance {
    fn city_count(&self) -> usize {
        self.distances.cities()
    }

    fn facility_count(&self) -> usize {
        self.construction_cost.len()
    }

    fn construction_cost(&self, facility: usize) -> f64 {
        self.construction_cost[facility]
    }

    fn distance(&self, city: usize, facility: usize) -> f64 {
        self.distances.get(city, facility)
    }
}
