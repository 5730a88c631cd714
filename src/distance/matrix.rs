//! Dense city × facility distance matrix.

use crate::cost::{self, INFEASIBLE};

/// A dense `cities × facilities` distance matrix stored in row-major order
/// (one row per city).
///
/// An entry equal to [`INFEASIBLE`] means the city cannot be served by that
/// facility.
///
/// # Examples
///
/// ```
/// use u_facility::distance::DistanceMatrix;
///
/// let cities = [(0.0, 0.0), (10.0, 0.0)];
/// let facilities = [(3.0, 4.0)];
/// let dm = DistanceMatrix::from_points(&cities, &facilities);
/// assert!((dm.get(0, 0) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.cities(), 2);
/// assert_eq!(dm.facilities(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    cities: usize,
    facilities: usize,
}

impl DistanceMatrix {
    /// Creates a matrix of the given shape with every pair infeasible.
    pub fn new(cities: usize, facilities: usize) -> Self {
        Self {
            data: vec![INFEASIBLE; cities * facilities],
            cities,
            facilities,
        }
    }

    /// Computes Euclidean distances between city and facility coordinates.
    pub fn from_points(cities: &[(f64, f64)], facilities: &[(f64, f64)]) -> Self {
        let mut dm = Self::new(cities.len(), facilities.len());
        for (i, &(cx, cy)) in cities.iter().enumerate() {
            for (j, &(fx, fy)) in facilities.iter().enumerate() {
                let d = ((cx - fx).powi(2) + (cy - fy).powi(2)).sqrt();
                dm.set(i, j, d);
            }
        }
        dm
    }

    /// Creates a matrix from row-major data.
    ///
    /// Returns `None` if the data length doesn't match `cities * facilities`.
    pub fn from_data(cities: usize, facilities: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != cities * facilities {
            return None;
        }
        Some(Self {
            data,
            cities,
            facilities,
        })
    }

    /// Creates a matrix from one row per city.
    ///
    /// Returns `None` if the rows are ragged.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let facilities = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != facilities) {
            return None;
        }
        let data = rows.iter().flatten().copied().collect();
        Some(Self {
            data,
            cities: rows.len(),
            facilities,
        })
    }

    /// Distance from `city` to `facility`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, city: usize, facility: usize) -> f64 {
        self.data[city * self.facilities + facility]
    }

    /// Sets the distance from `city` to `facility`.
    pub fn set(&mut self, city: usize, facility: usize, distance: f64) {
        self.data[city * self.facilities + facility] = distance;
    }

    /// The distances from one city to every facility.
    pub fn row(&self, city: usize) -> &[f64] {
        let start = city * self.facilities;
        &self.data[start..start + self.facilities]
    }

    /// Number of cities (rows).
    pub fn cities(&self) -> usize {
        self.cities
    }

    /// Number of facilities (columns).
    pub fn facilities(&self) -> usize {
        self.facilities
    }

    /// Returns `true` if every city can reach every facility.
    pub fn is_complete(&self) -> bool {
        self.data.iter().all(|&d| cost::is_feasible(d))
    }

    /// Returns the nearest facility to `city` among `candidates`.
    ///
    /// Returns `None` if no candidate is reachable.
    pub fn nearest(&self, city: usize, candidates: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &j in candidates {
            let d = self.get(city, j);
            if cost::is_infeasible(d) {
                continue;
            }
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        best.map(|(j, _)| j)
    }
}
