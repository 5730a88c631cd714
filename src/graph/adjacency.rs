//! Compressed neighbor lists for the city/facility bipartite graph.
//!
//! Edges are numbered city-major: edge `e` of city `i` at slot `k` has id
//! `city_offset(i) + k`. Each side also records the *peer slot*, i.e. the
//! position of the edge in the other endpoint's list, so a message can be
//! routed to its receiver without searching.

use crate::cost;
use crate::models::FacilityLocationProblem;

/// Immutable bipartite adjacency in CSR form.
///
/// Invariant: facility `f` appears in city `i`'s list iff `i` appears in
/// `f`'s list, and both lists are sorted by index.
///
/// # Examples
///
/// ```
/// use u_facility::graph::Adjacency;
/// use u_facility::models::ProblemInstance;
///
/// let p = ProblemInstance::from_rows(
///     vec![1.0, 1.0],
///     &[vec![0.5, f64::INFINITY], vec![2.0, 0.5]],
/// ).unwrap();
/// let adj = Adjacency::from_problem(&p);
/// assert_eq!(adj.city_neighbors(0), &[0]);
/// assert_eq!(adj.facility_neighbors(0), &[0, 1]);
/// assert_eq!(adj.edge_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    city_offsets: Vec<usize>,
    city_neighbors: Vec<usize>,
    /// Slot of the city in the facility's list, per city-side edge.
    city_peer: Vec<usize>,
    facility_offsets: Vec<usize>,
    facility_neighbors: Vec<usize>,
    /// Edge id (city-major) per facility-side entry.
    facility_edges: Vec<usize>,
}

impl Adjacency {
    /// Every city adjacent to every facility.
    pub fn complete(cities: usize, facilities: usize) -> Self {
        Self::build(cities, facilities, |_, _| true)
    }

    /// One edge per pair at finite distance.
    pub fn from_problem<P>(problem: &P) -> Self
    where
        P: FacilityLocationProblem + ?Sized,
    {
        Self::build(problem.city_count(), problem.facility_count(), |i, f| {
            cost::is_feasible(problem.distance(i, f))
        })
    }

    fn build(cities: usize, facilities: usize, connected: impl Fn(usize, usize) -> bool) -> Self {
        let mut city_offsets = Vec::with_capacity(cities + 1);
        let mut city_neighbors = Vec::new();
        let mut facility_degree = vec![0usize; facilities];
        city_offsets.push(0);
        for i in 0..cities {
            for f in 0..facilities {
                if connected(i, f) {
                    city_neighbors.push(f);
                    facility_degree[f] += 1;
                }
            }
            city_offsets.push(city_neighbors.len());
        }

        let mut facility_offsets = Vec::with_capacity(facilities + 1);
        facility_offsets.push(0);
        for f in 0..facilities {
            facility_offsets.push(facility_offsets[f] + facility_degree[f]);
        }

        let edges = city_neighbors.len();
        let mut facility_neighbors = vec![0; edges];
        let mut facility_edges = vec![0; edges];
        let mut city_peer = vec![0; edges];
        let mut fill = vec![0usize; facilities];
        // Cities are visited in increasing order, so facility lists come out sorted.
        for i in 0..cities {
            for e in city_offsets[i]..city_offsets[i + 1] {
                let f = city_neighbors[e];
                let slot = fill[f];
                fill[f] += 1;
                facility_neighbors[facility_offsets[f] + slot] = i;
                facility_edges[facility_offsets[f] + slot] = e;
                city_peer[e] = slot;
            }
        }

        Self {
            city_offsets,
            city_neighbors,
            city_peer,
            facility_offsets,
            facility_neighbors,
            facility_edges,
        }
    }

    /// Number of cities.
    pub fn city_count(&self) -> usize {
        self.city_offsets.len() - 1
    }

    /// Number of facilities.
    pub fn facility_count(&self) -> usize {
        self.facility_offsets.len() - 1
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.city_neighbors.len()
    }

    /// Returns `true` if every city is adjacent to every facility.
    pub fn is_complete(&self) -> bool {
        self.edge_count() == self.city_count() * self.facility_count()
    }

    pub fn city_degree(&self, city: usize) -> usize {
        self.city_offsets[city + 1] - self.city_offsets[city]
    }

    pub fn facility_degree(&self, facility: usize) -> usize {
        self.facility_offsets[facility + 1] - self.facility_offsets[facility]
    }

    /// Facilities adjacent to `city`, sorted.
    pub fn city_neighbors(&self, city: usize) -> &[usize] {
        &self.city_neighbors[self.city_offsets[city]..self.city_offsets[city + 1]]
    }

    /// Cities adjacent to `facility`, sorted.
    pub fn facility_neighbors(&self, facility: usize) -> &[usize] {
        &self.facility_neighbors[self.facility_offsets[facility]..self.facility_offsets[facility + 1]]
    }

    /// Edge id of slot `slot` in `city`'s list.
    #[inline]
    pub fn city_edge(&self, city: usize, slot: usize) -> usize {
        self.city_offsets[city] + slot
    }

    /// Edge id of slot `slot` in `facility`'s list.
    #[inline]
    pub fn facility_edge(&self, facility: usize, slot: usize) -> usize {
        self.facility_edges[self.facility_offsets[facility] + slot]
    }

    /// Position of `city` in the list of the facility at `slot` of `city`'s list.
    #[inline]
    pub fn city_peer_slot(&self, city: usize, slot: usize) -> usize {
        self.city_peer[self.city_offsets[city] + slot]
    }

    /// Position of `facility` in the list of the city at `slot` of `facility`'s list.
    #[inline]
    pub fn facility_peer_slot(&self, facility: usize, slot: usize) -> usize {
        let e = self.facility_edge(facility, slot);
        let city = self.facility_neighbors[self.facility_offsets[facility] + slot];
        e - self.city_offsets[city]
    }

    /// Slot of `facility` in `city`'s list, if adjacent.
    pub fn city_slot_of(&self, city: usize, facility: usize) -> Option<usize> {
        self.city_neighbors(city).binary_search(&facility).ok()
    }

    /// Slot of `city` in `facility`'s list, if adjacent.
    pub fn facility_slot_of(&self, facility: usize, city: usize) -> Option<usize> {
        self.facility_neighbors(facility).binary_search(&city).ok()
    }

    /// `(city, facility)` endpoints of an edge id.
    pub fn endpoints(&self, edge: usize) -> (usize, usize) {
        // partition_point finds the first offset past `edge`.
        let city = self.city_offsets.partition_point(|&o| o <= edge) - 1;
        (city, self.city_neighbors[edge])
    }
}
