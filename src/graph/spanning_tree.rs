//! Uniform random spanning trees (Aldous–Broder).
//!
//! # Algorithm
//!
//! For each connected component, start a simple random walk at a uniformly
//! chosen node. Whenever the walk enters a node for the first time, the edge
//! it arrived on becomes a tree edge. The walk stops once every node of the
//! component has been visited. The resulting forest is uniform over all
//! spanning forests whose trees are the components.
//!
//! # Complexity
//!
//! Expected cover time of the walk, O(n·m) worst case per tree.
//!
//! # Reference
//!
//! Broder, A. (1989). "Generating random spanning trees", *FOCS* 30, 442-447.

use rand::Rng;

use super::Adjacency;

/// Draws spanning forests of the city/facility graph.
///
/// Nodes `0..C` are cities and `C..C+F` are facilities. Trees are reported
/// as edge ids of the underlying [`Adjacency`].
#[derive(Debug)]
pub struct UniformSpanningTree<'a> {
    adjacency: &'a Adjacency,
    components: Vec<Vec<usize>>,
    visited: Vec<bool>,
    tree: Vec<usize>,
}

impl<'a> UniformSpanningTree<'a> {
    pub fn new(adjacency: &'a Adjacency) -> Self {
        let nodes = adjacency.city_count() + adjacency.facility_count();
        let components = connected_components(adjacency)
            .into_iter()
            .filter(|c| c.len() > 1)
            .collect();
        Self {
            adjacency,
            components,
            visited: vec![false; nodes],
            tree: Vec::new(),
        }
    }

    /// Number of non-trivial connected components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Samples the next forest. The returned slice is overwritten by the
    /// following call.
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &[usize] {
        self.tree.clear();
        self.visited.iter_mut().for_each(|v| *v = false);

        for component in &self.components {
            let mut current = component[rng.random_range(0..component.len())];
            self.visited[current] = true;
            let mut remaining = component.len() - 1;
            while remaining > 0 {
                let (next, edge) = random_step(self.adjacency, current, rng);
                if !self.visited[next] {
                    self.visited[next] = true;
                    self.tree.push(edge);
                    remaining -= 1;
                }
                current = next;
            }
        }
        &self.tree
    }
}

/// One random-walk step from `node`: the neighbor reached and the edge used.
fn random_step<R: Rng + ?Sized>(adjacency: &Adjacency, node: usize, rng: &mut R) -> (usize, usize) {
    let cities = adjacency.city_count();
    if node < cities {
        let k = rng.random_range(0..adjacency.city_degree(node));
        let f = adjacency.city_neighbors(node)[k];
        (cities + f, adjacency.city_edge(node, k))
    } else {
        let f = node - cities;
        let k = rng.random_range(0..adjacency.facility_degree(f));
        let c = adjacency.facility_neighbors(f)[k];
        (c, adjacency.facility_edge(f, k))
    }
}

fn connected_components(adjacency: &Adjacency) -> Vec<Vec<usize>> {
    let cities = adjacency.city_count();
    let nodes = cities + adjacency.facility_count();
    let mut seen = vec![false; nodes];
    let mut components = Vec::new();
    let mut stack = Vec::new();

    for root in 0..nodes {
        if seen[root] {
            continue;
        }
        seen[root] = true;
        stack.push(root);
        let mut component = Vec::new();
        while let Some(node) = stack.pop() {
            component.push(node);
            if node < cities {
                for &f in adjacency.city_neighbors(node) {
                    if !seen[cities + f] {
                        seen[cities + f] = true;
                        stack.push(cities + f);
                    }
                }
            } else {
                for &c in adjacency.facility_neighbors(node - cities) {
                    if !seen[c] {
                        seen[c] = true;
                        stack.push(c);
                    }
                }
            }
        }
        component.sort_unstable();
        components.push(component);
    }
    components
}
