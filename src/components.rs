//! Identically colored connected components
//!
//! Two vertices are in the same component when a path of triangle edges joins
//! them and every vertex along the path has exactly the same color.

use crate::model::TriangleMesh;
use std::collections::VecDeque;

/// Ascending vertex indices of one component
pub type ConnectedComponent = Vec<usize>;

/// Components ordered by their smallest vertex index
pub type ConnectedComponentList = Vec<ConnectedComponent>;

impl TriangleMesh {
    /// Neighbor lists built from triangle edges, sorted and without duplicates
    ///
    /// Self-edges from degenerate triangles and indices past the end of the
    /// vertex list are dropped.
    pub fn vertex_adjacency(&self) -> Vec<Vec<usize>> {
        let count = self.vertices.len();
        let mut adjacency = vec![Vec::new(); count];

        for triangle in &self.triangles {
            let [a, b, c] = triangle.indices();
            for (u, v) in [(a, b), (b, c), (c, a)] {
                if u == v || u >= count || v >= count {
                    continue;
                }
                adjacency[u].push(v);
                adjacency[v].push(u);
            }
        }

        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        adjacency
    }

    /// Group vertices into connected components of identical color
    ///
    /// Returns an empty list when the mesh has no vertex colors. Otherwise
    /// every vertex appears in exactly one component; each component is sorted
    /// ascending and components are ordered by their first index.
    ///
    /// # Example
    ///
    /// ```
    /// use meshcc::{Color, Triangle, TriangleMesh, Vertex};
    ///
    /// let mut mesh = TriangleMesh::new();
    /// for x in 0..4 {
    ///     mesh.vertices.push(Vertex::new(x as f64, 0.0, 0.0));
    /// }
    /// mesh.triangles.push(Triangle::new(0, 1, 2));
    /// mesh.triangles.push(Triangle::new(1, 2, 3));
    /// let red = Color::from_rgb8(255, 0, 0);
    /// let blue = Color::from_rgb8(0, 0, 255);
    /// mesh.vertex_colors = vec![red, blue, red, blue];
    ///
    /// let components = mesh.identically_colored_connected_components();
    /// assert_eq!(components, vec![vec![0, 2], vec![1, 3]]);
    /// ```
    pub fn identically_colored_connected_components(&self) -> ConnectedComponentList {
        if !self.has_vertex_colors() {
            tracing::debug!("mesh has no vertex colors, no components");
            return Vec::new();
        }

        let adjacency = self.vertex_adjacency();
        let colors = &self.vertex_colors;
        let mut visited = vec![false; self.vertices.len()];
        let mut queue = VecDeque::new();
        let mut components = ConnectedComponentList::new();

        for seed in 0..self.vertices.len() {
            if visited[seed] {
                continue;
            }

            visited[seed] = true;
            queue.push_back(seed);
            let mut component = ConnectedComponent::new();

            while let Some(vertex) = queue.pop_front() {
                component.push(vertex);
                for &neighbor in &adjacency[vertex] {
                    if !visited[neighbor] && colors[neighbor] == colors[vertex] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            component.sort_unstable();
            components.push(component);
        }

        tracing::debug!(components = components.len(), "colored components extracted");
        components
    }
}
