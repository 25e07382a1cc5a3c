//! Edge adjacency and the topology signals derived from it.
//!
//! [`EdgeTopology`] records, for every undirected edge, which faces use it and
//! in which direction. That is enough to answer the three questions topology
//! classification asks (watertight? consistently wound? Euler characteristic?)
//! and to trace boundary loops for capping and hole filling.

use std::collections::HashMap;

/// One face's use of an undirected edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EdgeUse {
    face: usize,
    /// True if the face traverses the edge from its lower to its higher index.
    forward: bool,
}

/// Undirected edge adjacency of a triangle list.
#[derive(Debug, Clone, Default)]
pub struct EdgeTopology {
    edges: HashMap<(usize, usize), Vec<EdgeUse>>,
    /// Directed boundary edges in face order, as traversed by their face.
    boundary: Vec<(usize, usize)>,
}

impl EdgeTopology {
    /// Build adjacency for a list of triangles.
    ///
    /// # Example
    ///
    /// ```
    /// use chisel::mesh::EdgeTopology;
    ///
    /// let topo = EdgeTopology::build(&[[0, 1, 2], [0, 2, 3]]);
    /// assert_eq!(topo.edge_count(), 5);
    /// assert_eq!(topo.boundary_edges().len(), 4);
    /// assert!(!topo.is_watertight());
    /// ```
    pub fn build(faces: &[[usize; 3]]) -> Self {
        let mut edges: HashMap<(usize, usize), Vec<EdgeUse>> =
            HashMap::with_capacity(faces.len() * 3 / 2 + 1);

        for (fi, face) in faces.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                edges.entry(undirected(a, b)).or_default().push(EdgeUse {
                    face: fi,
                    forward: a < b,
                });
            }
        }

        let mut boundary = Vec::new();
        for face in faces {
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                if edges.get(&undirected(a, b)).map_or(0, Vec::len) == 1 {
                    boundary.push((a, b));
                }
            }
        }

        Self { edges, boundary }
    }

    /// Number of unique undirected edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Directed edges used by exactly one face, in face order.
    #[inline]
    pub fn boundary_edges(&self) -> &[(usize, usize)] {
        &self.boundary
    }

    /// Number of edges shared by more than two faces.
    pub fn non_manifold_edge_count(&self) -> usize {
        self.edges.values().filter(|uses| uses.len() > 2).count()
    }

    /// Faces that use the edge between `a` and `b`.
    pub fn faces_for_edge(&self, a: usize, b: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .get(&undirected(a, b))
            .into_iter()
            .flatten()
            .map(|u| u.face)
    }

    /// Every edge is shared by exactly two faces.
    pub fn is_watertight(&self) -> bool {
        !self.edges.is_empty() && self.edges.values().all(|uses| uses.len() == 2)
    }

    /// Every edge shared by two faces is traversed in opposite directions.
    ///
    /// Boundary edges do not break consistency; edges with more than two
    /// faces do, since no orientation can satisfy all of them.
    pub fn is_winding_consistent(&self) -> bool {
        self.edges.values().all(|uses| match uses.as_slice() {
            [_] => true,
            [a, b] => a.forward != b.forward,
            _ => false,
        })
    }

    /// Euler characteristic χ = V − E + F.
    pub fn euler_characteristic(&self, num_vertices: usize, num_faces: usize) -> i64 {
        num_vertices as i64 - self.edges.len() as i64 + num_faces as i64
    }

    /// Closed loops around the boundary, oriented for filling.
    ///
    /// Each loop lists vertices so that consecutive pairs run opposite to the
    /// boundary edges of the surrounding faces; triangles built in loop order
    /// therefore wind consistently with the mesh.
    pub fn boundary_loops(&self) -> Vec<Vec<usize>> {
        trace_loops(self.boundary.iter().map(|&(a, b)| (b, a)))
    }
}

/// Chain directed edges into closed loops.
///
/// Edges are consumed in the order given. A chain that cannot be closed is
/// discarded with a warning.
pub fn trace_loops<It>(edges: It) -> Vec<Vec<usize>>
where
    It: IntoIterator<Item = (usize, usize)>,
{
    let ordered: Vec<(usize, usize)> = edges.into_iter().collect();
    let mut outgoing: HashMap<usize, Vec<usize>> = HashMap::new();
    for &(a, b) in &ordered {
        outgoing.entry(a).or_default().push(b);
    }

    let mut loops = Vec::new();

    for &(start, first) in &ordered {
        // Skip edges already consumed by an earlier loop.
        let Some(targets) = outgoing.get_mut(&start) else {
            continue;
        };
        let Some(pos) = targets.iter().position(|&t| t == first) else {
            continue;
        };
        targets.swap_remove(pos);

        let mut chain = vec![start];
        let mut current = first;
        let mut closed = false;

        while chain.len() <= ordered.len() {
            if current == start {
                closed = true;
                break;
            }
            chain.push(current);
            match outgoing.get_mut(&current).and_then(|t| t.pop()) {
                Some(next) => current = next,
                None => break,
            }
        }

        if closed && chain.len() >= 3 {
            loops.push(chain);
        } else if !closed {
            log::warn!("Boundary chain starting at vertex {} does not close", start);
        }
    }

    loops
}

/// Sorted, de-duplicated one-ring neighbors of every vertex.
pub fn vertex_neighbors(num_vertices: usize, faces: &[[usize; 3]]) -> Vec<Vec<usize>> {
    let mut neighbors = vec![Vec::new(); num_vertices];
    for face in faces {
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            neighbors[a].push(b);
            neighbors[b].push(a);
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }
    neighbors
}

#[inline]
fn undirected(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{open_box, torus, unit_cube};

    #[test]
    fn test_cube_is_closed_genus_zero() {
        let cube = unit_cube();
        let topo = EdgeTopology::build(cube.faces());

        assert_eq!(topo.edge_count(), 18);
        assert!(topo.is_watertight());
        assert!(topo.is_winding_consistent());
        assert!(topo.boundary_edges().is_empty());
        assert_eq!(topo.euler_characteristic(8, 12), 2);
    }

    #[test]
    fn test_flipped_face_breaks_winding() {
        let mut cube = unit_cube();
        cube.faces[3].swap(0, 1);
        let topo = EdgeTopology::build(cube.faces());

        assert!(topo.is_watertight());
        assert!(!topo.is_winding_consistent());
    }

    #[test]
    fn test_torus_euler_characteristic() {
        let mesh = torus(8, 6);
        let topo = EdgeTopology::build(mesh.faces());
        assert!(topo.is_watertight());
        assert_eq!(
            topo.euler_characteristic(mesh.num_vertices(), mesh.num_faces()),
            0
        );
    }

    #[test]
    fn test_open_box_boundary_loop() {
        let mesh = open_box();
        let topo = EdgeTopology::build(mesh.faces());

        assert!(!topo.is_watertight());
        assert!(topo.is_winding_consistent());
        assert_eq!(topo.boundary_edges().len(), 4);

        let loops = topo.boundary_loops();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);

        // Loop edges run against the boundary edges of the faces.
        let boundary = topo.boundary_edges();
        for w in 0..4 {
            let a = loops[0][w];
            let b = loops[0][(w + 1) % 4];
            assert!(boundary.contains(&(b, a)));
        }
    }

    #[test]
    fn test_non_manifold_edge_detected() {
        // Three triangles hinged on edge (0, 1).
        let faces = [[0, 1, 2], [1, 0, 3], [0, 1, 4]];
        let topo = EdgeTopology::build(&faces);
        assert_eq!(topo.non_manifold_edge_count(), 1);
        assert!(!topo.is_watertight());
        assert!(!topo.is_winding_consistent());
        assert_eq!(topo.faces_for_edge(1, 0).count(), 3);
    }

    #[test]
    fn test_trace_loops_discards_open_chain() {
        let loops = trace_loops([(0, 1), (1, 2)]);
        assert!(loops.is_empty());

        let loops = trace_loops([(0, 1), (1, 2), (2, 0), (5, 6), (6, 7), (7, 5)]);
        assert_eq!(loops, vec![vec![0, 1, 2], vec![5, 6, 7]]);
    }

    #[test]
    fn test_vertex_neighbors() {
        let neighbors = vertex_neighbors(4, &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(neighbors[0], vec![1, 2, 3]);
        assert_eq!(neighbors[1], vec![0, 2]);
        assert_eq!(neighbors[3], vec![0, 2]);
    }
}
