//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges. Filling triangulates each loop
//! in place with ear clipping against the loop's own best-fit plane, so the
//! patch winds consistently with the faces around it.

use crate::mesh::{EdgeTopology, TriMesh};

use super::triangulate::triangulate_loop;

/// Options for hole filling.
#[derive(Debug, Clone)]
pub struct HoleFillOptions {
    /// Loops with more edges than this are left open.
    pub max_hole_edges: usize,
}

impl Default for HoleFillOptions {
    fn default() -> Self {
        Self { max_hole_edges: 100 }
    }
}

impl HoleFillOptions {
    /// Set the largest loop that will be filled.
    pub fn with_max_hole_edges(mut self, max_hole_edges: usize) -> Self {
        self.max_hole_edges = max_hole_edges;
        self
    }
}

/// Boundary loops of a mesh, each oriented for filling.
///
/// # Example
///
/// ```
/// use chisel::algo::holes::find_holes;
/// use chisel::mesh::TriMesh;
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = TriMesh::from_triangles(vertices, vec![[0, 1, 2]]).unwrap();
///
/// let holes = find_holes(&mesh);
/// assert_eq!(holes.len(), 1);
/// assert_eq!(holes[0].len(), 3);
/// ```
pub fn find_holes(mesh: &TriMesh) -> Vec<Vec<usize>> {
    EdgeTopology::build(mesh.faces()).boundary_loops()
}

/// Fill every hole no longer than `max_hole_edges`.
///
/// Returns the number of holes filled.
pub fn fill_holes(mesh: &mut TriMesh, options: &HoleFillOptions) -> usize {
    let holes = find_holes(mesh);
    if holes.is_empty() {
        return 0;
    }
    log::debug!("Found {} boundary loops", holes.len());

    let mut filled = 0;
    for hole in &holes {
        if hole.len() > options.max_hole_edges {
            log::warn!(
                "Skipping hole with {} edges (max: {})",
                hole.len(),
                options.max_hole_edges
            );
            continue;
        }

        let patch = triangulate_loop(mesh.vertices(), hole);
        if patch.is_empty() {
            continue;
        }
        mesh.faces.extend(patch);
        filled += 1;
    }

    log::info!("Filled {} of {} holes", filled, holes.len());
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{open_box, unit_cube};

    #[test]
    fn test_closed_mesh_has_no_holes() {
        let mut mesh = unit_cube();
        assert!(find_holes(&mesh).is_empty());
        assert_eq!(fill_holes(&mut mesh, &HoleFillOptions::default()), 0);
        assert_eq!(mesh.num_faces(), 12);
    }

    #[test]
    fn test_fill_open_box() {
        let mut mesh = open_box();
        let filled = fill_holes(&mut mesh, &HoleFillOptions::default());

        assert_eq!(filled, 1);
        assert_eq!(mesh.num_faces(), 12);

        let topo = EdgeTopology::build(mesh.faces());
        assert!(topo.is_watertight());
        assert!(topo.is_winding_consistent());
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_hole_skipped() {
        let mut mesh = open_box();
        let options = HoleFillOptions::default().with_max_hole_edges(3);

        assert_eq!(fill_holes(&mut mesh, &options), 0);
        assert_eq!(mesh.num_faces(), 10);
    }
}
