//! Uniform Laplacian smoothing.
//!
//! Each pass moves every free vertex a fraction `lambda` of the way towards
//! the mean of its one-ring neighbors. Positions for a pass are computed from
//! the previous pass only, so the result does not depend on vertex order and
//! the per-vertex work can run in parallel.
//!
//! # Example
//!
//! ```
//! use chisel::algo::smooth::{laplacian_smooth, SmoothOptions};
//! use chisel::mesh::TriMesh;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mut mesh = TriMesh::from_triangles(vertices, faces).unwrap();
//!
//! laplacian_smooth(&mut mesh, &SmoothOptions::default().with_iterations(3));
//! assert!(mesh.is_finite());
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::{vertex_neighbors, EdgeTopology, TriMesh};

use super::Progress;

/// Options for Laplacian smoothing.
#[derive(Debug, Clone)]
pub struct SmoothOptions {
    /// Number of smoothing passes.
    pub iterations: usize,

    /// Step towards the neighbor mean, in `[0, 1]`.
    pub lambda: f64,

    /// Keep vertices on open boundaries fixed.
    pub preserve_boundary: bool,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SmoothOptions {
    fn default() -> Self {
        Self {
            iterations: 5,
            lambda: 0.5,
            preserve_boundary: true,
            parallel: true,
        }
    }
}

impl SmoothOptions {
    /// Set the number of passes.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the step factor, clamped to `[0, 1]`.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda.clamp(0.0, 1.0);
        self
    }

    /// Let boundary vertices move like any other.
    pub fn allow_boundary_movement(mut self) -> Self {
        self.preserve_boundary = false;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Smooth a mesh in place.
///
/// Vertices without neighbors and, when `preserve_boundary` is set, vertices
/// on an open boundary keep their positions.
pub fn laplacian_smooth(mesh: &mut TriMesh, options: &SmoothOptions) {
    laplacian_smooth_with_progress(mesh, options, &Progress::none());
}

/// Laplacian smoothing with progress reporting, one update per pass.
pub fn laplacian_smooth_with_progress(
    mesh: &mut TriMesh,
    options: &SmoothOptions,
    progress: &Progress,
) {
    if options.iterations == 0 || options.lambda == 0.0 || mesh.is_empty() {
        return;
    }

    let neighbors = vertex_neighbors(mesh.num_vertices(), mesh.faces());
    let pinned = pinned_vertices(mesh, options.preserve_boundary);

    for iter in 0..options.iterations {
        progress.report(iter, options.iterations, "Laplacian smoothing");

        let current = mesh.vertices();
        let step = |i: usize| -> Point3<f64> {
            if pinned[i] || neighbors[i].is_empty() {
                return current[i];
            }
            let mean = neighbors[i]
                .iter()
                .map(|&j| current[j].coords)
                .sum::<Vector3<f64>>()
                / neighbors[i].len() as f64;
            current[i] + (mean - current[i].coords) * options.lambda
        };

        let next: Vec<Point3<f64>> = if options.parallel {
            (0..current.len()).into_par_iter().map(step).collect()
        } else {
            (0..current.len()).map(step).collect()
        };

        mesh.vertices = next;
    }

    progress.report(options.iterations, options.iterations, "Laplacian smoothing");
    log::debug!(
        "Smoothed {} vertices over {} passes",
        mesh.num_vertices(),
        options.iterations
    );
}

fn pinned_vertices(mesh: &TriMesh, preserve_boundary: bool) -> Vec<bool> {
    let mut pinned = vec![false; mesh.num_vertices()];
    if preserve_boundary {
        for &(a, b) in EdgeTopology::build(mesh.faces()).boundary_edges() {
            pinned[a] = true;
            pinned[b] = true;
        }
    }
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{flat_grid, icosphere, open_box, unit_cube};

    #[test]
    fn test_boundary_pinned_on_open_mesh() {
        let mut mesh = open_box();
        let original = mesh.clone();

        laplacian_smooth(&mut mesh, &SmoothOptions::default());

        let topo = EdgeTopology::build(original.faces());
        for &(a, _) in topo.boundary_edges() {
            assert!((mesh.position(a) - original.position(a)).norm() < 1e-12);
        }
    }

    #[test]
    fn test_flat_grid_stays_flat() {
        let mut mesh = flat_grid(6);
        laplacian_smooth(&mut mesh, &SmoothOptions::default().with_iterations(10));
        assert!(mesh.vertices().iter().all(|p| p.z.abs() < 1e-12));
    }

    #[test]
    fn test_closed_mesh_shrinks_towards_centroid() {
        let mut mesh = icosphere(2);
        let before = mesh.surface_area();

        laplacian_smooth(&mut mesh, &SmoothOptions::default());

        assert!(mesh.is_finite());
        assert!(mesh.surface_area() < before);
        assert_eq!(mesh.num_faces(), icosphere(2).num_faces());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut a = unit_cube();
        let mut b = unit_cube();
        let options = SmoothOptions::default().with_iterations(3);

        laplacian_smooth(&mut a, &options);
        laplacian_smooth(&mut b, &options.clone().sequential());

        for (p, q) in a.vertices().iter().zip(b.vertices()) {
            assert!((p - q).norm() < 1e-12);
        }
    }

    #[test]
    fn test_zero_iterations_is_noop() {
        let mut mesh = unit_cube();
        laplacian_smooth(&mut mesh, &SmoothOptions::default().with_iterations(0));
        assert_eq!(mesh, unit_cube());
    }
}
