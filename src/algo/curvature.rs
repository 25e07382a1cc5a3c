//! Sharp-point detection from vertex normal variation.
//!
//! A vertex's neighborhood is every vertex closer to it than the given
//! percentile of its distances to the whole mesh (itself included). Its score
//! is the mean absolute component-wise difference between its normal and the
//! normals of that neighborhood. Flat regions score zero; creases and tips
//! score high.
//!
//! The neighborhood search compares every vertex against every other, so the
//! cost is quadratic in the vertex count. Per-vertex work runs on the rayon
//! pool unless [`SharpPointOptions::parallel`] is cleared.
//!
//! # Example
//!
//! ```
//! use chisel::algo::curvature::{detect_sharp_points, SharpPointOptions};
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
//! let mesh = TriMesh::from_triangles(vertices, faces).unwrap();
//!
//! let sharp = detect_sharp_points(&mesh, &SharpPointOptions::default());
//! assert!(sharp.len() <= 20);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::mesh::TriMesh;

use super::Progress;

/// Options for sharp-point detection.
#[derive(Debug, Clone)]
pub struct SharpPointOptions {
    /// Scores must be strictly greater than this to count as sharp.
    pub curvature_threshold: f64,

    /// At most this many of the highest-scoring vertices are considered.
    pub max_points: usize,

    /// Distance percentile, in `[0, 100]`, bounding each neighborhood.
    pub neighborhood_percentile: f64,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for SharpPointOptions {
    fn default() -> Self {
        Self {
            curvature_threshold: 0.7,
            max_points: 20,
            neighborhood_percentile: 5.0,
            parallel: true,
        }
    }
}

impl SharpPointOptions {
    /// Set the score threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.curvature_threshold = threshold;
        self
    }

    /// Set the maximum number of points returned.
    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// Set the neighborhood percentile, clamped to `[0, 100]`.
    pub fn with_percentile(mut self, percentile: f64) -> Self {
        self.neighborhood_percentile = percentile.clamp(0.0, 100.0);
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

/// A vertex whose normal variation exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharpPoint {
    /// Vertex index in the mesh.
    pub vertex: usize,
    /// Vertex position.
    pub position: Point3<f64>,
    /// Normal variation score of this vertex.
    pub curvature: f64,
}

/// The `q`-th percentile of `values` with linear interpolation between
/// order statistics. Reorders `values`.
///
/// Returns `None` for an empty slice.
///
/// ```
/// use chisel::algo::curvature::percentile;
///
/// let mut values = vec![4.0, 1.0, 3.0, 2.0];
/// assert_eq!(percentile(&mut values, 50.0), Some(2.5));
/// ```
pub fn percentile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let rank = q.clamp(0.0, 100.0) / 100.0 * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let frac = rank - lo as f64;

    let (_, lo_value, upper) = values.select_nth_unstable_by(lo, |a, b| a.total_cmp(b));
    let lo_value = *lo_value;
    if frac == 0.0 || upper.is_empty() {
        return Some(lo_value);
    }

    let hi_value = upper.iter().copied().fold(f64::INFINITY, f64::min);
    Some(lo_value + (hi_value - lo_value) * frac)
}

/// Per-vertex normal variation scores.
///
/// `None` for vertices whose neighborhood holds fewer than two vertices.
pub fn normal_variation_scores(mesh: &TriMesh, options: &SharpPointOptions) -> Vec<Option<f64>> {
    normal_variation_scores_with_progress(mesh, options, &Progress::none())
}

/// Per-vertex scores with progress reporting.
pub fn normal_variation_scores_with_progress(
    mesh: &TriMesh,
    options: &SharpPointOptions,
    progress: &Progress,
) -> Vec<Option<f64>> {
    let positions = mesh.vertices();
    let n = positions.len();
    if n == 0 || mesh.is_empty() {
        return Vec::new();
    }

    let normals = mesh.vertex_normals();
    let done = AtomicUsize::new(0);
    let stride = (n / 100).max(1);

    let score = |dists: &mut Vec<f64>, sorted: &mut Vec<f64>, i: usize| -> Option<f64> {
        let s = vertex_score(positions, &normals, i, options.neighborhood_percentile, dists, sorted);
        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        progress.report_every(stride, finished, n, "Scoring vertices");
        s
    };

    if options.parallel {
        (0..n)
            .into_par_iter()
            .map_init(
                || (Vec::with_capacity(n), Vec::with_capacity(n)),
                |(dists, sorted), i| score(dists, sorted, i),
            )
            .collect()
    } else {
        let (mut dists, mut sorted) = (Vec::with_capacity(n), Vec::with_capacity(n));
        (0..n).map(|i| score(&mut dists, &mut sorted, i)).collect()
    }
}

/// Vertices with the highest normal variation above the threshold.
///
/// Scored vertices are ranked by descending score (ties keep vertex order),
/// truncated to `max_points`, then filtered by `curvature_threshold`.
/// Meshes too small to score give an empty list.
pub fn detect_sharp_points(mesh: &TriMesh, options: &SharpPointOptions) -> Vec<SharpPoint> {
    detect_sharp_points_with_progress(mesh, options, &Progress::none())
}

/// Sharp-point detection with progress reporting.
pub fn detect_sharp_points_with_progress(
    mesh: &TriMesh,
    options: &SharpPointOptions,
    progress: &Progress,
) -> Vec<SharpPoint> {
    let scores = normal_variation_scores_with_progress(mesh, options, progress);
    let sharp = select_sharp(&scores, mesh.vertices(), options);
    log::debug!(
        "Scored {} of {} vertices, {} sharp",
        scores.iter().filter(|s| s.is_some()).count(),
        scores.len(),
        sharp.len()
    );
    sharp
}

fn select_sharp(
    scores: &[Option<f64>],
    positions: &[Point3<f64>],
    options: &SharpPointOptions,
) -> Vec<SharpPoint> {
    let mut ranked: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.map(|s| (i, s)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(options.max_points)
        .filter(|&(_, s)| s > options.curvature_threshold)
        .map(|(vertex, curvature)| SharpPoint {
            vertex,
            position: positions[vertex],
            curvature,
        })
        .collect()
}

fn vertex_score(
    positions: &[Point3<f64>],
    normals: &[Vector3<f64>],
    i: usize,
    q: f64,
    dists: &mut Vec<f64>,
    sorted: &mut Vec<f64>,
) -> Option<f64> {
    let p = positions[i];
    dists.clear();
    dists.extend(positions.iter().map(|v| (v - p).norm()));
    sorted.clear();
    sorted.extend_from_slice(dists);

    let cutoff = percentile(sorted, q)?;
    let ni = normals[i];

    let (count, total) = dists
        .iter()
        .zip(normals)
        .filter(|&(&d, _)| d < cutoff)
        .fold((0usize, 0.0), |(count, total), (_, nj)| {
            (count + 1, total + (nj - ni).abs().sum())
        });

    (count > 1).then(|| total / (3 * count) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{crease_grid, flat_grid, icosphere, unit_cube};

    #[test]
    fn test_percentile_interpolates() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(percentile(&mut values, 50.0), Some(2.5));
        assert_eq!(percentile(&mut values, 0.0), Some(1.0));
        assert_eq!(percentile(&mut values, 100.0), Some(4.0));

        let mut values: Vec<f64> = (0..=10).map(f64::from).collect();
        let p = percentile(&mut values, 5.0).unwrap();
        assert!((p - 0.5).abs() < 1e-12);

        assert_eq!(percentile(&mut [7.0], 5.0), Some(7.0));
        assert_eq!(percentile(&mut [], 5.0), None);
    }

    #[test]
    fn test_flat_grid_scores_zero() {
        let mesh = flat_grid(10);
        let scores = normal_variation_scores(&mesh, &SharpPointOptions::default());

        assert_eq!(scores.len(), mesh.num_vertices());
        assert!(scores.iter().all(|s| *s == Some(0.0)));
        assert!(detect_sharp_points(&mesh, &SharpPointOptions::default()).is_empty());
    }

    #[test]
    fn test_small_mesh_neighborhood_too_small() {
        // Eight corners: only the vertex itself falls below the 5th percentile.
        let scores = normal_variation_scores(&unit_cube(), &SharpPointOptions::default());
        assert!(scores.iter().all(Option::is_none));
        assert!(detect_sharp_points(&unit_cube(), &SharpPointOptions::default()).is_empty());
    }

    #[test]
    fn test_smooth_sphere_has_no_sharp_points() {
        let mesh = icosphere(2);
        let scores = normal_variation_scores(&mesh, &SharpPointOptions::default());
        assert!(scores.iter().flatten().all(|&s| (0.0..0.7).contains(&s)));
        assert!(detect_sharp_points(&mesh, &SharpPointOptions::default()).is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = icosphere(1);
        let options = SharpPointOptions::default();
        assert_eq!(
            normal_variation_scores(&mesh, &options),
            normal_variation_scores(&mesh, &options.clone().sequential())
        );
    }

    #[test]
    fn test_select_truncates_before_threshold() {
        let positions: Vec<Point3<f64>> = (0..5).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect();
        let scores = [Some(0.9), Some(0.8), Some(0.95), None, Some(0.75)];

        let options = SharpPointOptions::default().with_max_points(2);
        let picked: Vec<usize> = select_sharp(&scores, &positions, &options)
            .iter()
            .map(|p| p.vertex)
            .collect();
        assert_eq!(picked, vec![2, 0]);

        let options = SharpPointOptions::default()
            .with_max_points(3)
            .with_threshold(0.85);
        let picked = select_sharp(&scores, &positions, &options);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[1].curvature, 0.9);
        assert_eq!(picked[1].position, positions[0]);
    }

    #[test]
    fn test_select_ties_keep_vertex_order() {
        let positions = vec![Point3::origin(); 4];
        let scores = [Some(1.0), Some(1.0), Some(0.5), Some(1.0)];
        let picked: Vec<usize> = select_sharp(&scores, &positions, &SharpPointOptions::default())
            .iter()
            .map(|p| p.vertex)
            .collect();
        assert_eq!(picked, vec![0, 1, 3]);
    }

    #[test]
    fn test_crease_is_detected() {
        let mesh = crease_grid(8);
        let base = SharpPointOptions::default().with_percentile(25.0);
        let scores = normal_variation_scores(&mesh, &base);

        let max = scores.iter().flatten().copied().fold(0.0_f64, f64::max);
        assert!(max > 0.1, "crease scored only {max}");

        let threshold = max / 2.0;
        let sharp = detect_sharp_points(&mesh, &base.with_threshold(threshold));
        assert!(!sharp.is_empty());
        assert!(sharp.len() <= 20);

        for point in &sharp {
            assert_eq!(Some(point.curvature), scores[point.vertex]);
            assert_eq!(point.position, mesh.vertices()[point.vertex]);
            assert!(point.curvature > threshold);
        }
        assert!(sharp.windows(2).all(|w| w[0].curvature >= w[1].curvature));

        // Flanks are planar; the highest variation sits on or beside the fold.
        assert!((sharp[0].position.x - 4.0).abs() <= 1.0);
    }
}
