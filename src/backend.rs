//! Geometry backend seam.
//!
//! The analyzer and editor never touch file formats, adjacency or geometric
//! kernels directly; they go through a [`MeshBackend`]. [`NativeBackend`]
//! implements every capability with this crate's own algorithms and is the
//! default type parameter of both components.

use std::path::Path;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::algo::holes::{self, HoleFillOptions};
use crate::algo::slice;
use crate::algo::progress::Progress;
use crate::algo::smooth::{laplacian_smooth, laplacian_smooth_with_progress, SmoothOptions};
use crate::error::{MeshError, Result};
use crate::io::{self, Format};
use crate::mesh::{EdgeTopology, TriMesh};

/// Geometry capabilities consumed by the analyzer and editor.
pub trait MeshBackend {
    /// Load a single mesh from a file.
    fn load(&self, path: &Path) -> Result<TriMesh>;

    /// Load a single mesh from an in-memory file.
    fn load_bytes(&self, bytes: &[u8], format: Option<Format>) -> Result<TriMesh>;

    /// Every edge is shared by exactly two faces.
    fn is_watertight(&self, mesh: &TriMesh) -> bool;

    /// Shared edges are traversed in opposite directions.
    fn is_winding_consistent(&self, mesh: &TriMesh) -> bool;

    /// V − E + F.
    fn euler_number(&self, mesh: &TriMesh) -> i64;

    /// Keep the half-space `normal` points into, optionally capping the cut.
    fn slice_plane(
        &self,
        mesh: &TriMesh,
        origin: &Point3<f64>,
        normal: &Vector3<f64>,
        cap: bool,
    ) -> Option<TriMesh>;

    /// Apply a homogeneous transform to every vertex.
    fn apply_transform(&self, mesh: &mut TriMesh, matrix: &Matrix4<f64>) -> Result<()>;

    /// Laplacian smoothing.
    fn smooth(&self, mesh: &mut TriMesh, options: &SmoothOptions) -> Result<()>;

    /// Laplacian smoothing that reports each pass to `progress`.
    ///
    /// Backends without incremental reporting smooth silently.
    fn smooth_with_progress(
        &self,
        mesh: &mut TriMesh,
        options: &SmoothOptions,
        _progress: &Progress,
    ) -> Result<()> {
        self.smooth(mesh, options)
    }

    /// Fill boundary loops, returning how many were filled.
    fn fill_holes(&self, mesh: &mut TriMesh, options: &HoleFillOptions) -> Result<usize>;

    /// Write a mesh, choosing the format by extension.
    fn export(&self, mesh: &TriMesh, path: &Path) -> Result<()>;
}

/// The crate's own implementation of every backend capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeBackend;

impl MeshBackend for NativeBackend {
    fn load(&self, path: &Path) -> Result<TriMesh> {
        io::load(path)
    }

    fn load_bytes(&self, bytes: &[u8], format: Option<Format>) -> Result<TriMesh> {
        io::load_bytes(bytes, format)
    }

    fn is_watertight(&self, mesh: &TriMesh) -> bool {
        EdgeTopology::build(mesh.faces()).is_watertight()
    }

    fn is_winding_consistent(&self, mesh: &TriMesh) -> bool {
        EdgeTopology::build(mesh.faces()).is_winding_consistent()
    }

    fn euler_number(&self, mesh: &TriMesh) -> i64 {
        EdgeTopology::build(mesh.faces()).euler_characteristic(mesh.num_vertices(), mesh.num_faces())
    }

    fn slice_plane(
        &self,
        mesh: &TriMesh,
        origin: &Point3<f64>,
        normal: &Vector3<f64>,
        cap: bool,
    ) -> Option<TriMesh> {
        slice::slice_plane(mesh, origin, normal, cap)
    }

    fn apply_transform(&self, mesh: &mut TriMesh, matrix: &Matrix4<f64>) -> Result<()> {
        if !matrix.iter().all(|v| v.is_finite()) {
            return Err(MeshError::invalid_param("matrix", "non-finite", "transform must be finite"));
        }
        mesh.transform(matrix);
        Ok(())
    }

    fn smooth(&self, mesh: &mut TriMesh, options: &SmoothOptions) -> Result<()> {
        laplacian_smooth(mesh, options);
        Ok(())
    }

    fn smooth_with_progress(
        &self,
        mesh: &mut TriMesh,
        options: &SmoothOptions,
        progress: &Progress,
    ) -> Result<()> {
        laplacian_smooth_with_progress(mesh, options, progress);
        Ok(())
    }

    fn fill_holes(&self, mesh: &mut TriMesh, options: &HoleFillOptions) -> Result<usize> {
        Ok(holes::fill_holes(mesh, options))
    }

    fn export(&self, mesh: &TriMesh, path: &Path) -> Result<()> {
        io::save(mesh, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{open_box, unit_cube};

    #[test]
    fn test_native_topology_signals() {
        let backend = NativeBackend;
        let cube = unit_cube();
        assert!(backend.is_watertight(&cube));
        assert!(backend.is_winding_consistent(&cube));
        assert_eq!(backend.euler_number(&cube), 2);

        let open = open_box();
        assert!(!backend.is_watertight(&open));
        assert_eq!(backend.euler_number(&open), 1);
    }

    #[test]
    fn test_non_finite_transform_rejected() {
        let mut cube = unit_cube();
        let mut matrix = Matrix4::identity();
        matrix[(0, 3)] = f64::NAN;

        assert!(NativeBackend.apply_transform(&mut cube, &matrix).is_err());
        assert_eq!(cube, unit_cube());
    }
}
