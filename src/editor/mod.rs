//! Stateful mesh editing.
//!
//! [`MeshEditor`] holds a live mesh plus the mesh it was created with. Each
//! edit computes its result on a copy; the live mesh is replaced only when
//! the edit succeeds, so a failed edit is always a no-op.
//!
//! # Example
//!
//! ```no_run
//! use chisel::editor::{CutDirection, CutPlane, CutSpec, MeshEditor};
//!
//! let mut editor = MeshEditor::open("part.stl").unwrap();
//! editor.rotate(0.0, 0.0, 90.0).unwrap();
//! editor
//!     .cut(&CutSpec::new(CutPlane::Xy).at(30.0).keep(CutDirection::Below))
//!     .unwrap();
//! let path = editor.export(None).unwrap();
//! println!("wrote {}", path.display());
//! ```

pub mod ops;

use std::path::{Path, PathBuf};
use std::time::Instant;

use nalgebra::{Point3, Vector3};

use crate::algo::holes::HoleFillOptions;
use crate::algo::progress::Progress;
use crate::algo::smooth::SmoothOptions;
use crate::algo::transform::{rotation_xyz, tilt_normal};
use crate::analysis::report::bounds_pair;
use crate::analysis::MeshStats;
use crate::backend::{MeshBackend, NativeBackend};
use crate::error::{MeshError, Result};
use crate::io::Format;
use crate::mesh::TriMesh;

pub use ops::{CutDirection, CutPlane, CutSpec, EditOperation, StepOutcome};

/// Applies edits to one mesh through a [`MeshBackend`].
#[derive(Debug, Clone)]
pub struct MeshEditor<B: MeshBackend = NativeBackend> {
    mesh: TriMesh,
    original: TriMesh,
    backend: B,
}

impl MeshEditor<NativeBackend> {
    /// Load a mesh file for editing with the native backend.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(NativeBackend, path)
    }

    /// Load an in-memory file, sniffing the format when `format` is unset.
    pub fn from_bytes(bytes: &[u8], format: Option<Format>) -> Result<Self> {
        let mesh = NativeBackend.load_bytes(bytes, format)?;
        Self::with_backend(mesh, NativeBackend)
    }

    /// Edit a mesh already in memory.
    pub fn new(mesh: TriMesh) -> Result<Self> {
        Self::with_backend(mesh, NativeBackend)
    }
}

impl<B: MeshBackend> MeshEditor<B> {
    /// Edit a mesh with a specific backend.
    pub fn with_backend(mesh: TriMesh, backend: B) -> Result<Self> {
        if mesh.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        Ok(Self {
            original: mesh.clone(),
            mesh,
            backend,
        })
    }

    /// Load a mesh file through `backend`.
    pub fn open_with<P: AsRef<Path>>(backend: B, path: P) -> Result<Self> {
        let mesh = backend.load(path.as_ref())?;
        Self::with_backend(mesh, backend)
    }

    /// The live mesh.
    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// The mesh as it was when the editor was created.
    pub fn original(&self) -> &TriMesh {
        &self.original
    }

    /// Whether any edit has changed the live mesh.
    pub fn is_modified(&self) -> bool {
        self.mesh != self.original
    }

    /// Consume the editor, returning the live mesh.
    pub fn into_mesh(self) -> TriMesh {
        self.mesh
    }

    /// Rotate about the origin: X, then Y, then Z, in degrees.
    pub fn rotate(&mut self, x_deg: f64, y_deg: f64, z_deg: f64) -> Result<()> {
        if ![x_deg, y_deg, z_deg].iter().all(|a| a.is_finite()) {
            return Err(MeshError::failed("rotate", "angles must be finite"));
        }
        let matrix = rotation_xyz(x_deg, y_deg, z_deg);
        self.try_edit("rotate", |backend, mesh| backend.apply_transform(mesh, &matrix))
    }

    /// Cut the mesh by a plane and cap the cross-section.
    ///
    /// Fails, leaving the mesh unchanged, if nothing is left on the kept side.
    pub fn cut(&mut self, spec: &CutSpec) -> Result<()> {
        if ![spec.position, spec.tilt_x, spec.tilt_y].iter().all(|v| v.is_finite()) {
            return Err(MeshError::failed("cut", "parameters must be finite"));
        }
        let (origin, normal) = self.cut_plane(spec);
        log::debug!(
            "Cut plane origin ({:.4}, {:.4}, {:.4}) normal ({:.4}, {:.4}, {:.4})",
            origin.x,
            origin.y,
            origin.z,
            normal.x,
            normal.y,
            normal.z
        );

        self.try_edit("cut", |backend, mesh| {
            let sliced = backend
                .slice_plane(mesh, &origin, &normal, true)
                .ok_or_else(|| MeshError::failed("cut", "slice produced an empty mesh"))?;
            *mesh = sliced;
            Ok(())
        })
    }

    /// Origin and unit normal of the plane a cut would use on the live mesh.
    ///
    /// The plane passes through the surface centroid, offset along its axis
    /// by `position / 100 - 0.5` of the bounding-box extent, then tilted.
    /// The kept side is the one the returned normal points into.
    pub fn cut_plane(&self, spec: &CutSpec) -> (Point3<f64>, Vector3<f64>) {
        let centroid = self.mesh.centroid();
        let bounds = self.mesh.bounding_box().unwrap_or_default();
        let t = spec.position / 100.0 - 0.5;

        let (origin, normal) = match spec.plane.axis() {
            Some(axis) => {
                let n = axis.unit().into_inner();
                (centroid + n * (t * bounds.extent(axis)), n)
            }
            None => (centroid, Vector3::y()),
        };

        let normal = tilt_normal(&normal, spec.tilt_x, spec.tilt_y);
        match spec.direction {
            CutDirection::Above => (origin, normal),
            CutDirection::Below => (origin, -normal),
        }
    }

    /// Laplacian smoothing with the default step, pinning open boundaries.
    pub fn smooth(&mut self, iterations: usize) -> Result<()> {
        self.smooth_with(&SmoothOptions::default().with_iterations(iterations))
    }

    /// Laplacian smoothing with explicit options.
    pub fn smooth_with(&mut self, options: &SmoothOptions) -> Result<()> {
        self.smooth_with_progress(options, &Progress::none())
    }

    /// Laplacian smoothing, reporting each pass to `progress`.
    pub fn smooth_with_progress(
        &mut self,
        options: &SmoothOptions,
        progress: &Progress,
    ) -> Result<()> {
        self.try_edit("smooth", |backend, mesh| {
            backend.smooth_with_progress(mesh, options, progress)
        })
    }

    /// Fill holes up to the default size, returning how many were filled.
    pub fn fill_holes(&mut self) -> Result<usize> {
        self.fill_holes_with(&HoleFillOptions::default())
    }

    /// Fill holes with explicit options.
    pub fn fill_holes_with(&mut self, options: &HoleFillOptions) -> Result<usize> {
        self.try_edit("fill_holes", |backend, mesh| backend.fill_holes(mesh, options))
    }

    /// Write the live mesh.
    ///
    /// With no path, a binary STL is written to a kept temporary file whose
    /// path is returned.
    pub fn export(&self, path: Option<&Path>) -> Result<PathBuf> {
        if self.mesh.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => temp_stl_path()?,
        };
        self.backend.export(&self.mesh, &path)?;
        Ok(path)
    }

    /// Counts, enclosure, volume, area and bounds of the live mesh.
    pub fn stats(&self) -> MeshStats {
        let is_watertight = self.backend.is_watertight(&self.mesh);
        MeshStats {
            vertices_count: self.mesh.num_vertices(),
            faces_count: self.mesh.num_faces(),
            is_watertight,
            volume: is_watertight.then(|| self.mesh.signed_volume()),
            surface_area: self.mesh.surface_area(),
            bounds: bounds_pair(self.mesh.bounding_box().as_ref()),
        }
    }

    /// Run one operation without exporting.
    pub fn run(&mut self, op: &EditOperation) -> Result<()> {
        match op {
            EditOperation::Rotate {
                x_angle,
                y_angle,
                z_angle,
            } => self.rotate(*x_angle, *y_angle, *z_angle),
            EditOperation::Cut(spec) => self.cut(spec),
            EditOperation::Smooth { iterations } => self.smooth(*iterations),
            EditOperation::FillHoles => self.fill_holes().map(|_| ()),
            EditOperation::Ovalize { .. } | EditOperation::Drill { .. } => {
                Err(MeshError::Unspecified {
                    operation: op.name(),
                })
            }
        }
    }

    /// Run one operation, export the result, and time both.
    ///
    /// Failures are reported in the outcome rather than returned. A step
    /// whose export fails is undone, so the live mesh only ever reflects
    /// steps that were reported as successful.
    pub fn apply(&mut self, op: &EditOperation, output: Option<&Path>) -> StepOutcome {
        let start = Instant::now();
        let previous = self.mesh.clone();
        let result = self.run(op).and_then(|_| {
            self.export(output).map_err(|e| {
                self.mesh = previous;
                e
            })
        });
        let execution_time = start.elapsed().as_secs_f64();

        match result {
            Ok(path) => StepOutcome {
                operation: op.step_type(),
                success: true,
                output: Some(path),
                execution_time,
                error: None,
            },
            Err(e) => {
                log::warn!("{} step failed: {}", op.step_type(), e);
                StepOutcome {
                    operation: op.step_type(),
                    success: false,
                    output: None,
                    execution_time,
                    error: Some(e.to_string()),
                }
            }
        }
    }

    fn try_edit<T, F>(&mut self, operation: &'static str, edit: F) -> Result<T>
    where
        F: FnOnce(&B, &mut TriMesh) -> Result<T>,
    {
        let mut candidate = self.mesh.clone();
        let value = edit(&self.backend, &mut candidate).map_err(|e| as_failure(operation, e))?;

        if candidate.is_empty() {
            return Err(MeshError::failed(operation, "result has no faces"));
        }
        if !candidate.is_finite() {
            return Err(MeshError::failed(operation, "result has non-finite coordinates"));
        }

        self.mesh = candidate;
        log::info!(
            "{} applied: {} vertices, {} faces",
            operation,
            self.mesh.num_vertices(),
            self.mesh.num_faces()
        );
        Ok(value)
    }
}

fn as_failure(operation: &'static str, error: MeshError) -> MeshError {
    match error {
        MeshError::OperationFailed { .. } | MeshError::Unspecified { .. } => error,
        other => MeshError::failed(operation, other.to_string()),
    }
}

fn temp_stl_path() -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("chisel-")
        .suffix(".stl")
        .tempfile()?;
    file.into_temp_path()
        .keep()
        .map_err(|e| MeshError::Io(e.error))
}
