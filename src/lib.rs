//! # Chisel
//!
//! Analysis and editing of triangulated surface meshes.
//!
//! Chisel loads STL and PLY models into an indexed [`TriMesh`](mesh::TriMesh),
//! reports the features a fabrication workflow cares about, and applies
//! parameterized edits that are exported back to disk.
//!
//! ## Features
//!
//! - **Analysis**: counts, watertightness, volume, surface area, bounds,
//!   extremal points, sharp points and a coarse topology classification
//! - **Editing**: rotation, capped planar cuts, Laplacian smoothing and hole filling
//! - **File formats**: STL (ASCII and binary) and PLY
//! - **Pluggable geometry**: both components run on any [`MeshBackend`](backend::MeshBackend)
//!
//! ## Quick Start
//!
//! ```no_run
//! use chisel::prelude::*;
//! use std::path::Path;
//!
//! let analyzer = FeatureAnalyzer::open("model.stl").unwrap();
//! let report = analyzer.analyze();
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//!
//! let mut editor = MeshEditor::open("model.stl").unwrap();
//! editor.rotate(0.0, 0.0, 90.0).unwrap();
//! editor.cut(&CutSpec::new(CutPlane::Xy).at(30.0)).unwrap();
//! editor.export(Some(Path::new("trimmed.stl"))).unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use chisel::prelude::*;
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//!
//! let faces = vec![
//!     [0, 2, 1], // bottom
//!     [0, 1, 3], // front
//!     [1, 2, 3], // right
//!     [2, 0, 3], // left
//! ];
//!
//! let mesh = TriMesh::from_triangles(vertices, faces).unwrap();
//! let analyzer = FeatureAnalyzer::new(mesh).unwrap();
//! let report = analyzer.analyze();
//!
//! assert!(report.is_watertight);
//! assert_eq!(report.topology_status, TopologyStatus::Good);
//! ```
//!
//! ## Edit Pipelines
//!
//! Operations can also be described as JSON, one object per step:
//!
//! ```
//! use chisel::prelude::*;
//!
//! let ops: Vec<EditOperation> = serde_json::from_str(
//!     r#"[{"operation": "rotate", "x_angle": 90}, {"operation": "smooth", "iterations": 3}]"#,
//! )
//! .unwrap();
//! assert_eq!(ops[1].step_type(), "smoothing");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod analysis;
pub mod backend;
pub mod editor;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// ```
/// use chisel::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::curvature::SharpPointOptions;
    pub use crate::algo::holes::HoleFillOptions;
    pub use crate::algo::smooth::SmoothOptions;
    pub use crate::algo::topology::TopologyStatus;
    pub use crate::analysis::{AnalysisReport, AnalyzerOptions, FeatureAnalyzer, MeshStats};
    pub use crate::backend::{MeshBackend, NativeBackend};
    pub use crate::editor::{
        CutDirection, CutPlane, CutSpec, EditOperation, MeshEditor, StepOutcome,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::io::Format;
    pub use crate::mesh::{Axis, BoundingBox, EdgeTopology, TriMesh};
}

pub use nalgebra;
