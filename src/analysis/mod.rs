//! Read-only feature analysis of a mesh.
//!
//! [`FeatureAnalyzer`] owns one mesh and answers questions about it: size and
//! enclosure, bounds, extremal points along an up axis, sharp points, the
//! widest and narrowest bounding-box axes, and a coarse topology verdict.
//! Every answer is recomputed from the mesh on each call.
//!
//! # Example
//!
//! ```no_run
//! use chisel::analysis::FeatureAnalyzer;
//!
//! let analyzer = FeatureAnalyzer::open("part.stl").unwrap();
//! let report = analyzer.analyze();
//! println!("{}", serde_json::to_string_pretty(&report).unwrap());
//! ```

pub mod report;

use std::path::Path;

use crate::algo::curvature::{detect_sharp_points, SharpPointOptions};
use crate::algo::topology::TopologyStatus;
use crate::backend::{MeshBackend, NativeBackend};
use crate::error::{MeshError, Result};
use crate::io::Format;
use crate::mesh::{Axis, BoundingBox, TriMesh};

pub use report::{
    AnalysisReport, AreaRecord, BoundsRecord, MeshStats, PointRecord, SharpPointRecord,
    VisualizationData,
};

use report::{array, bounds_pair};

/// Options for a full analysis.
#[derive(Debug, Clone)]
pub struct AnalyzerOptions {
    /// Number of top and bottom points reported.
    pub extremal_count: usize,

    /// Axis along which "top" and "bottom" are measured.
    pub up_axis: Axis,

    /// Sharp-point detection parameters.
    pub sharp: SharpPointOptions,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            extremal_count: 5,
            up_axis: Axis::Y,
            sharp: SharpPointOptions::default(),
        }
    }
}

impl AnalyzerOptions {
    /// Set how many top and bottom points are reported.
    pub fn with_extremal_count(mut self, count: usize) -> Self {
        self.extremal_count = count;
        self
    }

    /// Set the up axis.
    pub fn with_up_axis(mut self, axis: Axis) -> Self {
        self.up_axis = axis;
        self
    }

    /// Set the sharp-point options.
    pub fn with_sharp_points(mut self, sharp: SharpPointOptions) -> Self {
        self.sharp = sharp;
        self
    }
}

/// Analyzes one mesh through a [`MeshBackend`].
#[derive(Debug, Clone)]
pub struct FeatureAnalyzer<B: MeshBackend = NativeBackend> {
    mesh: TriMesh,
    backend: B,
    options: AnalyzerOptions,
}

impl FeatureAnalyzer<NativeBackend> {
    /// Load a mesh file and analyze it with the native backend.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(NativeBackend, path)
    }

    /// Load an in-memory file, sniffing the format when `format` is unset.
    pub fn from_bytes(bytes: &[u8], format: Option<Format>) -> Result<Self> {
        let mesh = NativeBackend.load_bytes(bytes, format)?;
        Self::with_backend(mesh, NativeBackend)
    }

    /// Analyze a mesh already in memory.
    pub fn new(mesh: TriMesh) -> Result<Self> {
        Self::with_backend(mesh, NativeBackend)
    }
}

impl<B: MeshBackend> FeatureAnalyzer<B> {
    /// Analyze a mesh with a specific backend.
    pub fn with_backend(mesh: TriMesh, backend: B) -> Result<Self> {
        if mesh.is_empty() {
            return Err(MeshError::EmptyMesh);
        }
        Ok(Self {
            mesh,
            backend,
            options: AnalyzerOptions::default(),
        })
    }

    /// Load a mesh file through `backend`.
    pub fn open_with<P: AsRef<Path>>(backend: B, path: P) -> Result<Self> {
        let mesh = backend.load(path.as_ref())?;
        Self::with_backend(mesh, backend)
    }

    /// Replace the analysis options.
    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    /// The analyzed mesh.
    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// Current analysis options.
    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Run every analysis and collect the results.
    pub fn analyze(&self) -> AnalysisReport {
        let summary = self.summary();
        let report = AnalysisReport {
            vertices_count: summary.vertices_count,
            faces_count: summary.faces_count,
            is_watertight: summary.is_watertight,
            volume: summary.volume,
            surface_area: summary.surface_area,
            bounding_box: self.bounding_box(),
            top_points: self.top_points(self.options.extremal_count),
            bottom_points: self.bottom_points(self.options.extremal_count),
            sharp_points: self.sharp_points(&self.options.sharp),
            widest_area: self.widest_area(),
            narrowest_area: self.narrowest_area(),
            topology_status: self.topology_status(),
        };

        log::info!(
            "Analyzed {} vertices: {}, {} sharp points",
            report.vertices_count,
            report.topology_status,
            report.sharp_points.len()
        );
        report
    }

    /// Counts, enclosure, volume and area.
    pub fn summary(&self) -> MeshStats {
        let is_watertight = self.backend.is_watertight(&self.mesh);
        MeshStats {
            vertices_count: self.mesh.num_vertices(),
            faces_count: self.mesh.num_faces(),
            is_watertight,
            volume: is_watertight.then(|| self.mesh.signed_volume()),
            surface_area: self.mesh.surface_area(),
            bounds: bounds_pair(Some(&self.bounds())),
        }
    }

    /// Axis-aligned bounds with extents.
    pub fn bounding_box(&self) -> BoundsRecord {
        BoundsRecord::from(&self.bounds())
    }

    /// The `n` highest vertices along the up axis, lowest of them first.
    pub fn top_points(&self, n: usize) -> Vec<PointRecord> {
        let order = self.order_along(self.options.up_axis);
        let start = order.len().saturating_sub(n);
        self.records(&order[start..])
    }

    /// The `n` lowest vertices along the up axis, lowest first.
    pub fn bottom_points(&self, n: usize) -> Vec<PointRecord> {
        let order = self.order_along(self.options.up_axis);
        let end = n.min(order.len());
        self.records(&order[..end])
    }

    /// Vertices with high normal variation.
    pub fn sharp_points(&self, options: &SharpPointOptions) -> Vec<SharpPointRecord> {
        detect_sharp_points(&self.mesh, options)
            .iter()
            .map(SharpPointRecord::from)
            .collect()
    }

    /// Bounding-box axis with the largest extent.
    pub fn widest_area(&self) -> AreaRecord {
        let bounds = self.bounds();
        self.area_record(&bounds, bounds.widest_axis())
    }

    /// Bounding-box axis with the smallest extent.
    pub fn narrowest_area(&self) -> AreaRecord {
        let bounds = self.bounds();
        self.area_record(&bounds, bounds.narrowest_axis())
    }

    /// Coarse topology verdict.
    pub fn topology_status(&self) -> TopologyStatus {
        let watertight = self.backend.is_watertight(&self.mesh);
        let consistent = self.backend.is_winding_consistent(&self.mesh);
        let euler = self.backend.euler_number(&self.mesh);
        log::debug!(
            "Topology: watertight={} consistent={} euler={}",
            watertight,
            consistent,
            euler
        );
        TopologyStatus::classify(watertight, consistent, euler)
    }

    /// Positions, faces, normals, centroid and bounds for rendering.
    pub fn visualization_data(&self) -> VisualizationData {
        VisualizationData {
            vertices: self.mesh.vertices().iter().map(|p| array(&p.coords)).collect(),
            faces: self.mesh.faces().to_vec(),
            normals: self.mesh.vertex_normals().iter().map(array).collect(),
            centroid: array(&self.mesh.centroid().coords),
            bounds: bounds_pair(Some(&self.bounds())),
        }
    }

    fn bounds(&self) -> BoundingBox {
        self.mesh.bounding_box().unwrap_or_default()
    }

    /// Vertex indices in stable ascending order of one coordinate.
    fn order_along(&self, axis: Axis) -> Vec<usize> {
        let k = axis.index();
        let vertices = self.mesh.vertices();
        let mut order: Vec<usize> = (0..vertices.len()).collect();
        order.sort_by(|&a, &b| vertices[a][k].total_cmp(&vertices[b][k]));
        order
    }

    fn records(&self, indices: &[usize]) -> Vec<PointRecord> {
        indices
            .iter()
            .map(|&i| PointRecord::from(self.mesh.position(i)))
            .collect()
    }

    fn area_record(&self, bounds: &BoundingBox, axis: Axis) -> AreaRecord {
        AreaRecord {
            position: PointRecord::from(&self.mesh.centroid()),
            width: bounds.extent(axis),
            direction: axis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::{box_mesh, crease_grid, flat_grid, open_box, torus, unit_cube};
    use nalgebra::Vector3;

    fn point(x: f64, y: f64, z: f64) -> PointRecord {
        PointRecord { x, y, z }
    }

    #[test]
    fn test_cube_report() {
        let report = FeatureAnalyzer::new(unit_cube()).unwrap().analyze();

        assert_eq!(report.vertices_count, 8);
        assert_eq!(report.faces_count, 12);
        assert!(report.is_watertight);
        assert!((report.volume.unwrap() - 1.0).abs() < 1e-12);
        assert!((report.surface_area - 6.0).abs() < 1e-12);
        assert_eq!(report.topology_status, TopologyStatus::Good);
        assert_eq!(report.top_points.len(), 5);
        assert_eq!(report.bottom_points.len(), 5);
        assert!(report.sharp_points.is_empty());

        // All extents tie, so both resolve to x.
        assert_eq!(report.widest_area.direction, Axis::X);
        assert_eq!(report.narrowest_area.direction, Axis::X);
    }

    #[test]
    fn test_box_dimensions_and_areas() {
        let analyzer = FeatureAnalyzer::new(box_mesh(Vector3::new(3.0, 2.0, 1.0))).unwrap();

        let bbox = analyzer.bounding_box();
        for k in 0..3 {
            assert_eq!(bbox.dimensions[k], bbox.max[k] - bbox.min[k]);
            assert!(bbox.dimensions[k] >= 0.0);
        }

        let widest = analyzer.widest_area();
        assert_eq!(widest.direction, Axis::X);
        assert_eq!(widest.width, 3.0);

        let narrowest = analyzer.narrowest_area();
        assert_eq!(narrowest.direction, Axis::Z);
        assert_eq!(narrowest.width, 1.0);

        let c = narrowest.position;
        assert!((c.x - 1.5).abs() < 1e-12 && (c.y - 1.0).abs() < 1e-12 && (c.z - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_extremal_points_order() {
        let analyzer = FeatureAnalyzer::new(box_mesh(Vector3::new(3.0, 2.0, 1.0))).unwrap();

        assert_eq!(
            analyzer.bottom_points(2),
            vec![point(0.0, 0.0, 0.0), point(3.0, 0.0, 0.0)]
        );
        assert_eq!(
            analyzer.top_points(2),
            vec![point(3.0, 2.0, 1.0), point(0.0, 2.0, 1.0)]
        );
        assert_eq!(analyzer.top_points(50).len(), 8);
        assert!(analyzer.bottom_points(0).is_empty());

        let along_z = analyzer.with_options(AnalyzerOptions::default().with_up_axis(Axis::Z));
        assert!(along_z.top_points(4).iter().all(|p| p.z == 1.0));
    }

    #[test]
    fn test_open_box_has_holes() {
        let report = FeatureAnalyzer::new(open_box()).unwrap().analyze();
        assert!(!report.is_watertight);
        assert_eq!(report.volume, None);
        assert_eq!(report.topology_status, TopologyStatus::HasHoles);
    }

    #[test]
    fn test_torus_is_complex() {
        let analyzer = FeatureAnalyzer::new(torus(12, 8)).unwrap();
        assert_eq!(analyzer.topology_status(), TopologyStatus::Complex);
    }

    #[test]
    fn test_flat_grid_has_no_sharp_points() {
        let analyzer = FeatureAnalyzer::new(flat_grid(8)).unwrap();
        assert!(analyzer.sharp_points(&SharpPointOptions::default()).is_empty());
        assert_eq!(analyzer.summary().volume, None);
    }

    #[test]
    fn test_crease_reports_sharp_points() {
        let sharp = SharpPointOptions::default()
            .with_percentile(25.0)
            .with_threshold(0.05);
        let analyzer = FeatureAnalyzer::new(crease_grid(8))
            .unwrap()
            .with_options(AnalyzerOptions::default().with_sharp_points(sharp));
        let report = analyzer.analyze();

        assert!(!report.sharp_points.is_empty());
        assert!(report.sharp_points.iter().all(|p| p.curvature > 0.05));

        let value = serde_json::to_value(&report).unwrap();
        for key in ["x", "y", "z", "curvature"] {
            assert!(value["sharp_points"][0][key].is_f64(), "missing key {key}");
        }
    }

    #[test]
    fn test_report_json_keys() {
        let report = FeatureAnalyzer::new(open_box()).unwrap().analyze();
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "vertices_count",
            "faces_count",
            "is_watertight",
            "volume",
            "surface_area",
            "bounding_box",
            "top_points",
            "bottom_points",
            "sharp_points",
            "widest_area",
            "narrowest_area",
            "topology_status",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert!(value["volume"].is_null());
        assert_eq!(value["topology_status"], "has_holes");
        assert_eq!(value["widest_area"]["direction"], "x");
        assert_eq!(value["bounding_box"]["dimensions"].as_array().unwrap().len(), 3);
        assert!(value["top_points"][0]["y"].is_f64());
    }

    #[test]
    fn test_visualization_data() {
        let data = FeatureAnalyzer::new(unit_cube()).unwrap().visualization_data();
        assert_eq!(data.vertices.len(), 8);
        assert_eq!(data.normals.len(), 8);
        assert_eq!(data.faces.len(), 12);
        assert_eq!(data.bounds, [[0.0; 3], [1.0; 3]]);
        assert!(data.centroid.iter().all(|c| (c - 0.5).abs() < 1e-12));
    }

    #[test]
    fn test_construction_errors() {
        assert!(matches!(
            FeatureAnalyzer::new(TriMesh::default()),
            Err(MeshError::EmptyMesh)
        ));
        let err = FeatureAnalyzer::from_bytes(b"not a mesh", None).unwrap_err();
        assert!(err.is_load_error());
    }
}
