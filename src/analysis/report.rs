//! Serializable analysis results.
//!
//! Field names are the JSON keys clients consume, so they are part of the
//! public contract. Coordinates are plain arrays or `{x, y, z}` objects rather
//! than nalgebra types to keep the wire shape independent of the math crate.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::algo::curvature::SharpPoint;
use crate::algo::topology::TopologyStatus;
use crate::mesh::{Axis, BoundingBox};

/// A point as `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<&Point3<f64>> for PointRecord {
    fn from(p: &Point3<f64>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }
}

/// A sharp point as `{x, y, z, curvature}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct SharpPointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Normal variation score of the vertex.
    pub curvature: f64,
}

impl From<&SharpPoint> for SharpPointRecord {
    fn from(p: &SharpPoint) -> Self {
        Self {
            x: p.position.x,
            y: p.position.y,
            z: p.position.z,
            curvature: p.curvature,
        }
    }
}

/// Bounds with per-axis extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundsRecord {
    /// Smallest coordinate per axis.
    pub min: [f64; 3],
    /// Largest coordinate per axis.
    pub max: [f64; 3],
    /// `max - min` per axis.
    pub dimensions: [f64; 3],
}

impl From<&BoundingBox> for BoundsRecord {
    fn from(b: &BoundingBox) -> Self {
        Self {
            min: array(&b.min.coords),
            max: array(&b.max.coords),
            dimensions: array(&b.dimensions()),
        }
    }
}

/// Widest or narrowest bounding-box axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaRecord {
    /// Surface centroid of the mesh.
    pub position: PointRecord,
    /// Extent along `direction`.
    pub width: f64,
    /// Bounding-box axis the width was measured along.
    pub direction: Axis,
}

/// The full analysis of one mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Number of welded vertices.
    pub vertices_count: usize,
    /// Number of triangles.
    pub faces_count: usize,
    /// Every edge is shared by exactly two faces.
    pub is_watertight: bool,
    /// Enclosed volume, only for watertight meshes.
    pub volume: Option<f64>,
    /// Sum of triangle areas.
    pub surface_area: f64,
    /// Axis-aligned bounds.
    pub bounding_box: BoundsRecord,
    /// Highest vertices along the up axis, in ascending height.
    pub top_points: Vec<PointRecord>,
    /// Lowest vertices along the up axis, in ascending height.
    pub bottom_points: Vec<PointRecord>,
    /// Vertices whose surrounding normals vary sharply.
    pub sharp_points: Vec<SharpPointRecord>,
    /// Longest bounding-box axis.
    pub widest_area: AreaRecord,
    /// Shortest bounding-box axis.
    pub narrowest_area: AreaRecord,
    /// Coarse topology classification.
    pub topology_status: TopologyStatus,
}

/// Headline numbers for a mesh, as reported after each edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct MeshStats {
    pub vertices_count: usize,
    pub faces_count: usize,
    pub is_watertight: bool,
    /// Enclosed volume, only for watertight meshes.
    pub volume: Option<f64>,
    pub surface_area: f64,
    /// `[min, max]`.
    pub bounds: [[f64; 3]; 2],
}

/// Geometry for a client-side renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationData {
    /// Vertex positions.
    pub vertices: Vec<[f64; 3]>,
    /// Triangle vertex indices, counter-clockwise from outside.
    pub faces: Vec<[usize; 3]>,
    /// Area-weighted vertex normals.
    pub normals: Vec<[f64; 3]>,
    /// Surface centroid.
    pub centroid: [f64; 3],
    /// `[min, max]`.
    pub bounds: [[f64; 3]; 2],
}

#[inline]
pub(crate) fn array(v: &Vector3<f64>) -> [f64; 3] {
    [v.x, v.y, v.z]
}

/// `[min, max]` of an optional bounding box, zeros when absent.
pub(crate) fn bounds_pair(bounds: Option<&BoundingBox>) -> [[f64; 3]; 2] {
    bounds.map_or([[0.0; 3]; 2], |b| [array(&b.min.coords), array(&b.max.coords)])
}
