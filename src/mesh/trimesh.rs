//! Indexed triangle mesh.
//!
//! [`TriMesh`] is the value every component owns: an ordered list of vertex
//! positions and an ordered list of triangles indexing into it. Adjacency,
//! normals and bounds are derived on demand, so a mesh can carry inconsistent
//! winding or non-manifold edges without failing to load. Topology queries
//! report those conditions instead.

use std::collections::HashMap;

use nalgebra::{Matrix4, Point3, Vector3};

use super::bounds::BoundingBox;
use crate::error::{MeshError, Result};

/// Quantization step used when welding coincident vertices.
pub const MERGE_TOLERANCE: f64 = 1e-8;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriMesh {
    pub(crate) vertices: Vec<Point3<f64>>,
    pub(crate) faces: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Build a mesh from vertex positions and triangles.
    ///
    /// Fails if there are no faces, a face indexes past the vertex list, or a
    /// face repeats a vertex.
    ///
    /// # Example
    ///
    /// ```
    /// use chisel::mesh::TriMesh;
    /// use nalgebra::Point3;
    ///
    /// let vertices = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = TriMesh::from_triangles(vertices, vec![[0, 1, 2]]).unwrap();
    /// assert_eq!(mesh.num_faces(), 1);
    /// assert!((mesh.surface_area() - 0.5).abs() < 1e-12);
    /// ```
    pub fn from_triangles(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        if faces.is_empty() {
            return Err(MeshError::EmptyMesh);
        }

        for (fi, face) in faces.iter().enumerate() {
            for &vi in face {
                if vi >= vertices.len() {
                    return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
                }
            }
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                return Err(MeshError::DegenerateFace { face: fi });
            }
        }

        Ok(Self { vertices, faces })
    }

    /// Build a mesh from raw triangle soup, welding coincident vertices.
    ///
    /// Vertices closer than [`MERGE_TOLERANCE`] on every axis collapse to the
    /// first one seen. Faces that become degenerate are dropped, and vertices
    /// no face references are discarded. Fails only if no face survives.
    pub fn merged(vertices: &[Point3<f64>], faces: &[[usize; 3]]) -> Result<Self> {
        let mut welded: Vec<Point3<f64>> = Vec::with_capacity(vertices.len());
        let mut lookup: HashMap<[i64; 3], usize> = HashMap::with_capacity(vertices.len());
        let mut remap: Vec<Option<usize>> = vec![None; vertices.len()];

        let mut out_faces = Vec::with_capacity(faces.len());
        let mut dropped = 0usize;

        for (fi, face) in faces.iter().enumerate() {
            let mut tri = [0usize; 3];
            for (k, &vi) in face.iter().enumerate() {
                let p = vertices
                    .get(vi)
                    .ok_or(MeshError::InvalidVertexIndex { face: fi, vertex: vi })?;
                tri[k] = *remap[vi].get_or_insert_with(|| {
                    *lookup.entry(quantize(p)).or_insert_with(|| {
                        welded.push(*p);
                        welded.len() - 1
                    })
                });
            }

            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                dropped += 1;
                continue;
            }
            out_faces.push(tri);
        }

        if dropped > 0 {
            log::debug!("Dropped {} degenerate faces while welding", dropped);
        }
        log::debug!(
            "Welded {} vertices into {}",
            vertices.len(),
            welded.len()
        );

        let mut mesh = Self::from_triangles(welded, out_faces)?;
        mesh.remove_unreferenced_vertices();
        Ok(mesh)
    }

    // ==================== Accessors ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Whether the mesh has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Vertex positions.
    #[inline]
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// Triangles as vertex index triples.
    #[inline]
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// Position of a vertex.
    #[inline]
    pub fn position(&self, v: usize) -> &Point3<f64> {
        &self.vertices[v]
    }

    /// Move a vertex.
    #[inline]
    pub fn set_position(&mut self, v: usize, pos: Point3<f64>) {
        self.vertices[v] = pos;
    }

    /// Positions of the three corners of a face.
    #[inline]
    pub fn face_positions(&self, f: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.faces[f];
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    // ==================== Geometry ====================

    /// Unit normal of a face, or zero for a zero-area face.
    pub fn face_normal(&self, f: usize) -> Vector3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f64::MIN_POSITIVE)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Area of a face.
    pub fn face_area(&self, f: usize) -> f64 {
        let [p0, p1, p2] = self.face_positions(f);
        0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
    }

    /// Centroid of a face.
    pub fn face_centroid(&self, f: usize) -> Point3<f64> {
        let [p0, p1, p2] = self.face_positions(f);
        Point3::from((p0.coords + p1.coords + p2.coords) / 3.0)
    }

    /// Area-weighted unit normal at every vertex.
    ///
    /// Vertices that touch no face (or only zero-area faces) get a zero normal.
    pub fn vertex_normals(&self) -> Vec<Vector3<f64>> {
        let mut normals = vec![Vector3::zeros(); self.vertices.len()];

        for face in &self.faces {
            let [a, b, c] = *face;
            let weighted = (self.vertices[b] - self.vertices[a])
                .cross(&(self.vertices[c] - self.vertices[a]));
            normals[a] += weighted;
            normals[b] += weighted;
            normals[c] += weighted;
        }

        normals
            .into_iter()
            .map(|n| n.try_normalize(f64::MIN_POSITIVE).unwrap_or_else(Vector3::zeros))
            .collect()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }

    /// Signed enclosed volume by the divergence theorem.
    ///
    /// Only meaningful for a closed mesh; positive when faces wind
    /// counter-clockwise seen from outside.
    pub fn signed_volume(&self) -> f64 {
        self.faces
            .iter()
            .map(|&[a, b, c]| {
                self.vertices[a]
                    .coords
                    .dot(&self.vertices[b].coords.cross(&self.vertices[c].coords))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Area-weighted surface centroid.
    ///
    /// Falls back to the mean of the vertex positions when the total area is
    /// zero.
    pub fn centroid(&self) -> Point3<f64> {
        let mut weighted = Vector3::zeros();
        let mut total = 0.0;
        for f in 0..self.faces.len() {
            let area = self.face_area(f);
            weighted += self.face_centroid(f).coords * area;
            total += area;
        }

        if total > f64::EPSILON {
            Point3::from(weighted / total)
        } else if self.vertices.is_empty() {
            Point3::origin()
        } else {
            let sum: Vector3<f64> = self.vertices.iter().map(|p| p.coords).sum();
            Point3::from(sum / self.vertices.len() as f64)
        }
    }

    /// Axis-aligned bounds, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|p| p.coords.iter().all(|c| c.is_finite()))
    }

    // ==================== Mutation ====================

    /// Apply a homogeneous transform to every vertex.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for p in &mut self.vertices {
            *p = matrix.transform_point(p);
        }
    }

    /// Reverse the winding of every face.
    pub fn invert(&mut self) {
        for face in &mut self.faces {
            face.swap(1, 2);
        }
    }

    /// Drop vertices no face references and renumber the rest.
    ///
    /// Returns the number of vertices removed.
    pub fn remove_unreferenced_vertices(&mut self) -> usize {
        let mut remap: Vec<Option<usize>> = vec![None; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len());

        let vertices = &self.vertices;
        for face in &mut self.faces {
            for vi in face.iter_mut() {
                let old = *vi;
                *vi = *remap[old].get_or_insert_with(|| {
                    kept.push(vertices[old]);
                    kept.len() - 1
                });
            }
        }

        let removed = self.vertices.len() - kept.len();
        self.vertices = kept;
        removed
    }
}

fn quantize(p: &Point3<f64>) -> [i64; 3] {
    [
        (p.x / MERGE_TOLERANCE).round() as i64,
        (p.y / MERGE_TOLERANCE).round() as i64,
        (p.z / MERGE_TOLERANCE).round() as i64,
    ]
}
