//! Core mesh data structures.
//!
//! This module provides the indexed triangle mesh every component owns, the
//! bounding box derived from it, and the edge adjacency used for topology
//! queries.
//!
//! # Overview
//!
//! [`TriMesh`] stores positions and triangles and nothing else; normals,
//! bounds, centroid and adjacency are recomputed from the current positions
//! whenever they are asked for. That keeps a mesh valid to hold through any
//! edit, including ones that leave it open or inconsistently wound.
//!
//! # Construction
//!
//! ```
//! use chisel::mesh::{EdgeTopology, TriMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//!
//! let mesh = TriMesh::from_triangles(vertices, faces).unwrap();
//! let topo = EdgeTopology::build(mesh.faces());
//! assert!(topo.is_watertight());
//! assert_eq!(topo.euler_characteristic(mesh.num_vertices(), mesh.num_faces()), 2);
//! ```

mod adjacency;
mod bounds;
mod trimesh;

#[cfg(test)]
pub(crate) mod fixtures;

pub use adjacency::{trace_loops, vertex_neighbors, EdgeTopology};
pub use bounds::{Axis, BoundingBox};
pub use trimesh::{TriMesh, MERGE_TOLERANCE};
