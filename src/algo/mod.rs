//! Mesh processing algorithms.
//!
//! - **Curvature**: sharp-point detection from vertex normal variation
//! - **Slicing**: plane cuts with capped cross-sections
//! - **Holes**: boundary loop detection and ear-clipped filling
//! - **Smoothing**: uniform Laplacian relaxation
//! - **Transforms**: axis rotations and plane-normal tilts
//! - **Topology**: coarse classification from edge adjacency
//!
//! Every algorithm works on [`TriMesh`](crate::mesh::TriMesh) directly and is
//! reached by the editor and analyzer through [`MeshBackend`](crate::backend::MeshBackend).

pub mod curvature;
pub mod holes;
pub mod progress;
pub mod slice;
pub mod smooth;
pub mod topology;
pub mod transform;
pub mod triangulate;

pub use progress::Progress;
