//! Plane slicing with cross-section capping.
//!
//! [`slice_plane`] keeps the part of a mesh on the side the plane normal
//! points into. Faces straddling the plane are clipped; the new vertices are
//! shared between the two faces of each cut edge so the result stays welded.
//! With `cap` set, the open cross-section is closed by triangulating the
//! boundary loops that lie in the plane. Loops nested inside another loop
//! become holes of it, so slicing a torus flat yields an annulus.

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::mesh::{trace_loops, EdgeTopology, TriMesh, MERGE_TOLERANCE};

use super::triangulate::{contains_point, signed_area, triangulate_loop, triangulate_with_holes};

/// Vertices closer to the plane than this many single-precision steps of the
/// largest coordinate, plus the weld tolerance, are treated as lying on it.
///
/// Cut vertices therefore never land within f32 or weld resolution of an
/// existing vertex, and a sliced mesh written to STL reloads with the same
/// topology.
const PLANE_SNAP_STEPS: f64 = 8.0;

/// Slice a mesh by a plane, keeping the half-space `normal` points into.
///
/// Faces lying in the plane are kept only when they face away from the kept
/// side, that is when they bound it. Returns `None` when nothing remains or
/// `normal` has no direction.
///
/// # Example
///
/// ```
/// use chisel::algo::slice::slice_plane;
/// use chisel::mesh::TriMesh;
/// use nalgebra::{Point3, Vector3};
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
///     Point3::new(0.5, 0.5, 1.0),
/// ];
/// let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
/// let mesh = TriMesh::from_triangles(vertices, faces).unwrap();
///
/// let top = slice_plane(&mesh, &Point3::new(0.0, 0.0, 0.5), &Vector3::z(), true).unwrap();
/// assert!(top.vertices().iter().all(|p| p.z >= 0.5 - 1e-12));
///
/// assert!(slice_plane(&mesh, &Point3::new(0.0, 0.0, 2.0), &Vector3::z(), true).is_none());
/// ```
pub fn slice_plane(
    mesh: &TriMesh,
    origin: &Point3<f64>,
    normal: &Vector3<f64>,
    cap: bool,
) -> Option<TriMesh> {
    let normal = normal.try_normalize(f64::EPSILON)?;
    let eps = snap_distance(mesh);

    let dist: Vec<f64> = mesh
        .vertices()
        .iter()
        .map(|p| {
            let d = (p - origin).dot(&normal);
            if d.abs() < eps {
                0.0
            } else {
                d
            }
        })
        .collect();

    let mut vertices = mesh.vertices().to_vec();
    let mut faces = Vec::with_capacity(mesh.num_faces());
    let mut cut_vertices: HashMap<(usize, usize), usize> = HashMap::new();

    let mut coplanar_dropped = 0usize;
    for face in mesh.faces() {
        let d = [dist[face[0]], dist[face[1]], dist[face[2]]];
        if d.iter().all(|&x| x == 0.0) {
            let [p0, p1, p2] = [vertices[face[0]], vertices[face[1]], vertices[face[2]]];
            if (p1 - p0).cross(&(p2 - p0)).dot(&normal) < 0.0 {
                faces.push(*face);
            } else {
                coplanar_dropped += 1;
            }
            continue;
        }
        if d.iter().all(|&x| x >= 0.0) {
            faces.push(*face);
            continue;
        }
        if d.iter().all(|&x| x <= 0.0) {
            continue;
        }

        // Sutherland-Hodgman against a single plane: at most four vertices.
        let mut polygon: Vec<usize> = Vec::with_capacity(4);
        for k in 0..3 {
            let (a, b) = (face[k], face[(k + 1) % 3]);
            let (da, db) = (d[k], d[(k + 1) % 3]);
            if da >= 0.0 {
                polygon.push(a);
            }
            if da * db < 0.0 {
                let key = if a < b { (a, b) } else { (b, a) };
                let idx = *cut_vertices.entry(key).or_insert_with(|| {
                    let (p, q) = key;
                    let t = dist[p] / (dist[p] - dist[q]);
                    let point = vertices[p] + (vertices[q] - vertices[p]) * t;
                    vertices.push(point);
                    vertices.len() - 1
                });
                polygon.push(idx);
            }
        }

        for i in 1..polygon.len().saturating_sub(1) {
            faces.push([polygon[0], polygon[i], polygon[i + 1]]);
        }
    }

    if faces.is_empty() {
        log::warn!("Slice removed every face");
        return None;
    }

    log::debug!(
        "Slice kept {} of {} faces, {} cut vertices, {} in-plane faces dropped",
        faces.len(),
        mesh.num_faces(),
        cut_vertices.len(),
        coplanar_dropped
    );

    if cap {
        let original = mesh.num_vertices();
        let on_plane = |v: usize| v >= original || dist[v] == 0.0;
        let caps = cap_faces(&vertices, &faces, on_plane, &normal);
        log::debug!("Cap added {} faces", caps.len());
        faces.extend(caps);
    }

    let mut sliced = TriMesh { vertices, faces };
    sliced.remove_unreferenced_vertices();
    Some(sliced)
}

/// Snap distance for `mesh`: a few f32 steps at its largest coordinate plus
/// the weld tolerance.
fn snap_distance(mesh: &TriMesh) -> f64 {
    let extent = mesh
        .vertices()
        .iter()
        .flat_map(|p| p.coords.iter().copied())
        .fold(1.0_f64, |m, c| m.max(c.abs()));
    PLANE_SNAP_STEPS * (f64::from(f32::EPSILON) * extent + MERGE_TOLERANCE)
}

/// Triangles closing every in-plane boundary loop.
fn cap_faces<F>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
    on_plane: F,
    normal: &Vector3<f64>,
) -> Vec<[usize; 3]>
where
    F: Fn(usize) -> bool,
{
    let topo = EdgeTopology::build(faces);
    let loops = trace_loops(
        topo.boundary_edges()
            .iter()
            .filter(|&&(a, b)| on_plane(a) && on_plane(b))
            .map(|&(a, b)| (b, a)),
    );
    if loops.is_empty() {
        return Vec::new();
    }

    // A cap on an outward-facing mesh faces away from the kept side. The
    // largest loop is always an outer boundary, which fixes the sign for
    // inward-facing input too.
    let mut cap_normal = -normal;
    let areas: Vec<f64> = loops
        .iter()
        .map(|l| signed_area(vertices, l, &cap_normal))
        .collect();
    let largest = areas
        .iter()
        .copied()
        .fold(0.0_f64, |best, a| if a.abs() > best.abs() { a } else { best });
    if largest < 0.0 {
        cap_normal = -cap_normal;
    }
    let sign = largest.signum();

    let mut outers: Vec<(Vec<usize>, f64, Vec<Vec<usize>>)> = Vec::new();
    let mut holes = Vec::new();
    for (l, area) in loops.into_iter().zip(areas) {
        let area = area * sign;
        if area > 0.0 {
            outers.push((l, area, Vec::new()));
        } else if area < 0.0 {
            holes.push(l);
        }
    }

    let mut triangles = Vec::new();
    for hole in holes {
        let inside = vertices[hole[0]];
        let container = outers
            .iter_mut()
            .filter(|(outer, _, _)| contains_point(vertices, outer, &inside, &cap_normal))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        match container {
            Some((_, _, nested)) => nested.push(hole),
            None => triangles.extend(triangulate_loop(vertices, &hole)),
        }
    }

    for (outer, _, nested) in &outers {
        triangles.extend(triangulate_with_holes(vertices, outer, nested, &cap_normal));
    }

    triangles.retain(|f| f[0] != f[1] && f[1] != f[2] && f[0] != f[2]);
    triangles
}
