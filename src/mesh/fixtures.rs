//! Procedural meshes shared by the unit tests.

use std::collections::HashMap;
use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use super::TriMesh;

const CUBE_FACES: [[usize; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2], // bottom
    [4, 5, 6],
    [4, 6, 7], // top
    [0, 1, 5],
    [0, 5, 4], // front
    [3, 7, 6],
    [3, 6, 2], // back
    [0, 4, 7],
    [0, 7, 3], // left
    [1, 2, 6],
    [1, 6, 5], // right
];

/// Axis-aligned box from the origin to `dims`, 8 vertices and 12 outward faces.
pub fn box_mesh(dims: Vector3<f64>) -> TriMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(dims.x, 0.0, 0.0),
        Point3::new(dims.x, dims.y, 0.0),
        Point3::new(0.0, dims.y, 0.0),
        Point3::new(0.0, 0.0, dims.z),
        Point3::new(dims.x, 0.0, dims.z),
        Point3::new(dims.x, dims.y, dims.z),
        Point3::new(0.0, dims.y, dims.z),
    ];
    TriMesh::from_triangles(vertices, CUBE_FACES.to_vec()).unwrap()
}

/// The unit cube `[0, 1]^3`.
pub fn unit_cube() -> TriMesh {
    box_mesh(Vector3::new(1.0, 1.0, 1.0))
}

/// The unit cube with its top face removed.
pub fn open_box() -> TriMesh {
    let mut cube = unit_cube();
    cube.faces.drain(2..4);
    cube
}

/// Flat `n x n` grid of unit squares in the z = 0 plane.
pub fn flat_grid(n: usize) -> TriMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64, j as f64, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    TriMesh::from_triangles(vertices, faces).unwrap()
}

/// `flat_grid(n)` folded into a V along the line `x = n / 2`, with unit
/// slope on both flanks.
pub fn crease_grid(n: usize) -> TriMesh {
    let mut mesh = flat_grid(n);
    let mid = (n / 2) as f64;
    for p in &mut mesh.vertices {
        p.z = (p.x - mid).abs();
    }
    mesh
}

/// Unit icosphere with the given number of subdivisions.
pub fn icosphere(subdivisions: usize) -> TriMesh {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut vertices: Vec<Point3<f64>> = [
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ]
    .iter()
    .map(|c| Point3::from(Vector3::new(c[0], c[1], c[2]).normalize()))
    .collect();

    let mut faces = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(usize, usize), usize> = HashMap::new();
        let mut next = Vec::with_capacity(faces.len() * 4);

        for face in &faces {
            let mut mids = [0usize; 3];
            for i in 0..3 {
                let (a, b) = (face[i], face[(i + 1) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                mids[i] = *midpoints.entry(key).or_insert_with(|| {
                    let mid = (vertices[a].coords + vertices[b].coords) / 2.0;
                    vertices.push(Point3::from(mid.normalize()));
                    vertices.len() - 1
                });
            }

            next.push([face[0], mids[0], mids[2]]);
            next.push([face[1], mids[1], mids[0]]);
            next.push([face[2], mids[2], mids[1]]);
            next.push([mids[0], mids[1], mids[2]]);
        }

        faces = next;
    }

    TriMesh::from_triangles(vertices, faces).unwrap()
}

/// Closed torus around the Z axis, `major x minor` quads split in two.
pub fn torus(major: usize, minor: usize) -> TriMesh {
    let (big_r, small_r) = (2.0, 0.5);
    let mut vertices = Vec::with_capacity(major * minor);
    for i in 0..major {
        let u = 2.0 * PI * i as f64 / major as f64;
        for j in 0..minor {
            let v = 2.0 * PI * j as f64 / minor as f64;
            let ring = big_r + small_r * v.cos();
            vertices.push(Point3::new(ring * u.cos(), ring * u.sin(), small_r * v.sin()));
        }
    }

    let idx = |i: usize, j: usize| (i % major) * minor + (j % minor);
    let mut faces = Vec::with_capacity(major * minor * 2);
    for i in 0..major {
        for j in 0..minor {
            let (a, b, c, d) = (idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1));
            faces.push([a, b, c]);
            faces.push([a, c, d]);
        }
    }

    TriMesh::from_triangles(vertices, faces).unwrap()
}
