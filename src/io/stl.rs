//! STL (stereolithography) format support.
//!
//! STL stores each triangle with its own three corners, so loading always
//! welds shared corners back together. Saving writes binary STL with
//! per-face normals.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::TriMesh;

use super::{load_error, weld};

/// Read an STL stream (binary or ASCII), naming `origin` in errors.
pub fn read<R: Read + Seek>(reader: &mut R, origin: &Path) -> Result<TriMesh> {
    let stl = stl_io::read_stl(reader).map_err(|e| load_error(origin, e))?;

    let vertices: Vec<Point3<f64>> = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let faces: Vec<[usize; 3]> = stl.faces.iter().map(|tri| tri.vertices).collect();

    log::debug!(
        "Read {} STL facets from {}",
        faces.len(),
        origin.display()
    );
    weld(origin, &vertices, &faces)
}

/// Load a mesh from an STL file.
///
/// ```no_run
/// let mesh = chisel::io::stl::load("model.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| load_error(path, e))?;
    read(&mut file, path)
}

/// Write a mesh as binary STL.
pub fn write<W: Write>(mesh: &TriMesh, writer: &mut W) -> std::io::Result<()> {
    let triangles: Vec<stl_io::Triangle> = (0..mesh.num_faces())
        .map(|f| {
            let [p0, p1, p2] = mesh.face_positions(f);
            let n = (p1 - p0)
                .cross(&(p2 - p0))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            stl_io::Triangle {
                normal: stl_io::Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(&p0), vertex(&p1), vertex(&p2)],
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.iter())
}

/// Save a mesh to a binary STL file.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    write(mesh, &mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| MeshError::SaveError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

#[inline]
fn vertex(p: &Point3<f64>) -> stl_io::Vertex {
    stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::fixtures::box_mesh;
    use std::io::Cursor;

    #[test]
    fn test_binary_layout() {
        let mesh = box_mesh(Vector3::new(3.0, 2.0, 1.0));
        let mut bytes = Vec::new();
        write(&mesh, &mut bytes).unwrap();

        // 80-byte header, u32 count, 50 bytes per facet.
        assert_eq!(bytes.len(), 84 + 50 * 12);
        assert_eq!(u32::from_le_bytes([bytes[80], bytes[81], bytes[82], bytes[83]]), 12);

        let back = read(&mut Cursor::new(bytes), Path::new("box.stl")).unwrap();
        let dims = back.bounding_box().unwrap().dimensions();
        assert!((dims - Vector3::new(3.0, 2.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_ascii_stl() {
        let text = "solid tri\n\
            facet normal 0 0 1\n\
            outer loop\n\
            vertex 0 0 0\n\
            vertex 1 0 0\n\
            vertex 0 1 0\n\
            endloop\n\
            endfacet\n\
            endsolid tri\n";
        let mesh = read(&mut Cursor::new(text.as_bytes()), Path::new("tri.stl")).unwrap();
        assert_eq!(mesh.num_faces(), 1);
        assert!((mesh.surface_area() - 0.5).abs() < 1e-9);
    }
}
