//! Mesh file I/O.
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | STL | `.stl` | ✓ | ✓ | Binary and ASCII in, binary out |
//! | PLY | `.ply` | ✓ | ✓ | Binary and ASCII in, ASCII out |
//!
//! Both formats go through [`TriMesh::merged`] on load, so coincident vertices
//! are welded, degenerate faces dropped and unreferenced vertices removed
//! before anything else sees the mesh. Any failure while reading becomes
//! [`MeshError::LoadError`].
//!
//! # Usage
//!
//! ```no_run
//! use chisel::io::{load, save};
//!
//! let mesh = load("model.stl").unwrap();
//! save(&mesh, "copy.ply").unwrap();
//! ```
//!
//! Byte streams are sniffed: anything starting with the `ply` magic is read
//! as PLY, everything else as STL.
//!
//! ```
//! use chisel::io::{load_bytes, Format};
//!
//! let bytes = b"ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\n\
//!     property float y\nproperty float z\nelement face 1\n\
//!     property list uchar int vertex_indices\nend_header\n\
//!     0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
//! assert_eq!(Format::sniff(bytes), Format::Ply);
//!
//! let mesh = load_bytes(bytes, None).unwrap();
//! assert_eq!(mesh.num_faces(), 1);
//! ```

pub mod ply;
pub mod stl;

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::error::{MeshError, Result};
use crate::mesh::TriMesh;

/// Path reported in errors for meshes loaded from memory.
pub const MEMORY_SOURCE: &str = "<memory>";

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// STL (stereolithography) format.
    Stl,
    /// PLY (Stanford polygon) format.
    Ply,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "stl" => Some(Format::Stl),
            "ply" => Some(Format::Ply),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Guess the format of an in-memory file from its leading bytes.
    pub fn sniff(bytes: &[u8]) -> Format {
        if bytes.starts_with(b"ply") {
            Format::Ply
        } else {
            Format::Stl
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Stl => "stl",
            Format::Ply => "ply",
        }
    }
}

/// Load a mesh from a file, choosing the format by extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let format = format_for(path)?;
    let file = File::open(path).map_err(|e| load_error(path, e))?;

    let mesh = match format {
        Format::Stl => stl::read(&mut BufReader::new(file), path)?,
        Format::Ply => ply::read(&mut BufReader::new(file), path)?,
    };

    log::info!(
        "Loaded {}: {} vertices, {} faces",
        path.display(),
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Load a mesh from an in-memory file.
///
/// With `format` unset the format is sniffed from the content.
pub fn load_bytes(bytes: &[u8], format: Option<Format>) -> Result<TriMesh> {
    let origin = Path::new(MEMORY_SOURCE);
    let format = format.unwrap_or_else(|| Format::sniff(bytes));
    let mut cursor = Cursor::new(bytes);

    let mesh = match format {
        Format::Stl => stl::read(&mut cursor, origin)?,
        Format::Ply => ply::read(&mut cursor, origin)?,
    };

    log::info!(
        "Loaded {} bytes as {:?}: {} vertices, {} faces",
        bytes.len(),
        format,
        mesh.num_vertices(),
        mesh.num_faces()
    );
    Ok(mesh)
}

/// Save a mesh to a file, choosing the format by extension.
pub fn save<P: AsRef<Path>>(mesh: &TriMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match format_for(path)? {
        Format::Stl => stl::save(mesh, path)?,
        Format::Ply => ply::save(mesh, path)?,
    }
    log::info!("Saved {} faces to {}", mesh.num_faces(), path.display());
    Ok(())
}

fn format_for(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })
}

/// Build a [`MeshError::LoadError`] for `origin`.
pub(crate) fn load_error(origin: &Path, message: impl ToString) -> MeshError {
    MeshError::LoadError {
        path: origin.to_path_buf(),
        message: message.to_string(),
    }
}

/// Weld raw reader output into a mesh, reporting failures against `origin`.
pub(crate) fn weld(
    origin: &Path,
    vertices: &[nalgebra::Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<TriMesh> {
    TriMesh::merged(vertices, faces).map_err(|e| match e {
        MeshError::EmptyMesh => load_error(origin, "no valid triangles"),
        other => load_error(origin, other),
    })
}
