//! STL (Stereolithography) surface import.
//!
//! Supports both ASCII and binary STL. STL stores every triangle with its
//! own three corners, so the loaded mesh is an unwelded triangle soup; the
//! surface importer welds it before validation.
//!
//! # Format Detection
//!
//! A file is binary when its size matches `84 + 50 * n` for the triangle
//! count `n` stored after the 80-byte header, or when it does not start with
//! `solid`. Binary files whose header happens to start with `solid` are
//! therefore still read as binary.
//!
//! # Binary Layout
//!
//! ```text
//! UINT8[80]    – Header (ignored)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored, recomputed from winding)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count
//! end
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Vector3, Vertex};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL.
const TRIANGLE_SIZE: usize = 50;

/// Load a surface from an STL file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or a parse
/// error if the content is not valid STL.
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_stl;
///
/// let soup = load_stl("cylinder.stl").unwrap();
/// println!("Loaded {} triangles", soup.faces.len());
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<IndexedMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| IoError::from_open(e, path))?;
    let mesh = parse_stl(&bytes)?;
    debug!(
        path = %path.display(),
        triangles = mesh.faces.len(),
        "loaded STL"
    );
    Ok(mesh)
}

/// Parse STL content held in memory.
///
/// # Errors
///
/// Returns an error if the content is neither valid ASCII nor valid binary
/// STL.
pub fn parse_stl(bytes: &[u8]) -> IoResult<IndexedMesh> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    if is_binary(bytes) {
        parse_binary(bytes)
    } else {
        parse_ascii(std::str::from_utf8(bytes)?)
    }
}

fn declared_triangles(bytes: &[u8]) -> Option<u32> {
    let count = bytes.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]))
}

fn is_binary(bytes: &[u8]) -> bool {
    if let Some(n) = declared_triangles(bytes) {
        if HEADER_SIZE + 4 + n as usize * TRIANGLE_SIZE == bytes.len() {
            return true;
        }
    }
    !bytes.trim_ascii_start().starts_with(b"solid")
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32; record counts come from a u32 field
fn parse_binary(bytes: &[u8]) -> IoResult<IndexedMesh> {
    let declared = declared_triangles(bytes)
        .ok_or_else(|| IoError::invalid_content("binary STL shorter than its header"))?;

    let records = &bytes[HEADER_SIZE + 4..];
    let available = (records.len() / TRIANGLE_SIZE) as u32;
    if available < declared {
        return Err(IoError::InvalidFaceCount {
            expected: declared,
            got: available,
        });
    }

    let mut mesh = IndexedMesh::with_capacity(declared as usize * 3, declared as usize);
    for record in records.chunks_exact(TRIANGLE_SIZE).take(declared as usize) {
        let base = mesh.vertices.len() as u32;
        // Bytes 0..12 hold the stored normal.
        for corner in 0..3 {
            let start = 12 + corner * 12;
            mesh.vertices.push(read_vertex(&record[start..start + 12]));
        }
        mesh.faces.push([base, base + 1, base + 2]);
    }
    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> Vertex {
    let f = |i: usize| f32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
    Vertex::from_coords(f64::from(f(0)), f64::from(f(4)), f64::from(f(8)))
}

#[allow(clippy::cast_possible_truncation)]
// Truncation: mesh indices are u32
fn parse_ascii(text: &str) -> IoResult<IndexedMesh> {
    let mut mesh = IndexedMesh::new();
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);
    let mut tokens = text.split_whitespace();

    while let Some(token) = tokens.next() {
        match token.to_ascii_lowercase().as_str() {
            "facet" => corners.clear(),
            "vertex" => {
                let mut coord = [0.0; 3];
                for c in &mut coord {
                    let value = tokens
                        .next()
                        .ok_or_else(|| IoError::invalid_content("truncated vertex line"))?;
                    *c = value.parse()?;
                }
                corners.push(Vertex::from(coord));
            }
            "endfacet" => {
                if corners.len() != 3 {
                    return Err(IoError::invalid_content(format!(
                        "facet {} has {} vertices",
                        mesh.faces.len(),
                        corners.len()
                    )));
                }
                let base = mesh.vertices.len() as u32;
                mesh.vertices.append(&mut corners);
                mesh.faces.push([base, base + 1, base + 2]);
            }
            "endsolid" => break,
            _ => {}
        }
    }
    Ok(mesh)
}

/// Save a surface to an STL file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_stl<P: AsRef<Path>>(mesh: &IndexedMesh, path: P, binary: bool) -> IoResult<()> {
    let file = File::create(path)?;
    write_stl(mesh, BufWriter::new(file), binary)
}

/// Write a surface as STL to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_stl<W: Write>(mesh: &IndexedMesh, mut writer: W, binary: bool) -> IoResult<()> {
    let facets = mesh.faces.iter().map(|&[a, b, c]| {
        let p = |i: u32| mesh.vertices[i as usize].position;
        let (v0, v1, v2) = (p(a), p(b), p(c));
        let n = (v1 - v0).cross(&(v2 - v0));
        let len = n.norm();
        let n = if len > f64::EPSILON { n / len } else { Vector3::zeros() };
        [n, v0.coords, v1.coords, v2.coords]
    });

    if binary {
        let mut header = [b' '; HEADER_SIZE];
        let text = b"binary STL written by mesh-io";
        header[..text.len()].copy_from_slice(text);
        writer.write_all(&header)?;
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: face counts are limited to u32 by the format
        writer.write_all(&(mesh.faces.len() as u32).to_le_bytes())?;

        for facet in facets {
            for v in facet {
                for c in v.iter() {
                    #[allow(clippy::cast_possible_truncation)]
                    // Truncation: binary STL stores f32
                    writer.write_all(&(*c as f32).to_le_bytes())?;
                }
            }
            writer.write_all(&0u16.to_le_bytes())?;
        }
    } else {
        writeln!(writer, "solid mesh")?;
        for [n, v0, v1, v2] in facets {
            writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
            writeln!(writer, "    outer loop")?;
            for v in [v0, v1, v2] {
                writeln!(writer, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
            }
            writeln!(writer, "    endloop")?;
            writeln!(writer, "  endfacet")?;
        }
        writeln!(writer, "endsolid mesh")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use mesh_types::{MeshTopology, unit_cube};

    #[test]
    fn roundtrip_binary() {
        let cube = unit_cube();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.stl");
        save_stl(&cube, &path, true).unwrap();

        let loaded = load_stl(&path).unwrap();
        assert_eq!(loaded.face_count(), 12);
        assert_eq!(loaded.vertex_count(), 36);
        assert!((loaded.signed_volume() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn roundtrip_ascii_keeps_full_precision() {
        let mut cube = unit_cube();
        cube.vertices[6].position.x = 1.0 + 1e-12;
        let mut buf = Vec::new();
        write_stl(&cube, &mut buf, false).unwrap();

        let loaded = parse_stl(&buf).unwrap();
        assert_eq!(loaded.face_count(), 12);
        assert!(
            loaded
                .vertices
                .iter()
                .any(|v| v.position.x == 1.0 + 1e-12)
        );
    }

    #[test]
    fn binary_with_solid_header_is_binary() {
        let cube = unit_cube();
        let mut buf = Vec::new();
        write_stl(&cube, &mut buf, true).unwrap();
        buf[..5].copy_from_slice(b"solid");

        let loaded = parse_stl(&buf).unwrap();
        assert_eq!(loaded.face_count(), 12);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let cube = unit_cube();
        let mut buf = Vec::new();
        write_stl(&cube, &mut buf, true).unwrap();
        buf.truncate(buf.len() - 60);

        let err = parse_stl(&buf).unwrap_err();
        assert!(matches!(
            err,
            IoError::InvalidFaceCount {
                expected: 12,
                got: 10
            }
        ));
    }

    #[test]
    fn ascii_facet_with_missing_vertex() {
        let text = b"solid t
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid t";
        assert!(matches!(
            parse_stl(text),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn missing_file() {
        let err = load_stl("definitely_missing_4821.stl").unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }
}
