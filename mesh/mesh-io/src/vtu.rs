//! VTK XML unstructured grid (`.vtu`) export and re-import.
//!
//! The volume mesh is written as one ASCII `Piece`:
//!
//! - `Points`: node coordinates (`Float64`, three components)
//! - `Cells`: tetrahedra (VTK type 10) followed by the boundary triangles
//!   (VTK type 5) as `connectivity`, `offsets` and `types`
//! - `CellData/ModelFaceID` (`UInt32`): 0 for tetrahedra, the face ID for
//!   boundary triangles
//! - `CellData/GlobalElementID` and `PointData/GlobalNodeID`: 1-based
//!   running numbers
//!
//! Coordinates are printed with Rust's shortest round-trip formatting, so
//! reading an exported file reproduces the mesh bit for bit.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use mesh_types::{TetMesh, Vertex};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// VTK cell type code for a linear tetrahedron.
pub const VTK_TETRA: u8 = 10;

/// VTK cell type code for a linear triangle.
pub const VTK_TRIANGLE: u8 = 5;

/// Name of the per-cell face tag array.
pub const MODEL_FACE_ID: &str = "ModelFaceID";

/// Save a volume mesh to a `.vtu` file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
///
/// # Example
///
/// ```no_run
/// use mesh_io::{load_vtu, save_vtu};
///
/// let mesh = load_vtu("cylinder-mesh.vtu").unwrap();
/// save_vtu(&mesh, "copy.vtu").unwrap();
/// ```
pub fn save_vtu<P: AsRef<Path>>(mesh: &TetMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_vtu(mesh, BufWriter::new(file))?;
    debug!(
        path = %path.display(),
        nodes = mesh.node_count(),
        tetrahedra = mesh.element_count(),
        triangles = mesh.boundary_faces.len(),
        "wrote VTU"
    );
    Ok(())
}

/// Load a volume mesh from a `.vtu` file written by [`save_vtu`].
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or a parse
/// error for malformed content.
pub fn load_vtu<P: AsRef<Path>>(path: P) -> IoResult<TetMesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| IoError::from_open(e, path))?;
    read_vtu(BufReader::new(file))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>, what: &str) -> IoResult<()> {
    writer
        .write_event(event)
        .map_err(|e| IoError::invalid_content(format!("failed to write {what}: {e}")))
}

fn emit_array<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    vtk_type: &str,
    components: Option<usize>,
    values: &str,
) -> IoResult<()> {
    let mut array = BytesStart::new("DataArray");
    array.push_attribute(("type", vtk_type));
    array.push_attribute(("Name", name));
    if let Some(n) = components {
        array.push_attribute(("NumberOfComponents", n.to_string().as_str()));
    }
    array.push_attribute(("format", "ascii"));
    emit(writer, Event::Start(array), name)?;
    emit(writer, Event::Text(BytesText::new(values)), name)?;
    emit(writer, Event::End(BytesEnd::new("DataArray")), name)
}

fn join<T: ToString>(values: impl Iterator<Item = T>) -> String {
    values.map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
}

/// Write a volume mesh as VTU to any writer.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_vtu<W: Write>(mesh: &TetMesh, writer: W) -> IoResult<()> {
    let cell_count = mesh.tetrahedra.len() + mesh.boundary_faces.len();
    let mut writer = Writer::new_with_indent(writer, b' ', 2);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        "declaration",
    )?;

    let mut root = BytesStart::new("VTKFile");
    root.push_attribute(("type", "UnstructuredGrid"));
    root.push_attribute(("version", "1.0"));
    root.push_attribute(("byte_order", "LittleEndian"));
    emit(&mut writer, Event::Start(root), "VTKFile")?;
    emit(
        &mut writer,
        Event::Start(BytesStart::new("UnstructuredGrid")),
        "UnstructuredGrid",
    )?;

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("NumberOfPoints", mesh.vertices.len().to_string().as_str()));
    piece.push_attribute(("NumberOfCells", cell_count.to_string().as_str()));
    emit(&mut writer, Event::Start(piece), "Piece")?;

    let mut point_data = BytesStart::new("PointData");
    point_data.push_attribute(("Scalars", "GlobalNodeID"));
    emit(&mut writer, Event::Start(point_data), "PointData")?;
    emit_array(
        &mut writer,
        "GlobalNodeID",
        "Int64",
        None,
        &join(1..=mesh.vertices.len()),
    )?;
    emit(&mut writer, Event::End(BytesEnd::new("PointData")), "PointData")?;

    let mut cell_data = BytesStart::new("CellData");
    cell_data.push_attribute(("Scalars", MODEL_FACE_ID));
    emit(&mut writer, Event::Start(cell_data), "CellData")?;
    let face_ids = std::iter::repeat_n(0, mesh.tetrahedra.len()).chain(
        (0..mesh.boundary_faces.len()).map(|i| mesh.boundary_ids.get(i).copied().unwrap_or(0)),
    );
    emit_array(&mut writer, MODEL_FACE_ID, "UInt32", None, &join(face_ids))?;
    emit_array(
        &mut writer,
        "GlobalElementID",
        "Int64",
        None,
        &join(1..=cell_count),
    )?;
    emit(&mut writer, Event::End(BytesEnd::new("CellData")), "CellData")?;

    emit(&mut writer, Event::Start(BytesStart::new("Points")), "Points")?;
    let coords = mesh
        .vertices
        .iter()
        .flat_map(|v| [v.position.x, v.position.y, v.position.z]);
    emit_array(&mut writer, "Points", "Float64", Some(3), &join(coords))?;
    emit(&mut writer, Event::End(BytesEnd::new("Points")), "Points")?;

    emit(&mut writer, Event::Start(BytesStart::new("Cells")), "Cells")?;
    let connectivity = mesh
        .tetrahedra
        .iter()
        .flat_map(|t| t.iter().copied())
        .chain(mesh.boundary_faces.iter().flat_map(|f| f.iter().copied()));
    emit_array(&mut writer, "connectivity", "Int64", None, &join(connectivity))?;
    let offsets = (1..=mesh.tetrahedra.len())
        .map(|i| i * 4)
        .chain((1..=mesh.boundary_faces.len()).map(|i| mesh.tetrahedra.len() * 4 + i * 3));
    emit_array(&mut writer, "offsets", "Int64", None, &join(offsets))?;
    let types = std::iter::repeat_n(VTK_TETRA, mesh.tetrahedra.len())
        .chain(std::iter::repeat_n(VTK_TRIANGLE, mesh.boundary_faces.len()));
    emit_array(&mut writer, "types", "UInt8", None, &join(types))?;
    emit(&mut writer, Event::End(BytesEnd::new("Cells")), "Cells")?;

    emit(&mut writer, Event::End(BytesEnd::new("Piece")), "Piece")?;
    emit(
        &mut writer,
        Event::End(BytesEnd::new("UnstructuredGrid")),
        "UnstructuredGrid",
    )?;
    emit(&mut writer, Event::End(BytesEnd::new("VTKFile")), "VTKFile")?;

    writer.into_inner().flush()?;
    Ok(())
}

/// Raw arrays collected while scanning the XML.
#[derive(Default)]
struct RawGrid {
    declared_points: Option<usize>,
    declared_cells: Option<usize>,
    points: Option<String>,
    connectivity: Option<String>,
    offsets: Option<String>,
    types: Option<String>,
    face_ids: Option<String>,
}

impl RawGrid {
    fn slot(&mut self, section: &[u8], name: &str) -> Option<&mut Option<String>> {
        match (section, name) {
            (b"Points", _) => Some(&mut self.points),
            (b"Cells", "connectivity") => Some(&mut self.connectivity),
            (b"Cells", "offsets") => Some(&mut self.offsets),
            (b"Cells", "types") => Some(&mut self.types),
            (b"CellData", MODEL_FACE_ID) => Some(&mut self.face_ids),
            _ => None,
        }
    }
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> IoResult<Option<String>> {
    for attr in element.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(std::str::from_utf8(&attr.value)?.to_string()));
        }
    }
    Ok(None)
}

fn parse_list<T: FromStr>(text: Option<&str>, name: &str) -> IoResult<Vec<T>>
where
    IoError: From<T::Err>,
{
    let text = text.ok_or_else(|| IoError::MissingArray {
        name: name.to_string(),
    })?;
    text.split_whitespace()
        .map(|token| token.parse::<T>().map_err(IoError::from))
        .collect()
}

fn check_count(what: &'static str, declared: Option<usize>, found: usize) -> IoResult<()> {
    match declared {
        Some(declared) if declared != found => Err(IoError::CountMismatch {
            what,
            declared,
            found,
        }),
        _ => Ok(()),
    }
}

/// Read a volume mesh from VTU content.
///
/// Tetrahedra become [`TetMesh::tetrahedra`]; triangles become boundary
/// faces tagged with their `ModelFaceID` (0 when the array is absent).
///
/// # Errors
///
/// Returns an error for malformed XML, missing arrays, inconsistent counts or
/// cell types other than tetrahedra and triangles.
pub fn read_vtu<R: BufRead>(reader: R) -> IoResult<TetMesh> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut raw = RawGrid::default();
    let mut section: Vec<u8> = Vec::new();
    let mut array: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"Piece" => {
                    raw.declared_points = attribute(e, b"NumberOfPoints")?
                        .map(|v| v.parse())
                        .transpose()?;
                    raw.declared_cells = attribute(e, b"NumberOfCells")?
                        .map(|v| v.parse())
                        .transpose()?;
                }
                name @ (b"Points" | b"Cells" | b"PointData" | b"CellData") => {
                    section = name.to_vec();
                }
                b"DataArray" => {
                    array = attribute(e, b"Name")?;
                    // Empty arrays produce no text event.
                    if let Some(slot) = array.as_deref().and_then(|n| raw.slot(&section, n)) {
                        *slot = Some(String::new());
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.local_name().as_ref() == b"DataArray" => {
                if let Some(name) = attribute(e, b"Name")? {
                    if let Some(slot) = raw.slot(&section, &name) {
                        *slot = Some(String::new());
                    }
                }
            }
            Ok(Event::Text(ref text)) => {
                if let Some(name) = array.as_deref() {
                    let content = std::str::from_utf8(text)?.to_string();
                    if let Some(slot) = raw.slot(&section, name) {
                        *slot = Some(content);
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"DataArray" => array = None,
                b"Points" | b"Cells" | b"PointData" | b"CellData" => section.clear(),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(IoError::invalid_content(format!("XML parse error: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    build_mesh(&raw)
}

fn build_mesh(raw: &RawGrid) -> IoResult<TetMesh> {
    let coords: Vec<f64> = parse_list(raw.points.as_deref(), "Points")?;
    if coords.len() % 3 != 0 {
        return Err(IoError::invalid_content(
            "point coordinate count is not a multiple of 3",
        ));
    }
    let connectivity: Vec<u32> = parse_list(raw.connectivity.as_deref(), "connectivity")?;
    let offsets: Vec<usize> = parse_list(raw.offsets.as_deref(), "offsets")?;
    let types: Vec<u8> = parse_list(raw.types.as_deref(), "types")?;
    let face_ids: Vec<u32> = match raw.face_ids.as_deref() {
        Some(text) => parse_list(Some(text), MODEL_FACE_ID)?,
        None => vec![0; types.len()],
    };

    let mut mesh = TetMesh::new();
    mesh.vertices = coords
        .chunks_exact(3)
        .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
        .collect();
    check_count("point", raw.declared_points, mesh.vertices.len())?;
    check_count("cell", raw.declared_cells, types.len())?;
    check_count("offset", Some(types.len()), offsets.len())?;
    check_count(MODEL_FACE_ID, Some(types.len()), face_ids.len())?;

    let mut start = 0;
    for ((&end, &cell_type), &face_id) in offsets.iter().zip(&types).zip(&face_ids) {
        let nodes = connectivity
            .get(start..end)
            .ok_or_else(|| IoError::invalid_content(format!("cell offset {end} out of range")))?;
        if let Some(&bad) = nodes.iter().find(|&&n| n as usize >= mesh.vertices.len()) {
            return Err(IoError::invalid_content(format!(
                "cell references missing node {bad}"
            )));
        }
        match (cell_type, nodes) {
            (VTK_TETRA, &[a, b, c, d]) => mesh.tetrahedra.push([a, b, c, d]),
            (VTK_TRIANGLE, &[a, b, c]) => {
                mesh.boundary_faces.push([a, b, c]);
                mesh.boundary_ids.push(face_id);
            }
            _ => {
                return Err(IoError::UnsupportedCell {
                    type_id: cell_type,
                    node_count: nodes.len(),
                });
            }
        }
        start = end;
    }

    Ok(mesh)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mesh_types::tet_faces;

    fn two_tet_mesh() -> TetMesh {
        let mut mesh = TetMesh::new();
        mesh.vertices = vec![
            Vertex::from_coords(0.0, 0.0, 0.0),
            Vertex::from_coords(1.0, 0.0, 0.0),
            Vertex::from_coords(0.0, 1.0, 0.0),
            Vertex::from_coords(0.0, 0.0, 1.0),
            Vertex::from_coords(1.0 / 3.0, 0.7, 0.1),
        ];
        mesh.tetrahedra = vec![[0, 1, 2, 3], [1, 2, 3, 4]];
        mesh.boundary_faces = mesh.extract_boundary();
        mesh.boundary_ids = (1..=6).collect();
        mesh
    }

    fn to_string(mesh: &TetMesh) -> String {
        let mut buf = Vec::new();
        write_vtu(mesh, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn writes_expected_arrays() {
        let text = to_string(&two_tet_mesh());
        assert!(text.contains(r#"NumberOfPoints="5""#));
        assert!(text.contains(r#"NumberOfCells="8""#));
        assert!(text.contains(r#"Name="ModelFaceID""#));
        assert!(text.contains("10 10 5 5 5 5 5 5"));
        assert!(text.contains("0 0 1 2 3 4 5 6"));
    }

    #[test]
    fn roundtrip_preserves_counts_and_tags() {
        let mesh = two_tet_mesh();
        let text = to_string(&mesh);
        let loaded = read_vtu(text.as_bytes()).unwrap();

        assert_eq!(loaded.node_count(), mesh.node_count());
        assert_eq!(loaded.element_count(), mesh.element_count());
        assert_eq!(loaded.boundary_faces, mesh.boundary_faces);
        assert_eq!(loaded.boundary_ids, mesh.boundary_ids);
        assert_eq!(loaded.vertices, mesh.vertices);
    }

    #[test]
    fn roundtrip_through_file() {
        let mut mesh = two_tet_mesh();
        mesh.boundary_faces = tet_faces([0, 1, 2, 3]).to_vec();
        mesh.tetrahedra.truncate(1);
        mesh.boundary_ids = vec![3, 1, 1, 2];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tet.vtu");
        save_vtu(&mesh, &path).unwrap();
        let loaded = load_vtu(&path).unwrap();
        assert_eq!(loaded, mesh);
    }

    #[test]
    fn face_ids_use_the_full_unsigned_range() {
        let mut mesh = two_tet_mesh();
        mesh.boundary_ids[0] = u32::MAX;
        mesh.boundary_ids[1] = 3_000_000_000;
        let text = to_string(&mesh);
        assert!(text.contains(r#"type="UInt32" Name="ModelFaceID""#));
        assert!(!text.contains(r#""Int32""#));

        let loaded = read_vtu(text.as_bytes()).unwrap();
        assert_eq!(loaded.boundary_ids, mesh.boundary_ids);
    }

    #[test]
    fn rejects_unknown_cell_type() {
        let text = to_string(&two_tet_mesh()).replace("10 10 5", "12 10 5");
        let err = read_vtu(text.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IoError::UnsupportedCell {
                type_id: 12,
                node_count: 4
            }
        ));
    }

    #[test]
    fn rejects_count_mismatch() {
        let text = to_string(&two_tet_mesh())
            .replace(r#"NumberOfPoints="5""#, r#"NumberOfPoints="6""#);
        let err = read_vtu(text.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::CountMismatch { what: "point", .. }));
    }

    #[test]
    fn missing_points_array() {
        let text = r#"<?xml version="1.0"?><VTKFile type="UnstructuredGrid"><UnstructuredGrid>
            <Piece NumberOfPoints="0" NumberOfCells="0"></Piece></UnstructuredGrid></VTKFile>"#;
        let err = read_vtu(text.as_bytes()).unwrap_err();
        assert!(matches!(err, IoError::MissingArray { .. }));
    }
}
