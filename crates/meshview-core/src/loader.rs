//! Wavefront OBJ loader
//!
//! Reads vertices, vertex normals and triangular faces. Everything else in the
//! format (texture coordinates, groups, materials) is skipped.

use std::path::Path;

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map, map_res, opt, rest},
    multi::separated_list1,
    number::complete::float,
    sequence::{pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::LoadError;
use crate::math::{vec3, Snap, Vec3};

/// A triangle with its corner positions and, when the face referenced them,
/// its corner normals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [Vec3; 3],
    pub normals: Option<[Vec3; 3]>,
}

impl Triangle {
    pub fn centroid(&self) -> Vec3 {
        (self.positions[0] + self.positions[1] + self.positions[2]) / 3.0
    }

    /// Unit normal from the winding order, zero for degenerate triangles.
    pub fn face_normal(&self) -> Vec3 {
        let [a, b, c] = self.positions;
        (b - a).cross(c - a).normalize_or_zero()
    }
}

/// Result of a successful load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedMesh {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub faces: Vec<Triangle>,
    /// Mean of all vertex positions.
    pub pivot: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Corner {
    vertex: u32,
    normal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
enum Record {
    Vertex(Vec3),
    Normal(Vec3),
    Face(Vec<Corner>),
    Skip,
}

/// Reads and parses an OBJ file from disk.
pub fn load(path: impl AsRef<Path>) -> Result<LoadedMesh, LoadError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj(&source)?;
    tracing::info!(
        path = %path.display(),
        vertices = mesh.vertices.len(),
        faces = mesh.faces.len(),
        "Loaded mesh"
    );
    Ok(mesh)
}

/// Parses OBJ text.
pub fn parse_obj(source: &str) -> Result<LoadedMesh, LoadError> {
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut faces = Vec::new();

    for (i, raw) in source.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let (_, record) = all_consuming(record)(line).map_err(|_| LoadError::Syntax {
            line: line_no,
            content: line.to_string(),
        })?;

        match record {
            Record::Vertex(v) => vertices.push(v),
            Record::Normal(n) => normals.push(n),
            Record::Face(corners) => faces.push((line_no, corners)),
            Record::Skip => {}
        }
    }

    if vertices.is_empty() {
        return Err(LoadError::EmptyMesh);
    }

    // Faces may reference vertices declared after them, so resolve at the end.
    let faces = faces
        .into_iter()
        .map(|(line, corners)| resolve_face(line, &corners, &vertices, &normals))
        .collect::<Result<Vec<_>, _>>()?;

    let sum: Vec3 = vertices.iter().copied().sum();
    let pivot = (sum / vertices.len() as f32).snap();

    Ok(LoadedMesh {
        vertices,
        normals,
        faces,
        pivot,
    })
}

fn lookup(line: usize, index: u32, list: &[Vec3]) -> Result<Vec3, LoadError> {
    (index as usize)
        .checked_sub(1)
        .and_then(|i| list.get(i))
        .copied()
        .ok_or(LoadError::IndexOutOfRange {
            line,
            index,
            len: list.len(),
        })
}

fn resolve_face(
    line: usize,
    corners: &[Corner],
    vertices: &[Vec3],
    normals: &[Vec3],
) -> Result<Triangle, LoadError> {
    let [a, b, c] = corners else {
        return Err(LoadError::NonTriangularFace {
            line,
            corners: corners.len(),
        });
    };

    let positions = [
        lookup(line, a.vertex, vertices)?,
        lookup(line, b.vertex, vertices)?,
        lookup(line, c.vertex, vertices)?,
    ];

    let normals = match (a.normal, b.normal, c.normal) {
        (Some(na), Some(nb), Some(nc)) => Some([
            lookup(line, na, normals)?,
            lookup(line, nb, normals)?,
            lookup(line, nc, normals)?,
        ]),
        _ => None,
    };

    Ok(Triangle { positions, normals })
}

// ============================================================================
// Record parsers
// ============================================================================

fn record(input: &str) -> IResult<&str, Record> {
    alt((comment, normal, vertex, face, other))(input)
}

fn comment(input: &str) -> IResult<&str, Record> {
    map(preceded(char('#'), rest), |_| Record::Skip)(input)
}

fn triple(input: &str) -> IResult<&str, Vec3> {
    map(
        tuple((
            preceded(space1, float),
            preceded(space1, float),
            preceded(space1, float),
        )),
        |(x, y, z)| vec3(x, y, z),
    )(input)
}

fn vertex(input: &str) -> IResult<&str, Record> {
    // Trailing weight (`v x y z w`) is accepted and ignored.
    map(
        terminated(preceded(tag("v"), triple), opt(preceded(space1, float))),
        Record::Vertex,
    )(input)
}

fn normal(input: &str) -> IResult<&str, Record> {
    map(preceded(tag("vn"), triple), Record::Normal)(input)
}

fn index(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

/// `v`, `v/t`, `v//n` or `v/t/n`
fn corner(input: &str) -> IResult<&str, Corner> {
    let (input, vertex) = index(input)?;
    let (input, tail) = opt(preceded(
        char('/'),
        pair(opt(index), opt(preceded(char('/'), opt(index)))),
    ))(input)?;
    let normal = tail.and_then(|(_, n)| n.flatten());
    Ok((input, Corner { vertex, normal }))
}

fn face(input: &str) -> IResult<&str, Record> {
    map(
        preceded(pair(tag("f"), space1), separated_list1(space1, corner)),
        Record::Face,
    )(input)
}

fn other(input: &str) -> IResult<&str, Record> {
    let keyword = alt((
        tag("vt"),
        tag("vp"),
        tag("o"),
        tag("g"),
        tag("s"),
        tag("l"),
        tag("usemtl"),
        tag("mtllib"),
    ));
    map(
        pair(keyword, alt((preceded(space1, rest), space0))),
        |_| Record::Skip,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
# a single triangle
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";

    #[test]
    fn test_parse_triangle_with_normals() {
        let mesh = parse_obj(TRIANGLE).unwrap();
        assert_eq!(mesh.vertices.len(), 3);
        assert_eq!(mesh.normals, vec![Vec3::Z]);
        assert_eq!(mesh.faces.len(), 1);
        assert_eq!(mesh.faces[0].normals, Some([Vec3::Z; 3]));
        assert!((mesh.pivot - Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_corner_forms() {
        assert_eq!(corner("4").unwrap().1, Corner { vertex: 4, normal: None });
        assert_eq!(corner("4/2").unwrap().1, Corner { vertex: 4, normal: None });
        assert_eq!(corner("4//7").unwrap().1, Corner { vertex: 4, normal: Some(7) });
        assert_eq!(corner("4/2/7").unwrap().1, Corner { vertex: 4, normal: Some(7) });
    }

    #[test]
    fn test_plain_faces_have_no_normals() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.faces[0].normals, None);
        assert_eq!(mesh.faces[0].face_normal(), Vec3::Z);
    }

    #[test]
    fn test_ignored_records() {
        let src = "mtllib cube.mtl\no Cube\nv 0 0 0\nvt 0.5 0.5\ns off\nusemtl Material\ng\n";
        let mesh = parse_obj(src).unwrap();
        assert_eq!(mesh.vertices.len(), 1);
        assert!(mesh.faces.is_empty());
    }

    #[test]
    fn test_scientific_notation() {
        let mesh = parse_obj("v 1e-3 -2.5E1 +3\n").unwrap();
        assert!((mesh.vertices[0] - Vec3::new(0.001, -25.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn test_quad_is_rejected() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        match parse_obj(src) {
            Err(LoadError::NonTriangularFace { line, corners }) => {
                assert_eq!(line, 5);
                assert_eq!(corners, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n";
        assert!(matches!(
            parse_obj(src),
            Err(LoadError::IndexOutOfRange { line: 4, index: 4, len: 3 })
        ));
        let src = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n";
        assert!(matches!(parse_obj(src), Err(LoadError::IndexOutOfRange { index: 0, .. })));
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let src = "v 0 0 0\nv 1 zero 0\n";
        match parse_obj(src) {
            Err(LoadError::Syntax { line, .. }) => assert_eq!(line, 2),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_mesh() {
        assert!(matches!(parse_obj("# nothing\n\n"), Err(LoadError::EmptyMesh)));
    }

    #[test]
    fn test_missing_file() {
        let err = load("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_cube_fixture() {
        let mesh = parse_obj(include_str!("../tests/fixtures/cube.obj")).unwrap();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.faces.len(), 12);
        assert!(mesh.pivot.length() < 1e-6);
    }
}
