//! Binding of color, normal, and texture-coordinate lists onto mesh vertices.
//!
//! Colors and normals follow X3D's four conventions, picked by the
//! per-vertex flag and whether a secondary index is present:
//!
//! | binding    | no index                        | with index                                    |
//! |------------|---------------------------------|-----------------------------------------------|
//! | per vertex | `values[v]` for vertex `v`      | `values[index[i]]` at vertex `coordIndex[i]`  |
//! | per face   | `values[f]` on every vertex of `f` | `values[index[f]]` on every vertex of `f`  |
//!
//! Vertex slots written more than once keep the last write. Slots never
//! written keep `T::default()`.

use x3d_math::{Vec2, Vec3, Vec4};

use crate::geometry::{decode_faces, GeometryError, GeometryResult, DELIMITER};
use crate::mesh::{Face, Mesh};

/// The face layout attributes are bound against.
#[derive(Clone, Copy, Debug)]
pub struct Topology<'a> {
    pub vertex_count: usize,
    pub faces: &'a [Face],
}

impl<'a> Topology<'a> {
    pub fn new(vertex_count: usize, faces: &'a [Face]) -> Self {
        Self {
            vertex_count,
            faces,
        }
    }

    /// The topology of an existing mesh.
    pub fn of(mesh: &'a Mesh) -> Self {
        Self::new(mesh.vertex_count(), &mesh.faces)
    }
}

/// Whether an attribute list holds one value per vertex or per face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    PerVertex,
    PerFace,
}

impl Binding {
    /// Map an X3D `colorPerVertex`/`normalPerVertex` flag.
    pub fn from_per_vertex(per_vertex: bool) -> Self {
        if per_vertex {
            Self::PerVertex
        } else {
            Self::PerFace
        }
    }
}

/// The attribute being bound; used to label errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Color,
    Normal,
}

impl AttributeKind {
    fn values_label(self) -> &'static str {
        match self {
            Self::Color => "colors",
            Self::Normal => "normals",
        }
    }

    fn index_label(self) -> &'static str {
        match self {
            Self::Color => "color index",
            Self::Normal => "normal index",
        }
    }
}

fn checked_index(value: i32, bound: usize, what: &'static str) -> GeometryResult<usize> {
    usize::try_from(value)
        .ok()
        .filter(|&index| index < bound)
        .ok_or(GeometryError::IndexOutOfRange {
            what,
            index: i64::from(value),
            bound,
        })
}

fn require_at_least(what: &'static str, expected: usize, actual: usize) -> GeometryResult<()> {
    if actual < expected {
        return Err(GeometryError::CountMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Write one value per face onto every vertex slot of that face.
fn replicate_per_face<T: Copy + Default>(
    topology: &Topology,
    face_values: impl Iterator<Item = GeometryResult<T>>,
) -> GeometryResult<Vec<T>> {
    let mut target = vec![T::default(); topology.vertex_count];

    for (face, value) in topology.faces.iter().zip(face_values) {
        let value = value?;
        for &vertex in &face.indices {
            let slot = target
                .get_mut(vertex as usize)
                .ok_or(GeometryError::IndexOutOfRange {
                    what: "face vertex index",
                    index: i64::from(vertex),
                    bound: topology.vertex_count,
                })?;
            *slot = value;
        }
    }

    Ok(target)
}

/// Bind a color or normal list onto a topology.
///
/// `coord_index` is the stream the faces were decoded from; it is only
/// consulted for indexed per-vertex binding. An empty `attribute_index`
/// selects positional correspondence.
pub fn bind_attribute<T: Copy + Default>(
    kind: AttributeKind,
    topology: &Topology,
    binding: Binding,
    coord_index: &[i32],
    attribute_index: &[i32],
    values: &[T],
) -> GeometryResult<Vec<T>> {
    match (binding, attribute_index.is_empty()) {
        (Binding::PerVertex, true) => {
            require_at_least(kind.values_label(), topology.vertex_count, values.len())?;
            Ok(values[..topology.vertex_count].to_vec())
        }
        (Binding::PerVertex, false) => {
            require_at_least(kind.index_label(), coord_index.len(), attribute_index.len())?;

            let mut target = vec![T::default(); topology.vertex_count];
            for (&coord, &attribute) in coord_index.iter().zip(attribute_index) {
                if attribute == DELIMITER {
                    continue;
                }
                let vertex = checked_index(coord, topology.vertex_count, "coordinate index")?;
                let value = checked_index(attribute, values.len(), kind.index_label())?;
                target[vertex] = values[value];
            }
            Ok(target)
        }
        (Binding::PerFace, true) => {
            require_at_least(kind.values_label(), topology.faces.len(), values.len())?;
            replicate_per_face(topology, values.iter().copied().map(Ok))
        }
        (Binding::PerFace, false) => {
            require_at_least(kind.index_label(), topology.faces.len(), attribute_index.len())?;
            replicate_per_face(
                topology,
                attribute_index.iter().map(|&index| {
                    checked_index(index, values.len(), kind.index_label()).map(|i| values[i])
                }),
            )
        }
    }
}

/// Bind colors; see [`bind_attribute`].
pub fn bind_colors(
    topology: &Topology,
    binding: Binding,
    coord_index: &[i32],
    color_index: &[i32],
    colors: &[Vec4],
) -> GeometryResult<Vec<Vec4>> {
    bind_attribute(
        AttributeKind::Color,
        topology,
        binding,
        coord_index,
        color_index,
        colors,
    )
}

/// Bind normals; see [`bind_attribute`].
pub fn bind_normals(
    topology: &Topology,
    binding: Binding,
    coord_index: &[i32],
    normal_index: &[i32],
    normals: &[Vec3],
) -> GeometryResult<Vec<Vec3>> {
    bind_attribute(
        AttributeKind::Normal,
        topology,
        binding,
        coord_index,
        normal_index,
        normals,
    )
}

/// Bind texture coordinates face by face.
///
/// With a `tex_coord_index`, that stream is decoded into faces that must
/// mirror the topology exactly. Without one, each vertex index doubles as
/// its texture-coordinate index.
pub fn bind_tex_coords(
    topology: &Topology,
    tex_coord_index: &[i32],
    tex_coords: &[Vec2],
) -> GeometryResult<Vec<Vec2>> {
    let decoded;
    let index_faces = if tex_coord_index.is_empty() {
        topology.faces
    } else {
        decoded = decode_faces(tex_coord_index).0;
        if decoded.is_empty() {
            return Err(GeometryError::EmptyIndexStream {
                what: "texture coordinate index",
            });
        }
        require_equal("texture coordinate faces", topology.faces.len(), decoded.len())?;
        decoded.as_slice()
    };

    let mut target = vec![Vec2::ZERO; topology.vertex_count];
    for (face, index_face) in topology.faces.iter().zip(index_faces) {
        require_equal("texture coordinate face size", face.len(), index_face.len())?;

        for (&vertex, &tex_coord) in face.indices.iter().zip(&index_face.indices) {
            let vertex_bound = topology.vertex_count;
            let slot = target
                .get_mut(vertex as usize)
                .ok_or(GeometryError::IndexOutOfRange {
                    what: "face vertex index",
                    index: i64::from(vertex),
                    bound: vertex_bound,
                })?;
            *slot = *tex_coords
                .get(tex_coord as usize)
                .ok_or(GeometryError::IndexOutOfRange {
                    what: "texture coordinate index",
                    index: i64::from(tex_coord),
                    bound: tex_coords.len(),
                })?;
        }
    }

    Ok(target)
}

fn require_equal(what: &'static str, expected: usize, actual: usize) -> GeometryResult<()> {
    if expected != actual {
        return Err(GeometryError::CountMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Widen RGB colors to RGBA with an opaque alpha.
pub fn promote_rgb(colors: &[Vec3]) -> Vec<Vec4> {
    colors.iter().map(|c| c.extend(1.0)).collect()
}
