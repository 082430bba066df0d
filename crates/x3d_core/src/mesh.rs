//! Mesh geometry representation for imported X3D scenes.
//!
//! A mesh is a vertex list plus a list of faces, where each face is an
//! ordered index list into the vertices. Faces of different sizes can be
//! mixed in one mesh; the [`PrimitiveTypes`] mask records which kinds occur.

use bitflags::bitflags;
use serde::Serialize;
use x3d_math::{Vec2, Vec3, Vec4};

use crate::geometry::{GeometryError, GeometryResult};

bitflags! {
    /// Primitive kinds observed across a mesh's faces.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct PrimitiveTypes: u8 {
        const POINT = 1 << 0;
        const LINE = 1 << 1;
        const TRIANGLE = 1 << 2;
        const POLYGON = 1 << 3;
    }
}

impl PrimitiveTypes {
    /// Classify a face by its index count.
    ///
    /// Returns an empty set for a zero-sized face, which is never committed.
    pub fn for_face_size(size: usize) -> Self {
        match size {
            0 => Self::empty(),
            1 => Self::POINT,
            2 => Self::LINE,
            3 => Self::TRIANGLE,
            _ => Self::POLYGON,
        }
    }
}

/// One face: an ordered index list into the owning mesh's vertices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn primitive_type(&self) -> PrimitiveTypes {
        PrimitiveTypes::for_face_size(self.indices.len())
    }
}

impl From<Vec<u32>> for Face {
    fn from(indices: Vec<u32>) -> Self {
        Self::new(indices)
    }
}

/// A mesh consisting of vertex positions, faces, and optional per-vertex attributes.
#[derive(Clone, Debug, Serialize)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Faces, each indexing into `positions`
    pub faces: Vec<Face>,

    /// Bitwise OR of the primitive kinds present in `faces`
    pub primitive_types: PrimitiveTypes,

    /// Vertex colors, RGBA (one per vertex)
    pub colors: Option<Vec<Vec4>>,

    /// Vertex normals (one per vertex)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Index into the scene's material list
    pub material_index: Option<usize>,
}

impl Mesh {
    /// Create a mesh from positions and faces.
    ///
    /// Every face must be non-empty and only reference existing vertices.
    pub fn new(positions: Vec<Vec3>, faces: Vec<Face>) -> GeometryResult<Self> {
        let vertex_count = positions.len();
        let mut primitive_types = PrimitiveTypes::empty();

        for face in &faces {
            if face.is_empty() {
                return Err(GeometryError::EmptyIndexStream { what: "mesh face" });
            }
            for &index in &face.indices {
                if index as usize >= vertex_count {
                    return Err(GeometryError::IndexOutOfRange {
                        what: "face vertex index",
                        index: i64::from(index),
                        bound: vertex_count,
                    });
                }
            }
            primitive_types |= face.primitive_type();
        }

        Ok(Self {
            positions,
            faces,
            primitive_types,
            colors: None,
            normals: None,
            uvs: None,
            material_index: None,
        })
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of faces in the mesh.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has vertex colors.
    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }
}
