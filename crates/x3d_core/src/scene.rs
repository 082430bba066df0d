//! Scene types produced by an X3D import.
//!
//! The node hierarchy is a tree of [`SceneNode`]s. Meshes, materials, and
//! lights live in flat lists on [`Scene`]; nodes and meshes refer into them
//! by index.

use indexmap::IndexMap;
use serde::Serialize;
use x3d_math::{Mat4, Vec2, Vec3};

use crate::mesh::Mesh;

/// A single metadata value, keeping the type of its source element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum MetadataValue {
    Bool(bool),
    Double(f64),
    Float(f32),
    Integer(i32),
    String(String),
}

/// A node in the output hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneNode {
    /// Node name (the group's `DEF` name, if any)
    pub name: String,

    /// Local transform relative to the parent node
    pub transform: Mat4,

    /// Child nodes
    pub children: Vec<SceneNode>,

    /// Indices into [`Scene::meshes`]
    pub meshes: Vec<usize>,

    /// Metadata entries, in document order
    pub metadata: IndexMap<String, MetadataValue>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            children: Vec::new(),
            meshes: Vec::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Count this node and all of its descendants.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Depth-first search for a node by name.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

/// Texture addressing outside `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextureWrap {
    Wrap,
    Clamp,
}

impl TextureWrap {
    pub fn from_repeat(repeat: bool) -> Self {
        if repeat {
            Self::Wrap
        } else {
            Self::Clamp
        }
    }
}

/// How a texture combines with the base color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextureOp {
    Multiply,
}

/// Projection used to generate texture coordinates for meshes that have none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextureMapping {
    Plane,
    Box,
    Cylinder,
    Sphere,
}

/// A diffuse texture reference.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextureRef {
    pub path: String,
    pub wrap_u: TextureWrap,
    pub wrap_v: TextureWrap,
    pub op: TextureOp,
}

/// 2D transform applied to texture coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UvTransform {
    pub translation: Vec2,
    pub scale: Vec2,
    pub rotation: f32,
}

/// A Phong-style material built from an X3D `Appearance`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Material {
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub emissive_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
    pub shininess_strength: f32,

    /// Opacity (0=transparent, 1=opaque)
    pub opacity: f32,

    pub diffuse_texture: Option<TextureRef>,
    pub uv_transform: Option<UvTransform>,

    /// Set when the material is textured but its mesh has no UVs
    pub texture_mapping: Option<TextureMapping>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::splat(0.2),
            diffuse_color: Vec3::splat(0.8),
            emissive_color: Vec3::ZERO,
            specular_color: Vec3::ZERO,
            shininess: 0.2,
            shininess_strength: 1.0,
            opacity: 1.0,
            diffuse_texture: None,
            uv_transform: None,
            texture_mapping: None,
        }
    }
}

impl Material {
    /// Check if this material uses a texture.
    pub fn has_texture(&self) -> bool {
        self.diffuse_texture.is_some()
    }

    /// Check if this material is emissive.
    pub fn is_emissive(&self) -> bool {
        self.emissive_color.length_squared() > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
}

/// A light in world space.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,

    /// World position (point and spot lights)
    pub position: Vec3,

    /// World direction (directional and spot lights)
    pub direction: Vec3,

    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,

    /// Spot cone angles in radians
    pub angle_inner_cone: f32,
    pub angle_outer_cone: f32,
}

/// A complete imported scene.
#[derive(Clone, Debug, Serialize)]
pub struct Scene {
    /// Scene name (from import options)
    pub name: String,

    pub root: SceneNode,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Total faces across all meshes.
    pub fn total_face_count(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }
}
