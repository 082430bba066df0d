//! Node elements stored in the scene graph arena.
//!
//! Each element has a [`NodeKind`] tag and a matching [`NodeData`] payload.
//! Payloads keep the declarative X3D field values; nothing is expanded or
//! validated until materialization.

use std::fmt;

use x3d_math::{Mat4, Vec2, Vec3, Vec4};

/// Arena index of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A child placement: either the node was created in this scope (owned) or
/// it was placed here by a `USE` reference (not owned).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Child {
    Owned(NodeId),
    Used(NodeId),
}

impl Child {
    pub fn id(self) -> NodeId {
        match self {
            Child::Owned(id) | Child::Used(id) => id,
        }
    }

    pub fn is_owned(self) -> bool {
        matches!(self, Child::Owned(_))
    }
}

/// Node kinds, named after the X3D elements that create them.
///
/// `Group` covers every grouping element (`Group`, `StaticGroup`,
/// `Transform`, `Switch`) so that a `USE` of any of them matches the others.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    // Metadata
    MetadataBoolean,
    MetadataDouble,
    MetadataFloat,
    MetadataInteger,
    MetadataSet,
    MetadataString,
    // Geometry 2D
    Arc2D,
    ArcClose2D,
    Circle2D,
    Disk2D,
    Polyline2D,
    Polypoint2D,
    Rectangle2D,
    TriangleSet2D,
    // Geometry 3D
    Box,
    Cone,
    Cylinder,
    Sphere,
    ElevationGrid,
    Extrusion,
    IndexedFaceSet,
    IndexedLineSet,
    IndexedTriangleSet,
    IndexedTriangleFanSet,
    IndexedTriangleStripSet,
    LineSet,
    PointSet,
    TriangleSet,
    TriangleFanSet,
    TriangleStripSet,
    // Geometry sources
    Color,
    ColorRgba,
    Coordinate,
    Normal,
    TextureCoordinate,
    // Shape
    Shape,
    Appearance,
    Material,
    ImageTexture,
    TextureTransform,
    // Lighting
    DirectionalLight,
    PointLight,
    SpotLight,
}

impl NodeKind {
    /// Geometry kinds whose vertices come from a shape generator.
    pub const GENERATED: [NodeKind; 14] = [
        NodeKind::Arc2D,
        NodeKind::ArcClose2D,
        NodeKind::Circle2D,
        NodeKind::Disk2D,
        NodeKind::Polyline2D,
        NodeKind::Polypoint2D,
        NodeKind::Rectangle2D,
        NodeKind::TriangleSet2D,
        NodeKind::Box,
        NodeKind::Cone,
        NodeKind::Cylinder,
        NodeKind::Sphere,
        NodeKind::ElevationGrid,
        NodeKind::Extrusion,
    ];

    /// The X3D element name.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::MetadataBoolean => "MetadataBoolean",
            NodeKind::MetadataDouble => "MetadataDouble",
            NodeKind::MetadataFloat => "MetadataFloat",
            NodeKind::MetadataInteger => "MetadataInteger",
            NodeKind::MetadataSet => "MetadataSet",
            NodeKind::MetadataString => "MetadataString",
            NodeKind::Arc2D => "Arc2D",
            NodeKind::ArcClose2D => "ArcClose2D",
            NodeKind::Circle2D => "Circle2D",
            NodeKind::Disk2D => "Disk2D",
            NodeKind::Polyline2D => "Polyline2D",
            NodeKind::Polypoint2D => "Polypoint2D",
            NodeKind::Rectangle2D => "Rectangle2D",
            NodeKind::TriangleSet2D => "TriangleSet2D",
            NodeKind::Box => "Box",
            NodeKind::Cone => "Cone",
            NodeKind::Cylinder => "Cylinder",
            NodeKind::Sphere => "Sphere",
            NodeKind::ElevationGrid => "ElevationGrid",
            NodeKind::Extrusion => "Extrusion",
            NodeKind::IndexedFaceSet => "IndexedFaceSet",
            NodeKind::IndexedLineSet => "IndexedLineSet",
            NodeKind::IndexedTriangleSet => "IndexedTriangleSet",
            NodeKind::IndexedTriangleFanSet => "IndexedTriangleFanSet",
            NodeKind::IndexedTriangleStripSet => "IndexedTriangleStripSet",
            NodeKind::LineSet => "LineSet",
            NodeKind::PointSet => "PointSet",
            NodeKind::TriangleSet => "TriangleSet",
            NodeKind::TriangleFanSet => "TriangleFanSet",
            NodeKind::TriangleStripSet => "TriangleStripSet",
            NodeKind::Color => "Color",
            NodeKind::ColorRgba => "ColorRGBA",
            NodeKind::Coordinate => "Coordinate",
            NodeKind::Normal => "Normal",
            NodeKind::TextureCoordinate => "TextureCoordinate",
            NodeKind::Shape => "Shape",
            NodeKind::Appearance => "Appearance",
            NodeKind::Material => "Material",
            NodeKind::ImageTexture => "ImageTexture",
            NodeKind::TextureTransform => "TextureTransform",
            NodeKind::DirectionalLight => "DirectionalLight",
            NodeKind::PointLight => "PointLight",
            NodeKind::SpotLight => "SpotLight",
        }
    }

    /// Map an X3D element name to the kind it creates.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "Group" | "StaticGroup" | "Transform" | "Switch" => NodeKind::Group,
            "MetadataBoolean" => NodeKind::MetadataBoolean,
            "MetadataDouble" => NodeKind::MetadataDouble,
            "MetadataFloat" => NodeKind::MetadataFloat,
            "MetadataInteger" => NodeKind::MetadataInteger,
            "MetadataSet" => NodeKind::MetadataSet,
            "MetadataString" => NodeKind::MetadataString,
            "Arc2D" => NodeKind::Arc2D,
            "ArcClose2D" => NodeKind::ArcClose2D,
            "Circle2D" => NodeKind::Circle2D,
            "Disk2D" => NodeKind::Disk2D,
            "Polyline2D" => NodeKind::Polyline2D,
            "Polypoint2D" => NodeKind::Polypoint2D,
            "Rectangle2D" => NodeKind::Rectangle2D,
            "TriangleSet2D" => NodeKind::TriangleSet2D,
            "Box" => NodeKind::Box,
            "Cone" => NodeKind::Cone,
            "Cylinder" => NodeKind::Cylinder,
            "Sphere" => NodeKind::Sphere,
            "ElevationGrid" => NodeKind::ElevationGrid,
            "Extrusion" => NodeKind::Extrusion,
            "IndexedFaceSet" => NodeKind::IndexedFaceSet,
            "IndexedLineSet" => NodeKind::IndexedLineSet,
            "IndexedTriangleSet" => NodeKind::IndexedTriangleSet,
            "IndexedTriangleFanSet" => NodeKind::IndexedTriangleFanSet,
            "IndexedTriangleStripSet" => NodeKind::IndexedTriangleStripSet,
            "LineSet" => NodeKind::LineSet,
            "PointSet" => NodeKind::PointSet,
            "TriangleSet" => NodeKind::TriangleSet,
            "TriangleFanSet" => NodeKind::TriangleFanSet,
            "TriangleStripSet" => NodeKind::TriangleStripSet,
            "Color" => NodeKind::Color,
            "ColorRGBA" => NodeKind::ColorRgba,
            "Coordinate" => NodeKind::Coordinate,
            "Normal" => NodeKind::Normal,
            "TextureCoordinate" => NodeKind::TextureCoordinate,
            "Shape" => NodeKind::Shape,
            "Appearance" => NodeKind::Appearance,
            "Material" => NodeKind::Material,
            "ImageTexture" => NodeKind::ImageTexture,
            "TextureTransform" => NodeKind::TextureTransform,
            "DirectionalLight" => NodeKind::DirectionalLight,
            "PointLight" => NodeKind::PointLight,
            "SpotLight" => NodeKind::SpotLight,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_geometry(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            IndexedFaceSet
                | IndexedLineSet
                | IndexedTriangleSet
                | IndexedTriangleFanSet
                | IndexedTriangleStripSet
                | LineSet
                | PointSet
                | TriangleSet
                | TriangleFanSet
                | TriangleStripSet
        ) || Self::GENERATED.contains(&self)
    }

    pub fn is_metadata(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            MetadataBoolean
                | MetadataDouble
                | MetadataFloat
                | MetadataInteger
                | MetadataSet
                | MetadataString
        )
    }

    pub fn is_light(self) -> bool {
        matches!(
            self,
            NodeKind::DirectionalLight | NodeKind::PointLight | NodeKind::SpotLight
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Grouping node fields.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupData {
    /// Local transform (identity unless the element was a `Transform`)
    pub transform: Mat4,

    /// Restricts `USE` lookups from descendants to this subtree
    pub is_static: bool,

    /// `Switch` selection; only the child at this index is materialized
    pub choice: Option<i32>,
}

impl Default for GroupData {
    fn default() -> Self {
        Self {
            transform: Mat4::IDENTITY,
            is_static: false,
            choice: None,
        }
    }
}

impl GroupData {
    pub fn new_static() -> Self {
        Self {
            is_static: true,
            ..Default::default()
        }
    }
}

/// Metadata value lists, by element type.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Boolean(Vec<bool>),
    Double(Vec<f64>),
    Float(Vec<f32>),
    Integer(Vec<i32>),
    String(Vec<String>),
    /// `MetadataSet`: entries are the node's metadata children
    Set,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Metadata {
    pub name: String,
    pub reference: String,
    pub value: MetaValue,
}

/// How generated vertices are grouped into faces.
#[derive(Clone, Debug, PartialEq)]
pub enum FaceLayout {
    /// Consecutive runs of this many vertices
    Uniform(usize),
    /// An explicit `-1`-delimited index stream
    Indexed(Vec<i32>),
}

/// Vertices produced for a closed-form shape (box, sphere, arc, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedGeometry {
    pub vertices: Vec<Vec3>,
    pub faces: FaceLayout,
}

/// The index data of a geometry node, by node family.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometrySource {
    IndexedFaces {
        coord_index: Vec<i32>,
        color_index: Vec<i32>,
        normal_index: Vec<i32>,
        tex_coord_index: Vec<i32>,
    },
    IndexedLines {
        coord_index: Vec<i32>,
        color_index: Vec<i32>,
    },
    IndexedTriangles(Vec<i32>),
    IndexedTriangleFans(Vec<i32>),
    IndexedTriangleStrips(Vec<i32>),
    Points,
    Lines(Vec<i32>),
    Triangles,
    TriangleFans(Vec<i32>),
    TriangleStrips(Vec<i32>),
    Generated(GeneratedGeometry),
}

/// A geometry node: index data plus the X3D rendering flags.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub source: GeometrySource,
    pub ccw: bool,
    pub solid: bool,
    pub color_per_vertex: bool,
    pub normal_per_vertex: bool,
    pub convex: bool,
    pub crease_angle: f32,
}

impl Geometry {
    pub fn new(source: GeometrySource) -> Self {
        Self {
            source,
            ccw: true,
            solid: true,
            color_per_vertex: true,
            normal_per_vertex: true,
            convex: true,
            crease_angle: 0.0,
        }
    }
}

/// `Material` fields with X3D defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialData {
    pub ambient_intensity: f32,
    pub diffuse_color: Vec3,
    pub emissive_color: Vec3,
    pub shininess: f32,
    pub specular_color: Vec3,
    pub transparency: f32,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.2,
            diffuse_color: Vec3::splat(0.8),
            emissive_color: Vec3::ZERO,
            shininess: 0.2,
            specular_color: Vec3::ZERO,
            transparency: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImageTextureData {
    pub url: Vec<String>,
    pub repeat_s: bool,
    pub repeat_t: bool,
}

impl Default for ImageTextureData {
    fn default() -> Self {
        Self {
            url: Vec::new(),
            repeat_s: true,
            repeat_t: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureTransformData {
    pub center: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub translation: Vec2,
}

impl Default for TextureTransformData {
    fn default() -> Self {
        Self {
            center: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            translation: Vec2::ZERO,
        }
    }
}

/// Light fields shared by the three light kinds; each kind reads its subset.
#[derive(Clone, Debug, PartialEq)]
pub struct LightData {
    pub ambient_intensity: f32,
    pub color: Vec3,
    pub intensity: f32,
    pub direction: Vec3,
    pub location: Vec3,
    pub attenuation: Vec3,
    pub beam_width: f32,
    pub cut_off_angle: f32,
}

impl Default for LightData {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.0,
            color: Vec3::ONE,
            intensity: 1.0,
            direction: Vec3::new(0.0, 0.0, -1.0),
            location: Vec3::ZERO,
            attenuation: Vec3::new(1.0, 0.0, 0.0),
            beam_width: std::f32::consts::FRAC_PI_4,
            cut_off_angle: std::f32::consts::FRAC_PI_2,
        }
    }
}

/// Kind-specific node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    Group(GroupData),
    Metadata(Metadata),
    Geometry(Geometry),
    Coordinate(Vec<Vec3>),
    Normal(Vec<Vec3>),
    Color(Vec<Vec3>),
    ColorRgba(Vec<Vec4>),
    TextureCoordinate(Vec<Vec2>),
    Shape,
    Appearance,
    Material(MaterialData),
    ImageTexture(ImageTextureData),
    TextureTransform(TextureTransformData),
    Light(LightData),
}

/// One node in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeElement {
    pub kind: NodeKind,
    pub data: NodeData,

    /// Name from a `DEF` attribute
    pub id: Option<String>,

    /// Owning parent; `None` only for the document root
    pub parent: Option<NodeId>,

    /// Owned and `USE`-placed children, in document order
    pub children: Vec<Child>,
}

impl NodeElement {
    pub fn new(kind: NodeKind, data: NodeData) -> Self {
        Self {
            kind,
            data,
            id: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(&self) -> Option<&GroupData> {
        match &self.data {
            NodeData::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn is_static_group(&self) -> bool {
        self.group().is_some_and(|group| group.is_static)
    }

    pub fn name(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }
}
