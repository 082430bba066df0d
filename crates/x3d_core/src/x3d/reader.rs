//! Document reader: walks a tokenized X3D tree into a [`SceneGraph`].
//!
//! Every recognised element becomes one graph node. `DEF` names are
//! declared as nodes are created; a `USE` attaches the resolved node to the
//! current scope and nothing else is read from that element. Elements on the
//! [`SKIPPED_NODES`] list are logged and ignored, anything else unknown
//! fails the import.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

use x3d_math::{TransformFields, Vec2};

use crate::graph::{
    FaceLayout, GeneratedGeometry, Geometry, GeometrySource, GraphBuilder, GraphError, GroupData,
    ImageTextureData, LightData, MaterialData, MetaValue, Metadata, NodeData, NodeId, NodeKind,
    SceneGraph, TextureTransformData,
};
use crate::x3d::{Attributes, ImportError, ImportResult, ShapeGenerator, SourceNode};

/// X3D node names that are recognised but not imported.
pub const SKIPPED_NODES: &[&str] = &[
    // CAD geometry
    "CADAssembly", "CADFace", "CADLayer", "CADPart", "IndexedQuadSet", "QuadSet",
    // Core
    "ROUTE", "ExternProtoDeclare", "ProtoDeclare", "ProtoInstance", "ProtoInterface", "WorldInfo",
    // Distributed interactive simulation
    "DISEntityManager", "DISEntityTypeMapping", "EspduTransform", "ReceiverPdu", "SignalPdu",
    "TransmitterPdu",
    // Cube map environmental texturing
    "ComposedCubeMapTexture", "GeneratedCubeMapTexture", "ImageCubeMapTexture",
    // Environmental effects
    "Background", "Fog", "FogCoordinate", "LocalFog", "TextureBackground",
    // Environmental sensors
    "ProximitySensor", "TransformSensor", "VisibilitySensor",
    // Followers
    "ColorChaser", "ColorDamper", "CoordinateChaser", "CoordinateDamper", "OrientationChaser",
    "OrientationDamper", "PositionChaser", "PositionChaser2D", "PositionDamper",
    "PositionDamper2D", "ScalarChaser", "ScalarDamper", "TexCoordChaser2D", "TexCoordDamper2D",
    // Geospatial
    "GeoCoordinate", "GeoElevationGrid", "GeoLocation", "GeoLOD", "GeoMetadata", "GeoOrigin",
    "GeoPositionInterpolator", "GeoProximitySensor", "GeoTouchSensor", "GeoTransform",
    "GeoViewpoint",
    // H-Anim
    "HAnimDisplacer", "HAnimHumanoid", "HAnimJoint", "HAnimSegment", "HAnimSite",
    // Interpolation
    "ColorInterpolator", "CoordinateInterpolator", "CoordinateInterpolator2D", "EaseInEaseOut",
    "NormalInterpolator", "OrientationInterpolator", "PositionInterpolator",
    "PositionInterpolator2D", "ScalarInterpolator", "SplinePositionInterpolator",
    "SplinePositionInterpolator2D", "SplineScalarInterpolator", "SquadOrientationInterpolator",
    // Key device sensors
    "KeySensor", "StringSensor",
    // Layering
    "Layer", "LayerSet", "Viewport",
    // Layout
    "Layout", "LayoutGroup", "LayoutLayer", "ScreenFontStyle", "ScreenGroup",
    // Navigation
    "Billboard", "Collision", "LOD", "NavigationInfo", "OrthoViewpoint", "Viewpoint",
    "ViewpointGroup",
    // Networking
    "EXPORT", "IMPORT", "Anchor", "LoadSensor", "Inline",
    // NURBS
    "Contour2D", "ContourPolyline2D", "CoordinateDouble", "NurbsCurve", "NurbsCurve2D",
    "NurbsOrientationInterpolator", "NurbsPatchSurface", "NurbsPositionInterpolator", "NurbsSet",
    "NurbsSurfaceInterpolator", "NurbsSweptSurface", "NurbsSwungSurface",
    "NurbsTextureCoordinate", "NurbsTrimmedSurface",
    // Particle systems
    "BoundedPhysicsModel", "ConeEmitter", "ExplosionEmitter", "ForcePhysicsModel",
    "ParticleSystem", "PointEmitter", "PolylineEmitter", "SurfaceEmitter", "VolumeEmitter",
    "WindPhysicsModel",
    // Picking
    "LinePickSensor", "PickableGroup", "PointPickSensor", "PrimitivePickSensor",
    "VolumePickSensor",
    // Pointing device sensors
    "CylinderSensor", "PlaneSensor", "SphereSensor", "TouchSensor",
    // Rendering
    "ClipPlane",
    // Rigid body physics
    "BallJoint", "CollidableOffset", "CollidableShape", "CollisionCollection", "CollisionSensor",
    "CollisionSpace", "Contact", "DoubleAxisHingeJoint", "MotorJoint", "RigidBody",
    "RigidBodyCollection", "SingleAxisHingeJoint", "SliderJoint", "UniversalJoint",
    // Scripting
    "Script",
    // Programmable shaders
    "ComposedShader", "FloatVertexAttribute", "Matrix3VertexAttribute", "Matrix4VertexAttribute",
    "PackagedShader", "ProgramShader", "ShaderPart", "ShaderProgram",
    // Shape
    "FillProperties", "LineProperties", "TwoSidedMaterial",
    // Sound
    "AudioClip", "Sound",
    // Text
    "FontStyle", "Text",
    // 3D texturing
    "ComposedTexture3D", "ImageTexture3D", "PixelTexture3D", "TextureCoordinate3D",
    "TextureCoordinate4D", "TextureTransformMatrix3D", "TextureTransform3D",
    // Texturing
    "MovieTexture", "MultiTexture", "MultiTextureCoordinate", "MultiTextureTransform",
    "PixelTexture", "TextureCoordinateGenerator", "TextureProperties",
    // Time
    "TimeSensor",
    // Event utilities
    "BooleanFilter", "BooleanSequencer", "BooleanToggle", "BooleanTrigger", "IntegerSequencer",
    "IntegerTrigger", "TimeTrigger",
    // Volume rendering
    "BlendedVolumeStyle", "BoundaryEnhancementVolumeStyle", "CartoonVolumeStyle",
    "ComposedVolumeStyle", "EdgeEnhancementVolumeStyle", "IsoSurfaceVolumeData",
    "OpacityMapVolumeStyle", "ProjectionVolumeStyle", "SegmentedVolumeData", "ShadedVolumeStyle",
    "SilhouetteEnhancementVolumeStyle", "ToneMappedVolumeStyle", "VolumeData",
];

/// Ignore a whitelisted element, or fail on an unknown one.
fn skip_unsupported<N: SourceNode>(element: &N, parent: &str) -> ImportResult<()> {
    if SKIPPED_NODES.contains(&element.name()) {
        log::info!("Skipping node \"{}\" in {}", element.name(), parent);
        Ok(())
    } else {
        Err(ImportError::UnsupportedNode {
            name: element.name().to_string(),
            parent: parent.to_string(),
        })
    }
}

/// Read an `X3D` document tree into a scene graph.
pub fn read_document<N, G>(root: &N, generator: &G) -> ImportResult<SceneGraph>
where
    N: SourceNode,
    G: ShapeGenerator,
{
    let mut reader = DocumentReader {
        builder: GraphBuilder::new(),
        generator,
    };
    reader.read_root(root)?;
    Ok(reader.builder.finish()?)
}

struct DocumentReader<'g, G> {
    builder: GraphBuilder,
    generator: &'g G,
}

impl<G: ShapeGenerator> DocumentReader<'_, G> {
    fn read_root<N: SourceNode>(&mut self, root: &N) -> ImportResult<()> {
        if root.name() != "X3D" {
            return Err(ImportError::MissingRoot);
        }

        self.builder.enter_group(GroupData::default())?;
        for child in root.children() {
            match child.name() {
                "head" => self.read_head(child)?,
                "Scene" => self.read_scene(child)?,
                _ => skip_unsupported(child, "Root")?,
            }
        }
        self.builder.exit();
        Ok(())
    }

    /// `<meta name content>` entries become string metadata on the root.
    fn read_head<N: SourceNode>(&mut self, head: &N) -> ImportResult<()> {
        for child in head.children() {
            if child.name() != "meta" {
                log::debug!("Ignoring <{}> in head", child.name());
                continue;
            }

            let attrs = Attributes::new(child);
            let name = attrs.string("name")?.unwrap_or_default();
            if name.is_empty() {
                continue;
            }
            let content = attrs.string("content")?.unwrap_or_default();

            self.builder.add_node(
                NodeKind::MetadataString,
                NodeData::Metadata(Metadata {
                    name,
                    reference: String::new(),
                    value: MetaValue::String(vec![content]),
                }),
            )?;
        }
        Ok(())
    }

    fn read_scene<N: SourceNode>(&mut self, scene: &N) -> ImportResult<()> {
        // Static, so USE lookups inside the scene never see head metadata
        self.builder.enter_group(GroupData::new_static())?;
        self.read_group_children(scene, "Scene")?;
        self.builder.exit();
        Ok(())
    }

    /// Handle `USE`. Returns true when the element was a reference and has
    /// been attached; its content must then be ignored.
    fn reference<N: SourceNode>(&mut self, element: &N, kind: NodeKind) -> ImportResult<bool> {
        let attrs = Attributes::new(element);
        let Some(name) = attrs.string("USE")? else {
            return Ok(false);
        };
        if attrs.string("DEF")?.is_some() {
            return Err(GraphError::DefAndUse { name }.into());
        }

        self.builder.use_node(&name, kind)?;
        Ok(true)
    }

    fn declare<N: SourceNode>(&mut self, element: &N, id: NodeId) -> ImportResult<()> {
        if let Some(name) = Attributes::new(element).string("DEF")? {
            self.builder.declare(id, &name)?;
        }
        Ok(())
    }

    /// Create a non-group node, declare its name, and make it the scope.
    fn begin<N: SourceNode>(
        &mut self,
        element: &N,
        kind: NodeKind,
        data: NodeData,
    ) -> ImportResult<NodeId> {
        let id = self.builder.enter_node(kind, data)?;
        self.declare(element, id)?;
        Ok(id)
    }

    /// Read a node whose only children may be metadata.
    fn read_leaf<N, F>(&mut self, element: &N, kind: NodeKind, data: F) -> ImportResult<()>
    where
        N: SourceNode,
        F: FnOnce(&Attributes<'_, N>) -> ImportResult<NodeData>,
    {
        if self.reference(element, kind)? {
            return Ok(());
        }

        let data = data(&Attributes::new(element))?;
        self.begin(element, kind, data)?;
        self.read_metadata_children(element, kind.name())?;
        self.builder.exit();
        Ok(())
    }

    fn read_metadata_children<N: SourceNode>(&mut self, element: &N, parent: &str) -> ImportResult<()> {
        for child in element.children() {
            match NodeKind::from_name(child.name()) {
                Some(kind) if kind.is_metadata() => self.read_metadata(child, kind)?,
                _ => skip_unsupported(child, parent)?,
            }
        }
        Ok(())
    }

    fn read_group_children<N: SourceNode>(&mut self, element: &N, parent: &str) -> ImportResult<()> {
        for child in element.children() {
            match NodeKind::from_name(child.name()) {
                Some(NodeKind::Group) => self.read_group(child)?,
                Some(NodeKind::Shape) => self.read_shape(child)?,
                Some(kind) if kind.is_light() => self.read_light(child, kind)?,
                Some(kind) if kind.is_metadata() => self.read_metadata(child, kind)?,
                _ => skip_unsupported(child, parent)?,
            }
        }
        Ok(())
    }

    /// `Group`, `StaticGroup`, `Transform`, or `Switch`.
    fn read_group<N: SourceNode>(&mut self, element: &N) -> ImportResult<()> {
        if self.reference(element, NodeKind::Group)? {
            return Ok(());
        }

        let attrs = Attributes::new(element);
        let group = match element.name() {
            "StaticGroup" => GroupData::new_static(),
            "Transform" => {
                let defaults = TransformFields::default();
                let fields = TransformFields {
                    center: attrs.vec3("center", defaults.center)?,
                    rotation: attrs.rotation("rotation", defaults.rotation)?,
                    scale: attrs.vec3("scale", defaults.scale)?,
                    scale_orientation: attrs
                        .rotation("scaleOrientation", defaults.scale_orientation)?,
                    translation: attrs.vec3("translation", defaults.translation)?,
                };
                GroupData {
                    transform: fields.to_matrix(),
                    ..Default::default()
                }
            }
            "Switch" => GroupData {
                choice: Some(attrs.int("whichChoice", -1)?),
                ..Default::default()
            },
            _ => GroupData::default(),
        };

        let id = self.builder.enter_group(group)?;
        self.declare(element, id)?;
        self.read_group_children(element, element.name())?;
        self.builder.exit();
        Ok(())
    }

    fn read_shape<N: SourceNode>(&mut self, element: &N) -> ImportResult<()> {
        if self.reference(element, NodeKind::Shape)? {
            return Ok(());
        }

        self.begin(element, NodeKind::Shape, NodeData::Shape)?;
        for child in element.children() {
            match NodeKind::from_name(child.name()) {
                Some(NodeKind::Appearance) => self.read_appearance(child)?,
                Some(kind) if kind.is_geometry() => self.read_geometry(child, kind)?,
                Some(kind) if kind.is_metadata() => self.read_metadata(child, kind)?,
                _ => skip_unsupported(child, "Shape")?,
            }
        }
        self.builder.exit();
        Ok(())
    }

    fn read_appearance<N: SourceNode>(&mut self, element: &N) -> ImportResult<()> {
        if self.reference(element, NodeKind::Appearance)? {
            return Ok(());
        }

        self.begin(element, NodeKind::Appearance, NodeData::Appearance)?;
        for child in element.children() {
            match NodeKind::from_name(child.name()) {
                Some(kind @ NodeKind::Material) => self.read_leaf(child, kind, read_material)?,
                Some(kind @ NodeKind::ImageTexture) => {
                    self.read_leaf(child, kind, read_image_texture)?
                }
                Some(kind @ NodeKind::TextureTransform) => {
                    self.read_leaf(child, kind, read_texture_transform)?
                }
                Some(kind) if kind.is_metadata() => self.read_metadata(child, kind)?,
                _ => skip_unsupported(child, "Appearance")?,
            }
        }
        self.builder.exit();
        Ok(())
    }

    fn read_geometry<N: SourceNode>(&mut self, element: &N, kind: NodeKind) -> ImportResult<()> {
        if self.reference(element, kind)? {
            return Ok(());
        }

        let attrs = Attributes::new(element);
        let source = match kind {
            NodeKind::IndexedFaceSet => GeometrySource::IndexedFaces {
                coord_index: attrs.required_ints("coordIndex")?,
                color_index: attrs.ints("colorIndex")?,
                normal_index: attrs.ints("normalIndex")?,
                tex_coord_index: attrs.ints("texCoordIndex")?,
            },
            NodeKind::IndexedLineSet => GeometrySource::IndexedLines {
                coord_index: attrs.required_ints("coordIndex")?,
                color_index: attrs.ints("colorIndex")?,
            },
            NodeKind::IndexedTriangleSet => {
                GeometrySource::IndexedTriangles(attrs.required_ints("index")?)
            }
            NodeKind::IndexedTriangleFanSet => {
                GeometrySource::IndexedTriangleFans(attrs.required_ints("index")?)
            }
            NodeKind::IndexedTriangleStripSet => {
                GeometrySource::IndexedTriangleStrips(attrs.required_ints("index")?)
            }
            NodeKind::LineSet => GeometrySource::Lines(attrs.required_ints("vertexCount")?),
            NodeKind::PointSet => GeometrySource::Points,
            NodeKind::TriangleSet => GeometrySource::Triangles,
            NodeKind::TriangleFanSet => {
                GeometrySource::TriangleFans(attrs.required_ints("fanCount")?)
            }
            NodeKind::TriangleStripSet => {
                GeometrySource::TriangleStrips(attrs.required_ints("stripCount")?)
            }
            _ => GeometrySource::Generated(self.generate(element, kind)?),
        };

        let geometry = Geometry {
            source,
            ccw: attrs.bool("ccw", true)?,
            solid: attrs.bool("solid", true)?,
            color_per_vertex: attrs.bool("colorPerVertex", true)?,
            normal_per_vertex: attrs.bool("normalPerVertex", true)?,
            convex: attrs.bool("convex", true)?,
            crease_angle: attrs.float("creaseAngle", 0.0)?,
        };

        // Line and point sets carry no normals or texture coordinates
        let unshaded = matches!(
            kind,
            NodeKind::IndexedLineSet | NodeKind::LineSet | NodeKind::PointSet
        );

        self.begin(element, kind, NodeData::Geometry(geometry))?;
        for child in element.children() {
            match NodeKind::from_name(child.name()) {
                Some(source @ NodeKind::Color) => self.read_leaf(child, source, |a| {
                    Ok(NodeData::Color(a.color3s("color")?))
                })?,
                Some(source @ NodeKind::ColorRgba) => self.read_leaf(child, source, |a| {
                    Ok(NodeData::ColorRgba(a.color4s("color")?))
                })?,
                Some(source @ NodeKind::Coordinate) => self.read_leaf(child, source, |a| {
                    Ok(NodeData::Coordinate(a.vec3s("point")?))
                })?,
                Some(source @ NodeKind::Normal) if !unshaded => {
                    self.read_leaf(child, source, |a| Ok(NodeData::Normal(a.vec3s("vector")?)))?
                }
                Some(source @ NodeKind::TextureCoordinate) if !unshaded => {
                    self.read_leaf(child, source, |a| {
                        Ok(NodeData::TextureCoordinate(a.vec2s("point")?))
                    })?
                }
                Some(meta) if meta.is_metadata() => self.read_metadata(child, meta)?,
                _ => skip_unsupported(child, kind.name())?,
            }
        }
        self.builder.exit();
        Ok(())
    }

    fn generate<N: SourceNode>(&self, element: &N, kind: NodeKind) -> ImportResult<GeneratedGeometry> {
        match self.generator.generate(kind, element)? {
            Some(generated) => Ok(generated),
            None => {
                log::warn!("No shape generator for {kind}; node contributes no geometry");
                Ok(GeneratedGeometry {
                    vertices: Vec::new(),
                    faces: FaceLayout::Uniform(3),
                })
            }
        }
    }

    fn read_light<N: SourceNode>(&mut self, element: &N, kind: NodeKind) -> ImportResult<()> {
        let attrs = Attributes::new(element);
        if !attrs.bool("on", true)? && attrs.string("USE")?.is_none() {
            log::debug!("Skipping disabled {kind}");
            return Ok(());
        }

        self.read_leaf(element, kind, |a| {
            let defaults = LightData::default();
            Ok(NodeData::Light(LightData {
                ambient_intensity: a.float("ambientIntensity", defaults.ambient_intensity)?,
                color: a.color3("color", defaults.color)?,
                intensity: a.float("intensity", defaults.intensity)?,
                direction: a.vec3("direction", defaults.direction)?,
                location: a.vec3("location", defaults.location)?,
                attenuation: a.vec3("attenuation", defaults.attenuation)?,
                beam_width: a.float("beamWidth", FRAC_PI_4)?,
                cut_off_angle: a.float("cutOffAngle", FRAC_PI_2)?,
            }))
        })
    }

    /// Metadata elements; a `MetadataSet`'s entries are its metadata children.
    fn read_metadata<N: SourceNode>(&mut self, element: &N, kind: NodeKind) -> ImportResult<()> {
        self.read_leaf(element, kind, |a| {
            let value = match kind {
                NodeKind::MetadataBoolean => MetaValue::Boolean(a.bools("value")?),
                NodeKind::MetadataDouble => MetaValue::Double(a.doubles("value")?),
                NodeKind::MetadataFloat => MetaValue::Float(a.floats("value")?),
                NodeKind::MetadataInteger => MetaValue::Integer(a.ints("value")?),
                NodeKind::MetadataString => MetaValue::String(a.strings("value")?),
                _ => MetaValue::Set,
            };
            Ok(NodeData::Metadata(Metadata {
                name: a.string("name")?.unwrap_or_default(),
                reference: a.string("reference")?.unwrap_or_default(),
                value,
            }))
        })
    }
}

fn read_material<N: SourceNode>(a: &Attributes<'_, N>) -> ImportResult<NodeData> {
    let defaults = MaterialData::default();
    Ok(NodeData::Material(MaterialData {
        ambient_intensity: a.float("ambientIntensity", defaults.ambient_intensity)?,
        diffuse_color: a.color3("diffuseColor", defaults.diffuse_color)?,
        emissive_color: a.color3("emissiveColor", defaults.emissive_color)?,
        shininess: a.float("shininess", defaults.shininess)?,
        specular_color: a.color3("specularColor", defaults.specular_color)?,
        transparency: a.float("transparency", defaults.transparency)?,
    }))
}

fn read_image_texture<N: SourceNode>(a: &Attributes<'_, N>) -> ImportResult<NodeData> {
    Ok(NodeData::ImageTexture(ImageTextureData {
        url: a.strings("url")?,
        repeat_s: a.bool("repeatS", true)?,
        repeat_t: a.bool("repeatT", true)?,
    }))
}

fn read_texture_transform<N: SourceNode>(a: &Attributes<'_, N>) -> ImportResult<NodeData> {
    Ok(NodeData::TextureTransform(TextureTransformData {
        center: a.vec2("center", Vec2::ZERO)?,
        rotation: a.float("rotation", 0.0)?,
        scale: a.vec2("scale", Vec2::ONE)?,
        translation: a.vec2("translation", Vec2::ZERO)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Child;
    use crate::x3d::{AttrValue, DocNode, NoShapeGenerator};
    use x3d_math::{Vec3, Vec4};

    fn document(scene: DocNode) -> DocNode {
        DocNode::new("X3D").child(scene)
    }

    fn read(root: &DocNode) -> ImportResult<SceneGraph> {
        read_document(root, &NoShapeGenerator)
    }

    fn def(node: DocNode, name: &str) -> DocNode {
        node.with("DEF", AttrValue::Str(name.into()))
    }

    fn use_(node: &str, name: &str) -> DocNode {
        DocNode::new(node).with("USE", AttrValue::Str(name.into()))
    }

    fn kinds(graph: &SceneGraph) -> Vec<NodeKind> {
        graph.iter().map(|(_, node)| node.kind).collect()
    }

    #[test]
    fn test_root_must_be_x3d() {
        let err = read(&DocNode::new("Scene")).unwrap_err();
        assert!(matches!(err, ImportError::MissingRoot));
    }

    #[test]
    fn test_scene_is_static_group_under_root() {
        let graph = read(&document(DocNode::new("Scene"))).unwrap();
        let root = graph.root().unwrap();
        let scene: Vec<_> = graph.children(root).collect();

        assert_eq!(scene.len(), 1);
        assert!(graph.node(scene[0]).is_static_group());
        assert!(!graph.node(root).is_static_group());
    }

    #[test]
    fn test_head_meta_becomes_root_metadata() {
        let head = DocNode::new("head")
            .child(
                DocNode::new("meta")
                    .with("name", AttrValue::Str("author".into()))
                    .with("content", AttrValue::Str("someone".into())),
            )
            .child(DocNode::new("meta").with("content", AttrValue::Str("unnamed".into())))
            .child(DocNode::new("component"));
        let graph = read(&DocNode::new("X3D").child(head)).unwrap();

        assert_eq!(kinds(&graph), vec![NodeKind::Group, NodeKind::MetadataString]);
        let (_, meta) = graph.iter().nth(1).unwrap();
        match &meta.data {
            NodeData::Metadata(m) => {
                assert_eq!(m.name, "author");
                assert_eq!(m.value, MetaValue::String(vec!["someone".to_string()]));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_transform_fields() {
        let scene = DocNode::new("Scene").child(
            DocNode::new("Transform").with("translation", AttrValue::Vec3(Vec3::new(1.0, 2.0, 3.0))),
        );
        let graph = read(&document(scene)).unwrap();
        let (_, transform) = graph.iter().last().unwrap();

        assert_eq!(
            transform.group().map(|g| g.transform.w_axis),
            Some(Vec4::new(1.0, 2.0, 3.0, 1.0))
        );
    }

    #[test]
    fn test_switch_defaults_to_no_choice() {
        let scene = DocNode::new("Scene").child(DocNode::new("Switch"));
        let graph = read(&document(scene)).unwrap();
        let (_, switch) = graph.iter().last().unwrap();

        assert_eq!(switch.group().and_then(|g| g.choice), Some(-1));
    }

    #[test]
    fn test_use_places_existing_node() {
        let scene = DocNode::new("Scene")
            .child(def(DocNode::new("Shape"), "Ball"))
            .child(DocNode::new("Group").child(use_("Shape", "Ball")));
        let graph = read(&document(scene)).unwrap();

        let shapes: Vec<_> = graph
            .iter()
            .filter(|(_, node)| node.kind == NodeKind::Shape)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(shapes.len(), 1);

        let (_, group) = graph.iter().last().unwrap();
        assert_eq!(group.children, vec![Child::Used(shapes[0])]);
    }

    #[test]
    fn test_def_and_use_together_is_an_error() {
        let scene = DocNode::new("Scene")
            .child(def(DocNode::new("Shape"), "A"))
            .child(def(use_("Shape", "A"), "B"));
        let err = read(&document(scene)).unwrap_err();

        assert!(matches!(err, ImportError::Graph(GraphError::DefAndUse { .. })));
    }

    #[test]
    fn test_unresolved_use() {
        let scene = DocNode::new("Scene").child(use_("Group", "Nowhere"));
        let err = read(&document(scene)).unwrap_err();

        assert!(matches!(
            err,
            ImportError::Graph(GraphError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_static_group_hides_outer_definitions() {
        let hidden = DocNode::new("Scene")
            .child(def(DocNode::new("Shape"), "Ball"))
            .child(DocNode::new("StaticGroup").child(use_("Shape", "Ball")));
        assert!(matches!(
            read(&document(hidden)).unwrap_err(),
            ImportError::Graph(GraphError::UnresolvedReference { .. })
        ));

        let visible = DocNode::new("Scene")
            .child(def(DocNode::new("Shape"), "Ball"))
            .child(DocNode::new("Group").child(use_("Shape", "Ball")));
        assert!(read(&document(visible)).is_ok());
    }

    #[test]
    fn test_skipped_and_unsupported_nodes() {
        let skipped = DocNode::new("Scene")
            .child(DocNode::new("Viewpoint"))
            .child(DocNode::new("Group").child(DocNode::new("TimeSensor")));
        assert!(read(&document(skipped)).is_ok());

        let unknown = DocNode::new("Scene").child(DocNode::new("Teapot"));
        match read(&document(unknown)).unwrap_err() {
            ImportError::UnsupportedNode { name, parent } => {
                assert_eq!(name, "Teapot");
                assert_eq!(parent, "Scene");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_line_set_rejects_normals() {
        let lines = DocNode::new("IndexedLineSet")
            .with("coordIndex", AttrValue::Ints(vec![0, 1]))
            .child(DocNode::new("Normal"));
        let scene = DocNode::new("Scene").child(DocNode::new("Shape").child(lines));

        assert!(matches!(
            read(&document(scene)).unwrap_err(),
            ImportError::UnsupportedNode { .. }
        ));
    }

    #[test]
    fn test_missing_coord_index() {
        let faces = DocNode::new("IndexedFaceSet");
        let scene = DocNode::new("Scene").child(DocNode::new("Shape").child(faces));

        assert!(matches!(
            read(&document(scene)).unwrap_err(),
            ImportError::MissingAttribute { .. }
        ));
    }

    #[test]
    fn test_disabled_light_is_not_created() {
        let scene = DocNode::new("Scene")
            .child(DocNode::new("PointLight").with("on", AttrValue::Bool(false)))
            .child(DocNode::new("SpotLight"));
        let graph = read(&document(scene)).unwrap();

        assert_eq!(
            kinds(&graph),
            vec![NodeKind::Group, NodeKind::Group, NodeKind::SpotLight]
        );
    }

    #[test]
    fn test_metadata_set_children() {
        let set = DocNode::new("MetadataSet")
            .with("name", AttrValue::Str("info".into()))
            .child(DocNode::new("MetadataInteger").with("value", AttrValue::Ints(vec![4, 5])));
        let graph = read(&document(DocNode::new("Scene").child(set))).unwrap();

        assert_eq!(
            kinds(&graph),
            vec![
                NodeKind::Group,
                NodeKind::Group,
                NodeKind::MetadataSet,
                NodeKind::MetadataInteger
            ]
        );
    }

    #[test]
    fn test_generated_geometry_without_generator_is_empty() {
        let scene = DocNode::new("Scene").child(DocNode::new("Shape").child(DocNode::new("Box")));
        let graph = read(&document(scene)).unwrap();
        let (_, geometry) = graph.iter().last().unwrap();

        match &geometry.data {
            NodeData::Geometry(Geometry {
                source: GeometrySource::Generated(generated),
                ..
            }) => assert!(generated.vertices.is_empty()),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
