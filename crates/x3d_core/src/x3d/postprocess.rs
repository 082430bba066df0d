//! Scene materialization.
//!
//! Walks the owned-plus-used children of the graph from the root, composing
//! group transforms, and emits the output [`Scene`]. Geometry nodes are
//! expanded into meshes here; the graph itself stays declarative.

use indexmap::IndexMap;
use x3d_math::{Mat4, Mat4Ext, Vec2, Vec3, Vec4};

use crate::geometry::{
    bind_colors, bind_normals, bind_tex_coords, decode_faces, decode_lines,
    indexed_triangle_fans, indexed_triangle_strips, indexed_triangles,
    polyline_indices_to_line_indices, polylines_from_counts, promote_rgb, sequential_faces,
    sequential_points, sequential_triangles, triangle_fans_from_counts,
    triangle_strips_from_counts, Binding, GeometryResult, Topology,
};
use crate::graph::{
    FaceLayout, Geometry, GeometrySource, MetaValue, NodeData, NodeId, NodeKind, SceneGraph,
};
use crate::mesh::{Face, Mesh};
use crate::scene::{
    Light, LightKind, Material, MetadataValue, Scene, SceneNode, TextureMapping, TextureOp,
    TextureRef, TextureWrap, UvTransform,
};
use crate::x3d::{ImportError, ImportResult};

/// Build the output scene from a finished graph.
pub fn materialize(graph: &SceneGraph, name: &str) -> ImportResult<Scene> {
    let root = graph.root().ok_or(ImportError::MissingRoot)?;

    let mut materializer = Materializer {
        graph,
        meshes: Vec::new(),
        materials: Vec::new(),
        lights: Vec::new(),
    };
    let mut root = materializer.build_group(root, Mat4::IDENTITY)?;
    if root.name.is_empty() {
        root.name = name.to_string();
    }

    Ok(Scene {
        name: name.to_string(),
        root,
        meshes: materializer.meshes,
        materials: materializer.materials,
        lights: materializer.lights,
    })
}

/// Projection hint for a textured mesh without texture coordinates.
pub fn texture_mapping_for(kind: NodeKind) -> TextureMapping {
    match kind {
        NodeKind::Box => TextureMapping::Box,
        NodeKind::Cone | NodeKind::Cylinder => TextureMapping::Cylinder,
        NodeKind::Sphere => TextureMapping::Sphere,
        _ => TextureMapping::Plane,
    }
}

struct Materializer<'a> {
    graph: &'a SceneGraph,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    lights: Vec<Light>,
}

/// Vertex data gathered from a geometry node's source children.
#[derive(Default)]
struct Sources<'a> {
    coords: Option<&'a [Vec3]>,
    colors: Option<Vec<Vec4>>,
    normals: Option<&'a [Vec3]>,
    tex_coords: Option<&'a [Vec2]>,
}

/// A geometry source expanded into faces plus the streams attributes bind against.
#[derive(Default)]
struct Expanded {
    faces: Vec<Face>,
    coord_index: Vec<i32>,
    color_index: Vec<i32>,
    normal_index: Vec<i32>,
    tex_coord_index: Vec<i32>,
    /// Polyline faces for line sets; colors bind per polyline, not per segment
    color_faces: Option<Vec<Face>>,
}

impl Expanded {
    fn from_stream(stream: Vec<i32>) -> Self {
        Self {
            faces: decode_faces(&stream).0,
            coord_index: stream,
            ..Default::default()
        }
    }
}

fn expand(source: &GeometrySource, vertex_count: usize, ccw: bool) -> GeometryResult<Expanded> {
    let expanded = match source {
        GeometrySource::IndexedFaces {
            coord_index,
            color_index,
            normal_index,
            tex_coord_index,
        } => Expanded {
            color_index: color_index.clone(),
            normal_index: normal_index.clone(),
            tex_coord_index: tex_coord_index.clone(),
            ..Expanded::from_stream(coord_index.clone())
        },
        GeometrySource::IndexedLines {
            coord_index,
            color_index,
        } => Expanded {
            faces: decode_lines(coord_index),
            coord_index: coord_index.clone(),
            color_index: color_index.clone(),
            color_faces: Some(decode_faces(coord_index).0),
            ..Default::default()
        },
        GeometrySource::IndexedTriangles(index) => {
            Expanded::from_stream(indexed_triangles(index, ccw))
        }
        GeometrySource::IndexedTriangleFans(index) => {
            Expanded::from_stream(indexed_triangle_fans(index, ccw))
        }
        GeometrySource::IndexedTriangleStrips(index) => {
            Expanded::from_stream(indexed_triangle_strips(index, ccw))
        }
        GeometrySource::Points => Expanded::from_stream(sequential_points(vertex_count)),
        GeometrySource::Lines(vertex_counts) => {
            let polylines = polylines_from_counts(vertex_counts, vertex_count)?;
            Expanded {
                color_faces: Some(decode_faces(&polylines).0),
                ..Expanded::from_stream(polyline_indices_to_line_indices(&polylines))
            }
        }
        GeometrySource::Triangles => {
            Expanded::from_stream(sequential_triangles(vertex_count, ccw))
        }
        GeometrySource::TriangleFans(fan_counts) => {
            Expanded::from_stream(triangle_fans_from_counts(fan_counts, vertex_count, ccw)?)
        }
        GeometrySource::TriangleStrips(strip_counts) => {
            Expanded::from_stream(triangle_strips_from_counts(strip_counts, vertex_count, ccw)?)
        }
        GeometrySource::Generated(generated) => match &generated.faces {
            FaceLayout::Uniform(per_face) => {
                Expanded::from_stream(sequential_faces(vertex_count, *per_face))
            }
            FaceLayout::Indexed(stream) => Expanded::from_stream(stream.clone()),
        },
    };
    Ok(expanded)
}

impl<'a> Materializer<'a> {
    fn unexpected(&self, id: NodeId, context: &'static str) -> ImportError {
        ImportError::UnexpectedNode {
            kind: self.graph.node(id).kind,
            context,
        }
    }

    fn build_group(&mut self, id: NodeId, parent_world: Mat4) -> ImportResult<SceneNode> {
        let element = self.graph.node(id);
        let group = element.group().ok_or_else(|| self.unexpected(id, "group"))?;
        let world = parent_world * group.transform;

        let mut node = SceneNode::new(element.name(), group.transform);
        let children: Vec<NodeId> = self.graph.children(id).collect();
        for &child in &children {
            if self.graph.node(child).kind.is_metadata() {
                self.collect_metadata(child, &mut node.metadata);
            }
        }

        // Switch: only the chosen child, or none when the choice is out of range.
        // The choice indexes every child, metadata included.
        let content: Vec<NodeId> = match group.choice {
            Some(choice) => usize::try_from(choice)
                .ok()
                .and_then(|index| children.get(index).copied())
                .into_iter()
                .collect(),
            None => children,
        };

        for child in content {
            match self.graph.node(child).kind {
                kind if kind.is_metadata() => {}
                NodeKind::Group => {
                    let child_node = self.build_group(child, world)?;
                    node.children.push(child_node);
                }
                NodeKind::Shape => self.build_shape(child, &mut node)?,
                kind if kind.is_light() => self.build_light(child, world)?,
                _ => return Err(self.unexpected(child, "group")),
            }
        }

        Ok(node)
    }

    fn build_shape(&mut self, id: NodeId, node: &mut SceneNode) -> ImportResult<()> {
        let mut geometry = None;
        let mut appearance = None;

        for child in self.graph.children(id) {
            let kind = self.graph.node(child).kind;
            if kind.is_geometry() {
                if geometry.replace(child).is_some() {
                    return Err(ImportError::InvalidShape {
                        reason: "more than one geometry node",
                    });
                }
            } else if kind == NodeKind::Appearance {
                if appearance.replace(child).is_some() {
                    return Err(ImportError::InvalidShape {
                        reason: "more than one appearance node",
                    });
                }
            } else if kind.is_metadata() {
                self.collect_metadata(child, &mut node.metadata);
            } else {
                return Err(self.unexpected(child, "Shape"));
            }
        }

        let mut mesh = match geometry {
            Some(geometry) => self.build_mesh(geometry, &mut node.metadata)?,
            None => None,
        };

        if let Some(appearance) = appearance {
            let mut material = self.build_material(appearance)?;

            if let (Some(mesh), Some(geometry)) = (mesh.as_mut(), geometry) {
                if material.has_texture() && !mesh.has_uvs() {
                    material.texture_mapping =
                        Some(texture_mapping_for(self.graph.node(geometry).kind));
                }
                mesh.material_index = Some(self.materials.len());
            }
            self.materials.push(material);
        }

        if let Some(mesh) = mesh {
            node.meshes.push(self.meshes.len());
            self.meshes.push(mesh);
        }
        Ok(())
    }

    /// Expand one geometry node. `None` when it yields no faces.
    fn build_mesh(
        &self,
        id: NodeId,
        metadata: &mut IndexMap<String, MetadataValue>,
    ) -> ImportResult<Option<Mesh>> {
        let element = self.graph.node(id);
        let NodeData::Geometry(geometry) = &element.data else {
            return Err(self.unexpected(id, "Shape"));
        };

        let mut sources = Sources::default();
        for child in self.graph.children(id) {
            match &self.graph.node(child).data {
                NodeData::Coordinate(points) => sources.coords = Some(points.as_slice()),
                NodeData::Color(colors) => sources.colors = Some(promote_rgb(colors)),
                NodeData::ColorRgba(colors) => sources.colors = Some(colors.clone()),
                NodeData::Normal(normals) => sources.normals = Some(normals.as_slice()),
                NodeData::TextureCoordinate(points) => {
                    sources.tex_coords = Some(points.as_slice())
                }
                NodeData::Metadata(_) => self.collect_metadata(child, metadata),
                _ => return Err(self.unexpected(child, element.kind.name())),
            }
        }

        let vertices = match &geometry.source {
            GeometrySource::Generated(generated) => generated.vertices.clone(),
            _ => sources.coords.map(<[Vec3]>::to_vec).unwrap_or_default(),
        };
        if vertices.is_empty() {
            log::debug!("{} has no vertices", element.kind);
            return Ok(None);
        }

        let expanded = expand(&geometry.source, vertices.len(), geometry.ccw)?;
        if expanded.faces.is_empty() {
            log::warn!("{} produced no faces", element.kind);
            return Ok(None);
        }

        let mut mesh = Mesh::new(vertices, expanded.faces.clone())?;
        self.bind_attributes(&mut mesh, geometry, &expanded, &sources)?;

        log::debug!(
            "Built mesh from {}: {} vertices, {} faces",
            element.kind,
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(Some(mesh))
    }

    fn bind_attributes(
        &self,
        mesh: &mut Mesh,
        geometry: &Geometry,
        expanded: &Expanded,
        sources: &Sources,
    ) -> ImportResult<()> {
        if let Some(colors) = &sources.colors {
            let faces = expanded.color_faces.as_deref().unwrap_or(mesh.faces.as_slice());
            let bound = bind_colors(
                &Topology::new(mesh.vertex_count(), faces),
                Binding::from_per_vertex(geometry.color_per_vertex),
                &expanded.coord_index,
                &expanded.color_index,
                colors,
            )?;
            mesh.colors = Some(bound);
        }

        if let Some(normals) = sources.normals {
            let bound = bind_normals(
                &Topology::of(mesh),
                Binding::from_per_vertex(geometry.normal_per_vertex),
                &expanded.coord_index,
                &expanded.normal_index,
                normals,
            )?;
            mesh.normals = Some(bound);
        }

        if let Some(tex_coords) = sources.tex_coords {
            let bound = bind_tex_coords(&Topology::of(mesh), &expanded.tex_coord_index, tex_coords)?;
            mesh.uvs = Some(bound);
        }

        Ok(())
    }

    fn build_material(&self, id: NodeId) -> ImportResult<Material> {
        let mut material = Material::default();

        for child in self.graph.children(id) {
            match &self.graph.node(child).data {
                NodeData::Material(data) => {
                    material.ambient_color = Vec3::splat(data.ambient_intensity);
                    material.diffuse_color = data.diffuse_color;
                    material.emissive_color = data.emissive_color;
                    material.specular_color = data.specular_color;
                    material.shininess = data.shininess;
                    material.opacity = 1.0 - data.transparency;
                }
                NodeData::ImageTexture(texture) => match texture.url.first() {
                    Some(url) => {
                        material.diffuse_texture = Some(TextureRef {
                            path: url.clone(),
                            wrap_u: TextureWrap::from_repeat(texture.repeat_s),
                            wrap_v: TextureWrap::from_repeat(texture.repeat_t),
                            op: TextureOp::Multiply,
                        });
                    }
                    None => log::warn!("ImageTexture without url ignored"),
                },
                NodeData::TextureTransform(transform) => {
                    material.uv_transform = Some(UvTransform {
                        translation: transform.translation - transform.center,
                        scale: transform.scale,
                        rotation: transform.rotation,
                    });
                }
                NodeData::Metadata(_) => {}
                _ => return Err(self.unexpected(child, "Appearance")),
            }
        }

        Ok(material)
    }

    /// Lights have no transform of their own; `world` is their parent's.
    fn build_light(&mut self, id: NodeId, world: Mat4) -> ImportResult<()> {
        let element = self.graph.node(id);
        let NodeData::Light(data) = &element.data else {
            return Err(self.unexpected(id, "group"));
        };
        let kind = match element.kind {
            NodeKind::DirectionalLight => LightKind::Directional,
            NodeKind::PointLight => LightKind::Point,
            NodeKind::SpotLight => LightKind::Spot,
            _ => return Err(self.unexpected(id, "group")),
        };

        let name = element
            .id
            .clone()
            .unwrap_or_else(|| format!("{}_{}", element.kind, self.lights.len()));
        let diffuse = data.color * data.intensity;

        let mut light = Light {
            name,
            kind,
            ambient_color: data.color * data.ambient_intensity,
            diffuse_color: diffuse,
            specular_color: diffuse,
            position: Vec3::ZERO,
            direction: Vec3::ZERO,
            attenuation_constant: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
            angle_inner_cone: 0.0,
            angle_outer_cone: 0.0,
        };

        if kind != LightKind::Point {
            light.direction = world.transform_direction(data.direction);
        }
        if kind != LightKind::Directional {
            light.position = world.transform_point3(data.location);
            light.attenuation_constant = data.attenuation.x;
            light.attenuation_linear = data.attenuation.y;
            light.attenuation_quadratic = data.attenuation.z;
        }
        if kind == LightKind::Spot {
            light.angle_inner_cone = data.beam_width;
            light.angle_outer_cone = data.cut_off_angle;
        }

        self.lights.push(light);
        Ok(())
    }

    /// Flatten a metadata node (recursing into sets) into `into`.
    ///
    /// Each entry contributes its first value; entries with no values are
    /// dropped.
    fn collect_metadata(&self, id: NodeId, into: &mut IndexMap<String, MetadataValue>) {
        let NodeData::Metadata(meta) = &self.graph.node(id).data else {
            return;
        };

        let value = match &meta.value {
            MetaValue::Boolean(values) => values.first().copied().map(MetadataValue::Bool),
            MetaValue::Double(values) => values.first().copied().map(MetadataValue::Double),
            MetaValue::Float(values) => values.first().copied().map(MetadataValue::Float),
            MetaValue::Integer(values) => values.first().copied().map(MetadataValue::Integer),
            MetaValue::String(values) => values.first().cloned().map(MetadataValue::String),
            MetaValue::Set => {
                for child in self.graph.children(id) {
                    self.collect_metadata(child, into);
                }
                None
            }
        };

        if let Some(value) = value {
            into.insert(meta.name.clone(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeometryError;
    use crate::graph::{
        GraphBuilder, GroupData, ImageTextureData, LightData, MaterialData, Metadata,
        TextureTransformData,
    };
    use crate::mesh::PrimitiveTypes;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    fn root() -> GraphBuilder {
        let mut builder = GraphBuilder::new();
        builder.enter_group(GroupData::default()).unwrap();
        builder
    }

    /// A shape holding one geometry node with the given coordinates.
    fn add_shape(builder: &mut GraphBuilder, kind: NodeKind, geometry: Geometry, points: Vec<Vec3>) {
        builder.enter_node(NodeKind::Shape, NodeData::Shape).unwrap();
        builder.enter_node(kind, NodeData::Geometry(geometry)).unwrap();
        builder
            .add_node(NodeKind::Coordinate, NodeData::Coordinate(points))
            .unwrap();
        builder.exit();
        builder.exit();
    }

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    fn metadata(name: &str, value: MetaValue) -> NodeData {
        NodeData::Metadata(Metadata {
            name: name.to_string(),
            reference: String::new(),
            value,
        })
    }

    fn face_indices(mesh: &Mesh) -> Vec<Vec<u32>> {
        mesh.faces.iter().map(|f| f.indices.clone()).collect()
    }

    #[test]
    fn test_indexed_face_set_mesh() {
        let mut builder = root();
        let faces = Geometry::new(GeometrySource::IndexedFaces {
            coord_index: vec![0, 1, 2, -1, 0, 2, 3, -1],
            color_index: vec![],
            normal_index: vec![],
            tex_coord_index: vec![],
        });
        add_shape(&mut builder, NodeKind::IndexedFaceSet, faces, quad());

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.root.meshes, vec![0]);
        assert_eq!(scene.root.name, "test");

        let mesh = &scene.meshes[0];
        assert_eq!(face_indices(mesh), vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert_eq!(mesh.primitive_types, PrimitiveTypes::TRIANGLE);
        assert!(mesh.material_index.is_none());
    }

    #[test]
    fn test_malformed_stream_yields_no_mesh() {
        let mut builder = root();
        let faces = Geometry::new(GeometrySource::IndexedFaces {
            coord_index: vec![0, 1, 2, -1, -1, 3],
            color_index: vec![],
            normal_index: vec![],
            tex_coord_index: vec![],
        });
        add_shape(&mut builder, NodeKind::IndexedFaceSet, faces, quad());

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        assert_eq!(scene.mesh_count(), 0);
        assert!(scene.root.meshes.is_empty());
    }

    #[test]
    fn test_switch_out_of_range_choice() {
        let mut builder = root();
        builder
            .enter_group(GroupData {
                choice: Some(5),
                ..Default::default()
            })
            .unwrap();
        for _ in 0..3 {
            builder.enter_group(GroupData::default()).unwrap();
            builder.exit();
        }
        builder.exit();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        assert_eq!(scene.root.children.len(), 1);
        assert!(scene.root.children[0].children.is_empty());
    }

    #[test]
    fn test_switch_choice_counts_metadata_children() {
        let mut builder = root();
        builder
            .enter_group(GroupData {
                choice: Some(1),
                ..Default::default()
            })
            .unwrap();
        builder
            .add_node(NodeKind::MetadataInteger, metadata("n", MetaValue::Integer(vec![1])))
            .unwrap();
        let first = builder.enter_group(GroupData::default()).unwrap();
        builder.declare(first, "first").unwrap();
        builder.exit();
        let second = builder.enter_group(GroupData::default()).unwrap();
        builder.declare(second, "second").unwrap();
        builder.exit();
        builder.exit();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let switch = &scene.root.children[0];
        assert_eq!(switch.children.len(), 1);
        assert_eq!(switch.children[0].name, "first");
        assert_eq!(switch.metadata.get("n"), Some(&MetadataValue::Integer(1)));
    }

    #[test]
    fn test_switch_choosing_metadata_materializes_nothing() {
        let mut builder = root();
        builder
            .enter_group(GroupData {
                choice: Some(0),
                ..Default::default()
            })
            .unwrap();
        builder
            .add_node(NodeKind::MetadataString, metadata("tag", MetaValue::String(vec!["a".into()])))
            .unwrap();
        builder.enter_group(GroupData::default()).unwrap();
        builder.exit();
        builder.exit();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let switch = &scene.root.children[0];
        assert!(switch.children.is_empty());
        assert_eq!(
            switch.metadata.get("tag"),
            Some(&MetadataValue::String("a".to_string()))
        );
    }

    #[test]
    fn test_stray_node_under_group_is_unexpected() {
        let mut builder = root();
        builder
            .add_node(NodeKind::Coordinate, NodeData::Coordinate(quad()))
            .unwrap();

        let err = materialize(&builder.finish().unwrap(), "test").unwrap_err();
        assert!(matches!(
            err,
            ImportError::UnexpectedNode {
                kind: NodeKind::Coordinate,
                context: "group"
            }
        ));
    }

    #[test]
    fn test_light_uses_ancestor_transform() {
        let mut builder = root();
        builder
            .enter_group(GroupData {
                transform: Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)),
                ..Default::default()
            })
            .unwrap();
        builder
            .enter_group(GroupData {
                transform: Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ..Default::default()
            })
            .unwrap();
        builder
            .add_node(
                NodeKind::SpotLight,
                NodeData::Light(LightData {
                    location: Vec3::new(0.0, 0.0, 1.0),
                    ..Default::default()
                }),
            )
            .unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let light = &scene.lights[0];

        assert_eq!(light.kind, LightKind::Spot);
        assert_eq!(light.name, "SpotLight_0");
        assert!(approx(light.position, Vec3::new(1.0, 5.0, 0.0)));
        assert!(approx(light.direction, Vec3::new(-1.0, 0.0, 0.0)));
        assert_eq!(light.angle_outer_cone, std::f32::consts::FRAC_PI_2);
        assert_eq!(light.attenuation_constant, 1.0);
    }

    #[test]
    fn test_directional_light_ignores_translation() {
        let mut builder = root();
        builder
            .enter_group(GroupData {
                transform: Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)),
                ..Default::default()
            })
            .unwrap();
        let sun = builder
            .add_node(
                NodeKind::DirectionalLight,
                NodeData::Light(LightData {
                    color: Vec3::new(1.0, 0.5, 0.0),
                    intensity: 0.5,
                    ambient_intensity: 0.2,
                    ..Default::default()
                }),
            )
            .unwrap();
        builder.declare(sun, "Sun").unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let light = &scene.lights[0];

        assert_eq!(light.name, "Sun");
        assert_eq!(light.position, Vec3::ZERO);
        assert!(approx(light.direction, Vec3::new(0.0, 0.0, -1.0)));
        assert!(approx(light.diffuse_color, Vec3::new(0.5, 0.25, 0.0)));
        assert!(approx(light.ambient_color, Vec3::new(0.2, 0.1, 0.0)));
    }

    #[test]
    fn test_material_and_texture_mapping() {
        let mut builder = root();
        builder.enter_node(NodeKind::Shape, NodeData::Shape).unwrap();
        builder.enter_node(NodeKind::Appearance, NodeData::Appearance).unwrap();
        builder
            .add_node(
                NodeKind::Material,
                NodeData::Material(MaterialData {
                    transparency: 0.25,
                    ambient_intensity: 0.5,
                    ..Default::default()
                }),
            )
            .unwrap();
        builder
            .add_node(
                NodeKind::ImageTexture,
                NodeData::ImageTexture(ImageTextureData {
                    url: vec!["wood.png".to_string(), "fallback.png".to_string()],
                    repeat_s: false,
                    ..Default::default()
                }),
            )
            .unwrap();
        builder
            .add_node(
                NodeKind::TextureTransform,
                NodeData::TextureTransform(TextureTransformData {
                    center: Vec2::new(0.5, 0.5),
                    translation: Vec2::new(1.0, 1.0),
                    ..Default::default()
                }),
            )
            .unwrap();
        builder.exit();
        builder.enter_node(NodeKind::TriangleSet, NodeData::Geometry(Geometry::new(GeometrySource::Triangles))).unwrap();
        builder
            .add_node(NodeKind::Coordinate, NodeData::Coordinate(quad()[..3].to_vec()))
            .unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let material = &scene.materials[0];

        assert_eq!(scene.meshes[0].material_index, Some(0));
        assert_eq!(material.opacity, 0.75);
        assert_eq!(material.ambient_color, Vec3::splat(0.5));
        assert_eq!(material.texture_mapping, Some(TextureMapping::Plane));

        let texture = material.diffuse_texture.as_ref().unwrap();
        assert_eq!(texture.path, "wood.png");
        assert_eq!(texture.wrap_u, TextureWrap::Clamp);
        assert_eq!(texture.wrap_v, TextureWrap::Wrap);
        assert_eq!(
            material.uv_transform.map(|t| t.translation),
            Some(Vec2::new(0.5, 0.5))
        );
    }

    #[test]
    fn test_shape_with_two_geometries() {
        let mut builder = root();
        builder.enter_node(NodeKind::Shape, NodeData::Shape).unwrap();
        for _ in 0..2 {
            builder
                .add_node(NodeKind::PointSet, NodeData::Geometry(Geometry::new(GeometrySource::Points)))
                .unwrap();
        }

        let err = materialize(&builder.finish().unwrap(), "test").unwrap_err();
        assert!(matches!(err, ImportError::InvalidShape { .. }));
    }

    #[test]
    fn test_fan_set_with_colors() {
        let mut builder = root();
        let mut fans = Geometry::new(GeometrySource::TriangleFans(vec![4]));
        fans.ccw = false;
        builder.enter_node(NodeKind::Shape, NodeData::Shape).unwrap();
        builder.enter_node(NodeKind::TriangleFanSet, NodeData::Geometry(fans)).unwrap();
        builder
            .add_node(NodeKind::Coordinate, NodeData::Coordinate(quad()))
            .unwrap();
        builder
            .add_node(
                NodeKind::Color,
                NodeData::Color(vec![Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE]),
            )
            .unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let mesh = &scene.meshes[0];

        assert_eq!(face_indices(mesh), vec![vec![0, 2, 1], vec![0, 3, 2]]);
        assert_eq!(
            mesh.colors.as_ref().map(|c| c[1]),
            Some(Vec4::new(0.0, 1.0, 0.0, 1.0))
        );
    }

    #[test]
    fn test_fan_counts_beyond_vertices_fail() {
        let mut builder = root();
        let fans = Geometry::new(GeometrySource::TriangleFans(vec![5]));
        add_shape(&mut builder, NodeKind::TriangleFanSet, fans, quad());

        let err = materialize(&builder.finish().unwrap(), "test").unwrap_err();
        assert!(matches!(
            err,
            ImportError::Geometry(GeometryError::CountMismatch {
                expected: 4,
                actual: 5,
                ..
            })
        ));
    }

    #[test]
    fn test_line_set_segments_and_polyline_colors() {
        let mut builder = root();
        let mut lines = Geometry::new(GeometrySource::Lines(vec![3]));
        lines.color_per_vertex = false;
        builder.enter_node(NodeKind::Shape, NodeData::Shape).unwrap();
        builder.enter_node(NodeKind::LineSet, NodeData::Geometry(lines)).unwrap();
        builder
            .add_node(NodeKind::Coordinate, NodeData::Coordinate(quad()[..3].to_vec()))
            .unwrap();
        builder
            .add_node(NodeKind::ColorRgba, NodeData::ColorRgba(vec![Vec4::ONE]))
            .unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let mesh = &scene.meshes[0];

        assert_eq!(face_indices(mesh), vec![vec![0, 1], vec![1, 2]]);
        assert_eq!(mesh.primitive_types, PrimitiveTypes::LINE);
        assert_eq!(mesh.colors, Some(vec![Vec4::ONE; 3]));
    }

    #[test]
    fn test_point_set() {
        let mut builder = root();
        add_shape(
            &mut builder,
            NodeKind::PointSet,
            Geometry::new(GeometrySource::Points),
            quad(),
        );

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        assert_eq!(scene.meshes[0].face_count(), 4);
        assert_eq!(scene.meshes[0].primitive_types, PrimitiveTypes::POINT);
    }

    #[test]
    fn test_metadata_flattening() {
        let mut builder = root();
        builder
            .enter_node(NodeKind::MetadataSet, metadata("set", MetaValue::Set))
            .unwrap();
        builder
            .add_node(
                NodeKind::MetadataDouble,
                metadata("scale", MetaValue::Double(vec![2.5, 3.0])),
            )
            .unwrap();
        builder
            .add_node(NodeKind::MetadataFloat, metadata("empty", MetaValue::Float(vec![])))
            .unwrap();
        builder.exit();
        builder
            .add_node(
                NodeKind::MetadataBoolean,
                metadata("visible", MetaValue::Boolean(vec![true])),
            )
            .unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        let keys: Vec<_> = scene.root.metadata.keys().cloned().collect();

        assert_eq!(keys, vec!["scale".to_string(), "visible".to_string()]);
        assert_eq!(scene.root.metadata["scale"], MetadataValue::Double(2.5));
    }

    #[test]
    fn test_used_shape_materializes_in_each_placement() {
        let mut builder = root();
        let shape = builder.enter_node(NodeKind::Shape, NodeData::Shape).unwrap();
        builder.declare(shape, "S").unwrap();
        builder
            .enter_node(NodeKind::PointSet, NodeData::Geometry(Geometry::new(GeometrySource::Points)))
            .unwrap();
        builder
            .add_node(NodeKind::Coordinate, NodeData::Coordinate(quad()))
            .unwrap();
        builder.exit();
        builder.exit();
        builder.enter_group(GroupData::default()).unwrap();
        builder.use_node("S", NodeKind::Shape).unwrap();

        let scene = materialize(&builder.finish().unwrap(), "test").unwrap();
        assert_eq!(scene.mesh_count(), 2);
        assert_eq!(scene.root.meshes, vec![0]);
        assert_eq!(scene.root.children[0].meshes, vec![1]);
    }

    #[test]
    fn test_texture_mapping_by_kind() {
        assert_eq!(texture_mapping_for(NodeKind::Box), TextureMapping::Box);
        assert_eq!(texture_mapping_for(NodeKind::Cone), TextureMapping::Cylinder);
        assert_eq!(texture_mapping_for(NodeKind::Sphere), TextureMapping::Sphere);
        assert_eq!(texture_mapping_for(NodeKind::IndexedFaceSet), TextureMapping::Plane);
    }
}
