//! High-level X3D import.
//!
//! Reads a tokenized document into a scene graph, then materializes the
//! graph into a [`Scene`]. Any error aborts the whole import; no partial
//! scene is returned.

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::GeometryError;
use crate::graph::{GraphError, NodeKind};
use crate::scene::Scene;
use crate::x3d::{materialize, read_document, NoShapeGenerator, ShapeGenerator, SourceNode};

/// Errors that can occur during X3D import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Reference error: {0}")]
    Graph(#[from] GraphError),

    #[error("Unknown node \"{name}\" in {parent}")]
    UnsupportedNode { name: String, parent: String },

    #[error("Attribute \"{attribute}\" of <{node}> should be {expected}, found {found}")]
    InvalidAttribute {
        node: String,
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("<{node}> is missing required attribute \"{attribute}\"")]
    MissingAttribute { node: String, attribute: String },

    #[error("Document root is not an <X3D> element")]
    MissingRoot,

    #[error("Unexpected {kind} node in {context}")]
    UnexpectedNode {
        kind: NodeKind,
        context: &'static str,
    },

    #[error("Invalid Shape: {reason}")]
    InvalidShape { reason: &'static str },

    #[error("No geometry found in X3D document")]
    NoGeometry,
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Import settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Name of the output scene, and of the root node when it has no `DEF`
    pub scene_name: String,

    /// Fail with [`ImportError::NoGeometry`] when no mesh is produced
    pub require_geometry: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            scene_name: "x3d".to_string(),
            require_geometry: false,
        }
    }
}

/// Import a document without a shape generator.
///
/// Boxes, spheres and the other closed-form shapes produce no meshes; use
/// [`import_document_with`] to supply their vertices.
///
/// # Example
///
/// ```ignore
/// use x3d_core::x3d::{import_document, DocNode, ImportOptions};
///
/// let doc: DocNode = serde_json::from_str(&text)?;
/// let scene = import_document(&doc, &ImportOptions::default())?;
/// println!("Imported {} meshes", scene.mesh_count());
/// ```
pub fn import_document<N: SourceNode>(root: &N, options: &ImportOptions) -> ImportResult<Scene> {
    import_document_with(root, options, &NoShapeGenerator)
}

/// Import a document, generating closed-form shapes with `generator`.
pub fn import_document_with<N, G>(
    root: &N,
    options: &ImportOptions,
    generator: &G,
) -> ImportResult<Scene>
where
    N: SourceNode,
    G: ShapeGenerator,
{
    let graph = read_document(root, generator)?;
    log::debug!("Read {} nodes", graph.len());

    let scene = materialize(&graph, &options.scene_name)?;
    if options.require_geometry && scene.meshes.is_empty() {
        return Err(ImportError::NoGeometry);
    }

    log::info!(
        "Imported '{}': {} meshes, {} materials, {} lights, {} nodes",
        scene.name,
        scene.mesh_count(),
        scene.material_count(),
        scene.light_count(),
        scene.node_count()
    );
    Ok(scene)
}
