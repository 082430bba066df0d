//! X3D Core - Scene import for X3D documents.
//!
//! This crate provides:
//!
//! - **Index streams**: `-1`-delimited face decoding and primitive-set expansion
//! - **Attribute binding**: colors, normals, and texture coordinates onto meshes
//! - **Scene graph**: DEF/USE node sharing with static lookup scopes
//! - **Import**: document reading and materialization into a flat `Scene`
//!
//! # Example
//!
//! ```ignore
//! use x3d_core::{import_document, DocNode, ImportOptions};
//!
//! let doc: DocNode = serde_json::from_str(&text)?;
//! let scene = import_document(&doc, &ImportOptions::default())?;
//! println!("Imported {} meshes, {} lights",
//!     scene.mesh_count(),
//!     scene.light_count());
//! ```

pub mod geometry;
pub mod graph;
pub mod mesh;
pub mod scene;
pub mod x3d;

// Re-export commonly used types
pub use mesh::{Face, Mesh, PrimitiveTypes};
pub use scene::{Light, LightKind, Material, Scene, SceneNode};
pub use x3d::{import_document, import_document_with, DocNode, ImportError, ImportOptions};
