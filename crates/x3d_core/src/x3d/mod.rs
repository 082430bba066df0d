//! X3D document import.
//!
//! This module provides:
//! - [`SourceNode`]/[`DocNode`]: the tokenized input tree
//! - [`read_document`]: DEF/USE-aware reading into a scene graph
//! - [`materialize`]: conversion of the graph into an output [`Scene`](crate::scene::Scene)
//! - [`import_document`]: both steps with [`ImportOptions`]

pub mod generator;
pub mod loader;
pub mod postprocess;
pub mod reader;
pub mod source;

pub use generator::{NoShapeGenerator, ShapeGenerator};
pub use loader::{import_document, import_document_with, ImportError, ImportOptions, ImportResult};
pub use postprocess::{materialize, texture_mapping_for};
pub use reader::{read_document, SKIPPED_NODES};
pub use source::{AttrValue, Attributes, DocNode, SourceNode};
