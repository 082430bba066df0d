//! In-progress document tree with `DEF`/`USE` node sharing.
//!
//! Nodes live in an arena owned by [`SceneGraph`] and refer to each other by
//! [`NodeId`]. Every node has exactly one owning parent; a `USE` adds a
//! [`Child::Used`] placement elsewhere without changing ownership, so the
//! graph is a DAG layered over an owning tree.

mod builder;
mod node;

pub use builder::*;
pub use node::*;

use thiserror::Error;

/// Reference and structure errors raised while building the graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("USE \"{name}\" does not match any {kind} node in scope")]
    UnresolvedReference { name: String, kind: NodeKind },

    #[error("node \"{name}\" cannot both DEF and USE")]
    DefAndUse { name: String },

    #[error("DEF \"{name}\" is already defined for a {kind} node in this scope")]
    DuplicateDefinition { name: String, kind: NodeKind },

    #[error("USE \"{name}\" would place a node inside itself")]
    CyclicReference { name: String },

    #[error("no active scope to attach a {0} node to")]
    NoActiveScope(NodeKind),

    #[error("document has no root node")]
    MissingRoot,
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
