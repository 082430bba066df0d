//! Host hook for closed-form geometry.
//!
//! Boxes, spheres, arcs, extrusions and the other generator-backed kinds
//! carry shape parameters rather than vertex lists. The reader hands those
//! elements to a [`ShapeGenerator`] and stores whatever vertices it returns.

use crate::graph::{GeneratedGeometry, NodeKind};
use crate::x3d::{ImportResult, SourceNode};

/// Produces vertices for one generator-backed geometry element.
pub trait ShapeGenerator {
    /// Generate geometry for `node`, an element of the given kind.
    ///
    /// `Ok(None)` means the kind is not supported by this generator; the
    /// element then contributes no mesh.
    fn generate<N: SourceNode>(
        &self,
        kind: NodeKind,
        node: &N,
    ) -> ImportResult<Option<GeneratedGeometry>>;
}

/// A generator that supports nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoShapeGenerator;

impl ShapeGenerator for NoShapeGenerator {
    fn generate<N: SourceNode>(
        &self,
        _kind: NodeKind,
        _node: &N,
    ) -> ImportResult<Option<GeneratedGeometry>> {
        Ok(None)
    }
}
