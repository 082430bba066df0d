//! Scope-tracking construction of the scene graph.

use crate::graph::{
    Child, GraphError, GraphResult, GroupData, NodeData, NodeElement, NodeId, NodeKind,
};

/// The node arena produced by [`GraphBuilder`].
///
/// Nodes are stored in creation order, which is also `NodeId` order.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<NodeElement>,
    root: Option<NodeId>,
}

impl SceneGraph {
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeElement> {
        self.nodes.get(id.0)
    }

    /// Look up a node created by this graph's builder.
    pub fn node(&self, id: NodeId) -> &NodeElement {
        &self.nodes[id.0]
    }

    /// All nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeElement)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Owned and used children of a node, in document order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().map(|child| child.id())
    }

    /// Whether `id` is `ancestor` or lies in its owning subtree.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    /// Walk owning parents from `from` to the nearest static group.
    fn search_root(&self, from: Option<NodeId>) -> Option<NodeId> {
        let mut cursor = from;
        while let Some(id) = cursor {
            let node = self.node(id);
            if node.is_static_group() {
                return Some(id);
            }
            cursor = node.parent;
        }
        None
    }

    /// Find the first node, in creation order, with this `DEF` name and kind
    /// that is visible from `from`.
    ///
    /// Below a static group only that group's subtree is visible; otherwise
    /// the whole document is.
    pub fn find(&self, name: &str, kind: NodeKind, from: Option<NodeId>) -> Option<NodeId> {
        let search_root = self.search_root(from);

        self.iter()
            .filter(|(_, node)| node.kind == kind && node.id.as_deref() == Some(name))
            .map(|(id, _)| id)
            .find(|&id| search_root.map_or(true, |root| self.is_within(id, root)))
    }
}

/// Builds a [`SceneGraph`] with an explicit current-scope cursor.
///
/// `enter_*` pushes a new scope, [`exit`](Self::exit) pops back to the
/// owning parent.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: SceneGraph,
    current: Option<NodeId>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active scope, if any.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    fn push_node(&mut self, mut element: NodeElement) -> NodeId {
        let id = NodeId(self.graph.nodes.len());
        element.parent = self.current;
        self.graph.nodes.push(element);

        if let Some(parent) = self.current {
            self.graph.nodes[parent.0].children.push(Child::Owned(id));
        }
        id
    }

    /// Create a group in the current scope and make it the new scope.
    ///
    /// With no active scope the group becomes the document root.
    pub fn enter_group(&mut self, group: GroupData) -> GraphResult<NodeId> {
        if self.current.is_none() && self.graph.root.is_some() {
            return Err(GraphError::NoActiveScope(NodeKind::Group));
        }

        let id = self.push_node(NodeElement::new(NodeKind::Group, NodeData::Group(group)));
        if self.graph.root.is_none() {
            self.graph.root = Some(id);
        }
        self.current = Some(id);
        Ok(id)
    }

    /// Create a node in the current scope without entering it.
    pub fn add_node(&mut self, kind: NodeKind, data: NodeData) -> GraphResult<NodeId> {
        if self.current.is_none() {
            return Err(GraphError::NoActiveScope(kind));
        }
        Ok(self.push_node(NodeElement::new(kind, data)))
    }

    /// Create a container node in the current scope and make it the new scope.
    pub fn enter_node(&mut self, kind: NodeKind, data: NodeData) -> GraphResult<NodeId> {
        let id = self.add_node(kind, data)?;
        self.current = Some(id);
        Ok(id)
    }

    /// Pop to the owning parent of the current scope.
    pub fn exit(&mut self) {
        if let Some(current) = self.current {
            self.current = self.graph.node(current).parent;
        }
    }

    /// Record a `DEF` name on a freshly created node.
    pub fn declare(&mut self, id: NodeId, name: &str) -> GraphResult<()> {
        let node = self.graph.node(id);
        let kind = node.kind;

        if self.graph.find(name, kind, node.parent).is_some() {
            return Err(GraphError::DuplicateDefinition {
                name: name.to_string(),
                kind,
            });
        }

        self.graph.nodes[id.0].id = Some(name.to_string());
        Ok(())
    }

    /// Resolve a `USE` name from the current scope.
    pub fn resolve(&self, name: &str, kind: NodeKind) -> GraphResult<NodeId> {
        self.graph
            .find(name, kind, self.current)
            .ok_or_else(|| GraphError::UnresolvedReference {
                name: name.to_string(),
                kind,
            })
    }

    /// Resolve a `USE` name and place the node in the current scope.
    ///
    /// The node keeps its owner; the current scope only gains a
    /// [`Child::Used`] placement.
    pub fn use_node(&mut self, name: &str, kind: NodeKind) -> GraphResult<NodeId> {
        let current = self.current.ok_or(GraphError::NoActiveScope(kind))?;
        let id = self.resolve(name, kind)?;

        if self.graph.is_within(current, id) {
            return Err(GraphError::CyclicReference {
                name: name.to_string(),
            });
        }

        self.graph.nodes[current.0].children.push(Child::Used(id));
        Ok(id)
    }

    /// Finish building and return the graph.
    pub fn finish(self) -> GraphResult<SceneGraph> {
        if self.graph.root.is_none() {
            return Err(GraphError::MissingRoot);
        }
        Ok(self.graph)
    }
}
