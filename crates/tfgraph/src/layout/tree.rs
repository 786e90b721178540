//! Nested geometry produced by the layout engine.
//!
//! A [`Geometry`] is a tree of rectangles rooted at the canvas. Every node
//! carries a stable [`Id`] built with the `parent::child` scheme, and, when it
//! draws a diagram element, the id of that element so a renderer can bind
//! shapes back to services, subnets and access points.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Serialize, Serializer, ser::SerializeStruct};

use tfgraph_core::{
    geometry::{Bounds, Insets},
    identifier::Id,
};

use crate::config::LayoutConfig;

/// Whether a node may hold children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Container,
    Leaf,
}

/// What a geometry node draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Canvas,
    ServiceRow,
    Network,
    Zone,
    Subnet,
    Service,
    AccessPoint,
}

impl NodeKind {
    /// Returns the role implied by the kind.
    pub fn role(self) -> NodeRole {
        match self {
            NodeKind::Service | NodeKind::AccessPoint => NodeRole::Leaf,
            _ => NodeRole::Container,
        }
    }

    /// Returns the space kept clear between a node of this kind and its
    /// children. The top inset of containers with a title includes the
    /// header.
    pub fn padding(self, config: &LayoutConfig) -> Insets {
        match self {
            NodeKind::Canvas => Insets::uniform(config.canvas_padding),
            NodeKind::ServiceRow => Insets::uniform(config.service_gap),
            NodeKind::Network => Insets::new(
                config.container_header,
                config.container_padding,
                config.container_padding,
                config.container_padding,
            ),
            NodeKind::Zone => Insets::new(
                config.zone_header,
                config.subnet_padding,
                config.subnet_gap,
                config.subnet_padding,
            ),
            NodeKind::Subnet => Insets::uniform(config.subnet_gap),
            NodeKind::Service | NodeKind::AccessPoint => Insets::uniform(0.0),
        }
    }
}

/// One rectangle of the geometry tree.
#[derive(Debug, Clone, Serialize)]
pub struct GeometryNode {
    id: Id,
    kind: NodeKind,
    role: NodeRole,
    bounds: Bounds,
    #[serde(skip_serializing_if = "Option::is_none")]
    element: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
    children: Vec<Id>,
}

impl GeometryNode {
    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Returns the node's rectangle in absolute canvas coordinates.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the id of the diagram element this node draws, if any.
    pub fn element(&self) -> Option<&Id> {
        self.element.as_ref()
    }

    pub fn parent(&self) -> Option<&Id> {
        self.parent.as_ref()
    }

    /// Returns child ids in insertion order.
    pub fn children(&self) -> &[Id] {
        &self.children
    }
}

/// The complete geometry tree.
#[derive(Debug, Clone)]
pub struct Geometry {
    nodes: IndexMap<Id, GeometryNode>,
    elements: HashMap<Id, Id>,
}

impl Geometry {
    /// Creates a tree holding only the canvas root.
    pub(crate) fn new(root: Id, bounds: Bounds) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(
            root.clone(),
            GeometryNode {
                id: root,
                kind: NodeKind::Canvas,
                role: NodeRole::Container,
                bounds,
                element: None,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            elements: HashMap::new(),
        }
    }

    /// Adds a child node under `parent` and returns its id.
    pub(crate) fn insert(
        &mut self,
        parent: &Id,
        segment: &str,
        kind: NodeKind,
        bounds: Bounds,
        element: Option<&Id>,
    ) -> Id {
        let id = parent.create_nested(segment);
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.push(id.clone());
        }
        if let Some(element) = element {
            self.elements.insert(element.clone(), id.clone());
        }
        self.nodes.insert(
            id.clone(),
            GeometryNode {
                id: id.clone(),
                kind,
                role: kind.role(),
                bounds,
                element: element.cloned(),
                parent: Some(parent.clone()),
                children: Vec::new(),
            },
        );
        id
    }

    /// Returns the canvas node.
    pub fn root(&self) -> &GeometryNode {
        // The canvas is inserted first and never removed.
        &self.nodes[0]
    }

    /// Returns the canvas size as bounds.
    pub fn bounds(&self) -> Bounds {
        self.root().bounds
    }

    /// Looks up a node by its geometry id.
    pub fn node(&self, id: &Id) -> Option<&GeometryNode> {
        self.nodes.get(id)
    }

    /// Looks up the node that draws a diagram element.
    pub fn node_for(&self, element: &Id) -> Option<&GeometryNode> {
        self.elements.get(element).and_then(|id| self.nodes.get(id))
    }

    /// Returns the children of a node in insertion order.
    pub fn children<'a>(&'a self, id: &Id) -> impl Iterator<Item = &'a GeometryNode> + 'a {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.nodes.get(child))
    }

    /// Returns all nodes, parents before children.
    pub fn nodes(&self) -> impl Iterator<Item = &GeometryNode> {
        self.nodes.values()
    }

    /// Returns all nodes of one kind.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &GeometryNode> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the canvas root is always present.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Serialize for Geometry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bounds = self.bounds();
        let nodes: Vec<&GeometryNode> = self.nodes.values().collect();

        let mut state = serializer.serialize_struct("Geometry", 3)?;
        state.serialize_field("width", &bounds.width())?;
        state.serialize_field("height", &bounds.height())?;
        state.serialize_field("nodes", &nodes)?;
        state.end()
    }
}
