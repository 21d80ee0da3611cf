//! Inheritance graph construction.
//!
//! [`build_graph`] walks the top-level declarations of a tree once, in
//! bundle order, and records:
//!
//! - one vertex per declaration whose kind is in the [`GraphKinds`] set,
//! - one `parent -> child` edge per resolvable heritage clause of a class or
//!   interface,
//! - a [`NodeRegistry`] mapping each declared name to its position.
//!
//! Heritage names with no declaration in the tree become
//! [`VertexType::External`] vertices. Construction never fails: malformed
//! or self-referential heritage is skipped, duplicate names overwrite.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tugdts_ast::nodes::{DeclarationTree, Node, NodeKind, NodeType};

// ============================================================================
// Registry
// ============================================================================

/// Position of a top-level declaration: file index within the bundle and
/// statement index within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodePath {
    pub file: usize,
    pub index: usize,
}

impl NodePath {
    pub fn new(file: usize, index: usize) -> Self {
        NodePath { file, index }
    }

    /// The node at this path, if the tree still has one there.
    pub fn resolve<'t>(&self, tree: &'t DeclarationTree) -> Option<&'t Node> {
        tree.statement(self.file, self.index)
    }

    pub fn resolve_mut<'t>(&self, tree: &'t mut DeclarationTree) -> Option<&'t mut Node> {
        tree.statement_mut(self.file, self.index)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.index)
    }
}

/// Declared name to position. The last declaration of a name wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeRegistry {
    entries: BTreeMap<String, NodePath>,
}

impl NodeRegistry {
    /// Register `name`, replacing any earlier entry.
    pub fn insert(&mut self, name: impl Into<String>, path: NodePath) {
        self.entries.insert(name.into(), path);
    }

    pub fn get(&self, name: &str) -> Option<NodePath> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodePath)> {
        self.entries.iter().map(|(name, path)| (name.as_str(), *path))
    }
}

// ============================================================================
// Vertices and Edges
// ============================================================================

/// What a vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexType {
    /// A declaration of this kind in the tree.
    Node(NodeType),
    /// A heritage name with no declaration in the tree.
    External,
}

impl VertexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VertexType::Node(ty) => ty.as_str(),
            VertexType::External => "external",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "external" => Some(VertexType::External),
            other => NodeType::parse(other).map(VertexType::Node),
        }
    }
}

impl From<NodeType> for VertexType {
    fn from(ty: NodeType) -> Self {
        VertexType::Node(ty)
    }
}

impl fmt::Display for VertexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for VertexType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for VertexType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        VertexType::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown vertex type: {}", s)))
    }
}

/// A graph vertex, identified by declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub id: String,
    pub vertex_type: VertexType,
}

/// Heritage relation carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Extends,
    Implements,
}

/// Declaration kinds that become vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphKinds {
    kinds: BTreeSet<NodeType>,
}

impl GraphKinds {
    pub fn new(kinds: impl IntoIterator<Item = NodeType>) -> Self {
        GraphKinds {
            kinds: kinds.into_iter().collect(),
        }
    }

    pub fn contains(&self, ty: NodeType) -> bool {
        self.kinds.contains(&ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeType> + '_ {
        self.kinds.iter().copied()
    }
}

impl Default for GraphKinds {
    /// Classes, interfaces, functions, variables and type aliases.
    fn default() -> Self {
        GraphKinds::new([
            NodeType::Class,
            NodeType::Interface,
            NodeType::Function,
            NodeType::Variable,
            NodeType::TypeAlias,
        ])
    }
}

// ============================================================================
// Graph
// ============================================================================

/// Directed `parent -> child` inheritance graph over top-level declarations.
#[derive(Debug, Clone, Default)]
pub struct InheritanceGraph {
    pub(crate) graph: DiGraph<Vertex, EdgeKind>,
    ids: HashMap<String, NodeIndex>,
    registry: NodeRegistry,
}

impl InheritanceGraph {
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn vertex(&self, id: &str) -> Option<&Vertex> {
        self.ids.get(id).map(|idx| &self.graph[*idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.graph.node_indices().map(|idx| &self.graph[idx])
    }

    /// `(source, target, kind)` for every edge, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, EdgeKind)> {
        self.graph.edge_references().map(|edge| {
            (
                self.graph[edge.source()].id.as_str(),
                self.graph[edge.target()].id.as_str(),
                *edge.weight(),
            )
        })
    }

    /// Direct parents of `id` (incoming edges), in insertion order.
    pub fn parents(&self, id: &str) -> Vec<&Vertex> {
        self.adjacent(id, Direction::Incoming)
    }

    /// Direct children of `id` (outgoing edges), in insertion order.
    pub fn children(&self, id: &str) -> Vec<&Vertex> {
        self.adjacent(id, Direction::Outgoing)
    }

    fn adjacent(&self, id: &str, direction: Direction) -> Vec<&Vertex> {
        let Some(idx) = self.ids.get(id) else {
            return Vec::new();
        };
        self.neighbors(*idx, &[direction])
            .into_iter()
            .map(|(_, other, _)| &self.graph[other])
            .collect()
    }

    /// Neighbors of `idx` across `directions`, ordered by edge insertion.
    ///
    /// petgraph yields adjacent edges newest first, so they are re-sorted by
    /// edge index.
    pub(crate) fn neighbors(
        &self,
        idx: NodeIndex,
        directions: &[Direction],
    ) -> Vec<(EdgeIndex, NodeIndex, EdgeKind)> {
        let mut out: Vec<(EdgeIndex, NodeIndex, EdgeKind)> = Vec::new();
        for direction in directions {
            for edge in self.graph.edges_directed(idx, *direction) {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                out.push((edge.id(), other, *edge.weight()));
            }
        }
        out.sort_by_key(|(edge, _, _)| edge.index());
        out
    }

    /// Add `id` or update its type. Declarations override `External`, and
    /// a later declaration overrides an earlier one.
    fn upsert_vertex(&mut self, id: &str, vertex_type: VertexType) -> NodeIndex {
        if let Some(idx) = self.ids.get(id) {
            let idx = *idx;
            if vertex_type != VertexType::External {
                self.graph[idx].vertex_type = vertex_type;
            }
            return idx;
        }
        let idx = self.graph.add_node(Vertex {
            id: id.to_string(),
            vertex_type,
        });
        self.ids.insert(id.to_string(), idx);
        idx
    }

    /// Add `parent -> child` unless that pair is already connected.
    fn add_edge_once(&mut self, parent: NodeIndex, child: NodeIndex, kind: EdgeKind) {
        if self.graph.find_edge(parent, child).is_none() {
            self.graph.add_edge(parent, child, kind);
        }
    }
}

// ============================================================================
// Building
// ============================================================================

/// Build the inheritance graph and name registry for `tree`.
///
/// # Arguments
///
/// * `tree` - Declarations to scan; only top-level statements are read.
/// * `kinds` - Declaration kinds that become vertices.
///
/// Classes and interfaces add edges from their heritage clauses. A class
/// contributes its single `extends` parent and every `implements` entry;
/// an interface contributes every `extends` entry.
pub fn build_graph(tree: &DeclarationTree, kinds: &GraphKinds) -> InheritanceGraph {
    let mut graph = InheritanceGraph::default();

    for (file, index, node) in tree.top_level() {
        let ty = node.node_type();
        if !kinds.contains(ty) {
            continue;
        }
        let Some(name) = node.name() else {
            continue;
        };
        graph.registry.insert(name, NodePath::new(file, index));
        let child = graph.upsert_vertex(name, VertexType::Node(ty));

        for (parent_name, edge_kind) in heritage_edges(node) {
            if parent_name == name {
                continue;
            }
            let parent = graph.upsert_vertex(parent_name, VertexType::External);
            graph.add_edge_once(parent, child, edge_kind);
        }
    }

    tracing::debug!(
        "built inheritance graph: {} vertices, {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    graph
}

/// Parent names and edge kinds declared by `node`, skipping clauses that
/// are not dotted identifiers.
fn heritage_edges(node: &Node) -> Vec<(&str, EdgeKind)> {
    let (extends, implements) = match &node.kind {
        NodeKind::Class(decl) => (
            decl.heritage.extends.iter().take(1).collect::<Vec<_>>(),
            decl.heritage.implements.iter().collect::<Vec<_>>(),
        ),
        NodeKind::Interface(decl) => (decl.heritage.extends.iter().collect(), Vec::new()),
        NodeKind::Function(_)
        | NodeKind::Variable(_)
        | NodeKind::TypeAlias(_)
        | NodeKind::Method(_)
        | NodeKind::Property(_)
        | NodeKind::Constructor(_)
        | NodeKind::Parameter(_)
        | NodeKind::Import(_)
        | NodeKind::Namespace(_)
        | NodeKind::Raw(_) => return Vec::new(),
    };

    extends
        .into_iter()
        .map(|clause| (clause, EdgeKind::Extends))
        .chain(implements.into_iter().map(|clause| (clause, EdgeKind::Implements)))
        .filter(|(clause, _)| clause.is_resolvable())
        .map(|(clause, kind)| (clause.base_name(), kind))
        .collect()
}
