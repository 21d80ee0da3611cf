//! Depth-first and breadth-first traversal over the inheritance graph.
//!
//! Traversals start from every root and walk successors in edge insertion
//! order. Each root gets its own visited set, so a vertex reachable from two
//! roots is reported once per root. Vertices rejected by the type filter are
//! walked through but never reported.

use std::collections::{HashSet, VecDeque};
use std::ops::ControlFlow;

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::builder::{EdgeKind, InheritanceGraph, Vertex, VertexType};

/// Traversal settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Only follow `parent -> child` edges. When false, edges are also
    /// followed backwards.
    pub directed: bool,
    /// Report only vertices of these types. `None` reports everything.
    pub type_filter: Option<Vec<VertexType>>,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        TraversalOptions {
            directed: true,
            type_filter: None,
        }
    }
}

impl TraversalOptions {
    /// Directed traversal reporting only `types`.
    pub fn filtered(types: impl IntoIterator<Item = VertexType>) -> Self {
        TraversalOptions {
            directed: true,
            type_filter: Some(types.into_iter().collect()),
        }
    }

    pub fn undirected(mut self) -> Self {
        self.directed = false;
        self
    }

    fn accepts(&self, vertex: &Vertex) -> bool {
        self.type_filter
            .as_ref()
            .is_none_or(|types| types.contains(&vertex.vertex_type))
    }

    fn directions(&self) -> &'static [Direction] {
        if self.directed {
            &[Direction::Outgoing]
        } else {
            &[Direction::Outgoing, Direction::Incoming]
        }
    }
}

/// One reported vertex.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'g> {
    pub vertex: &'g Vertex,
    /// Edge the vertex was reached through; `None` for roots.
    pub edge: Option<EdgeKind>,
    /// Vertex the traversal came from, filtered or not; `None` for roots.
    pub parent: Option<&'g Vertex>,
    /// Position of this report within the whole traversal.
    pub index: usize,
    /// Distance from the root, counting filtered vertices.
    pub depth: usize,
}

/// A pending step: where we are, how we got here, how far from the root.
#[derive(Clone, Copy)]
struct Step {
    idx: NodeIndex,
    parent: Option<NodeIndex>,
    edge: Option<EdgeKind>,
    depth: usize,
}

impl InheritanceGraph {
    /// Vertices accepted by the filter that have no incoming edge from
    /// another accepted vertex, in insertion order.
    pub fn roots(&self, options: &TraversalOptions) -> Vec<&Vertex> {
        self.root_indices(options)
            .into_iter()
            .map(|idx| &self.graph[idx])
            .collect()
    }

    fn root_indices(&self, options: &TraversalOptions) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|idx| options.accepts(&self.graph[*idx]))
            .filter(|idx| {
                !self
                    .graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .any(|parent| parent != *idx && options.accepts(&self.graph[parent]))
            })
            .collect()
    }

    /// Depth-first, pre-order traversal from every root.
    ///
    /// Returns `Break` if `visit` stopped the traversal.
    pub fn depth_first<F>(&self, mut visit: F, options: TraversalOptions) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_>) -> ControlFlow<()>,
    {
        let mut index = 0;
        for root in self.root_indices(&options) {
            let mut visited: HashSet<NodeIndex> = HashSet::new();
            let mut stack = vec![Step {
                idx: root,
                parent: None,
                edge: None,
                depth: 0,
            }];
            while let Some(step) = stack.pop() {
                if !visited.insert(step.idx) {
                    continue;
                }
                self.report(step, &options, &mut index, &mut visit)?;
                let successors = self.neighbors(step.idx, options.directions());
                for (_, next, edge) in successors.into_iter().rev() {
                    if !visited.contains(&next) {
                        stack.push(Step {
                            idx: next,
                            parent: Some(step.idx),
                            edge: Some(edge),
                            depth: step.depth + 1,
                        });
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Breadth-first traversal from every root.
    ///
    /// Returns `Break` if `visit` stopped the traversal.
    pub fn breadth_first<F>(&self, mut visit: F, options: TraversalOptions) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_>) -> ControlFlow<()>,
    {
        let mut index = 0;
        for root in self.root_indices(&options) {
            let mut visited: HashSet<NodeIndex> = HashSet::from([root]);
            let mut queue = VecDeque::from([Step {
                idx: root,
                parent: None,
                edge: None,
                depth: 0,
            }]);
            while let Some(step) = queue.pop_front() {
                self.report(step, &options, &mut index, &mut visit)?;
                for (_, next, edge) in self.neighbors(step.idx, options.directions()) {
                    if visited.insert(next) {
                        queue.push_back(Step {
                            idx: next,
                            parent: Some(step.idx),
                            edge: Some(edge),
                            depth: step.depth + 1,
                        });
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    fn report<F>(
        &self,
        step: Step,
        options: &TraversalOptions,
        index: &mut usize,
        visit: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(&Visit<'_>) -> ControlFlow<()>,
    {
        let vertex = &self.graph[step.idx];
        if !options.accepts(vertex) {
            return ControlFlow::Continue(());
        }
        let current = Visit {
            vertex,
            edge: step.edge,
            parent: step.parent.map(|idx| &self.graph[idx]),
            index: *index,
            depth: step.depth,
        };
        *index += 1;
        visit(&current)
    }

    /// Serializable snapshot of vertices and edges, in insertion order.
    pub fn to_json(&self) -> GraphJson {
        GraphJson {
            vertices: self
                .vertices()
                .map(|v| VertexJson {
                    id: v.id.clone(),
                    vertex_type: v.vertex_type,
                })
                .collect(),
            edges: self
                .edges()
                .map(|(source, target, _)| EdgeJson {
                    source: source.to_string(),
                    target: target.to_string(),
                })
                .collect(),
        }
    }
}

/// JSON form of an [`InheritanceGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphJson {
    pub vertices: Vec<VertexJson>,
    pub edges: Vec<EdgeJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexJson {
    pub id: String,
    #[serde(rename = "type")]
    pub vertex_type: VertexType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeJson {
    pub source: String,
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_graph, GraphKinds};
    use tugdts_ast::nodes::{DeclarationTree, NodeType};
    use tugdts_ast::parser::parse_source;

    fn graph(text: &str) -> InheritanceGraph {
        let tree = DeclarationTree::single(parse_source("t.d.ts", text).unwrap());
        build_graph(&tree, &GraphKinds::default())
    }

    fn dfs(g: &InheritanceGraph, options: TraversalOptions) -> Vec<String> {
        let mut out = Vec::new();
        let _ = g.depth_first(
            |v| {
                out.push(format!("{}@{}", v.vertex.id, v.depth));
                ControlFlow::Continue(())
            },
            options,
        );
        out
    }

    fn bfs(g: &InheritanceGraph, options: TraversalOptions) -> Vec<String> {
        let mut out = Vec::new();
        let _ = g.breadth_first(
            |v| {
                out.push(format!("{}@{}", v.vertex.id, v.depth));
                ControlFlow::Continue(())
            },
            options,
        );
        out
    }

    const TREE: &str = "declare class A {}\n\
        declare class B extends A {}\n\
        declare class C extends A {}\n\
        declare class D extends B {}";

    #[test]
    fn depth_first_pre_order() {
        let g = graph(TREE);
        assert_eq!(
            dfs(&g, TraversalOptions::default()),
            vec!["A@0", "B@1", "D@2", "C@1"]
        );
    }

    #[test]
    fn breadth_first_by_level() {
        let g = graph(TREE);
        assert_eq!(
            bfs(&g, TraversalOptions::default()),
            vec!["A@0", "B@1", "C@1", "D@2"]
        );
    }

    #[test]
    fn visit_reports_parent_edge_and_index() {
        let g = graph(TREE);
        let mut seen = Vec::new();
        let _ = g.depth_first(
            |v| {
                seen.push((
                    v.index,
                    v.vertex.id.clone(),
                    v.parent.map(|p| p.id.clone()),
                    v.edge,
                ));
                ControlFlow::Continue(())
            },
            TraversalOptions::default(),
        );
        assert_eq!(seen[0], (0, "A".to_string(), None, None));
        assert_eq!(
            seen[2],
            (2, "D".to_string(), Some("B".to_string()), Some(EdgeKind::Extends))
        );
    }

    #[test]
    fn break_stops_traversal() {
        let g = graph(TREE);
        let mut count = 0;
        let flow = g.depth_first(
            |v| {
                count += 1;
                if v.vertex.id == "B" {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
            TraversalOptions::default(),
        );
        assert!(flow.is_break());
        assert_eq!(count, 2);
    }

    #[test]
    fn filtered_vertices_are_walked_through() {
        let g = graph(
            "declare class A {}\ninterface I {}\n\
             declare class B extends A implements I {}\ninterface J extends I {}",
        );
        let classes = TraversalOptions::filtered([VertexType::Node(NodeType::Class)]);
        assert_eq!(dfs(&g, classes), vec!["A@0", "B@1"]);

        // An external parent is not a class, so its children become roots.
        let g = graph("declare class B extends Ext {}\ndeclare class C extends B {}");
        let classes = TraversalOptions::filtered([VertexType::Node(NodeType::Class)]);
        let roots: Vec<_> = g.roots(&classes).iter().map(|v| v.id.clone()).collect();
        assert_eq!(roots, vec!["B"]);
        assert_eq!(dfs(&g, classes), vec!["B@0", "C@1"]);
    }

    #[test]
    fn depth_counts_filtered_vertices() {
        let g = graph("declare class A {}\ninterface I extends A {}\ndeclare class B implements I {}");
        let classes = TraversalOptions::filtered([VertexType::Node(NodeType::Class)]);
        // B has no class parent, so it is also a root of its own.
        assert_eq!(dfs(&g, classes), vec!["A@0", "B@2", "B@0"]);
    }

    #[test]
    fn reachable_from_two_roots_is_visited_per_root() {
        let g = graph("interface I {}\ninterface J {}\ninterface K extends I, J {}");
        assert_eq!(
            dfs(&g, TraversalOptions::default()),
            vec!["I@0", "K@1", "J@0", "K@1"]
        );
        assert_eq!(
            bfs(&g, TraversalOptions::default()),
            vec!["I@0", "K@1", "J@0", "K@1"]
        );
    }

    #[test]
    fn undirected_follows_edges_backwards() {
        let g = graph(TREE);
        let out = dfs(&g, TraversalOptions::default().undirected());
        assert_eq!(out, vec!["A@0", "B@1", "D@2", "C@1"]);

        let g = graph("interface I {}\ninterface J {}\ninterface K extends I, J {}");
        let out = dfs(&g, TraversalOptions::default().undirected());
        assert_eq!(out, vec!["I@0", "K@1", "J@2", "J@0", "K@1", "I@2"]);
    }

    #[test]
    fn to_json_lists_vertices_and_edges() {
        let g = graph("declare class B extends A {}\ndeclare function f(): void;");
        let json = serde_json::to_value(g.to_json()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "vertices": [
                    {"id": "B", "type": "class"},
                    {"id": "A", "type": "external"},
                    {"id": "f", "type": "function"}
                ],
                "edges": [{"source": "A", "target": "B"}]
            })
        );
    }
}
