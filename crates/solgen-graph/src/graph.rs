//! C9 continued: the file-level directed dependency graph itself. An edge
//! A -> B means B is a dependency of A (spec.md §3.1, §3.2).

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use solgen_hir::DependencyNode;

use crate::deps::parse_file_dependencies;

#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_for(&mut self, path: &str) -> NodeIndex {
        if let Some(idx) = self.index.get(path) {
            return *idx;
        }
        let idx = self.graph.add_node(path.to_string());
        self.index.insert(path.to_string(), idx);
        idx
    }

    pub fn add_file(&mut self, path: &str) {
        self.node_for(path);
    }

    /// Adds an edge meaning `from` includes `to`. Tolerates cycles: the
    /// edge is added unconditionally, and traversal below is guarded by a
    /// visited set.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.node_for(from);
        let to_idx = self.node_for(to);
        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Builds a graph from every file's content, resolving only quoted
    /// includes (spec.md §4.9).
    pub fn build(files: &[(String, String)]) -> Self {
        let mut graph = Self::new();
        for (path, _) in files {
            graph.add_file(path);
        }
        for (path, content) in files {
            let dir = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
            let parsed = parse_file_dependencies(content, dir);
            for include in parsed.includes.into_iter().filter(|i| i.is_quoted) {
                if let Some(resolved) = include.resolved {
                    graph.add_dependency(path, &resolved);
                }
            }
        }
        graph
    }

    /// Depth-first transitive dependency set of `path`, guarded against
    /// cycles by petgraph's own visited-set `Dfs` walker.
    pub fn transitive_dependencies(&self, path: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let Some(&start) = self.index.get(path) else {
            return result;
        };
        let mut dfs = Dfs::new(&self.graph, start);
        dfs.next(&self.graph); // skip the start node itself
        while let Some(node) = dfs.next(&self.graph) {
            result.insert(self.graph[node].clone());
        }
        result
    }

    /// Files that directly include `path`.
    pub fn direct_dependents(&self, path: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(path) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    pub fn direct_dependencies(&self, path: &str) -> Vec<String> {
        let Some(&idx) = self.index.get(path) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Exports the graph as the persisted-shape `DependencyNode` list
    /// (spec.md §3.1). Recomputed every invocation; never itself
    /// persisted (spec.md §3.3).
    pub fn to_nodes(&self) -> Vec<DependencyNode> {
        self.index
            .keys()
            .map(|path| {
                let mut node = DependencyNode::new(path.clone());
                node.dependencies = self.direct_dependencies(path).into_iter().collect();
                node.dependents = self.direct_dependents(path).into_iter().collect();
                node
            })
            .collect()
    }
}
