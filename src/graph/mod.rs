//! Dependency graph over document anchors.
//!
//! Every anchored node becomes a graph node named by its anchor identifier.
//! Anchored mappings may list their dependencies under a configurable field
//! (for example `depends_on`) as aliases to other anchors:
//!
//! ```yaml
//! build: &build
//!   script: make
//! test: &test
//!   depends_on: [*build]
//! deploy: &deploy
//!   depends_on: *test   # a single alias is accepted too
//! ```
//!
//! An edge `from -> to` means `from` depends on `to`. The graph borrows the
//! [`Document`] it was built from, so the document cannot change while the
//! graph is alive.
//!
//! ```rust
//! use anchorage::document::Document;
//! use anchorage::graph::check_dependencies;
//!
//! let doc = Document::parse("a: &a {}\nb: &b {depends_on: [*a]}\n")?;
//! let graph = check_dependencies(&doc, "depends_on")?;
//! assert_eq!(graph.dependencies_of("b"), Some(&["a".to_string()][..]));
//! # Ok::<(), anchorage::core::AnchorageError>(())
//! ```

mod builder;
mod cycles;

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::core::{AnchorageError, Result};
use crate::document::{Document, Node};

/// A graph node: one anchored node of the document.
#[derive(Debug, Clone)]
pub struct DependencyNode<'a> {
    /// Anchor identifier
    pub id: String,
    /// The anchored node in the document
    pub node: &'a Node,
    /// Identifiers this node depends on, in declaration order
    pub dependencies: Vec<String>,
}

impl fmt::Display for DependencyNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Directed graph of declared dependencies between anchors.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    graph: DiGraph<DependencyNode<'a>, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl<'a> DependencyGraph<'a> {
    /// Build the graph for `doc`, reading dependencies from `field`.
    pub fn build(doc: &'a Document, field: &str) -> Result<Self> {
        builder::build(doc, field)
    }

    fn empty() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    fn add_node(&mut self, id: &str, node: &'a Node) {
        let index = self.graph.add_node(DependencyNode {
            id: id.to_string(),
            node,
            dependencies: Vec::new(),
        });
        self.node_map.insert(id.to_string(), index);
    }

    /// Record that `from` depends on `to`. Both must already be nodes.
    fn add_dependency(&mut self, from: NodeIndex, to: NodeIndex) {
        let target = self.graph[to].id.clone();
        self.graph[from].dependencies.push(target);

        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// Look up a node by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DependencyNode<'a>> {
        self.node_map.get(id).map(|&index| &self.graph[index])
    }

    /// Whether `id` is a node of the graph.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.node_map.contains_key(id)
    }

    /// Nodes in anchor declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode<'a>> {
        self.graph.node_weights()
    }

    /// Node identifiers in anchor declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|node| node.id.as_str())
    }

    /// Direct dependencies of `id`, in declaration order.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> Option<&[String]> {
        self.get(id).map(|node| node.dependencies.as_slice())
    }

    /// Every node `id` depends on, directly or indirectly, breadth first.
    #[must_use]
    pub fn transitive_dependencies(&self, id: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        let mut queue = VecDeque::new();

        if let Some(node) = self.get(id) {
            queue.push_back(node);
            seen.insert(node.id.as_str());
        }

        while let Some(current) = queue.pop_front() {
            for dep in &current.dependencies {
                if let Some(dep_node) = self.get(dep)
                    && seen.insert(dep_node.id.as_str())
                {
                    deps.push(dep_node.id.as_str());
                    queue.push_back(dep_node);
                }
            }
        }

        deps
    }

    /// Nodes ordered so that every dependency comes before its dependents.
    pub fn topological_order(&self) -> Result<Vec<&DependencyNode<'a>>> {
        self.detect_cycles()?;

        let indices = toposort(&self.graph, None).map_err(|cycle| {
            let id = self.graph[cycle.node_id()].id.clone();
            AnchorageError::CycleDetected {
                chain: vec![id.clone()],
                id,
            }
        })?;

        Ok(indices.into_iter().rev().map(|index| &self.graph[index]).collect())
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of distinct dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the document declared no anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Render the dependencies of `root` as a tree.
    ///
    /// Nodes already printed on the current branch are marked as circular.
    #[must_use]
    pub fn to_tree_string(&self, root: &str) -> Option<String> {
        let node = self.get(root)?;
        let mut result = format!("{}\n", node.id);
        let mut branch = vec![node.id.as_str()];
        self.build_tree_string(node, &mut result, "", &mut branch);
        Some(result)
    }

    fn build_tree_string<'g>(
        &'g self,
        node: &'g DependencyNode<'a>,
        result: &mut String,
        prefix: &str,
        branch: &mut Vec<&'g str>,
    ) {
        let count = node.dependencies.len();
        for (i, dep) in node.dependencies.iter().enumerate() {
            let is_last = i + 1 == count;
            let (connector, child_prefix) = if is_last {
                ("└── ", format!("{prefix}    "))
            } else {
                ("├── ", format!("{prefix}│   "))
            };

            if branch.contains(&dep.as_str()) {
                result.push_str(&format!("{prefix}{connector}{dep} (circular reference)\n"));
                continue;
            }
            result.push_str(&format!("{prefix}{connector}{dep}\n"));

            if let Some(dep_node) = self.get(dep) {
                branch.push(dep_node.id.as_str());
                self.build_tree_string(dep_node, result, &child_prefix, branch);
                branch.pop();
            }
        }
    }
}

/// Build the dependency graph of `doc` and reject cycles.
pub fn check_dependencies<'a>(doc: &'a Document, field: &str) -> Result<DependencyGraph<'a>> {
    let graph = DependencyGraph::build(doc, field)?;
    graph.detect_cycles()?;
    tracing::debug!(
        "Dependency graph is acyclic: {} node(s), {} edge(s)",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
