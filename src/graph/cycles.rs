//! Three-color cycle detection.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use super::DependencyGraph;
use crate::core::{AnchorageError, Result};

/// Visitation state of a node during one detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Visitation {
    /// Not reached yet.
    #[default]
    Unvisited,
    /// On the current depth-first path.
    Visiting,
    /// Fully explored.
    Visited,
}

impl DependencyGraph<'_> {
    /// Fail with [`AnchorageError::CycleDetected`] if any dependency chain
    /// leads back to a node on the current path.
    ///
    /// Visitation state belongs to the pass, so the graph can be checked any
    /// number of times with the same result.
    pub fn detect_cycles(&self) -> Result<()> {
        let mut marks: HashMap<NodeIndex, Visitation> = HashMap::new();
        let mut path: Vec<NodeIndex> = Vec::new();

        for node in self.graph.node_indices() {
            if marks.get(&node).copied().unwrap_or_default() == Visitation::Unvisited {
                self.visit(node, &mut marks, &mut path)?;
            }
        }

        Ok(())
    }

    /// Depth-first walk from `root` with an explicit stack of
    /// `(node, next dependency)` frames. `path` mirrors the stack.
    fn visit(
        &self,
        root: NodeIndex,
        marks: &mut HashMap<NodeIndex, Visitation>,
        path: &mut Vec<NodeIndex>,
    ) -> Result<()> {
        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        marks.insert(root, Visitation::Visiting);
        path.push(root);

        while let Some(frame) = stack.last_mut() {
            let (node, next) = *frame;
            frame.1 += 1;

            let Some(dep) = self.graph[node].dependencies.get(next) else {
                stack.pop();
                path.pop();
                marks.insert(node, Visitation::Visited);
                continue;
            };
            let Some(&dep_index) = self.node_map.get(dep) else {
                continue;
            };

            match marks.get(&dep_index).copied().unwrap_or_default() {
                Visitation::Visited => {}
                Visitation::Visiting => return Err(self.cycle_error(dep_index, path)),
                Visitation::Unvisited => {
                    marks.insert(dep_index, Visitation::Visiting);
                    path.push(dep_index);
                    stack.push((dep_index, 0));
                }
            }
        }

        Ok(())
    }

    fn cycle_error(&self, node: NodeIndex, path: &[NodeIndex]) -> AnchorageError {
        let start = path.iter().position(|&n| n == node).unwrap_or(0);
        let mut chain: Vec<String> =
            path[start..].iter().map(|&n| self.graph[n].id.clone()).collect();
        let id = self.graph[node].id.clone();
        chain.push(id.clone());

        tracing::debug!("Cycle closed at '{}': {}", id, chain.join(" -> "));
        AnchorageError::CycleDetected {
            id,
            chain,
        }
    }
}
