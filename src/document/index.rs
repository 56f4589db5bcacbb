//! Anchor indexing.

use std::collections::HashMap;

use super::{Node, NodeKind, NodePath, PathStep};

/// Map from anchor identifier to the location of the declaring node.
///
/// Built by a single left-to-right, depth-first traversal. When an identifier
/// is declared more than once, the declaration met last wins; its position in
/// [`AnchorIndex::ids`] stays that of the first declaration.
#[derive(Debug, Clone, Default)]
pub struct AnchorIndex {
    entries: HashMap<String, NodePath>,
    order: Vec<String>,
}

impl AnchorIndex {
    /// Index every anchored node under `root`, `root` included.
    #[must_use]
    pub fn build(root: &Node) -> Self {
        let mut index = Self::default();
        let mut path = NodePath::new();
        index.visit(root, &mut path);
        index
    }

    fn visit(&mut self, node: &Node, path: &mut NodePath) {
        if let Some(anchor) = node.anchor.as_deref().filter(|a| !a.is_empty()) {
            self.insert(anchor, path.clone());
        }

        match &node.kind {
            NodeKind::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    path.push(PathStep::Item(i));
                    self.visit(item, path);
                    path.pop();
                }
            }
            NodeKind::Mapping(pairs) => {
                for (i, (key, value)) in pairs.iter().enumerate() {
                    path.push(PathStep::Key(i));
                    self.visit(key, path);
                    path.pop();

                    path.push(PathStep::Value(i));
                    self.visit(value, path);
                    path.pop();
                }
            }
            NodeKind::Scalar {
                ..
            }
            | NodeKind::Alias(_) => {}
        }
    }

    fn insert(&mut self, anchor: &str, path: NodePath) {
        if self.entries.insert(anchor.to_string(), path).is_some() {
            tracing::warn!("Anchor '{}' declared more than once; the last declaration wins", anchor);
        } else {
            self.order.push(anchor.to_string());
        }
    }

    /// Location of the node declaring `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NodePath> {
        self.entries.get(id)
    }

    /// Stored identifier and location for `id`.
    #[must_use]
    pub fn entry(&self, id: &str) -> Option<(&str, &NodePath)> {
        self.entries.get_key_value(id).map(|(k, v)| (k.as_str(), v))
    }

    /// Whether `id` is indexed.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of distinct identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no anchors were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in first-declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
