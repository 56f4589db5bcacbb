//! Dependency graph construction.

use super::DependencyGraph;
use crate::core::{AnchorageError, Result};
use crate::document::{Document, Node, NodeKind};

/// Build the graph in a single pass over the anchor index.
///
/// Nodes are created for every anchor first, so a dependency may refer to an
/// anchor declared anywhere in the document.
pub(super) fn build<'a>(doc: &'a Document, field: &str) -> Result<DependencyGraph<'a>> {
    let mut graph = DependencyGraph::empty();

    for id in doc.anchor_ids() {
        if let Some(anchored) = doc.anchored(id) {
            graph.add_node(anchored.id, anchored.node);
        }
    }

    let owners: Vec<(String, &'a Node)> =
        graph.nodes().map(|node| (node.id.clone(), node.node)).collect();

    for (owner, node) in owners {
        for alias in dependency_aliases(&owner, node, field) {
            let target = resolve_dependency(doc, &owner, alias)?;
            let (Some(&from), Some(&to)) = (graph.node_map.get(&owner), graph.node_map.get(&target))
            else {
                return Err(AnchorageError::UnresolvedDagNode {
                    owner,
                    id: target,
                });
            };
            tracing::trace!("{} depends on {}", owner, target);
            graph.add_dependency(from, to);
        }
    }

    tracing::debug!(
        "Built dependency graph on '{}': {} node(s), {} edge(s)",
        field,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Entries listed under `field` in an anchored mapping.
///
/// A sequence yields its items; a single alias yields itself. Any other value
/// is ignored with a warning.
fn dependency_aliases<'a>(owner: &str, node: &'a Node, field: &str) -> Vec<&'a Node> {
    let Some(value) = node.get(field) else {
        return Vec::new();
    };

    match &value.kind {
        NodeKind::Sequence(items) => items.iter().collect(),
        NodeKind::Alias(_) => vec![value],
        _ => {
            tracing::warn!(
                "'{}': ignoring '{}' at line {} (expected a list of aliases, found a {})",
                owner,
                field,
                value.mark.line,
                value.kind_name()
            );
            Vec::new()
        }
    }
}

/// Resolve one dependency entry to the identifier of its anchor.
fn resolve_dependency(doc: &Document, owner: &str, entry: &Node) -> Result<String> {
    match doc.resolve_alias(entry) {
        Ok(target) => Ok(target.id.to_string()),
        Err(AnchorageError::UnresolvedAlias {
            name,
        }) => Err(AnchorageError::UnresolvedDagNode {
            owner: owner.to_string(),
            id: name,
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(deps: Node) -> Node {
        Node::mapping(vec![(Node::scalar("depends_on"), deps)])
    }

    fn doc(pairs: Vec<(&str, Node)>) -> Document {
        Document::new(Node::mapping(
            pairs.into_iter().map(|(key, value)| (Node::scalar(key), value)).collect(),
        ))
    }

    #[test]
    fn test_list_dependencies() {
        let doc = Document::parse("A: &A {script: a}\nB: &B\n  depends_on: [*A]\n").unwrap();
        let graph = build(&doc, "depends_on").unwrap();

        assert_eq!(graph.dependencies_of("B"), Some(&["A".to_string()][..]));
        assert_eq!(graph.dependencies_of("A"), Some(&[][..]));
        assert!(graph.detect_cycles().is_ok());
    }

    #[test]
    fn test_single_alias_dependency() {
        let doc = Document::parse("A: &A {}\nB: &B {depends_on: *A}\n").unwrap();
        let graph = build(&doc, "depends_on").unwrap();
        assert_eq!(graph.dependencies_of("B"), Some(&["A".to_string()][..]));
    }

    #[test]
    fn test_dependency_order_is_preserved() {
        let doc = Document::parse("z: &z {}\na: &a {}\nm: &m {}\nall: &all {depends_on: [*m, *z, *a]}\n")
            .unwrap();
        let graph = build(&doc, "depends_on").unwrap();
        let deps = graph.dependencies_of("all").unwrap();
        assert_eq!(deps, ["m", "z", "a"]);
    }

    #[test]
    fn test_non_mapping_anchors_have_no_dependencies() {
        let doc = Document::parse("list: &list [1, 2]\nvalue: &value text\n").unwrap();
        let graph = build(&doc, "depends_on").unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.dependencies_of("list"), Some(&[][..]));
    }

    #[test]
    fn test_unknown_reference() {
        let doc = doc(vec![
            ("A", Node::mapping(vec![]).with_anchor("A")),
            ("B", job(Node::sequence(vec![Node::alias("C")])).with_anchor("B")),
        ]);
        let err = build(&doc, "depends_on").unwrap_err();
        assert!(matches!(
            err,
            AnchorageError::UnresolvedDagNode { ref owner, ref id } if owner == "B" && id == "C"
        ));
    }

    #[test]
    fn test_non_alias_entry_is_rejected() {
        let doc = doc(vec![
            ("A", Node::mapping(vec![]).with_anchor("A")),
            ("B", job(Node::sequence(vec![Node::scalar("A")])).with_anchor("B")),
        ]);
        let err = build(&doc, "depends_on").unwrap_err();
        assert!(matches!(err, AnchorageError::NotAnAlias { ref kind, .. } if kind == "scalar"));
    }

    #[test]
    fn test_scalar_field_is_ignored() {
        let doc = doc(vec![("A", job(Node::scalar("B")).with_anchor("A"))]);
        let graph = build(&doc, "depends_on").unwrap();
        assert_eq!(graph.dependencies_of("A"), Some(&[][..]));
    }

    #[test]
    fn test_unanchored_mappings_are_not_nodes() {
        let doc = Document::parse("A: &A {}\nB:\n  depends_on: [*A]\n").unwrap();
        let graph = build(&doc, "depends_on").unwrap();
        assert_eq!(graph.ids().collect::<Vec<_>>(), vec!["A"]);
    }
}
