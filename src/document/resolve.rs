//! Alias resolution and reference rewriting.

use super::{AnchorIndex, AnchoredNode, CORE_STR_TAG, Document, Node, NodeKind, ScalarStyle};
use crate::core::{AnchorageError, Result};

impl Document {
    /// Resolve an alias node to the node declaring its anchor.
    ///
    /// Fails with [`AnchorageError::NotAnAlias`] for any other kind of node and
    /// with [`AnchorageError::UnresolvedAlias`] when the anchor is not indexed.
    pub fn resolve_alias(&self, alias: &Node) -> Result<AnchoredNode<'_>> {
        let NodeKind::Alias(name) = &alias.kind else {
            return Err(AnchorageError::NotAnAlias {
                kind: alias.kind_name().to_string(),
                line: alias.mark.line,
                column: alias.mark.column,
            });
        };

        self.anchored(name).ok_or_else(|| AnchorageError::UnresolvedAlias {
            name: name.clone(),
        })
    }

    /// Replace alias references under every `field` key with the anchor
    /// identifier as a string scalar.
    ///
    /// Handles both a list of aliases and a single alias value. Entries that
    /// are not aliases are left untouched. Returns the number of rewritten
    /// references.
    ///
    /// ```rust
    /// use anchorage::document::Document;
    ///
    /// let mut doc = Document::parse("a: &a {}\nb: {depends_on: [*a]}\n")?;
    /// assert_eq!(doc.rewrite_references("depends_on")?, 1);
    /// let deps = doc.root().get("b").and_then(|b| b.get("depends_on")).unwrap();
    /// assert_eq!(deps.as_sequence().unwrap()[0].as_str(), Some("a"));
    /// # Ok::<(), anchorage::core::AnchorageError>(())
    /// ```
    pub fn rewrite_references(&mut self, field: &str) -> Result<usize> {
        let Self {
            root,
            anchors,
        } = self;
        rewrite_node(root, field, anchors)
    }
}

fn rewrite_node(node: &mut Node, field: &str, anchors: &AnchorIndex) -> Result<usize> {
    let mut rewritten = 0;

    match &mut node.kind {
        NodeKind::Mapping(pairs) => {
            for (key, value) in pairs.iter_mut() {
                if key.as_str() == Some(field) {
                    if value.is_alias() {
                        rewritten += rewrite_alias(value, anchors)?;
                    } else if let NodeKind::Sequence(items) = &mut value.kind {
                        for item in items.iter_mut() {
                            rewritten += rewrite_alias(item, anchors)?;
                        }
                    }
                }

                rewritten += rewrite_node(key, field, anchors)?;
                rewritten += rewrite_node(value, field, anchors)?;
            }
        }
        NodeKind::Sequence(items) => {
            for item in items.iter_mut() {
                rewritten += rewrite_node(item, field, anchors)?;
            }
        }
        NodeKind::Scalar {
            ..
        }
        | NodeKind::Alias(_) => {}
    }

    Ok(rewritten)
}

fn rewrite_alias(node: &mut Node, anchors: &AnchorIndex) -> Result<usize> {
    let Some(name) = node.alias_name().map(str::to_string) else {
        return Ok(0);
    };

    if !anchors.contains(&name) {
        return Err(AnchorageError::UnresolvedAlias {
            name,
        });
    }

    tracing::trace!("Rewriting alias *{} to its identifier", name);
    node.kind = NodeKind::Scalar {
        value: name,
        style: ScalarStyle::Plain,
    };
    node.tag = Some(CORE_STR_TAG.to_string());
    Ok(1)
}
