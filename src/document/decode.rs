//! Bridge from the node tree to serde.
//!
//! Typed decoding itself is delegated to `serde_yaml`: the tree is converted to
//! a [`serde_yaml::Value`] with aliases expanded and merge keys applied, then
//! deserialized into the caller's type.

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use serde_yaml::value::{Mapping, Tag as ValueTag, TaggedValue};
use yaml_rust2::Yaml;

use super::{CORE_STR_TAG, CORE_TAG_PREFIX, Document, Node, NodeKind, ScalarStyle};
use crate::constants::{ALIAS_EXPANSION_FACTOR, MAX_ALIAS_DEPTH, MIN_EXPANSION_BUDGET};
use crate::core::{AnchorageError, Result};

impl Document {
    /// Convert the tree into a [`serde_yaml::Value`].
    ///
    /// Aliases are replaced by a copy of their anchored content, plain scalars
    /// get YAML core schema types, `<<` merge keys are applied and tags outside
    /// the core schema are kept as tagged values.
    ///
    /// The number of emitted nodes is bounded by [`ALIAS_EXPANSION_FACTOR`]
    /// times the size of the tree (at least [`MIN_EXPANSION_BUDGET`]), so
    /// nested aliases cannot blow up into an arbitrarily large value.
    pub fn to_value(&self) -> Result<Value> {
        let budget = node_count(&self.root).saturating_mul(ALIAS_EXPANSION_FACTOR).max(MIN_EXPANSION_BUDGET);
        let mut expansion = Expansion {
            expanding: Vec::new(),
            remaining: budget,
        };
        let mut value = self.node_value(&self.root, &mut expansion)?;
        value.apply_merge().map_err(|e| AnchorageError::DecodeError {
            reason: e.to_string(),
        })?;
        Ok(value)
    }

    /// Decode the resolved tree into `T`.
    ///
    /// ```rust
    /// use anchorage::document::Document;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Job {
    ///     retries: u32,
    /// }
    ///
    /// let doc = Document::parse("default: &default {retries: 3}\njob: {<<: *default}\n")?;
    /// let jobs: std::collections::HashMap<String, Job> = doc.decode()?;
    /// assert_eq!(jobs["job"].retries, 3);
    /// # Ok::<(), anchorage::core::AnchorageError>(())
    /// ```
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(self.to_value()?).map_err(|e| AnchorageError::DecodeError {
            reason: e.to_string(),
        })
    }

    fn node_value(&self, node: &Node, expansion: &mut Expansion) -> Result<Value> {
        expansion.emit()?;

        let value = match &node.kind {
            NodeKind::Scalar {
                value,
                style,
            } => scalar_value(value, *style, node.tag.as_deref()),
            NodeKind::Sequence(items) => Value::Sequence(
                items.iter().map(|item| self.node_value(item, expansion)).collect::<Result<_>>()?,
            ),
            NodeKind::Mapping(pairs) => {
                let mut mapping = Mapping::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let key = self.node_value(key, expansion)?;
                    let value = self.node_value(value, expansion)?;
                    mapping.insert(key, value);
                }
                Value::Mapping(mapping)
            }
            NodeKind::Alias(name) => {
                let expanding = &mut expansion.expanding;
                if expanding.iter().any(|n| n == name) || expanding.len() >= MAX_ALIAS_DEPTH {
                    return Err(AnchorageError::RecursiveAlias {
                        name: name.clone(),
                    });
                }
                let target = self.resolve_alias(node)?;
                expanding.push(name.clone());
                let value = self.node_value(target.node, expansion);
                expansion.expanding.pop();
                return value;
            }
        };

        Ok(apply_tag(value, node.tag.as_deref()))
    }
}

/// Per-conversion alias bookkeeping.
struct Expansion {
    /// Aliases currently being expanded, innermost last.
    expanding: Vec<String>,
    /// Nodes that may still be emitted.
    remaining: usize,
}

impl Expansion {
    fn emit(&mut self) -> Result<()> {
        self.remaining = self.remaining.checked_sub(1).ok_or_else(|| AnchorageError::DecodeError {
            reason: "alias expansion limit exceeded".to_string(),
        })?;
        Ok(())
    }
}

fn node_count(node: &Node) -> usize {
    1 + match &node.kind {
        NodeKind::Sequence(items) => items.iter().map(node_count).sum(),
        NodeKind::Mapping(pairs) => pairs.iter().map(|(k, v)| node_count(k) + node_count(v)).sum(),
        NodeKind::Scalar {
            ..
        }
        | NodeKind::Alias(_) => 0,
    }
}

fn scalar_value(text: &str, style: ScalarStyle, tag: Option<&str>) -> Value {
    if style != ScalarStyle::Plain || tag == Some(CORE_STR_TAG) {
        return Value::String(text.to_string());
    }

    let typed = Yaml::from_str(text);
    match &typed {
        Yaml::Integer(i) => Value::Number((*i).into()),
        Yaml::Real(_) => match typed.as_f64() {
            Some(f) => Value::Number(f.into()),
            None => Value::String(text.to_string()),
        },
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Null => Value::Null,
        _ => Value::String(text.to_string()),
    }
}

fn apply_tag(value: Value, tag: Option<&str>) -> Value {
    match tag {
        Some(tag) if !tag.starts_with(CORE_TAG_PREFIX) => Value::Tagged(Box::new(TaggedValue {
            tag: ValueTag::new(tag),
            value,
        })),
        _ => value,
    }
}
