//! Document model: the node tree and its anchor index.
//!
//! A [`Document`] owns the root [`Node`] of a parsed configuration tree together
//! with an [`AnchorIndex`] that maps every anchor identifier to the location of
//! the node declaring it. The index stores [`NodePath`]s (child steps from the
//! root) rather than references, so it never competes with the tree for
//! ownership and stays valid for as long as the tree is not restructured.
//!
//! # Node kinds
//!
//! - [`NodeKind::Scalar`] - a leaf value with its presentation style
//! - [`NodeKind::Sequence`] - ordered items
//! - [`NodeKind::Mapping`] - ordered key/value pairs
//! - [`NodeKind::Alias`] - a reference to an anchor, by identifier
//!
//! # Lifecycle
//!
//! 1. Text is parsed by a [`DocumentParser`] (by default [`YamlParser`]).
//! 2. [`Document::new`] indexes the anchors.
//! 3. Include expansion ([`Document::expand_includes`]) rebuilds the tree and
//!    re-indexes it.
//! 4. The dependency graph builder and the alias resolver read the frozen
//!    document.
//!
//! # Example
//!
//! ```rust
//! use anchorage::document::Document;
//!
//! let doc = Document::parse("base: &base {retries: 3}\njob: *base\n")?;
//! let job = doc.root().get("job").expect("job entry");
//! let target = doc.resolve_alias(job)?;
//! assert_eq!(target.id, "base");
//! # Ok::<(), anchorage::core::AnchorageError>(())
//! ```

mod decode;
mod index;
mod parser;
mod resolve;


pub use index::AnchorIndex;
pub use parser::{DocumentParser, ParseFailure, YamlParser};

use std::path::Path;

use crate::constants::INLINE_ORIGIN;
use crate::core::{AnchorageError, Result};
use crate::include::IncludeExpander;

/// Fully qualified form of the YAML `!!str` tag.
pub const CORE_STR_TAG: &str = "tag:yaml.org,2002:str";

/// Prefix shared by all YAML core schema tags.
pub const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Source position of a node (1-based line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Mark {
    /// Line number, starting at 1
    pub line: usize,
    /// Column number, starting at 1
    pub column: usize,
}

impl Mark {
    /// Create a mark from a line and column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self {
            line,
            column,
        }
    }
}

/// How a scalar was written in the source.
///
/// Only plain scalars are subject to core schema typing when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ScalarStyle {
    /// Unquoted
    #[default]
    Plain,
    /// `'single quoted'`
    SingleQuoted,
    /// `"double quoted"`
    DoubleQuoted,
    /// `|` block
    Literal,
    /// `>` block
    Folded,
}

/// Kind-specific payload of a [`Node`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Leaf value
    Scalar {
        /// Raw scalar text
        value: String,
        /// Presentation style
        style: ScalarStyle,
    },
    /// Ordered list of items
    Sequence(Vec<Node>),
    /// Ordered key/value pairs
    Mapping(Vec<(Node, Node)>),
    /// Reference to the anchor with this identifier
    Alias(String),
}

/// A node of the configuration tree.
///
/// Each node exclusively owns its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Kind and payload
    pub kind: NodeKind,
    /// Anchor identifier declared on this node (`&name`)
    pub anchor: Option<String>,
    /// Type tag (`!include`, `tag:yaml.org,2002:str`, ...)
    pub tag: Option<String>,
    /// Source position
    pub mark: Mark,
}

/// One step from a container node to one of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// The n-th item of a sequence
    Item(usize),
    /// The key of the n-th mapping pair
    Key(usize),
    /// The value of the n-th mapping pair
    Value(usize),
}

/// Location of a node, as steps from the root.
pub type NodePath = Vec<PathStep>;

impl Node {
    /// Create a node of the given kind without anchor, tag or position.
    #[must_use]
    pub const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            anchor: None,
            tag: None,
            mark: Mark::new(0, 0),
        }
    }

    /// Plain scalar node.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::new(NodeKind::Scalar {
            value: value.into(),
            style: ScalarStyle::Plain,
        })
    }

    /// Sequence node.
    #[must_use]
    pub fn sequence(items: Vec<Node>) -> Self {
        Self::new(NodeKind::Sequence(items))
    }

    /// Mapping node.
    #[must_use]
    pub fn mapping(pairs: Vec<(Node, Node)>) -> Self {
        Self::new(NodeKind::Mapping(pairs))
    }

    /// Alias node referring to `name`.
    pub fn alias(name: impl Into<String>) -> Self {
        Self::new(NodeKind::Alias(name.into()))
    }

    /// Attach an anchor identifier. An empty identifier means no anchor.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        let anchor = anchor.into();
        self.anchor = if anchor.is_empty() {
            None
        } else {
            Some(anchor)
        };
        self
    }

    /// Attach a type tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the source position.
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.mark = Mark::new(line, column);
        self
    }

    /// Human-readable kind name, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self.kind {
            NodeKind::Scalar {
                ..
            } => "scalar",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Mapping(_) => "mapping",
            NodeKind::Alias(_) => "alias",
        }
    }

    /// Whether this node is an alias.
    #[must_use]
    pub const fn is_alias(&self) -> bool {
        matches!(self.kind, NodeKind::Alias(_))
    }

    /// Whether this node carries exactly the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag.as_deref() == Some(tag)
    }

    /// Scalar text, if this is a scalar.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar {
                value,
                ..
            } => Some(value),
            _ => None,
        }
    }

    /// Anchor identifier referenced by this alias.
    #[must_use]
    pub fn alias_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Alias(name) => Some(name),
            _ => None,
        }
    }

    /// Items, if this is a sequence.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Key/value pairs, if this is a mapping.
    #[must_use]
    pub fn as_mapping(&self) -> Option<&[(Node, Node)]> {
        match &self.kind {
            NodeKind::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Value for the first scalar key equal to `key`, if this is a mapping.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping()?.iter().find(|(k, _)| k.as_str() == Some(key)).map(|(_, v)| v)
    }

    /// Child reached by a single step.
    #[must_use]
    pub fn child(&self, step: PathStep) -> Option<&Node> {
        match (step, &self.kind) {
            (PathStep::Item(i), NodeKind::Sequence(items)) => items.get(i),
            (PathStep::Key(i), NodeKind::Mapping(pairs)) => pairs.get(i).map(|(k, _)| k),
            (PathStep::Value(i), NodeKind::Mapping(pairs)) => pairs.get(i).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Descendant reached by following `path` from this node.
    #[must_use]
    pub fn at_path(&self, path: &[PathStep]) -> Option<&Node> {
        path.iter().try_fold(self, |node, step| node.child(*step))
    }
}

/// A node found through the anchor index, together with its identifier.
#[derive(Debug, Clone, Copy)]
pub struct AnchoredNode<'a> {
    /// Anchor identifier
    pub id: &'a str,
    /// The node declaring the anchor
    pub node: &'a Node,
}

impl AnchoredNode<'_> {
    /// Line of the anchored node.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.node.mark.line
    }

    /// Column of the anchored node.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.node.mark.column
    }
}

/// A parsed configuration tree with its anchor index.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
    anchors: AnchorIndex,
}

impl Document {
    /// Wrap a tree and index its anchors.
    #[must_use]
    pub fn new(root: Node) -> Self {
        let anchors = AnchorIndex::build(&root);
        Self {
            root,
            anchors,
        }
    }

    /// Parse YAML text with the default parser.
    pub fn parse(source: &str) -> Result<Self> {
        Self::parse_with(&YamlParser, source, INLINE_ORIGIN)
    }

    /// Parse text with a specific parser; `origin` names the source in errors.
    pub fn parse_with<P: DocumentParser>(parser: &P, source: &str, origin: &str) -> Result<Self> {
        let root = parser.parse(source).map_err(|e| AnchorageError::ParseFailure {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(root))
    }

    /// Root node of the tree.
    #[must_use]
    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the tree.
    ///
    /// The anchor index is not updated; call [`Document::reindex`] after
    /// changing the tree's structure.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Give up the index and return the tree.
    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// The anchor index.
    #[must_use]
    pub const fn anchors(&self) -> &AnchorIndex {
        &self.anchors
    }

    /// Anchor identifiers in first-declaration order.
    pub fn anchor_ids(&self) -> impl Iterator<Item = &str> {
        self.anchors.ids()
    }

    /// Rebuild the anchor index from the current tree.
    pub fn reindex(&mut self) {
        self.anchors = AnchorIndex::build(&self.root);
        tracing::debug!("Re-indexed document: {} anchor(s)", self.anchors.len());
    }

    /// Look up an anchor by identifier.
    #[must_use]
    pub fn anchored(&self, id: &str) -> Option<AnchoredNode<'_>> {
        let (id, path) = self.anchors.entry(id)?;
        let node = self.root.at_path(path)?;
        Some(AnchoredNode {
            id,
            node,
        })
    }

    /// Expand include directives and re-index the result.
    ///
    /// The document is consumed: when expansion fails no partially expanded
    /// tree is left behind.
    pub fn expand_includes<P: DocumentParser>(
        self,
        expander: &mut IncludeExpander<P>,
        base_dir: &Path,
    ) -> Result<Self> {
        tracing::debug!(
            "Expanding '{}' directives below {} ({} policy)",
            expander.include_tag(),
            base_dir.display(),
            expander.policy()
        );
        let root = expander.expand(self.root, base_dir)?;
        let doc = Self::new(root);
        tracing::debug!("Expanded includes: {} anchor(s) after re-indexing", doc.anchors.len());
        Ok(doc)
    }
}
