//! Include expansion: splice external files into a node tree.
//!
//! Any node tagged with the configured include tag (by default `!include`) is
//! a directive. Its scalar value names a file relative to the directory of the
//! file that contains the directive. The directive is replaced by the root
//! node of the parsed target, after the target's own directives have been
//! expanded against the target's directory.
//!
//! # Security
//!
//! Include paths come from document content, so every directive goes through
//! [`resolve_include_path`]:
//!
//! - paths containing `..` are rejected outright
//! - the target must stay inside the including file's directory, both
//!   lexically and after resolving symlinks
//!
//! # Repeated inclusion
//!
//! [`InclusionPolicy::RejectRepeats`] (the default) rejects any file entered
//! twice during one expansion, including diamond-shaped reuse from independent
//! branches. [`InclusionPolicy::ActiveChain`] only rejects a file that would
//! include itself through the chain currently being expanded and reuses the
//! expanded content of files seen before.
//!
//! # Example
//!
//! ```rust,no_run
//! use anchorage::document::Document;
//! use anchorage::include::IncludeExpander;
//! use std::path::Path;
//!
//! let doc = Document::parse("tasks: !include tasks.yml\n")?;
//! let mut expander = IncludeExpander::new("!include");
//! let doc = doc.expand_includes(&mut expander, Path::new("pipelines"))?;
//! assert!(doc.root().get("tasks").and_then(|t| t.as_sequence()).is_some());
//! # Ok::<(), anchorage::core::AnchorageError>(())
//! ```

mod guard;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{AnchorageError, Result};
use crate::document::{DocumentParser, Node, NodeKind, YamlParser};
use crate::utils::resolve_include_path;
use guard::InclusionGuard;

/// How repeated inclusion of the same file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InclusionPolicy {
    /// Any file may be included at most once per expansion.
    #[default]
    RejectRepeats,
    /// A file may be included again unless it is still being expanded.
    ActiveChain,
}

impl std::fmt::Display for InclusionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RejectRepeats => write!(f, "reject-repeats"),
            Self::ActiveChain => write!(f, "active-chain"),
        }
    }
}

/// Expands include directives using a [`DocumentParser`] for included files.
pub struct IncludeExpander<P: DocumentParser = YamlParser> {
    include_tag: String,
    policy: InclusionPolicy,
    guard: InclusionGuard,
    cache: HashMap<PathBuf, Node>,
    parser: P,
}

impl IncludeExpander<YamlParser> {
    /// Expander for directives tagged `include_tag`, reading YAML files.
    pub fn new(include_tag: impl Into<String>) -> Self {
        Self::with_parser(include_tag, YamlParser)
    }
}

impl<P: DocumentParser> IncludeExpander<P> {
    /// Expander using a custom parser for included files.
    pub fn with_parser(include_tag: impl Into<String>, parser: P) -> Self {
        let policy = InclusionPolicy::default();
        Self {
            include_tag: include_tag.into(),
            policy,
            guard: InclusionGuard::new(policy),
            cache: HashMap::new(),
            parser,
        }
    }

    /// Set the repeated-inclusion policy.
    #[must_use]
    pub fn with_policy(mut self, policy: InclusionPolicy) -> Self {
        self.policy = policy;
        self.guard = InclusionGuard::new(policy);
        self
    }

    /// The tag marking directive nodes.
    #[must_use]
    pub fn include_tag(&self) -> &str {
        &self.include_tag
    }

    /// The repeated-inclusion policy.
    #[must_use]
    pub const fn policy(&self) -> InclusionPolicy {
        self.policy
    }

    /// Expand every directive in `root`, resolving paths against `base_dir`.
    ///
    /// Each call is an independent expansion: the guard and the content cache
    /// start empty. The first failure aborts the whole expansion.
    pub fn expand(&mut self, root: Node, base_dir: &Path) -> Result<Node> {
        self.guard.reset();
        self.cache.clear();
        tracing::debug!(
            "Expanding '{}' directives from {} ({})",
            self.include_tag,
            base_dir.display(),
            self.policy
        );
        self.expand_node(root, base_dir)
    }

    fn expand_node(&mut self, node: Node, base_dir: &Path) -> Result<Node> {
        if node.has_tag(&self.include_tag) {
            return self.splice(node, base_dir);
        }

        let Node {
            kind,
            anchor,
            tag,
            mark,
        } = node;

        let kind = match kind {
            NodeKind::Sequence(items) => NodeKind::Sequence(
                items.into_iter().map(|item| self.expand_node(item, base_dir)).collect::<Result<_>>()?,
            ),
            NodeKind::Mapping(pairs) => {
                let mut expanded = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    expanded.push((self.expand_node(key, base_dir)?, self.expand_node(value, base_dir)?));
                }
                NodeKind::Mapping(expanded)
            }
            other => other,
        };

        Ok(Node {
            kind,
            anchor,
            tag,
            mark,
        })
    }

    /// Replace a directive with the expanded content of its target.
    fn splice(&mut self, directive: Node, base_dir: &Path) -> Result<Node> {
        let Some(raw) = directive.as_str() else {
            return Err(AnchorageError::InvalidIncludeDirective {
                kind: directive.kind_name().to_string(),
                line: directive.mark.line,
                column: directive.mark.column,
            });
        };

        let target = resolve_include_path(raw, base_dir)?;

        if !self.guard.enter(&target) {
            tracing::debug!(
                "Rejected repeated include of {} (active chain: {:?})",
                target.display(),
                self.guard.chain()
            );
            return Err(AnchorageError::RecursiveInclusion {
                path: target.display().to_string(),
            });
        }

        let included = self.load_target(&target);
        self.guard.leave(&target);

        Ok(adopt(directive, included?))
    }

    fn load_target(&mut self, target: &Path) -> Result<Node> {
        if let Some(cached) = self.cache.get(target) {
            tracing::trace!("Reusing expanded content of {}", target.display());
            return Ok(cached.clone());
        }

        tracing::debug!("Including {}", target.display());
        let source = fs::read_to_string(target).map_err(|source| AnchorageError::IncludeReadError {
            path: target.display().to_string(),
            source,
        })?;

        let root = self.parser.parse(&source).map_err(|e| AnchorageError::IncludeParseError {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;

        let nested_base = target.parent().unwrap_or(target);
        let expanded = self.expand_node(root, nested_base)?;

        if self.policy == InclusionPolicy::ActiveChain {
            self.cache.insert(target.to_path_buf(), expanded.clone());
        }
        Ok(expanded)
    }
}

/// The directive takes over the included root's kind and tag. It keeps its
/// own position, and its own anchor unless the included root declares one.
fn adopt(directive: Node, included: Node) -> Node {
    Node {
        kind: included.kind,
        anchor: included.anchor.or(directive.anchor),
        tag: included.tag,
        mark: directive.mark,
    }
}
