//! Parser collaborator: turns YAML text into a [`Node`] tree.
//!
//! The grammar itself is handled by `yaml-rust2`. This module only listens to
//! its event stream and assembles the tree, keeping anchors, tags, scalar
//! styles and source marks.
//!
//! `yaml-rust2` reports anchors as numeric ids. The identifiers written in the
//! source are recovered from the scanner's anchor tokens: the parser assigns
//! ids in declaration order and emits anchored nodes in that same order, so the
//! n-th distinct id seen in the event stream belongs to the n-th anchor token.

use std::collections::HashMap;

use thiserror::Error;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, Scanner, TScalarStyle, Token, TokenType};

use super::{Mark, Node, NodeKind, ScalarStyle};

/// A parser rejected its input.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseFailure {
    /// Diagnostic text
    pub message: String,
    /// Position of the problem, when known
    pub mark: Option<Mark>,
}

impl ParseFailure {
    /// Create a failure with an optional position.
    pub fn new(message: impl Into<String>, mark: Option<Mark>) -> Self {
        Self {
            message: message.into(),
            mark,
        }
    }
}

/// Anything able to turn source text into a node tree.
///
/// The include expander is generic over this trait, so alternative grammars
/// can be plugged in as long as they produce the same node model.
pub trait DocumentParser {
    /// Parse `source` into the root node of its first document.
    fn parse(&self, source: &str) -> Result<Node, ParseFailure>;
}

/// YAML parser backed by `yaml-rust2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl DocumentParser for YamlParser {
    fn parse(&self, source: &str) -> Result<Node, ParseFailure> {
        let mut builder = TreeBuilder::new(scan_anchor_names(source));
        let mut parser = Parser::new_from_str(source);
        parser.load(&mut builder, false).map_err(|e| {
            let marker = e.marker();
            ParseFailure::new(e.to_string(), Some(to_mark(marker)))
        })?;
        builder.finish()
    }
}

/// Anchor identifiers in the order they appear in the source.
///
/// Scanning stops at the first lexical error; the parser reports it.
fn scan_anchor_names(source: &str) -> Vec<String> {
    Scanner::new(source.chars())
        .filter_map(|Token(_, token)| match token {
            TokenType::Anchor(name) => Some(name),
            _ => None,
        })
        .collect()
}

fn to_mark(marker: &Marker) -> Mark {
    Mark::new(marker.line(), marker.col() + 1)
}

fn to_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        TScalarStyle::Plain => ScalarStyle::Plain,
        _ => ScalarStyle::Folded,
    }
}

/// Properties shared by every node kind, captured when the node starts.
struct Header {
    anchor: Option<String>,
    tag: Option<String>,
    mark: Mark,
}

impl Header {
    fn into_node(self, kind: NodeKind) -> Node {
        Node {
            kind,
            anchor: self.anchor,
            tag: self.tag,
            mark: self.mark,
        }
    }
}

enum Frame {
    Sequence {
        header: Header,
        items: Vec<Node>,
    },
    Mapping {
        header: Header,
        pairs: Vec<(Node, Node)>,
        pending_key: Option<Node>,
    },
}

struct TreeBuilder {
    anchor_names: std::vec::IntoIter<String>,
    names_by_id: HashMap<usize, String>,
    stack: Vec<Frame>,
    root: Option<Node>,
    error: Option<ParseFailure>,
}

impl TreeBuilder {
    fn new(anchor_names: Vec<String>) -> Self {
        Self {
            anchor_names: anchor_names.into_iter(),
            names_by_id: HashMap::new(),
            stack: Vec::new(),
            root: None,
            error: None,
        }
    }

    fn finish(self) -> Result<Node, ParseFailure> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.stack.is_empty() {
            return Err(ParseFailure::new("unterminated collection", None));
        }
        self.root.ok_or_else(|| ParseFailure::new("empty document", None))
    }

    fn fail(&mut self, message: impl Into<String>, mark: Mark) {
        if self.error.is_none() {
            self.error = Some(ParseFailure::new(message, Some(mark)));
        }
    }

    fn anchor_name(&mut self, id: usize, mark: Mark) -> Option<String> {
        if id == 0 {
            return None;
        }
        if let Some(name) = self.names_by_id.get(&id) {
            return Some(name.clone());
        }
        match self.anchor_names.next() {
            Some(name) => {
                self.names_by_id.insert(id, name.clone());
                Some(name)
            }
            None => {
                self.fail(format!("anchor #{id} has no matching declaration"), mark);
                None
            }
        }
    }

    fn header(&mut self, anchor_id: usize, tag: Option<Tag>, mark: Mark) -> Header {
        Header {
            anchor: self.anchor_name(anchor_id, mark),
            tag: tag.map(|t| format!("{}{}", t.handle, t.suffix)),
            mark,
        }
    }

    fn complete(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(Frame::Sequence {
                items,
                ..
            }) => items.push(node),
            Some(Frame::Mapping {
                pairs,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => pairs.push((key, node)),
                None => *pending_key = Some(node),
            },
            None => {
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        let mark = to_mark(&marker);

        match ev {
            Event::Scalar(value, style, anchor_id, tag) => {
                let header = self.header(anchor_id, tag, mark);
                self.complete(header.into_node(NodeKind::Scalar {
                    value,
                    style: to_style(style),
                }));
            }
            Event::Alias(anchor_id) => match self.names_by_id.get(&anchor_id).cloned() {
                Some(name) => self.complete(Node::alias(name).at(mark.line, mark.column)),
                None => self.fail(format!("alias refers to unknown anchor #{anchor_id}"), mark),
            },
            Event::SequenceStart(anchor_id, tag) => {
                let header = self.header(anchor_id, tag, mark);
                self.stack.push(Frame::Sequence {
                    header,
                    items: Vec::new(),
                });
            }
            Event::SequenceEnd => match self.stack.pop() {
                Some(Frame::Sequence {
                    header,
                    items,
                }) => self.complete(header.into_node(NodeKind::Sequence(items))),
                _ => self.fail("unbalanced end of sequence", mark),
            },
            Event::MappingStart(anchor_id, tag) => {
                let header = self.header(anchor_id, tag, mark);
                self.stack.push(Frame::Mapping {
                    header,
                    pairs: Vec::new(),
                    pending_key: None,
                });
            }
            Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Mapping {
                    header,
                    pairs,
                    pending_key: None,
                }) => self.complete(header.into_node(NodeKind::Mapping(pairs))),
                _ => self.fail("unbalanced end of mapping", mark),
            },
            _ => {}
        }
    }
}
