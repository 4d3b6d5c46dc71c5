//! Owned element tree for USLM documents.
//!
//! The rest of the crate only ever reads a [`Node`]; nothing below the
//! parse step mutates the tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{RecordError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: String,
    pub attributes: BTreeMap<String, String>,
    /// Text before the first child element.
    pub text: String,
    /// Text after this element's end tag, owned by the parent's flow.
    pub tail: String,
    pub children: Vec<Node>,
}

impl Node {
    #[must_use]
    pub fn element(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn identifier(&self) -> Option<&str> {
        self.attr("identifier")
    }

    pub fn child(&self, kind: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Trimmed direct text of the first `<num>` child.
    pub fn number(&self) -> Option<String> {
        self.child_direct_text("num")
    }

    /// Trimmed direct text of the first `<heading>` child.
    pub fn heading(&self) -> Option<String> {
        self.child_direct_text("heading")
    }

    fn child_direct_text(&self, kind: &str) -> Option<String> {
        self.child(kind)
            .map(|c| c.text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// All text under this node in document order, tails of descendants
    /// included, this node's own tail excluded.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.push_full_text(&mut out);
        out
    }

    fn push_full_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.push_full_text(out);
            out.push_str(&child.tail);
        }
    }

    /// Pre-order iterator over every descendant, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Parse a USLM document into an owned tree and return its root element.
pub fn parse_document(xml: &str) -> Result<Node> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(err) => {
                return Err(RecordError::XmlParse {
                    position: reader.buffer_position() as u64,
                    message: err.to_string(),
                })
            }
        };

        match event {
            Event::Start(ref e) => {
                let node = open_node(e, reader.buffer_position() as u64)?;
                stack.push(node);
            }
            Event::Empty(ref e) => {
                let node = open_node(e, reader.buffer_position() as u64)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                if let Some(node) = stack.pop() {
                    attach(&mut stack, &mut root, node);
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(|err| RecordError::XmlParse {
                    position: reader.buffer_position() as u64,
                    message: err.to_string(),
                })?;
                push_text(&mut stack, &text);
            }
            Event::CData(ref e) => {
                push_text(&mut stack, &String::from_utf8_lossy(e));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(RecordError::UnclosedElement(open.kind.clone()));
    }

    root.ok_or(RecordError::EmptyDocument)
}

fn open_node(start: &BytesStart<'_>, position: u64) -> Result<Node> {
    let mut node = Node::element(normalize_kind(&String::from_utf8_lossy(
        start.name().as_ref(),
    )));

    for attr in start.attributes() {
        let attr = attr.map_err(|err| RecordError::XmlParse {
            position,
            message: err.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| RecordError::XmlParse {
                position,
                message: err.to_string(),
            })?
            .to_string();
        node.attributes.insert(key, value);
    }

    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn push_text(stack: &mut [Node], text: &str) {
    let Some(current) = stack.last_mut() else {
        return;
    };
    match current.children.last_mut() {
        Some(previous) => previous.tail.push_str(text),
        None => current.text.push_str(text),
    }
}

/// USLM elements may be written with an explicit `uslm:` prefix; everything
/// else keeps its qualified name so `dc:title` never reads as `title`.
fn normalize_kind(raw: &str) -> String {
    raw.strip_prefix("uslm:").unwrap_or(raw).to_string()
}

/// Count elements by kind, root included.
pub fn tag_histogram(root: &Node) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    *counts.entry(root.kind.clone()).or_insert(0) += 1;
    for node in root.descendants() {
        *counts.entry(node.kind.clone()).or_insert(0) += 1;
    }
    counts
}
