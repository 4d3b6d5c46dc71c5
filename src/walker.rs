//! Depth-first walk that threads the structural ancestor path down the tree.
//!
//! Every node is visited in document order together with the snapshots of
//! the structural units strictly above it. Structural nodes extend the path
//! for their subtree; content nodes pass it through untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::{classify, NodeClass};
use crate::text::capitalize_first;
use crate::tree::Node;

/// Snapshot of one structural ancestor, detached from the live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorEntry {
    pub kind: String,
    pub num: Option<String>,
    pub heading: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl AncestorEntry {
    pub fn snapshot(node: &Node) -> Self {
        Self {
            kind: node.kind.clone(),
            num: node.number(),
            heading: node.heading(),
            attributes: node.attributes.clone(),
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        self.attributes.get("identifier").map(String::as_str)
    }
}

/// Root-to-nearest-parent; never contains the node it belongs to.
pub type AncestorPath = Vec<AncestorEntry>;

#[derive(Debug, Clone, Copy)]
pub struct Visit<'a, 'p> {
    pub node: &'a Node,
    pub ancestors: &'p [AncestorEntry],
    pub class: NodeClass,
}

#[derive(Debug, Clone)]
pub struct WalkEntry<'a> {
    pub node: &'a Node,
    pub ancestors: AncestorPath,
    pub class: NodeClass,
}

/// Visit every node under (and including) `root` in pre-order.
pub fn walk_with<'a, F>(root: &'a Node, mut on_visit: F)
where
    F: FnMut(Visit<'a, '_>),
{
    let mut path = AncestorPath::new();
    visit(root, &mut path, &mut on_visit);
}

fn visit<'a, F>(node: &'a Node, path: &mut AncestorPath, on_visit: &mut F)
where
    F: FnMut(Visit<'a, '_>),
{
    let class = classify(&node.kind);
    on_visit(Visit {
        node,
        ancestors: path.as_slice(),
        class,
    });

    match class {
        NodeClass::Structural => {
            path.push(AncestorEntry::snapshot(node));
            for child in &node.children {
                visit(child, path, on_visit);
            }
            path.pop();
        }
        NodeClass::Content => {
            for child in &node.children {
                visit(child, path, on_visit);
            }
        }
    }
}

pub fn walk(root: &Node) -> Vec<WalkEntry<'_>> {
    let mut entries = Vec::new();
    walk_with(root, |v| {
        entries.push(WalkEntry {
            node: v.node,
            ancestors: v.ancestors.to_vec(),
            class: v.class,
        })
    });
    entries
}

/// `"Title:/us/usc/t5; Chapter:/us/usc/t5/ch12"`; ancestors without an
/// identifier are left out.
pub fn ancestor_summary(path: &[AncestorEntry]) -> String {
    path.iter()
        .filter_map(|entry| {
            entry
                .identifier()
                .filter(|id| !id.is_empty())
                .map(|id| format!("{}:{}", capitalize_first(&entry.kind), id))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
