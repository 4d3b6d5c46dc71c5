use crate::classify::is_structural;
use crate::tree::Node;

pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Single-line form: every whitespace run becomes one space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Text owned by `node` itself: its own text, every content descendant's
/// text, and the tails of structural children, but nothing inside a
/// structural descendant. Element boundaries read as whitespace, so
/// adjacent cells or paragraphs never fuse into one token.
pub fn local_text(node: &Node) -> String {
    let mut out = String::new();
    push_spaced_text(node, true, &mut out);
    out
}

/// All text under `node` with a word break at every element boundary.
pub fn spaced_text(node: &Node) -> String {
    let mut out = String::new();
    push_spaced_text(node, false, &mut out);
    out
}

fn push_spaced_text(node: &Node, skip_structural: bool, out: &mut String) {
    out.push_str(&node.text);
    for child in &node.children {
        push_boundary(out);
        if !(skip_structural && is_structural(&child.kind)) {
            push_spaced_text(child, skip_structural, out);
            push_boundary(out);
        }
        out.push_str(&child.tail);
    }
}

fn push_boundary(out: &mut String) {
    if !out.is_empty() && !out.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

/// Outermost structural descendants: the units whose nearest structural
/// ancestor is `node`.
pub fn structural_children(node: &Node) -> Vec<&Node> {
    let mut out = Vec::new();
    collect_structural_children(node, &mut out);
    out
}

fn collect_structural_children<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    for child in &node.children {
        if is_structural(&child.kind) {
            out.push(child);
        } else {
            collect_structural_children(child, out);
        }
    }
}

/// First element of `kind` under `node` that is not inside a nested
/// structural unit.
pub fn find_within_unit<'a>(node: &'a Node, kind: &str) -> Option<&'a Node> {
    for child in &node.children {
        if child.kind == kind {
            return Some(child);
        }
    }
    node.children
        .iter()
        .filter(|c| !is_structural(&c.kind))
        .find_map(|c| find_within_unit(c, kind))
}
