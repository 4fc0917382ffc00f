//! Minimal Document Model
//!
//! An arena-backed tree of element and text nodes, built from rendered
//! question HTML, used to resolve click targets and selections back to
//! their copy-text.
//!
//! # Storage
//!
//! - Text nodes hold decoded text, the way a browser exposes it.
//! - Attribute values are kept exactly as written in the markup, so a
//!   `data-copy-text` value is entity-decoded once, at delivery.
//!
//! # Architecture
//!
//! - `parser.rs` - lenient HTML fragment parser
//! - `range.rs` - selection ranges: text, cloning, common ancestor

mod parser;
mod range;

pub use range::{Boundary, Range, Selection};

use crate::format::escape_text;

// ─────────────────────────────────────────────────────────────────────────────
// Node Types
// ─────────────────────────────────────────────────────────────────────────────

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// An element's tag name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    /// Builder-style attribute setter; an existing attribute keeps its first value.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into().to_ascii_lowercase();
        if !self.has_attr(&name) {
            self.attrs.push((name, value.into()));
        }
        self
    }

    /// Raw attribute value as written in the markup.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| n == name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The fragment root; never an element
    Root,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// A tree of nodes under a single root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Parse an HTML fragment. Never fails; malformed markup is recovered
    /// the way a lenient browser parser would.
    pub fn parse_fragment(html: &str) -> Self {
        parser::parse_fragment(html)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element(&mut self, parent: NodeId, element: ElementData) -> NodeId {
        self.push(parent, NodeKind::Element(element))
    }

    /// Append text under `parent`, merging into a trailing text sibling.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Option<NodeId> {
        if text.is_empty() {
            return None;
        }
        if let Some(&last) = self.nodes[parent.0].children.last() {
            if let NodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(text);
                return Some(last);
            }
        }
        Some(self.push(parent, NodeKind::Text(text.to_string())))
    }

    /// Deep-copy `node` from `source` under `parent` in this document.
    pub fn import(&mut self, source: &Document, node: NodeId, parent: NodeId) -> Option<NodeId> {
        match source.kind(node) {
            NodeKind::Root => {
                for &child in source.children(node) {
                    self.import(source, child, parent);
                }
                None
            }
            NodeKind::Text(text) => self.append_text(parent, text),
            NodeKind::Element(element) => {
                let copy = self.append_element(parent, element.clone());
                for &child in source.children(node) {
                    self.import(source, child, copy);
                }
                Some(copy)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access
    // ─────────────────────────────────────────────────────────────────────────

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Position of `id` among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Offset just past the end of a node's contents: characters for text,
    /// children otherwise.
    pub fn node_length(&self, id: NodeId) -> usize {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => text.chars().count(),
            _ => self.children(id).len(),
        }
    }

    /// `id` and its ancestors, innermost first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Elements under the root carrying `class` and attribute `attr`, in
    /// document order.
    pub fn elements_with(&self, class: &str, attr: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .filter(|&n| {
                self.element(n)
                    .map(|el| el.has_class(class) && el.has_attr(attr))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Boundary at the first occurrence of `needle` in any single text node.
    pub fn find_text(&self, needle: &str) -> Option<Boundary> {
        self.descendants(self.root()).into_iter().find_map(|n| {
            let text = self.text(n)?;
            let byte = text.find(needle)?;
            Some(Boundary::new(n, text[..byte].chars().count()))
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize the children of `id` back to HTML.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Root => {
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
            }
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in element.attrs() {
                    out.push_str(&format!(r#" {}="{}""#, name, value));
                }
                out.push('>');
                if parser::is_void(&element.tag) {
                    return;
                }
                for &child in self.children(id) {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{}>", element.tag));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_query() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = doc.append_element(root, ElementData::new("DIV").with_attr("class", "a b"));
        let text = doc.append_text(div, "hello").unwrap();
        doc.append_text(div, " world");

        assert_eq!(doc.children(div), &[text]);
        assert_eq!(doc.text(text), Some("hello world"));
        assert_eq!(doc.element(div).unwrap().tag, "div");
        assert!(doc.element(div).unwrap().has_class("b"));
        assert!(!doc.element(div).unwrap().has_class("ab"));
        assert_eq!(doc.ancestors(text).collect::<Vec<_>>(), vec![text, div, root]);
        assert_eq!(doc.node_length(text), 11);
    }

    #[test]
    fn test_elements_with_in_document_order() {
        let doc = Document::parse_fragment(
            r#"<p><code class="clickable-code" data-copy-text="a">a</code> x <span class="clickable-code">n</span><code class="clickable-code" data-copy-text="b">b</code></p>"#,
        );
        let found: Vec<String> = doc
            .elements_with("clickable-code", "data-copy-text")
            .into_iter()
            .map(|n| doc.text_content(n))
            .collect();
        assert_eq!(found, vec!["a", "b"]);
    }

    #[test]
    fn test_find_text_counts_chars() {
        let doc = Document::parse_fragment("<b>héllo wörld</b>");
        let at = doc.find_text("wörld").unwrap();
        assert_eq!(at.offset, 6);
    }

    #[test]
    fn test_inner_html_roundtrip_keeps_raw_attrs() {
        let html = r#"<code class="c" data-copy-text="a &amp;&amp; b">a &amp;&amp; b</code><br>"#;
        let doc = Document::parse_fragment(html);
        assert_eq!(doc.inner_html(doc.root()), html);
    }

    #[test]
    fn test_import_deep_copies() {
        let source = Document::parse_fragment("<ul><li>a</li><li>b</li></ul>");
        let mut target = Document::new();
        let root = target.root();
        let ul = source.children(source.root())[0];
        target.import(&source, ul, root);
        assert_eq!(target.inner_html(root), "<ul><li>a</li><li>b</li></ul>");
    }
}
