//! Selection ranges over a [`Document`].
//!
//! A boundary is a node plus an offset: a character offset inside text
//! nodes, a child index everywhere else. Boundaries are ordered by their
//! path of child indices from the root.

use super::{Document, NodeId, NodeKind};
use std::cmp::Ordering;

/// One end of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }

    fn path(&self, doc: &Document) -> Vec<usize> {
        let mut path: Vec<usize> = doc
            .ancestors(self.node)
            .filter_map(|n| doc.index_in_parent(n))
            .collect();
        path.reverse();
        path.push(self.offset);
        path
    }
}

fn compare(doc: &Document, a: Boundary, b: Boundary) -> Ordering {
    a.path(doc).cmp(&b.path(doc))
}

fn slice_chars(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// A contiguous span of a document, start never after end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    start: Boundary,
    end: Boundary,
}

impl Range {
    /// Create a range; the boundaries are swapped if given backwards and
    /// offsets are clamped to the node length.
    pub fn new(doc: &Document, start: Boundary, end: Boundary) -> Self {
        let clamp = |b: Boundary| Boundary::new(b.node, b.offset.min(doc.node_length(b.node)));
        let (start, end) = (clamp(start), clamp(end));
        if compare(doc, start, end) == Ordering::Greater {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// Range covering the contents of `node`.
    pub fn select_node_contents(doc: &Document, node: NodeId) -> Self {
        Self {
            start: Boundary::new(node, 0),
            end: Boundary::new(node, doc.node_length(node)),
        }
    }

    /// Range covering `node` itself; the root selects its contents.
    pub fn select_node(doc: &Document, node: NodeId) -> Self {
        match (doc.parent(node), doc.index_in_parent(node)) {
            (Some(parent), Some(index)) => Self {
                start: Boundary::new(parent, index),
                end: Boundary::new(parent, index + 1),
            },
            _ => Self::select_node_contents(doc, node),
        }
    }

    pub fn start(&self) -> Boundary {
        self.start
    }

    pub fn end(&self) -> Boundary {
        self.end
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Deepest node containing both boundaries.
    pub fn common_ancestor_container(&self, doc: &Document) -> NodeId {
        let start_chain: Vec<NodeId> = doc.ancestors(self.start.node).collect();
        doc.ancestors(self.end.node)
            .find(|n| start_chain.contains(n))
            .unwrap_or_else(|| doc.root())
    }

    /// The selected text, as a browser's `Selection.toString()` reports it.
    pub fn selected_text(&self, doc: &Document) -> String {
        let mut out = String::new();
        for node in doc.descendants(doc.root()) {
            let Some(text) = doc.text(node) else { continue };
            let len = doc.node_length(node);

            let from = if node == self.start.node {
                self.start.offset
            } else if compare(doc, self.start, Boundary::new(node, 0)) != Ordering::Greater {
                0
            } else {
                continue;
            };
            let to = if node == self.end.node {
                self.end.offset
            } else if compare(doc, Boundary::new(node, len), self.end) != Ordering::Greater {
                len
            } else {
                continue;
            };

            if from < to {
                out.push_str(&slice_chars(text, from, to));
            }
        }
        out
    }

    /// Copy the selected nodes into a new fragment.
    ///
    /// Fully selected nodes are copied deep; elements that are only partly
    /// selected are copied with their attributes and the selected part of
    /// their children.
    pub fn clone_contents(&self, doc: &Document) -> Document {
        let mut fragment = Document::new();
        let root = fragment.root();
        let container = self.common_ancestor_container(doc);

        if let Some(text) = doc.text(container) {
            let selected = slice_chars(text, self.start.offset, self.end.offset);
            fragment.append_text(root, &selected);
            return fragment;
        }

        self.clone_children(doc, container, &mut fragment, root);
        fragment
    }

    fn clone_children(
        &self,
        doc: &Document,
        parent: NodeId,
        fragment: &mut Document,
        fragment_parent: NodeId,
    ) {
        for (index, &child) in doc.children(parent).iter().enumerate() {
            let before = Boundary::new(parent, index);
            let after = Boundary::new(parent, index + 1);
            let fully_selected = compare(doc, self.start, before) != Ordering::Greater
                && compare(doc, after, self.end) != Ordering::Greater;

            if fully_selected {
                fragment.import(doc, child, fragment_parent);
                continue;
            }

            let holds_boundary = doc.is_inclusive_ancestor(child, self.start.node)
                || doc.is_inclusive_ancestor(child, self.end.node);
            if !holds_boundary {
                continue;
            }

            match doc.kind(child) {
                NodeKind::Text(text) => {
                    let from = if child == self.start.node {
                        self.start.offset
                    } else {
                        0
                    };
                    let to = if child == self.end.node {
                        self.end.offset
                    } else {
                        doc.node_length(child)
                    };
                    fragment.append_text(fragment_parent, &slice_chars(text, from, to));
                }
                NodeKind::Element(element) => {
                    let copy = fragment.append_element(fragment_parent, element.clone());
                    self.clone_children(doc, child, fragment, copy);
                }
                NodeKind::Root => {}
            }
        }
    }
}

/// The user's current selection: zero or one range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    range: Option<Range>,
}

impl Selection {
    pub fn empty() -> Self {
        Self { range: None }
    }

    pub fn new(range: Range) -> Self {
        Self { range: Some(range) }
    }

    pub fn range_count(&self) -> usize {
        usize::from(self.range.is_some())
    }

    pub fn first_range(&self) -> Option<&Range> {
        self.range.as_ref()
    }
}
