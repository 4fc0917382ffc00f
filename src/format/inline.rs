//! Typed inline tree produced by the content formatter.
//!
//! Each pass of the formatter only ever rewrites `Inline::Text` nodes, so a
//! span that has been wrapped once can never be wrapped again.

use super::escape::{escape_angles, escape_attr, escape_text};

// ─────────────────────────────────────────────────────────────────────────────
// DOM Contract
// ─────────────────────────────────────────────────────────────────────────────

/// Attribute holding the escaped literal to copy.
pub const COPY_ATTR: &str = "data-copy-text";
/// Class of copyable code elements; also required for clean selection copy.
pub const CLICKABLE_CODE_CLASS: &str = "clickable-code";
/// Class of copyable URL and sysctl spans.
pub const CLICKABLE_PATH_CLASS: &str = "clickable-filepath";
/// Legacy class whose text content is copied on click.
pub const INLINE_CODE_CLASS: &str = "inline-code";
/// Tooltip on copyable code elements.
pub const CODE_TITLE: &str = "Click to copy";

const CODE_CLASSES: &str = "bg-light px-1 rounded clickable-code";
const URL_TITLE: &str = "Click to copy URL";
const SYSCTL_TITLE: &str = "Click to copy sysctl parameter";

// ─────────────────────────────────────────────────────────────────────────────
// Inline Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// What a copyable node was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    /// Bare `http(s)://` URL
    Url,
    /// `net.*=<digits>` kernel parameter
    Sysctl,
    /// Backtick-delimited command or value
    Code,
}

/// A node of formatted question content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text, angle brackets escaped on output
    Text(String),
    /// Markup carried through verbatim (known tags, already-decorated elements)
    Markup(String),
    /// Click-to-copy element; `text` is the literal copy-text
    Copyable { kind: CopyKind, text: String },
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    LineBreak,
}

impl Inline {
    pub fn copyable(kind: CopyKind, text: impl Into<String>) -> Self {
        Inline::Copyable {
            kind,
            text: text.into(),
        }
    }
}

/// Append `text` to `out`, merging with a trailing text node.
pub(crate) fn push_text(out: &mut Vec<Inline>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Inline::Text(prev)) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Text(text.to_string()));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Render a copyable element.
///
/// URL and sysctl spans display their text raw, code elements display it
/// escaped; the attribute is always escaped.
pub fn render_copyable(kind: CopyKind, text: &str, out: &mut String) {
    let attr = escape_attr(text);
    match kind {
        CopyKind::Url | CopyKind::Sysctl => {
            let title = if kind == CopyKind::Url {
                URL_TITLE
            } else {
                SYSCTL_TITLE
            };
            out.push_str(&format!(
                r#"<span class="{CLICKABLE_PATH_CLASS}" {COPY_ATTR}="{attr}" title="{title}">{text}</span>"#
            ));
        }
        CopyKind::Code => {
            let display = escape_text(text).replace('\n', "<br>");
            out.push_str(&format!(
                r#"<code class="{CODE_CLASSES}" {COPY_ATTR}="{attr}" title="{CODE_TITLE}">{display}</code>"#
            ));
        }
    }
}

/// Render a sequence of inline nodes as HTML.
pub fn render_inlines(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => out.push_str(&escape_angles(text)),
            Inline::Markup(markup) => out.push_str(markup),
            Inline::Copyable { kind, text } => render_copyable(*kind, text, out),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                render_inlines(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                render_inlines(children, out);
                out.push_str("</em>");
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}
