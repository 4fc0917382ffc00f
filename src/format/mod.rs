//! Question Content Formatter
//!
//! Converts raw question prose into HTML with click-to-copy elements for
//! URLs, sysctl parameters and backtick-delimited commands, plus bold,
//! italic and line-break handling.
//!
//! # Pipeline
//!
//! The input is first split into text and markup (known HTML tags and whole
//! already-decorated elements). Every following pass rewrites text nodes only:
//!
//! 1. pinned URLs (claimed whole)
//! 2. bare `http(s)://` URLs
//! 3. `net.*=<digits>` sysctl parameters
//! 4. backtick spans
//! 5. `**bold**`, then `*italic*`
//! 6. newlines
//!
//! Rendering then joins adjacent paragraphs and list items onto separate lines.

mod escape;
mod inline;

pub use escape::{decode_entities, escape_attr, escape_text};
pub use inline::{
    render_copyable, render_inlines, CopyKind, Inline, CLICKABLE_CODE_CLASS,
    CLICKABLE_PATH_CLASS, CODE_TITLE, COPY_ATTR, INLINE_CODE_CLASS,
};

use crate::config::FormatterSettings;
use inline::push_text;
use log::warn;
use regex::{Captures, Regex};
use std::sync::OnceLock;

// ─────────────────────────────────────────────────────────────────────────────
// Patterns
// ─────────────────────────────────────────────────────────────────────────────

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"https?://[a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=%]+").expect("valid URL regex")
    })
}

fn sysctl_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"net\.[a-zA-Z0-9._-]+=[0-9]+").expect("valid sysctl regex"))
}

fn backtick_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid backtick regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</?([a-zA-Z][a-zA-Z0-9]*)(?:\s[^<>]*)?/?>").expect("valid tag regex")
    })
}

/// Tags passed through as markup; anything else that looks like a tag is text.
const KNOWN_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "button", "caption", "code", "dd", "del", "details",
    "div", "dl", "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr",
    "i", "img", "ins", "kbd", "label", "li", "mark", "ol", "p", "path", "pre", "s", "samp",
    "section", "small", "span", "strong", "sub", "summary", "sup", "svg", "table", "tbody",
    "td", "th", "thead", "tr", "u", "ul", "var",
];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

// ─────────────────────────────────────────────────────────────────────────────
// Formatter
// ─────────────────────────────────────────────────────────────────────────────

/// Formats question content into HTML.
#[derive(Debug, Clone)]
pub struct ContentFormatter {
    pinned: Option<Regex>,
}

impl Default for ContentFormatter {
    fn default() -> Self {
        Self::new(&FormatterSettings::default())
    }
}

impl ContentFormatter {
    /// Create a formatter that claims the configured pinned URLs first.
    pub fn new(settings: &FormatterSettings) -> Self {
        let mut urls: Vec<&str> = settings
            .pinned_urls
            .iter()
            .map(String::as_str)
            .filter(|u| !u.is_empty())
            .collect();
        // Longest first so a pinned URL never loses to its own prefix
        urls.sort_by_key(|u| std::cmp::Reverse(u.len()));

        let pinned = if urls.is_empty() {
            None
        } else {
            let pattern = urls
                .iter()
                .map(|u| regex::escape(u))
                .collect::<Vec<_>>()
                .join("|");
            match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("Ignoring pinned URLs: {}", e);
                    None
                }
            }
        };

        Self { pinned }
    }

    /// Format question content into an HTML string.
    pub fn format(&self, content: &str) -> String {
        let nodes = self.parse(content);
        let mut html = String::with_capacity(content.len() * 2);
        render_inlines(&nodes, &mut html);
        html.replace("</p><p>", "</p>\n<p>")
            .replace("</li><li>", "</li>\n<li>")
    }

    /// Build the inline tree for question content.
    pub fn parse(&self, content: &str) -> Vec<Inline> {
        let mut nodes = lex_markup(content);

        if let Some(pinned) = &self.pinned {
            nodes = split_text(nodes, pinned, |caps| {
                Some(Inline::copyable(CopyKind::Url, &caps[0]))
            });
        }
        nodes = split_text(nodes, url_regex(), |caps| {
            Some(Inline::copyable(CopyKind::Url, &caps[0]))
        });
        nodes = split_text(nodes, sysctl_regex(), |caps| {
            Some(Inline::copyable(CopyKind::Sysctl, &caps[0]))
        });
        nodes = split_text(nodes, backtick_regex(), |caps| {
            Some(Inline::copyable(CopyKind::Code, caps[1].trim()))
        });

        nodes = apply_emphasis(nodes);
        break_lines(nodes)
    }
}

/// Format question content with the default settings.
pub fn process_question_content(content: &str) -> String {
    ContentFormatter::default().format(content)
}

// ─────────────────────────────────────────────────────────────────────────────
// Markup Lexing
// ─────────────────────────────────────────────────────────────────────────────

fn is_decorated(tag: &str) -> bool {
    tag.contains(COPY_ATTR)
        || [CLICKABLE_CODE_CLASS, CLICKABLE_PATH_CLASS, INLINE_CODE_CLASS]
            .iter()
            .any(|class| tag.contains(class))
}

struct OpenDecorated {
    tag: String,
    depth: usize,
    start: usize,
}

/// Byte ranges of backtick spans whose tags are command text, not markup.
///
/// Spans that hold decorated elements or close tags are left to the lexer.
fn literal_spans(content: &str) -> Vec<std::ops::Range<usize>> {
    backtick_regex()
        .find_iter(content)
        .filter(|m| {
            let span = m.as_str();
            !span.contains("</") && !is_decorated(span)
        })
        .map(|m| m.range())
        .collect()
}

/// Whether a `</name>` close tag occurs in `rest`.
fn has_close_tag(rest: &str, name: &str) -> bool {
    let lower = rest.to_ascii_lowercase();
    let needle = format!("</{}", name);
    lower.match_indices(&needle).any(|(at, _)| {
        lower[at + needle.len()..]
            .chars()
            .next()
            .is_some_and(|c| c == '>' || c.is_ascii_whitespace())
    })
}

/// Split content into text and markup.
///
/// Known tags become `Inline::Markup`, except inside backtick spans and
/// opening tags that are never closed. An element that already carries copy
/// decoration is kept whole, children included, up to its matching close tag.
fn lex_markup(content: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut last = 0;
    let mut open: Option<OpenDecorated> = None;
    let literal = literal_spans(content);

    for caps in tag_regex().captures_iter(content) {
        let Some(whole) = caps.get(0) else { continue };
        let name = caps[1].to_ascii_lowercase();
        if !KNOWN_TAGS.contains(&name.as_str()) {
            continue;
        }
        let tag = whole.as_str();
        let closing = tag.starts_with("</");
        let self_closing = tag.ends_with("/>") || VOID_TAGS.contains(&name.as_str());

        if open.is_none() {
            let in_literal = literal.iter().any(|span| span.contains(&whole.start()));
            let unclosed = !closing
                && !self_closing
                && !is_decorated(tag)
                && !has_close_tag(&content[whole.end()..], &name);
            if in_literal || unclosed {
                continue;
            }
        }

        if let Some(dec) = open.as_mut() {
            if name != dec.tag || self_closing {
                continue;
            }
            if !closing {
                dec.depth += 1;
                continue;
            }
            dec.depth -= 1;
            if dec.depth == 0 {
                let start = dec.start;
                open = None;
                out.push(Inline::Markup(content[start..whole.end()].to_string()));
                last = whole.end();
            }
            continue;
        }

        push_text(&mut out, &content[last..whole.start()]);
        last = whole.end();

        if !closing && !self_closing && is_decorated(tag) {
            open = Some(OpenDecorated {
                tag: name,
                depth: 1,
                start: whole.start(),
            });
        } else {
            out.push(Inline::Markup(tag.to_string()));
        }
    }

    if let Some(dec) = open {
        // Unclosed decorated element: keep the remainder verbatim
        out.push(Inline::Markup(content[dec.start..].to_string()));
        return out;
    }

    push_text(&mut out, &content[last..]);
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Passes
// ─────────────────────────────────────────────────────────────────────────────

/// Replace matches of `re` inside text nodes with the node `wrap` returns.
///
/// Matches for which `wrap` returns `None` stay text.
fn split_text<F>(nodes: Vec<Inline>, re: &Regex, mut wrap: F) -> Vec<Inline>
where
    F: FnMut(&Captures<'_>) -> Option<Inline>,
{
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        let Inline::Text(text) = node else {
            out.push(node);
            continue;
        };

        let mut last = 0;
        for caps in re.captures_iter(&text) {
            let Some(whole) = caps.get(0) else { continue };
            if let Some(inline) = wrap(&caps) {
                push_text(&mut out, &text[last..whole.start()]);
                out.push(inline);
                last = whole.end();
            }
        }
        push_text(&mut out, &text[last..]);
    }
    out
}

#[derive(Debug, Clone)]
enum Tok {
    Star,
    Node(Inline),
}

fn tokenize_stars(nodes: Vec<Inline>) -> Vec<Tok> {
    let mut toks = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Inline::Text(text) => {
                for (i, piece) in text.split('*').enumerate() {
                    if i > 0 {
                        toks.push(Tok::Star);
                    }
                    if !piece.is_empty() {
                        toks.push(Tok::Node(Inline::Text(piece.to_string())));
                    }
                }
            }
            other => toks.push(Tok::Node(other)),
        }
    }
    toks
}

fn untokenize(toks: &[Tok]) -> Vec<Inline> {
    let mut out = Vec::with_capacity(toks.len());
    for tok in toks {
        match tok {
            Tok::Star => push_text(&mut out, "*"),
            Tok::Node(Inline::Text(text)) => push_text(&mut out, text),
            Tok::Node(node) => out.push(node.clone()),
        }
    }
    out
}

fn star_run(toks: &[Tok], at: usize, width: usize) -> bool {
    at + width <= toks.len() && toks[at..at + width].iter().all(|t| matches!(t, Tok::Star))
}

/// Pair `width`-star delimiters around star-free content, leftmost first.
fn pair_stars(toks: Vec<Tok>, width: usize, wrap: fn(Vec<Inline>) -> Inline) -> Vec<Tok> {
    let mut out = Vec::with_capacity(toks.len());
    let mut i = 0;
    while i < toks.len() {
        if star_run(&toks, i, width) {
            let body = i + width;
            let mut end = body;
            while end < toks.len() && !matches!(toks[end], Tok::Star) {
                end += 1;
            }
            if end > body && star_run(&toks, end, width) {
                out.push(Tok::Node(wrap(untokenize(&toks[body..end]))));
                i = end + width;
                continue;
            }
        }
        out.push(toks[i].clone());
        i += 1;
    }
    out
}

/// `**text**` becomes strong, then `*text*` becomes emphasis.
///
/// Delimiters pair across copyable elements and markup, never across stars.
fn apply_emphasis(nodes: Vec<Inline>) -> Vec<Inline> {
    let toks = tokenize_stars(nodes);
    let toks = pair_stars(toks, 2, Inline::Strong);
    let toks = pair_stars(toks, 1, Inline::Emphasis);
    untokenize(&toks)
}

fn break_lines(nodes: Vec<Inline>) -> Vec<Inline> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Inline::Text(text) => {
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        out.push(Inline::LineBreak);
                    }
                    let line = line.strip_suffix('\r').unwrap_or(line);
                    push_text(&mut out, line);
                }
            }
            Inline::Strong(children) => out.push(Inline::Strong(break_lines(children))),
            Inline::Emphasis(children) => out.push(Inline::Emphasis(break_lines(children))),
            other => out.push(other),
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CALICO_OPERATOR_URL;

    fn fmt(content: &str) -> String {
        process_question_content(content)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fmt(""), "");
    }

    #[test]
    fn test_backtick_command() {
        let html = fmt("Run `kubectl get pods -n kube-system` to check");
        assert_eq!(
            html,
            r#"Run <code class="bg-light px-1 rounded clickable-code" data-copy-text="kubectl get pods -n kube-system" title="Click to copy">kubectl get pods -n kube-system</code> to check"#
        );
    }

    #[test]
    fn test_backtick_text_is_trimmed_and_escaped() {
        let nodes = ContentFormatter::default().parse("`  echo \"$HOME\" > /tmp/x  `");
        assert_eq!(
            nodes,
            vec![Inline::copyable(CopyKind::Code, "echo \"$HOME\" > /tmp/x")]
        );

        let html = fmt("`  echo \"$HOME\" > /tmp/x  `");
        assert!(html.contains(r#"data-copy-text="echo &quot;$HOME&quot; &gt; /tmp/x""#));
        assert!(html.contains(r#">echo "$HOME" &gt; /tmp/x</code>"#));
    }

    #[test]
    fn test_unmatched_backtick_is_literal() {
        assert_eq!(fmt("a `b c"), "a `b c");
        let html = fmt("`one` and `two");
        assert_eq!(html.matches("clickable-code").count(), 1);
        assert!(html.ends_with(" and `two"));
    }

    #[test]
    fn test_sysctl_parameter() {
        let html = fmt("Set net.ipv4.ip_forward=1 persistently");
        assert_eq!(
            html,
            r#"Set <span class="clickable-filepath" data-copy-text="net.ipv4.ip_forward=1" title="Click to copy sysctl parameter">net.ipv4.ip_forward=1</span> persistently"#
        );
    }

    #[test]
    fn test_url_wrapped_once() {
        let html = fmt("Install from https://argoproj.github.io/argo-helm now");
        assert_eq!(html.matches("<span").count(), 1);
        assert!(html.contains(
            r#"data-copy-text="https://argoproj.github.io/argo-helm" title="Click to copy URL">https://argoproj.github.io/argo-helm</span> now"#
        ));
    }

    #[test]
    fn test_url_with_unsafe_chars() {
        let html = fmt("see http://example.org/echo?a=1&b='x'\nnext");
        assert!(html.contains(r#"data-copy-text="http://example.org/echo?a=1&amp;b=&#39;x&#39;""#));
        assert!(html.contains(">http://example.org/echo?a=1&b='x'</span><br>next"));

        for url in ["http://example.org/echo?a=1&b='x'", "https://k8s.io/q?x=1&amp=2&y='z'"] {
            let html = fmt(&format!("open {} now", url));
            let doc = crate::dom::Document::parse_fragment(&html);
            let span = doc.elements_with(CLICKABLE_PATH_CLASS, COPY_ATTR)[0];
            let attr = doc.element(span).and_then(|el| el.attr(COPY_ATTR)).unwrap();
            assert_eq!(decode_entities(attr), url);
        }
    }

    #[test]
    fn test_pinned_url_claimed_without_trailing_punctuation() {
        let input = format!("Apply {},then wait", CALICO_OPERATOR_URL);
        let nodes = ContentFormatter::default().parse(&input);
        assert_eq!(
            nodes,
            vec![
                Inline::Text("Apply ".to_string()),
                Inline::copyable(CopyKind::Url, CALICO_OPERATOR_URL),
                Inline::Text(",then wait".to_string()),
            ]
        );

        // Without pinning the URL pattern swallows the comma
        let plain = ContentFormatter::new(&FormatterSettings {
            pinned_urls: Vec::new(),
        });
        let nodes = plain.parse(&input);
        assert_eq!(
            nodes[1],
            Inline::copyable(CopyKind::Url, format!("{},then", CALICO_OPERATOR_URL))
        );
    }

    #[test]
    fn test_url_inside_backticks_stays_literal_backticks() {
        let html = fmt("`curl https://a.io/x`");
        assert_eq!(html.matches("clickable-code").count(), 0);
        assert_eq!(html.matches("clickable-filepath").count(), 1);
        assert!(html.starts_with("`curl <span"));
        assert!(html.ends_with("</span>`"));
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            fmt("**Note:** use *only* this"),
            "<strong>Note:</strong> use <em>only</em> this"
        );
        assert_eq!(fmt("***both***"), "<em><strong>both</strong></em>");
        assert_eq!(fmt("a * b * c"), "a <em> b </em> c");
        assert_eq!(fmt("lonely * star"), "lonely * star");
    }

    #[test]
    fn test_bold_spans_code_element() {
        let html = fmt("**Run `ls` first**");
        assert!(html.starts_with("<strong>Run <code"));
        assert!(html.ends_with("</code> first</strong>"));
    }

    #[test]
    fn test_star_inside_code_is_not_emphasis() {
        let html = fmt("`ls *.txt` and `rm *.log`");
        assert!(!html.contains("<em>"));
        assert!(html.contains(r#"data-copy-text="ls *.txt""#));
    }

    #[test]
    fn test_newlines_and_block_spacing() {
        assert_eq!(fmt("a\nb\r\nc"), "a<br>b<br>c");
        assert_eq!(fmt("<p>a</p><p>b</p>"), "<p>a</p>\n<p>b</p>");
        assert_eq!(
            fmt("<ul><li>a</li><li>b</li></ul>"),
            "<ul><li>a</li>\n<li>b</li></ul>"
        );
    }

    #[test]
    fn test_unknown_tags_are_escaped() {
        assert_eq!(
            fmt("<script>alert(1)</script>"),
            "&lt;script&gt;alert(1)&lt;/script&gt;"
        );
        let html = fmt("`grep <name> file`");
        assert!(html.contains(r#"data-copy-text="grep &lt;name&gt; file""#));
    }

    #[test]
    fn test_known_tag_names_as_placeholders() {
        let html = fmt("Run `cat <path>` now");
        assert_eq!(
            html,
            r#"Run <code class="bg-light px-1 rounded clickable-code" data-copy-text="cat &lt;path&gt;" title="Click to copy">cat &lt;path&gt;</code> now"#
        );

        let html = fmt("Then `kubectl label pods <label>` and <b>check</b>");
        assert!(html.contains(r#"data-copy-text="kubectl label pods &lt;label&gt;""#));
        assert!(html.ends_with(" and <b>check</b>"));
    }

    #[test]
    fn test_unclosed_known_tag_is_escaped() {
        assert_eq!(fmt("replace <label> with a value"), "replace &lt;label&gt; with a value");
        assert_eq!(fmt("<b>bold</b> and <i>open"), "<b>bold</b> and &lt;i&gt;open");
        assert_eq!(fmt("a<br>b<hr/>"), "a<br>b<hr/>");
    }

    #[test]
    fn test_url_inside_known_tag_untouched() {
        let html = fmt(r#"<a href="https://k8s.io/docs">docs</a>"#);
        assert_eq!(html, r#"<a href="https://k8s.io/docs">docs</a>"#);
    }

    #[test]
    fn test_reformatting_does_not_double_wrap() {
        let input = "Run `kubectl get ns` then open https://k8s.io/x and set net.ipv6.conf.all.forwarding=1\n**done** *ok*";
        let once = fmt(input);
        let twice = fmt(&once);
        assert_eq!(once, twice);
        assert_eq!(twice.matches("clickable-code").count(), 1);
        assert_eq!(twice.matches("clickable-filepath").count(), 2);
    }

    #[test]
    fn test_decorated_input_kept_whole() {
        let decorated = r#"<span class="clickable-filepath" data-copy-text="net.a=1">net.a=1 `x`</span>"#;
        let html = fmt(&format!("{} `y`", decorated));
        assert!(html.starts_with(decorated));
        assert_eq!(html.matches("clickable-code").count(), 1);
    }

    #[test]
    fn test_unclosed_decorated_element_is_verbatim() {
        let input = r#"<code class="clickable-code" data-copy-text="a">a `b`"#;
        assert_eq!(fmt(input), input);
    }
}
