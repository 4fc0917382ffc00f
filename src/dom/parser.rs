//! Lenient HTML fragment parser.
//!
//! Handles what rendered question markup and copied selections contain:
//! elements with quoted or bare attributes, void and self-closing tags,
//! comments, and stray `<` characters in text. Unknown end tags are ignored;
//! an end tag closes the nearest open element with the same name.

use super::{Document, ElementData, NodeId};
use crate::format::decode_entities;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    doc: Document,
    stack: Vec<NodeId>,
}

pub(super) fn parse_fragment(html: &str) -> Document {
    let doc = Document::new();
    let root = doc.root();
    let mut parser = Parser {
        input: html,
        pos: 0,
        doc,
        stack: vec![root],
    };
    parser.run();
    parser.doc
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn run(&mut self) {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.skip_comment();
            } else if rest.starts_with("</") && starts_tag_name(&rest[2..]) {
                self.end_tag();
            } else if rest.starts_with('<') && starts_tag_name(&rest[1..]) {
                self.start_tag();
            } else {
                self.text();
            }
        }
    }

    fn skip_comment(&mut self) {
        match self.rest()[4..].find("-->") {
            Some(end) => self.pos += 4 + end + 3,
            None => self.pos = self.input.len(),
        }
    }

    fn text(&mut self) {
        let rest = self.rest();
        // The first byte is always consumed so a lone '<' makes progress
        let mut end = rest.len();
        for (i, b) in rest.bytes().enumerate().skip(1) {
            if b == b'<' && is_markup_start(&rest[i..]) {
                end = i;
                break;
            }
        }
        let raw = &rest[..end];
        self.pos += end;
        let parent = self.current();
        self.doc.append_text(parent, &decode_entities(raw));
    }

    fn end_tag(&mut self) {
        let rest = self.rest();
        let name_len = tag_name_len(&rest[2..]);
        let name = rest[2..2 + name_len].to_ascii_lowercase();
        self.pos += match rest.find('>') {
            Some(close) => close + 1,
            None => rest.len(),
        };

        let open_at = self.stack.iter().rposition(|&n| {
            self.doc
                .element(n)
                .map(|el| el.tag == name)
                .unwrap_or(false)
        });
        if let Some(at) = open_at {
            self.stack.truncate(at);
        }
    }

    fn start_tag(&mut self) {
        let rest = self.rest();
        let name_len = tag_name_len(&rest[1..]);
        let mut element = ElementData::new(&rest[1..1 + name_len]);
        let mut i = 1 + name_len;
        let bytes = rest.as_bytes();
        let mut self_closing = false;

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }
            match bytes[i] {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    i += 1;
                    if bytes.get(i) == Some(&b'>') {
                        self_closing = true;
                        i += 1;
                        break;
                    }
                    continue;
                }
                _ => {}
            }

            let name_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let name = &rest[name_start..i];

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let mut value = "";
            if bytes.get(i) == Some(&b'=') {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                match bytes.get(i).copied() {
                    Some(quote) if quote == b'"' || quote == b'\'' => {
                        let value_start = i + 1;
                        let close = rest[value_start..]
                            .find(quote as char)
                            .map(|off| value_start + off)
                            .unwrap_or(rest.len());
                        value = &rest[value_start..close];
                        i = (close + 1).min(rest.len());
                    }
                    _ => {
                        let value_start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                        {
                            i += 1;
                        }
                        value = &rest[value_start..i];
                    }
                }
            }
            if !name.is_empty() {
                element = element.with_attr(name, value);
            }
        }

        self.pos += i;
        let is_void_tag = is_void(&element.tag);
        let parent = self.current();
        let id = self.doc.append_element(parent, element);
        if !self_closing && !is_void_tag {
            self.stack.push(id);
        }
    }
}

fn starts_tag_name(s: &str) -> bool {
    s.bytes().next().map(|b| b.is_ascii_alphabetic()).unwrap_or(false)
}

fn tag_name_len(s: &str) -> usize {
    s.bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count()
}

fn is_markup_start(s: &str) -> bool {
    s.starts_with("<!--")
        || (s.starts_with("</") && starts_tag_name(&s[2..]))
        || starts_tag_name(&s[1..])
}
