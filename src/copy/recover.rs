//! Recovering clean copy-text from selections that captured markup.
//!
//! When decorated HTML ends up in a selection as literal text, the copied
//! string carries attribute and tag fragments. The artifact list below is
//! matched by hand against the markup the formatter emits and has to be
//! kept in step with it.

use crate::dom::Document;
use crate::format::{decode_entities, CLICKABLE_CODE_CLASS, COPY_ATTR};
use regex::Regex;
use std::sync::OnceLock;

/// Substrings whose presence means markup was captured as text.
pub const MARKUP_ARTIFACTS: &[&str] = &[
    r#"title="Click to copy""#,
    "data-copy-text=",
    "<span class=",
    "<code class=",
];

pub fn has_markup_artifacts(selected: &str) -> bool {
    MARKUP_ARTIFACTS.iter().any(|a| selected.contains(a))
}

/// Decoded copy-text of every clickable code element in `fragment`, in
/// document order, empty values dropped.
pub fn collect_copy_texts(fragment: &Document) -> Vec<String> {
    fragment
        .elements_with(CLICKABLE_CODE_CLASS, COPY_ATTR)
        .into_iter()
        .filter_map(|n| fragment.element(n)?.attr(COPY_ATTR))
        .map(decode_entities)
        .filter(|text| !text.is_empty())
        .collect()
}

fn strip_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r#"title="Click to copy">?"#, ""),
            (r#"data-copy-text="[^"]*""#, ""),
            (r"<span[^>]*>", ""),
            (r"</span>", ""),
            (r"<code[^>]*>", ""),
            (r"</code>", ""),
            (r"<[^>]*>", ""),
            ("&quot;", "\""),
            ("&amp;", "&"),
            ("&lt;", "<"),
            ("&gt;", ">"),
            ("&nbsp;", " "),
            (r"\s+", " "),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("valid markup strip pattern"),
                replacement,
            )
        })
        .collect()
    })
}

/// Strip captured markup and entities from selected text, collapse
/// whitespace and trim.
pub fn strip_markup(selected: &str) -> String {
    let mut text = selected.to_string();
    for (re, replacement) in strip_rules() {
        text = re.replace_all(&text, *replacement).into_owned();
    }
    text.trim().to_string()
}
