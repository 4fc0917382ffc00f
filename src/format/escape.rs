//! HTML escaping and entity decoding.
//!
//! Copy-text is stored escaped inside `data-copy-text` attributes and decoded
//! again before it reaches a clipboard, so both directions live here.

/// Escape a string for use inside a double- or single-quoted attribute value.
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a string for use as element text content.
pub fn escape_text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Escape only angle brackets, leaving existing entities in free text intact.
pub(crate) fn escape_angles(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

/// Decode HTML character references back to literal characters.
///
/// Resolves the full named entity table, legacy references without a
/// trailing semicolon and numeric references, in a single pass.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("plain"), "plain");
        assert_eq!(
            escape_attr(r#"a&b "c" 'd' <e>"#),
            "a&amp;b &quot;c&quot; &#39;d&#39; &lt;e&gt;"
        );
    }

    #[test]
    fn test_escape_text_leaves_quotes() {
        assert_eq!(escape_text(r#"if [ "$a" -lt 3 ] && x"#), r#"if [ "$a" -lt 3 ] &amp;&amp; x"#);
    }

    #[test]
    fn test_decode_named_and_numeric() {
        assert_eq!(decode_entities("&quot;hi&quot; &amp; &lt;b&gt;"), "\"hi\" & <b>");
        assert_eq!(decode_entities("it&#39;s &#x41;&#66;"), "it's AB");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(decode_entities("echo &dollar;HOME &verbar; wc"), "echo $HOME | wc");
        assert_eq!(decode_entities("&num;&euro;&lbrace;&rbrace;"), "#\u{20ac}{}");
    }

    #[test]
    fn test_decode_unknown_and_legacy_references() {
        assert_eq!(decode_entities("a && b"), "a && b");
        assert_eq!(decode_entities("&bogus; &;"), "&bogus; &;");
        assert_eq!(decode_entities("tail &amp"), "tail &");
    }

    #[test]
    fn test_escape_then_decode_restores_text() {
        let original = r#"grep -E '"name": "<x>"' file && echo ok"#;
        assert_eq!(decode_entities(&escape_attr(original)), original);
    }

    #[test]
    fn test_decode_is_single_pass() {
        assert_eq!(decode_entities("&amp;amp;"), "&amp;");
    }
}
