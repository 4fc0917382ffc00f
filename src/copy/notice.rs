//! Transient "Copied" notification text.

use std::fmt;
use std::time::Duration;

/// How long a host should keep a notice on screen.
pub const NOTICE_DURATION: Duration = Duration::from_secs(2);

/// Notice shown after text reaches the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyNotice {
    content: String,
    max_chars: usize,
}

impl CopyNotice {
    pub fn new(content: impl Into<String>, max_chars: usize) -> Self {
        Self {
            content: content.into(),
            max_chars,
        }
    }

    /// The full copied text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Copied text cut to `max_chars` characters, with `...` when cut.
    pub fn preview(&self) -> String {
        if self.content.chars().count() > self.max_chars {
            let head: String = self.content.chars().take(self.max_chars).collect();
            format!("{}...", head)
        } else {
            self.content.clone()
        }
    }
}

impl fmt::Display for CopyNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Copied: {}", self.preview())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_untouched() {
        assert_eq!(CopyNotice::new("ssh node01", 30).to_string(), "Copied: ssh node01");
    }

    #[test]
    fn test_long_content_truncated() {
        let text = "kubectl get pods --all-namespaces -o wide";
        let notice = CopyNotice::new(text, 30);
        assert_eq!(notice.preview(), "kubectl get pods --all-namespa...");
        assert_eq!(notice.content(), text);
    }

    #[test]
    fn test_exact_length_and_multibyte() {
        let exact = "a".repeat(30);
        assert_eq!(CopyNotice::new(exact.clone(), 30).preview(), exact);

        let wide = "ü".repeat(31);
        assert_eq!(
            CopyNotice::new(wide, 30).preview(),
            format!("{}...", "ü".repeat(30))
        );
    }
}
