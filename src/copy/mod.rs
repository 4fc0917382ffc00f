//! Copy Interception
//!
//! Turns clicks on decorated elements and native copies of a selection into
//! clean clipboard text. Every delivered copy is written locally (click
//! path) or into the copy event's payload (selection path), forwarded to the
//! remote mirror, and announced with a [`CopyNotice`].
//!
//! # Trigger paths
//!
//! - **Click**: the nearest ancestor carrying `data-copy-text` wins; a legacy
//!   `inline-code` target copies its own text content.
//! - **Copy**: a selection that captured markup is rebuilt from the
//!   clickable code elements it contains, or stripped of markup; otherwise a
//!   selection nested inside a clickable code element copies that element's
//!   copy-text.
//!
//! Handlers never fail: clipboard and mirror problems are logged.

mod notice;
mod recover;

pub use notice::{CopyNotice, NOTICE_DURATION};
pub use recover::{collect_copy_texts, has_markup_artifacts, strip_markup, MARKUP_ARTIFACTS};

use crate::clipboard::{write_best_effort, ClipboardWriter};
use crate::config::NoticeSettings;
use crate::dom::{Document, NodeId, Selection};
use crate::format::{decode_entities, CLICKABLE_CODE_CLASS, COPY_ATTR, INLINE_CODE_CLASS};
use crate::mirror::ClipboardMirror;
use log::{debug, info};

// ─────────────────────────────────────────────────────────────────────────────
// Event Types
// ─────────────────────────────────────────────────────────────────────────────

/// Payload of a copy event, as the host hands it to the platform clipboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardData {
    plain_text: Option<String>,
}

impl ClipboardData {
    pub fn set_plain_text(&mut self, text: impl Into<String>) {
        self.plain_text = Some(text.into());
    }

    pub fn plain_text(&self) -> Option<&str> {
        self.plain_text.as_deref()
    }
}

/// What handling an event did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Text delivered, if the event was intercepted
    pub copied: Option<String>,
    /// Notice for the host to display
    pub notice: Option<CopyNotice>,
    /// Whether the host must suppress the default action
    pub default_prevented: bool,
}

impl EventOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    pub fn is_intercepted(&self) -> bool {
        self.copied.is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Interceptor
// ─────────────────────────────────────────────────────────────────────────────

/// Click and copy handling for one mounted view.
pub struct CopyInterceptor<C: ClipboardWriter, M: ClipboardMirror> {
    clipboard: C,
    mirror: M,
    notice: NoticeSettings,
    mounted: bool,
}

impl<C: ClipboardWriter, M: ClipboardMirror> CopyInterceptor<C, M> {
    /// Create an unmounted interceptor.
    pub fn new(clipboard: C, mirror: M, notice: NoticeSettings) -> Self {
        Self {
            clipboard,
            mirror,
            notice,
            mounted: false,
        }
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    pub fn mirror(&self) -> &M {
        &self.mirror
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Start handling events. Returns `false` if already mounted; a second
    /// mount never adds a second binding.
    pub fn mount(&mut self) -> bool {
        if self.mounted {
            debug!("Copy interceptor already mounted");
            return false;
        }
        self.mounted = true;
        true
    }

    /// Stop handling events. Returns `false` if it was not mounted.
    pub fn unmount(&mut self) -> bool {
        std::mem::replace(&mut self.mounted, false)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Click Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a click on `target`.
    pub fn on_click(&self, doc: &Document, target: NodeId) -> EventOutcome {
        if !self.mounted {
            return EventOutcome::ignored();
        }

        // Clicks on text land on the enclosing element
        let start = if doc.text(target).is_some() {
            match doc.parent(target) {
                Some(parent) => parent,
                None => return EventOutcome::ignored(),
            }
        } else {
            target
        };

        let copy_text = doc
            .ancestors(start)
            .find_map(|n| doc.element(n)?.attr(COPY_ATTR));
        if let Some(raw) = copy_text {
            return self.copy_to_clipboard(decode_entities(raw));
        }

        let legacy = doc
            .element(start)
            .map(|el| el.has_class(INLINE_CODE_CLASS))
            .unwrap_or(false);
        if legacy {
            return self.copy_to_clipboard(doc.text_content(start));
        }

        EventOutcome::ignored()
    }

    fn copy_to_clipboard(&self, text: String) -> EventOutcome {
        self.mirror.mirror(&text);
        let written = write_best_effort(&self.clipboard, &text);
        if written {
            info!("Copied {} chars on click", text.chars().count());
        }

        EventOutcome {
            notice: written.then(|| CopyNotice::new(text.clone(), self.notice.max_chars)),
            copied: Some(text),
            default_prevented: true,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Native Copy Path
    // ─────────────────────────────────────────────────────────────────────────

    /// Handle a native copy of `selection`, overriding `data` when the
    /// selection maps to clean copy-text.
    pub fn on_copy(
        &self,
        doc: &Document,
        selection: &Selection,
        data: &mut ClipboardData,
    ) -> EventOutcome {
        if !self.mounted {
            return EventOutcome::ignored();
        }
        let Some(range) = selection.first_range() else {
            return EventOutcome::ignored();
        };

        let selected = range.selected_text(doc);

        if has_markup_artifacts(&selected) {
            let fragment = range.clone_contents(doc);
            let texts = collect_copy_texts(&fragment);
            if !texts.is_empty() {
                debug!("Rebuilt selection from {} copy targets", texts.len());
                return self.override_copy(texts.join(" "), data);
            }

            let cleaned = strip_markup(&selected);
            if !cleaned.is_empty() && cleaned != selected {
                debug!("Stripped markup from selection");
                return self.override_copy(cleaned, data);
            }
        }

        let container = range.common_ancestor_container(doc);
        let start = if doc.text(container).is_some() {
            doc.parent(container).unwrap_or(container)
        } else {
            container
        };

        let nested = doc.ancestors(start).find_map(|n| {
            let el = doc.element(n)?;
            if !el.has_class(CLICKABLE_CODE_CLASS) {
                return None;
            }
            el.attr(COPY_ATTR).filter(|v| !v.is_empty())
        });
        if let Some(raw) = nested {
            return self.override_copy(decode_entities(raw), data);
        }

        EventOutcome::ignored()
    }

    fn override_copy(&self, text: String, data: &mut ClipboardData) -> EventOutcome {
        data.set_plain_text(text.clone());
        self.mirror.mirror(&text);
        info!("Replaced copied selection with {} chars", text.chars().count());

        EventOutcome {
            notice: Some(CopyNotice::new(text.clone(), self.notice.max_chars)),
            copied: Some(text),
            default_prevented: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::ClipboardError;
    use crate::dom::{Boundary, Range};
    use crate::format::process_question_content;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingClipboard {
        writes: RefCell<Vec<String>>,
        fail: bool,
    }

    impl ClipboardWriter for RecordingClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::AccessError("denied".to_string()));
            }
            self.writes.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingMirror {
        sent: RefCell<Vec<String>>,
    }

    impl ClipboardMirror for RecordingMirror {
        fn mirror(&self, content: &str) {
            self.sent.borrow_mut().push(content.to_string());
        }
    }

    type TestInterceptor = CopyInterceptor<RecordingClipboard, RecordingMirror>;

    fn mounted() -> TestInterceptor {
        let mut interceptor = CopyInterceptor::new(
            RecordingClipboard::default(),
            RecordingMirror::default(),
            NoticeSettings::default(),
        );
        interceptor.mount();
        interceptor
    }

    fn select(doc: &Document, from: &str, to: &str) -> Selection {
        let start = doc.find_text(from).unwrap();
        let end = doc.find_text(to).unwrap();
        let end = Boundary::new(end.node, end.offset + to.chars().count());
        Selection::new(Range::new(doc, start, end))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Click path
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_click_copies_ssh_command() {
        let doc = Document::parse_fragment(
            r#"<div><strong>Solve this question on instance:</strong> <code class="bg-light px-1 rounded clickable-code" data-copy-text="ssh node01" title="Click to copy">ssh node01</code></div>"#,
        );
        let code = doc.elements_with(CLICKABLE_CODE_CLASS, COPY_ATTR)[0];
        let interceptor = mounted();

        let outcome = interceptor.on_click(&doc, code);

        assert_eq!(outcome.copied.as_deref(), Some("ssh node01"));
        assert!(outcome.default_prevented);
        assert_eq!(outcome.notice.unwrap().to_string(), "Copied: ssh node01");
        assert_eq!(*interceptor.clipboard().writes.borrow(), vec!["ssh node01"]);
        assert_eq!(*interceptor.mirror().sent.borrow(), vec!["ssh node01"]);
    }

    #[test]
    fn test_click_on_nested_text_walks_up() {
        let html = process_question_content("Use `echo \"a\" && b` please");
        let doc = Document::parse_fragment(&html);
        let text = doc.find_text("echo").unwrap().node;
        let interceptor = mounted();

        let outcome = interceptor.on_click(&doc, text);
        assert_eq!(outcome.copied.as_deref(), Some("echo \"a\" && b"));
    }

    #[test]
    fn test_click_outside_targets_is_ignored() {
        let doc = Document::parse_fragment("<p>plain <b>text</b></p>");
        let bold = doc.find_text("text").unwrap().node;
        let interceptor = mounted();

        let outcome = interceptor.on_click(&doc, bold);
        assert_eq!(outcome, EventOutcome::default());
        assert!(interceptor.clipboard().writes.borrow().is_empty());
        assert!(interceptor.mirror().sent.borrow().is_empty());
    }

    #[test]
    fn test_click_decodes_full_entity_table() {
        let doc = Document::parse_fragment(
            r#"<code class="clickable-code" data-copy-text="echo &dollar;HOME &verbar; cat &gt; out&num;1">x</code>"#,
        );
        let code = doc.children(doc.root())[0];
        let interceptor = mounted();

        let outcome = interceptor.on_click(&doc, code);
        assert_eq!(outcome.copied.as_deref(), Some("echo $HOME | cat > out#1"));
        assert_eq!(
            *interceptor.mirror().sent.borrow(),
            vec!["echo $HOME | cat > out#1"]
        );
    }

    #[test]
    fn test_legacy_inline_code_copies_text_content() {
        let doc = Document::parse_fragment(r#"<span class="inline-code">kubectl &lt;cmd&gt;</span>"#);
        let span = doc.children(doc.root())[0];
        let interceptor = mounted();

        let outcome = interceptor.on_click(&doc, span);
        assert_eq!(outcome.copied.as_deref(), Some("kubectl <cmd>"));
    }

    #[test]
    fn test_clipboard_failure_still_mirrors_without_notice() {
        let doc = Document::parse_fragment(r#"<span data-copy-text="ls">ls</span>"#);
        let span = doc.children(doc.root())[0];
        let mut interceptor = CopyInterceptor::new(
            RecordingClipboard {
                fail: true,
                ..Default::default()
            },
            RecordingMirror::default(),
            NoticeSettings::default(),
        );
        interceptor.mount();

        let outcome = interceptor.on_click(&doc, span);
        assert_eq!(outcome.copied.as_deref(), Some("ls"));
        assert!(outcome.notice.is_none());
        assert_eq!(*interceptor.mirror().sent.borrow(), vec!["ls"]);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_mount_lifecycle() {
        let doc = Document::parse_fragment(r#"<span data-copy-text="x">x</span>"#);
        let span = doc.children(doc.root())[0];
        let mut interceptor = CopyInterceptor::new(
            RecordingClipboard::default(),
            RecordingMirror::default(),
            NoticeSettings::default(),
        );

        assert!(!interceptor.on_click(&doc, span).is_intercepted());
        assert!(interceptor.mount());
        assert!(!interceptor.mount());
        assert!(interceptor.on_click(&doc, span).is_intercepted());
        assert_eq!(interceptor.clipboard().writes.borrow().len(), 1);

        assert!(interceptor.unmount());
        assert!(!interceptor.unmount());
        assert!(!interceptor.on_click(&doc, span).is_intercepted());
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Native copy path
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_copy_with_artifacts_joins_copy_targets() {
        // Decorated markup shown escaped next to real copy targets
        let html = format!(
            "<p>&lt;code class=\"x\" data-copy-text=\"junk\"&gt; {} </p>",
            process_question_content("`kubectl get ns` then `kubectl get pods -A`")
        );
        let doc = Document::parse_fragment(&html);
        let selection = select(&doc, "<code", "pods -A");
        let interceptor = mounted();
        let mut data = ClipboardData::default();

        let outcome = interceptor.on_copy(&doc, &selection, &mut data);

        assert_eq!(data.plain_text(), Some("kubectl get ns kubectl get pods -A"));
        assert!(outcome.default_prevented);
        assert_eq!(
            *interceptor.mirror().sent.borrow(),
            vec!["kubectl get ns kubectl get pods -A"]
        );
        assert!(interceptor.clipboard().writes.borrow().is_empty());
    }

    #[test]
    fn test_copy_with_artifacts_and_no_targets_strips_markup() {
        let doc = Document::parse_fragment(
            "<p>&lt;span class=\"clickable-filepath\"&gt;net.ipv4.ip_forward=1&lt;/span&gt;</p>",
        );
        let selection = select(&doc, "<span", "</span>");
        let interceptor = mounted();
        let mut data = ClipboardData::default();

        let outcome = interceptor.on_copy(&doc, &selection, &mut data);
        assert_eq!(data.plain_text(), Some("net.ipv4.ip_forward=1"));
        assert_eq!(outcome.copied.as_deref(), Some("net.ipv4.ip_forward=1"));
    }

    #[test]
    fn test_copy_inside_single_target_uses_decoded_copy_text() {
        let html = process_question_content("Check `grep -E \"a|b\" <file>` now");
        let doc = Document::parse_fragment(&html);
        let selection = select(&doc, "-E", "b\"");
        let interceptor = mounted();
        let mut data = ClipboardData::default();

        let outcome = interceptor.on_copy(&doc, &selection, &mut data);
        assert_eq!(data.plain_text(), Some("grep -E \"a|b\" <file>"));
        assert_eq!(
            outcome.notice.unwrap().to_string(),
            "Copied: grep -E \"a|b\" <file>"
        );
    }

    #[test]
    fn test_plain_selection_is_left_alone() {
        let doc = Document::parse_fragment("<p>Just some prose here</p>");
        let selection = select(&doc, "some", "here");
        let interceptor = mounted();
        let mut data = ClipboardData::default();

        let outcome = interceptor.on_copy(&doc, &selection, &mut data);
        assert!(!outcome.default_prevented);
        assert_eq!(data.plain_text(), None);
        assert!(interceptor.mirror().sent.borrow().is_empty());
    }

    #[test]
    fn test_copy_without_range_is_ignored() {
        let doc = Document::parse_fragment("<p>x</p>");
        let interceptor = mounted();
        let mut data = ClipboardData::default();

        let outcome = interceptor.on_copy(&doc, &Selection::empty(), &mut data);
        assert!(!outcome.is_intercepted());
    }
}
