//! questiondesk
//!
//! Renders exam question content to HTML with click-to-copy commands, URLs
//! and sysctl parameters, recovers clean text when a user clicks or copies
//! from that HTML, and forwards every copy to the local clipboard and a
//! remote desktop clipboard.

pub mod clipboard;
pub mod config;
pub mod copy;
pub mod dom;
pub mod error;
pub mod format;
pub mod mirror;
pub mod question;

pub use clipboard::{ClipboardWriter, SystemClipboard};
pub use config::{load_config, Settings};
pub use copy::{ClipboardData, CopyInterceptor, CopyNotice, EventOutcome};
pub use dom::{Document, NodeId, Range, Selection};
pub use error::{Error, Result};
pub use format::{process_question_content, ContentFormatter};
pub use mirror::{ClipboardMirror, DisabledMirror, RemoteMirror};
pub use question::{render_question, transform_questions, Question};
