//! Local Clipboard Writes
//!
//! Copies text to the system clipboard using the arboard crate, falling back
//! to the platform's copy command when the clipboard API is unavailable.
//! Callers on the event path use [`write_best_effort`], which never fails.

use crate::config::ClipboardSettings;
use arboard::Clipboard;
use log::{debug, error, warn};
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Duration;
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
use std::time::Instant;

// ─────────────────────────────────────────────────────────────────────────────
// Clipboard Error
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during clipboard operations.
#[derive(Debug)]
pub enum ClipboardError {
    /// Failed to access clipboard
    AccessError(String),
    /// Failed to set clipboard content
    WriteError(String),
    /// No platform copy command accepted the text
    CommandError(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::AccessError(msg) => write!(f, "Clipboard access error: {}", msg),
            ClipboardError::WriteError(msg) => write!(f, "Clipboard write error: {}", msg),
            ClipboardError::CommandError(msg) => write!(f, "Clipboard command error: {}", msg),
        }
    }
}

impl std::error::Error for ClipboardError {}

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        ClipboardError::WriteError(err.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Writer Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Something that can place plain text on a clipboard.
pub trait ClipboardWriter {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Write `text`, logging instead of failing. Returns whether it landed.
pub fn write_best_effort(writer: &dyn ClipboardWriter, text: &str) -> bool {
    match writer.write_text(text) {
        Ok(()) => true,
        Err(e) => {
            error!("Could not copy text to clipboard: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// System Clipboard
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(target_os = "macos")]
const COPY_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const COPY_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(all(unix, not(target_os = "macos")))]
const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[cfg(not(any(unix, windows)))]
const COPY_COMMANDS: &[(&str, &[&str])] = &[];

/// Platforms where the clipboard content lives only as long as the process
/// that set it serves it.
const SERVES_OWN_CONTENT: bool = cfg!(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Api,
    Command,
}

/// The desktop clipboard: arboard first, then the platform copy command.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    command_fallback: bool,
    one_shot: bool,
    hold: Duration,
}

impl SystemClipboard {
    pub fn new(settings: &ClipboardSettings) -> Self {
        Self {
            command_fallback: settings.command_fallback,
            one_shot: false,
            hold: Duration::from_millis(settings.hold_ms),
        }
    }

    /// Clipboard for a process that exits right after copying.
    ///
    /// Where the clipboard is served by the owning process, the platform copy
    /// command (which keeps serving after we exit) is tried first, and the
    /// arboard write blocks for up to `hold_ms` so a clipboard manager can
    /// take the content over.
    pub fn one_shot(settings: &ClipboardSettings) -> Self {
        Self {
            one_shot: true,
            ..Self::new(settings)
        }
    }

    fn backends(&self) -> Vec<Backend> {
        match (self.command_fallback, self.one_shot && SERVES_OWN_CONTENT) {
            (false, _) => vec![Backend::Api],
            (true, false) => vec![Backend::Api, Backend::Command],
            (true, true) => vec![Backend::Command, Backend::Api],
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new(&ClipboardSettings::default())
    }
}

impl ClipboardWriter for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last_error = None;
        for backend in self.backends() {
            let result = match backend {
                Backend::Api if self.one_shot => copy_and_hold(text, self.hold),
                Backend::Api => copy_text_to_clipboard(text),
                Backend::Command => copy_with_command(text),
            };
            match result {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("{}", e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| ClipboardError::AccessError("no clipboard backend".to_string())))
    }
}

/// Copy plain text to clipboard.
///
/// Uses arboard for cross-platform clipboard support.
pub fn copy_text_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::AccessError(e.to_string()))?;

    clipboard
        .set_text(text)
        .map_err(|e| ClipboardError::WriteError(e.to_string()))?;

    debug!("Copied {} chars to clipboard", text.chars().count());
    Ok(())
}

/// Copy text and keep serving it until another owner takes over or `hold`
/// elapses.
#[cfg(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
))]
fn copy_and_hold(text: &str, hold: Duration) -> Result<(), ClipboardError> {
    use arboard::SetExtLinux;

    let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::AccessError(e.to_string()))?;
    clipboard
        .set()
        .wait_until(Instant::now() + hold)
        .text(text)
        .map_err(|e| ClipboardError::WriteError(e.to_string()))?;

    debug!("Served {} chars on the clipboard", text.chars().count());
    Ok(())
}

#[cfg(not(all(
    unix,
    not(any(target_os = "macos", target_os = "android", target_os = "emscripten"))
)))]
fn copy_and_hold(text: &str, _hold: Duration) -> Result<(), ClipboardError> {
    copy_text_to_clipboard(text)
}

fn run_copy_command(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    Ok(child.wait()?.success())
}

/// Pipe `text` into the first platform copy command that accepts it.
fn copy_with_command(text: &str) -> Result<(), ClipboardError> {
    let mut tried = Vec::new();
    for (program, args) in COPY_COMMANDS {
        match run_copy_command(program, args, text) {
            Ok(true) => {
                debug!("Copied {} chars with {}", text.chars().count(), program);
                return Ok(());
            }
            Ok(false) => tried.push(format!("{} exited with failure", program)),
            Err(e) => tried.push(format!("{}: {}", program, e)),
        }
    }

    if tried.is_empty() {
        return Err(ClipboardError::CommandError(
            "no copy command for this platform".to_string(),
        ));
    }
    Err(ClipboardError::CommandError(tried.join("; ")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
