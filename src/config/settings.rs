//! User settings for questiondesk
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use serde::{Deserialize, Serialize};

/// Manifest URL that must always be claimed as one clickable unit.
pub const CALICO_OPERATOR_URL: &str =
    "https://raw.githubusercontent.com/projectcalico/calico/v3.29.2/manifests/tigera-operator.yaml";

// ─────────────────────────────────────────────────────────────────────────────
// Remote Mirror Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for forwarding copied text to the remote desktop clipboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSettings {
    /// Whether copied text is forwarded at all
    pub enabled: bool,
    /// Scheme, host and port of the facilitator service
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
    /// Total attempts per copy, including the first
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for MirrorSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:3000".to_string(),
            timeout_ms: 2000,
            max_attempts: 2,
            retry_delay_ms: 250,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Local Clipboard Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for the local clipboard write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    /// Fall back to the platform copy command when the clipboard API fails
    pub command_fallback: bool,
    /// How long a one-shot copy keeps serving the clipboard before exiting
    pub hold_ms: u64,
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self {
            command_fallback: true,
            hold_ms: 5000,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Formatter Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for question content formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterSettings {
    /// URLs claimed whole before any other pass runs
    pub pinned_urls: Vec<String>,
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            pinned_urls: vec![CALICO_OPERATOR_URL.to_string()],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Notice Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for the transient "Copied" notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoticeSettings {
    /// Characters of copied text shown before truncating with `...`
    pub max_chars: usize,
}

impl Default for NoticeSettings {
    fn default() -> Self {
        Self { max_chars: 30 }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// User preferences and application settings.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mirror: MirrorSettings,
    pub clipboard: ClipboardSettings,
    pub formatter: FormatterSettings,
    pub notice: NoticeSettings,
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum request timeout.
    pub const MIN_TIMEOUT_MS: u64 = 100;
    /// Maximum request timeout.
    pub const MAX_TIMEOUT_MS: u64 = 30_000;
    /// Maximum attempts per mirrored copy.
    pub const MAX_ATTEMPTS: u32 = 5;
    /// Maximum pause between attempts.
    pub const MAX_RETRY_DELAY_MS: u64 = 5_000;
    /// Maximum time a one-shot copy serves the clipboard.
    pub const MAX_CLIPBOARD_HOLD_MS: u64 = 60_000;
    /// Bounds for the notice preview length.
    pub const MIN_NOTICE_CHARS: usize = 8;
    pub const MAX_NOTICE_CHARS: usize = 200;

    /// Endpoint path of the remote desktop clipboard on the facilitator.
    pub const MIRROR_PATH: &'static str = "/facilitator/api/v1/remote-desktop/clipboard";

    /// Full URL the mirror posts to.
    pub fn mirror_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.mirror.base_url.trim_end_matches('/'),
            Self::MIRROR_PATH
        )
    }

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.mirror.timeout_ms = self
            .mirror
            .timeout_ms
            .clamp(Self::MIN_TIMEOUT_MS, Self::MAX_TIMEOUT_MS);
        self.mirror.max_attempts = self.mirror.max_attempts.clamp(1, Self::MAX_ATTEMPTS);
        self.mirror.retry_delay_ms = self.mirror.retry_delay_ms.min(Self::MAX_RETRY_DELAY_MS);

        self.clipboard.hold_ms = self.clipboard.hold_ms.min(Self::MAX_CLIPBOARD_HOLD_MS);

        if self.mirror.base_url.trim().is_empty() {
            self.mirror.base_url = MirrorSettings::default().base_url;
        }

        self.formatter
            .pinned_urls
            .retain(|url| url.starts_with("http://") || url.starts_with("https://"));
        self.formatter.pinned_urls.dedup();

        self.notice.max_chars = self
            .notice
            .max_chars
            .clamp(Self::MIN_NOTICE_CHARS, Self::MAX_NOTICE_CHARS);
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
