//! Remote Desktop Clipboard Mirror
//!
//! Forwards copied text to the facilitator service so it can be pasted in
//! the remote desktop session. Mirroring is a best-effort side channel:
//! requests run on a background thread, are retried a bounded number of
//! times, and failures are only logged and counted.

use crate::config::Settings;
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Mirror Error
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from a single mirror request.
#[derive(Debug)]
pub enum MirrorError {
    /// Connection, timeout or protocol failure
    Request(String),
    /// The endpoint answered with a non-success status
    Status(u16),
    /// The payload could not be encoded
    Encode(serde_json::Error),
}

impl std::fmt::Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorError::Request(msg) => write!(f, "Mirror request failed: {}", msg),
            MirrorError::Status(code) => write!(f, "Mirror endpoint returned status {}", code),
            MirrorError::Encode(e) => write!(f, "Mirror payload encoding failed: {}", e),
        }
    }
}

impl std::error::Error for MirrorError {}

impl From<ureq::Error> for MirrorError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => MirrorError::Status(code),
            other => MirrorError::Request(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        MirrorError::Encode(err)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload and Counters
// ─────────────────────────────────────────────────────────────────────────────

/// Request body: `{"content": "..."}`.
#[derive(Debug, Serialize)]
pub struct ClipboardPayload<'a> {
    pub content: &'a str,
}

/// Running totals for mirrored copies.
#[derive(Debug, Default)]
pub struct MirrorStats {
    delivered: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
}

/// Point-in-time copy of [`MirrorStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStatsSnapshot {
    pub delivered: u64,
    pub failed: u64,
    pub retries: u64,
}

impl MirrorStats {
    pub fn snapshot(&self) -> MirrorStatsSnapshot {
        MirrorStatsSnapshot {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mirror Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Fire-and-forget destination for copied text.
pub trait ClipboardMirror {
    /// Start forwarding `content`; must return without waiting for delivery.
    fn mirror(&self, content: &str);
}

/// Mirror used when forwarding is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledMirror;

impl ClipboardMirror for DisabledMirror {
    fn mirror(&self, content: &str) {
        debug!(
            "Remote clipboard disabled; not forwarding {} chars",
            content.chars().count()
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Mirror
// ─────────────────────────────────────────────────────────────────────────────

/// Posts copied text to the facilitator's remote desktop clipboard endpoint.
pub struct RemoteMirror {
    endpoint: String,
    agent: ureq::Agent,
    max_attempts: u32,
    retry_delay: Duration,
    stats: Arc<MirrorStats>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl RemoteMirror {
    pub fn new(settings: &Settings) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_millis(settings.mirror.timeout_ms)))
            .build();

        Self {
            endpoint: settings.mirror_endpoint(),
            agent: config.into(),
            max_attempts: settings.mirror.max_attempts.max(1),
            retry_delay: Duration::from_millis(settings.mirror.retry_delay_ms),
            stats: Arc::new(MirrorStats::default()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn stats(&self) -> Arc<MirrorStats> {
        Arc::clone(&self.stats)
    }

    /// Deliver `content` on the calling thread, retrying up to the
    /// configured number of attempts.
    pub fn send_blocking(&self, content: &str) -> Result<(), MirrorError> {
        deliver(
            &self.agent,
            &self.endpoint,
            content,
            self.max_attempts,
            self.retry_delay,
            &self.stats,
        )
    }

    /// Wait for every request started by [`ClipboardMirror::mirror`].
    ///
    /// Only needed by short-lived processes that would otherwise exit
    /// before the request is sent.
    pub fn wait_pending(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for handle in handles {
            if handle.join().is_err() {
                warn!("Remote clipboard thread panicked");
            }
        }
    }
}

impl ClipboardMirror for RemoteMirror {
    fn mirror(&self, content: &str) {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        let content = content.to_string();
        let attempts = self.max_attempts;
        let delay = self.retry_delay;
        let stats = Arc::clone(&self.stats);

        let spawned = thread::Builder::new()
            .name("clipboard-mirror".to_string())
            .spawn(move || {
                if let Err(e) = deliver(&agent, &endpoint, &content, attempts, delay, &stats) {
                    warn!("Failed to copy to remote clipboard: {}", e);
                }
            });

        match spawned {
            Ok(handle) => {
                if let Ok(mut pending) = self.pending.lock() {
                    pending.retain(|h| !h.is_finished());
                    pending.push(handle);
                }
            }
            Err(e) => warn!("Could not start remote clipboard request: {}", e),
        }
    }
}

fn post(agent: &ureq::Agent, endpoint: &str, body: &str) -> Result<(), MirrorError> {
    agent
        .post(endpoint)
        .header("Content-Type", "application/json")
        .send(body.as_bytes())?;
    Ok(())
}

fn deliver(
    agent: &ureq::Agent,
    endpoint: &str,
    content: &str,
    max_attempts: u32,
    retry_delay: Duration,
    stats: &MirrorStats,
) -> Result<(), MirrorError> {
    let body = serde_json::to_string(&ClipboardPayload { content })?;

    let mut attempt = 1;
    loop {
        match post(agent, endpoint, &body) {
            Ok(()) => {
                stats.delivered.fetch_add(1, Ordering::Relaxed);
                info!(
                    "Mirrored {} chars to remote clipboard",
                    content.chars().count()
                );
                return Ok(());
            }
            Err(e) if attempt < max_attempts => {
                stats.retries.fetch_add(1, Ordering::Relaxed);
                debug!("Remote clipboard attempt {} failed: {}", attempt, e);
                attempt += 1;
                thread::sleep(retry_delay);
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    /// Accept one HTTP request, answer with `status`, return the request.
    fn serve_once(status: u16) -> (String, thread::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
            }

            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();

            let mut stream = reader.into_inner();
            write!(
                stream,
                "HTTP/1.1 {} X\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            )
            .unwrap();
            (head, String::from_utf8(body).unwrap())
        });

        (base_url, handle)
    }

    fn settings_for(base_url: &str, max_attempts: u32) -> Settings {
        let mut settings = Settings::default();
        settings.mirror.base_url = base_url.to_string();
        settings.mirror.max_attempts = max_attempts;
        settings.mirror.retry_delay_ms = 0;
        settings
    }

    #[test]
    fn test_payload_shape() {
        let body = serde_json::to_string(&ClipboardPayload {
            content: "ssh node01",
        })
        .unwrap();
        assert_eq!(body, r#"{"content":"ssh node01"}"#);
    }

    #[test]
    fn test_endpoint_from_settings() {
        let mirror = RemoteMirror::new(&settings_for("http://facilitator:3000", 1));
        assert_eq!(
            mirror.endpoint(),
            "http://facilitator:3000/facilitator/api/v1/remote-desktop/clipboard"
        );
    }

    #[test]
    fn test_mirror_posts_json_in_background() {
        let (base_url, server) = serve_once(200);
        let mirror = RemoteMirror::new(&settings_for(&base_url, 1));

        mirror.mirror("ssh node01");
        mirror.wait_pending();

        let (head, body) = server.join().unwrap();
        assert!(head.starts_with("POST /facilitator/api/v1/remote-desktop/clipboard "));
        assert!(head.to_ascii_lowercase().contains("content-type: application/json"));
        assert_eq!(body, r#"{"content":"ssh node01"}"#);
        assert_eq!(mirror.stats().snapshot().delivered, 1);
    }

    #[test]
    fn test_error_status_counts_as_failure() {
        let (base_url, server) = serve_once(500);
        let mirror = RemoteMirror::new(&settings_for(&base_url, 1));

        let err = mirror.send_blocking("x").unwrap_err();
        assert!(matches!(err, MirrorError::Status(500)));
        server.join().unwrap();

        let stats = mirror.stats().snapshot();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.delivered, 0);
    }

    #[test]
    fn test_unreachable_endpoint_retries_then_gives_up() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let mirror = RemoteMirror::new(&settings_for(&base_url, 3));
        assert!(mirror.send_blocking("kubectl get pods").is_err());

        let stats = mirror.stats().snapshot();
        assert_eq!(
            stats,
            MirrorStatsSnapshot {
                delivered: 0,
                failed: 1,
                retries: 2,
            }
        );
    }

    #[test]
    fn test_disabled_mirror_is_noop() {
        DisabledMirror.mirror("anything");
    }
}
