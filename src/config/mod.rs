//! Configuration module for questiondesk
//!
//! This module handles user settings (mirror endpoint, clipboard fallback,
//! pinned URLs, notice length), including JSON serialization and persistent
//! storage in the platform-specific config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
