//! Client configuration with environment variable overrides.
//!
//! Each env var has strict parsing rules:
//! - Integers must be valid and within the specified range
//! - Invalid values are logged and ignored (fall back to defaults)

use serde::{Deserialize, Serialize};

/// Default REST API base URL.
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Default WebSocket base URL.
const DEFAULT_WS_BASE_URL: &str = "ws://localhost:8000/api";

/// Default delay between reconnect attempts, in milliseconds.
const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Default maximum number of reconnect attempts before giving up.
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Connection settings shared by the HTTP pipeline and the realtime channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL for REST requests (no trailing slash).
    pub api_base_url: String,
    /// Base URL for WebSocket connections (no trailing slash).
    pub ws_base_url: String,
    /// Delay between reconnect attempts, in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Maximum reconnect attempts before the channel closes for good.
    pub max_reconnect_attempts: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
        }
    }
}

impl ClientConfig {
    /// Build a config from compiled defaults plus `QUIZWIRE_*` env overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_env_overrides(&mut config);
        config
    }
}

/// Apply environment variable overrides to a config.
pub fn apply_env_overrides(config: &mut ClientConfig) {
    if let Some(v) = read_env_string("QUIZWIRE_API_URL") {
        config.api_base_url = v;
    }
    if let Some(v) = read_env_string("QUIZWIRE_WS_URL") {
        config.ws_base_url = v;
    }
    if let Some(v) = read_env_u64("QUIZWIRE_RECONNECT_DELAY_MS", 100, 300_000) {
        config.reconnect_delay_ms = v;
    }
    if let Some(v) = read_env_u32("QUIZWIRE_MAX_RECONNECT_ATTEMPTS", 0, 100) {
        config.max_reconnect_attempts = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_u64(name: &str, min: u64, max: u64) -> Option<u64> {
    let val = std::env::var(name).ok()?;
    let result = parse_u64_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
    }
    result
}

fn read_env_u32(name: &str, min: u32, max: u32) -> Option<u32> {
    let val = std::env::var(name).ok()?;
    let result = parse_u32_range(&val, min, max);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid u32 env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
