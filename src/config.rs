//! Runtime settings, loaded from the environment with local-dev defaults.
//! `.env` loading happens in `main.rs` via dotenvy before this runs.

use std::time::Duration;

pub const ENV_API_URL: &str = "SENTIMENT_API_URL";
pub const ENV_CONNECT_TIMEOUT_MS: &str = "SENTIMENT_CONNECT_TIMEOUT_MS";
pub const ENV_READ_TIMEOUT_MS: &str = "SENTIMENT_READ_TIMEOUT_MS";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the external inference service.
    pub upstream_url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub bind_addr: String,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            upstream_url: env_or(ENV_API_URL, DEFAULT_API_URL),
            connect_timeout: Duration::from_millis(env_ms(
                ENV_CONNECT_TIMEOUT_MS,
                DEFAULT_CONNECT_TIMEOUT_MS,
            )),
            read_timeout: Duration::from_millis(env_ms(
                ENV_READ_TIMEOUT_MS,
                DEFAULT_READ_TIMEOUT_MS,
            )),
            bind_addr: env_or(ENV_BIND_ADDR, DEFAULT_BIND_ADDR),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_API_URL.to_string(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Unparseable values fall back to the default rather than aborting startup.
fn env_ms(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
