//! Configuration settings for the OKC client.

use std::env;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://okc.ertelecom.ru/yii";
const DEFAULT_USER_AGENT: &str = "okc-rs-client";

/// OKC client configuration.
///
/// Values are read from the environment (`OKC_BASE_URL`, `OKC_USER_AGENT`,
/// `OKC_SESSION_ID`, `OKC_HANDSHAKE_TIMEOUT_SECS`) with sensible defaults;
/// binaries typically call `dotenv::dotenv()` first.
#[derive(Debug, Clone)]
pub struct Settings {
    /// HTTP base of the dashboard, including the routing prefix.
    pub base_url: String,
    /// `User-Agent` sent on socket upgrade requests.
    pub user_agent: String,
    /// Pre-obtained session identifier, when the caller authenticated
    /// through some other channel.
    pub session_id: Option<String>,
    /// Per-step handshake timeout.
    pub handshake_timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Self {
        let handshake_timeout = env::var("OKC_HANDSHAKE_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        Self {
            base_url: env::var("OKC_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            user_agent: env::var("OKC_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            session_id: env::var("OKC_SESSION_ID").ok().filter(|s| !s.is_empty()),
            handshake_timeout,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            session_id: None,
            handshake_timeout: Duration::from_secs(5),
        }
    }
}
