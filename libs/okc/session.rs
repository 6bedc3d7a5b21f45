//! The authenticated HTTP session backing the realtime channels.
//!
//! The REST side of the dashboard owns authentication; the realtime core
//! only ever reads cookies out of it. `OkcSession` wraps a `reqwest` client
//! with a shared cookie jar and exposes it through the
//! [`SessionBridge`] trait.

use crate::config::Settings;
use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;
use siosockets::SessionBridge;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Name of the distinguished session-identifier cookie.
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Routing prefix the dashboard serves HTTP under; realtime endpoints live
/// above it.
const ROUTING_PREFIX: &str = "/yii";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// An OKC HTTP session: cookie jar + HTTP client + base URL.
///
/// The realtime layer reads `cookie_header()` and `session_id()` fresh on
/// every connect attempt, so a rotated `PHPSESSID` picked up by the HTTP
/// side is honored on the next reconnect without rebuilding anything.
pub struct OkcSession {
    base_url: Url,
    jar: Arc<Jar>,
    http: reqwest::Client,
    user_agent: String,
}

impl OkcSession {
    pub fn new(settings: &Settings) -> Result<Self, SessionError> {
        let base_url: Url = settings
            .base_url
            .trim_end_matches('/')
            .parse()
            .map_err(|e| SessionError::InvalidBaseUrl(format!("{}: {}", settings.base_url, e)))?;

        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(settings.user_agent.clone())
            .build()?;

        let session = Self {
            base_url,
            jar,
            http,
            user_agent: settings.user_agent.clone(),
        };

        if let Some(id) = &settings.session_id {
            session.set_cookie(SESSION_COOKIE, id);
        }

        Ok(session)
    }

    /// Build a session from the environment (see [`Settings::from_env`]).
    pub fn from_env() -> Result<Self, SessionError> {
        Self::new(&Settings::from_env())
    }

    /// Store a cookie in the jar under the dashboard's origin.
    pub fn set_cookie(&self, name: &str, value: &str) {
        self.jar
            .add_cookie_str(&format!("{}={}; Path=/", name, value), &self.base_url);
        debug!("[session] Cookie set: {}", name);
    }

    /// The underlying HTTP client, sharing this session's cookie jar.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The `User-Agent` the realtime layer should present.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

#[async_trait]
impl SessionBridge for OkcSession {
    fn base_url(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }

    fn cookie_header(&self) -> String {
        self.jar
            .cookies(&self.base_url)
            .and_then(|value| value.to_str().map(str::to_string).ok())
            .unwrap_or_default()
    }

    fn session_id(&self) -> Option<String> {
        let header = self.cookie_header();
        header.split("; ").find_map(|pair| {
            pair.strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
                .map(str::to_string)
        })
    }

    /// Realtime endpoints live above the routing prefix: swap the scheme
    /// and strip the trailing `/yii`.
    fn socket_base(&self) -> String {
        let base = self.base_url();
        let base = base.strip_suffix(ROUTING_PREFIX).unwrap_or(&base);
        base.replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1)
    }
}
