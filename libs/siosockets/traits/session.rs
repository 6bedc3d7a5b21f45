use crate::error::{Result, SioError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// HTTP headers to send with the WebSocket upgrade request
pub type Headers = HashMap<String, String>;

/// The duplex socket type produced by [`SessionBridge::open_socket`]
pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Trait bridging an externally-owned, already-authenticated HTTP session
/// into the realtime channel.
///
/// The connection state machine reads authentication artifacts through this
/// trait on every connect attempt — nothing is cached across reconnects,
/// because the session identifier can rotate between connects.
///
/// # Example
/// ```ignore
/// struct MySession { base: String, cookie: String }
///
/// #[async_trait::async_trait]
/// impl SessionBridge for MySession {
///     fn base_url(&self) -> String { self.base.clone() }
///     fn cookie_header(&self) -> String { self.cookie.clone() }
///     fn session_id(&self) -> Option<String> { None }
/// }
/// ```
#[async_trait]
pub trait SessionBridge: Send + Sync {
    /// The HTTP origin of the dashboard (sent as the `Origin` header).
    fn base_url(&self) -> String;

    /// All cookies as `name=value` pairs joined by `"; "`, used verbatim as
    /// the `Cookie` header on the upgrade request.
    fn cookie_header(&self) -> String;

    /// The distinguished session-identifier cookie, if present.
    ///
    /// Absence is a valid outcome: anonymous flows proceed without sending
    /// an identifier during the handshake.
    fn session_id(&self) -> Option<String>;

    /// Base for WebSocket URLs: the HTTP base with its scheme swapped.
    ///
    /// Deployments that serve the dashboard behind a routing prefix
    /// override this to also strip that prefix.
    fn socket_base(&self) -> String {
        self.base_url()
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1)
    }

    /// Open the duplex socket. The core never retries this call; retry
    /// policy belongs to the caller.
    async fn open_socket(&self, url: &str, headers: Headers) -> Result<WsStream> {
        let mut request = url
            .into_client_request()
            .map_err(|e| SioError::WebSocket(format!("invalid request: {}", e)))?;

        for (key, value) in headers {
            match key.parse::<http::header::HeaderName>() {
                Ok(name) => match value.parse::<http::header::HeaderValue>() {
                    Ok(val) => {
                        request.headers_mut().insert(name, val);
                    }
                    Err(_) => warn!("Invalid header value for key '{}'", key),
                },
                Err(_) => warn!("Invalid header name: {}", key),
            }
        }

        debug!("[ws] Opening socket: {}", url);
        let (stream, _) = connect_async(request)
            .await
            .map_err(|e| SioError::WebSocket(e.to_string()))?;
        Ok(stream)
    }
}

/// A session bridge backed by a fixed base URL and cookie list.
///
/// Useful in tests and for callers that obtained their cookies through some
/// other channel and only need the realtime side.
pub struct StaticSession {
    base_url: String,
    cookies: Vec<(String, String)>,
    session_cookie: String,
}

impl StaticSession {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cookies: Vec::new(),
            session_cookie: "PHPSESSID".to_string(),
        }
    }

    /// Add a cookie to the jar (insertion order is preserved).
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Change which cookie carries the session identifier.
    pub fn with_session_cookie(mut self, name: impl Into<String>) -> Self {
        self.session_cookie = name.into();
        self
    }
}

#[async_trait]
impl SessionBridge for StaticSession {
    fn base_url(&self) -> String {
        self.base_url.clone()
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn session_id(&self) -> Option<String> {
        self.cookies
            .iter()
            .find(|(k, _)| k == &self.session_cookie)
            .map(|(_, v)| v.clone())
    }
}
