//! Realtime client for break-room occupancy.
//!
//! Events:
//! - `authMessage`: authorization confirmation with user info
//! - `userBreaks`: the user's break allowance per line
//! - `pageData`: break tables and the operator queue, pushed on change
//!
//! Unlike the lines family, the breaks server does NOT send `["connected"]`
//! after the namespace ack — authentication goes out immediately.

use crate::sockets::models::{AuthMessage, PageData, SimplePageData, UserBreaks};
use crate::sockets::USER_AGENT;
use serde_json::Value;
use siosockets::{
    ConnectionState, EventDecoder, HandshakeStyle, Result, SessionBridge, SocketConnection,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The closed set of break-room namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakNamespace {
    NtpOne,
    NtpTwo,
    NtpNck,
}

impl BreakNamespace {
    /// The WebSocket namespace path for this break room.
    pub fn service_url(&self) -> &'static str {
        match self {
            BreakNamespace::NtpOne => "/ntp-one-break-ws",
            BreakNamespace::NtpTwo => "/ntp-two-break-ws",
            BreakNamespace::NtpNck => "/break-nck-ntp-ws",
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            BreakNamespace::NtpOne => "ntp-one",
            BreakNamespace::NtpTwo => "ntp-two",
            BreakNamespace::NtpNck => "ntp-nck",
        }
    }

    /// The ntp-one and ntp-two rooms publish `pageData` in the reduced
    /// format without discharge data.
    fn uses_simple_page_data(&self) -> bool {
        matches!(self, BreakNamespace::NtpOne | BreakNamespace::NtpTwo)
    }
}

/// A decoded break event. Decode failures degrade to `Raw` rather than
/// being dropped.
#[derive(Debug, Clone)]
pub enum BreakEvent {
    Auth(AuthMessage),
    UserBreaks(UserBreaks),
    PageData(PageData),
    SimplePageData(SimplePageData),
    Raw {
        event: String,
        data: Option<Value>,
    },
}

/// Per-event decoder for the breaks family.
///
/// `pageData` decoding branches once on the namespace sub-variant: the rich
/// shape for ntp-nck, the reduced shape for ntp-one/ntp-two. There is no
/// field probing beyond this two-way branch.
pub struct BreakDecoder {
    namespace: BreakNamespace,
}

impl BreakDecoder {
    fn raw(event: &str, data: Option<Value>) -> BreakEvent {
        BreakEvent::Raw {
            event: event.to_string(),
            data,
        }
    }
}

impl EventDecoder for BreakDecoder {
    type Event = BreakEvent;

    fn decode(&self, event: &str, data: Option<Value>) -> BreakEvent {
        let label = self.namespace.label();
        match (event, data) {
            ("authMessage", Some(data)) => {
                match serde_json::from_value::<AuthMessage>(data.clone()) {
                    Ok(auth) => {
                        info!("[breaks:{}] Authorized as: {}", label, auth.user_name);
                        BreakEvent::Auth(auth)
                    }
                    Err(e) => {
                        warn!("[breaks:{}] Failed to decode authMessage: {}", label, e);
                        Self::raw(event, Some(data))
                    }
                }
            }
            ("userBreaks", Some(data)) => {
                match serde_json::from_value::<UserBreaks>(data.clone()) {
                    Ok(breaks) => {
                        info!("[breaks:{}] User breaks: {} total", label, breaks.total());
                        BreakEvent::UserBreaks(breaks)
                    }
                    Err(e) => {
                        warn!("[breaks:{}] Failed to decode userBreaks: {}", label, e);
                        Self::raw(event, Some(data))
                    }
                }
            }
            ("pageData", Some(data)) => {
                if self.namespace.uses_simple_page_data() {
                    match serde_json::from_value::<SimplePageData>(data.clone()) {
                        Ok(page) => {
                            debug!("[breaks:{}] Page data: {} lines", label, page.lines.len());
                            BreakEvent::SimplePageData(page)
                        }
                        Err(e) => {
                            warn!("[breaks:{}] Failed to decode pageData: {}", label, e);
                            Self::raw(event, Some(data))
                        }
                    }
                } else {
                    match serde_json::from_value::<PageData>(data.clone()) {
                        Ok(page) => {
                            debug!("[breaks:{}] Page data: {} lines", label, page.lines.len());
                            BreakEvent::PageData(page)
                        }
                        Err(e) => {
                            warn!("[breaks:{}] Failed to decode pageData: {}", label, e);
                            Self::raw(event, Some(data))
                        }
                    }
                }
            }
            (_, data) => {
                debug!("[breaks:{}] Event: {}", label, event);
                Self::raw(event, data)
            }
        }
    }
}

/// WebSocket client for one break room.
///
/// # Example
/// ```ignore
/// let breaks = BreaksSocket::new(session, BreakNamespace::NtpNck);
/// breaks.on("userBreaks", |event| println!("{:?}", event));
/// breaks.connect().await?;
/// ```
pub struct BreaksSocket {
    inner: SocketConnection<BreakDecoder>,
    namespace: BreakNamespace,
}

impl BreaksSocket {
    pub fn new(session: Arc<dyn SessionBridge>, namespace: BreakNamespace) -> Self {
        let inner = SocketConnection::new(
            session,
            namespace.service_url(),
            HandshakeStyle::ImmediateAuth,
            BreakDecoder { namespace },
        )
        .with_user_agent(USER_AGENT);
        Self { inner, namespace }
    }

    /// Override the per-step handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_step_timeout(timeout);
        self
    }

    pub fn break_namespace(&self) -> BreakNamespace {
        self.namespace
    }

    pub fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    pub async fn connect(&self) -> Result<()> {
        self.inner.connect().await
    }

    pub async fn disconnect(&self) {
        self.inner.disconnect().await
    }

    pub fn emit(&self, event: &str, data: Option<Value>) -> Result<()> {
        self.inner.emit(event, data)
    }

    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(BreakEvent) + Send + Sync + 'static,
    {
        self.inner.on(event, handler)
    }

    pub fn on_async<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(BreakEvent) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.inner.on_async(event, handler)
    }
}
