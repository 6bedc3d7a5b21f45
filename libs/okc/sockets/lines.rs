//! Realtime client for line (call queue) telemetry.
//!
//! Events:
//! - `authRoles`: information about the authorized user
//! - `rawIncidents`: incidents (priority, new, old)
//! - `rawData`: line data, updated roughly every second
//!
//! The lines family receives an explicit `["connected"]` frame before the
//! server accepts authentication.

use crate::sockets::models::{AuthRoles, RawIncidents};
use crate::sockets::USER_AGENT;
use serde_json::Value;
use siosockets::{
    ConnectionState, EventDecoder, HandshakeStyle, Result, SessionBridge, SocketConnection,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The closed set of line namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineNamespace {
    Ntp1,
    Ntp2,
    Nck,
}

impl LineNamespace {
    /// The WebSocket namespace path for this line.
    pub fn service_url(&self) -> &'static str {
        match self {
            LineNamespace::Ntp1 => "/ts-line-ntp1-okcdb-ws",
            LineNamespace::Ntp2 => "/line-ntp2-ws",
            LineNamespace::Nck => "/ts-line-genesys-okcdb-ws",
        }
    }

    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            LineNamespace::Ntp1 => "ntp1",
            LineNamespace::Ntp2 => "ntp2",
            LineNamespace::Nck => "nck",
        }
    }
}

/// A decoded line event. Decode failures degrade to `Raw` rather than being
/// dropped.
#[derive(Debug, Clone)]
pub enum LineEvent {
    AuthRoles(AuthRoles),
    Incidents(RawIncidents),
    /// `rawData` is handed over as plain JSON; its full schema belongs to
    /// the reporting layer.
    Data(Value),
    Raw {
        event: String,
        data: Option<Value>,
    },
}

/// Per-event decoder for the lines family.
pub struct LineDecoder {
    line: LineNamespace,
}

impl EventDecoder for LineDecoder {
    type Event = LineEvent;

    fn decode(&self, event: &str, data: Option<Value>) -> LineEvent {
        match (event, data) {
            ("authRoles", Some(data)) => match serde_json::from_value::<AuthRoles>(data.clone()) {
                Ok(roles) => {
                    debug!("[line:{}] Auth roles received", self.line.label());
                    LineEvent::AuthRoles(roles)
                }
                Err(e) => {
                    warn!("[line:{}] Failed to decode authRoles: {}", self.line.label(), e);
                    LineEvent::Raw {
                        event: event.to_string(),
                        data: Some(data),
                    }
                }
            },
            ("rawIncidents", Some(data)) => {
                match serde_json::from_value::<RawIncidents>(data.clone()) {
                    Ok(incidents) => {
                        info!(
                            "[line:{}] Incidents update: {}",
                            self.line.label(),
                            incidents.total()
                        );
                        LineEvent::Incidents(incidents)
                    }
                    Err(e) => {
                        warn!(
                            "[line:{}] Failed to decode rawIncidents: {}",
                            self.line.label(),
                            e
                        );
                        LineEvent::Raw {
                            event: event.to_string(),
                            data: Some(data),
                        }
                    }
                }
            }
            ("rawData", Some(data)) => {
                debug!("[line:{}] Line data received", self.line.label());
                LineEvent::Data(data)
            }
            (_, data) => {
                debug!("[line:{}] Event: {}", self.line.label(), event);
                LineEvent::Raw {
                    event: event.to_string(),
                    data,
                }
            }
        }
    }
}

/// WebSocket client for one line's realtime telemetry.
///
/// # Example
/// ```ignore
/// let line = LineSocket::new(session, LineNamespace::Nck);
/// line.on("rawData", |event| println!("{:?}", event));
/// line.connect().await?;
/// ```
pub struct LineSocket {
    inner: SocketConnection<LineDecoder>,
    line: LineNamespace,
}

impl LineSocket {
    pub fn new(session: Arc<dyn SessionBridge>, line: LineNamespace) -> Self {
        let inner = SocketConnection::new(
            session,
            line.service_url(),
            HandshakeStyle::AwaitConnectedAck,
            LineDecoder { line },
        )
        .with_user_agent(USER_AGENT);
        Self { inner, line }
    }

    /// Override the per-step handshake timeout.
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.inner = self.inner.with_step_timeout(timeout);
        self
    }

    pub fn line(&self) -> LineNamespace {
        self.line
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
        F: Fn(LineEvent) + Send + Sync + 'static,
    {
        self.inner.on(event, handler)
    }

    pub fn on_async<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(LineEvent) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.inner.on_async(event, handler)
    }
}
