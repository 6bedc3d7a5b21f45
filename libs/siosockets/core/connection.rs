//! Connection state machine.
//!
//! One `SocketConnection` owns one physical duplex socket bound to one
//! namespace: it runs the handshake sequence, spawns the background read
//! loop, answers heartbeats inline, and fans decoded events out through the
//! dispatcher. There is no implicit reconnect — retry policy belongs to the
//! caller.

use crate::core::dispatcher::EventDispatcher;
use crate::core::frame::{self, Frame, FrameKind, Payload};
use crate::core::state::{AtomicConnectionState, ConnectionState};
use crate::traits::{EventDecoder, Headers, Result, SessionBridge, SioError, WsStream};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Default bound for each handshake step.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_USER_AGENT: &str = "siosockets-client";

/// The one documented divergence between namespace families: whether the
/// server sends an explicit `["connected"]` frame before it accepts
/// authentication.
///
/// This is an explicit per-variant flag chosen at construction time, never
/// inferred from namespace name patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStyle {
    /// Wait for the explicit connected acknowledgement before
    /// authenticating (the lines family).
    AwaitConnectedAck,
    /// Authenticate immediately after the namespace-connect ack (the
    /// breaks family).
    ImmediateAuth,
}

struct Live {
    outbound: mpsc::UnboundedSender<String>,
    shutdown: Arc<Notify>,
    task: tokio::task::JoinHandle<()>,
}

/// A persistent bidirectional connection to one logical namespace.
pub struct SocketConnection<D: EventDecoder> {
    session: Arc<dyn SessionBridge>,
    namespace: String,
    style: HandshakeStyle,
    decoder: Arc<D>,
    dispatcher: Arc<EventDispatcher<D::Event>>,
    state: Arc<AtomicConnectionState>,
    live: Mutex<Option<Live>>,
    step_timeout: Duration,
    user_agent: String,
}

impl<D: EventDecoder> SocketConnection<D> {
    pub fn new(
        session: Arc<dyn SessionBridge>,
        namespace: impl Into<String>,
        style: HandshakeStyle,
        decoder: D,
    ) -> Self {
        Self {
            session,
            namespace: namespace.into(),
            style,
            decoder: Arc::new(decoder),
            dispatcher: Arc::new(EventDispatcher::new()),
            state: Arc::new(AtomicConnectionState::default()),
            live: Mutex::new(None),
            step_timeout: DEFAULT_STEP_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the per-step handshake timeout (default 5 s).
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// Override the `User-Agent` sent on the upgrade request.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// The immutable namespace path this connection is bound to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// True while the read loop owns a live socket.
    pub fn is_connected(&self) -> bool {
        self.state.is_listening() && self.live.lock().is_some()
    }

    /// The WebSocket URL for this namespace.
    pub fn websocket_url(&self) -> String {
        format!(
            "{}{}/?EIO=4&transport=websocket",
            self.session.socket_base(),
            self.namespace
        )
    }

    /// Register a synchronous event handler. Never errors; registrations
    /// accumulate for the lifetime of the client.
    pub fn on<F>(&self, event: &str, handler: F)
    where
        F: Fn(D::Event) + Send + Sync + 'static,
    {
        self.dispatcher.register(event, handler);
    }

    /// Register a suspending event handler, spawned fire-and-forget on each
    /// dispatch.
    pub fn on_async<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(D::Event) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.dispatcher.register_async(event, handler);
    }

    /// Send an event frame through the live socket.
    ///
    /// Fails fast with [`SioError::NotConnected`] when no live socket
    /// exists; never suspends.
    pub fn emit(&self, event: &str, data: Option<Value>) -> Result<()> {
        let guard = self.live.lock();
        let live = guard.as_ref().ok_or(SioError::NotConnected)?;
        if !self.state.is_listening() {
            return Err(SioError::NotConnected);
        }
        let text = frame::event_frame(&self.namespace, event, data);
        debug!("[ws] Sending frame: {}", text);
        live.outbound.send(text).map_err(|_| SioError::NotConnected)
    }

    /// Open the socket and run the handshake, then start the background
    /// read loop.
    ///
    /// Calling `connect()` while already connected (or while another
    /// connect is in flight) logs a warning and no-ops. Any handshake
    /// failure tears this attempt down and is returned to the caller; there
    /// is no implicit retry.
    pub async fn connect(&self) -> Result<()> {
        if let Err(current) = self
            .state
            .compare_exchange(ConnectionState::Disconnected, ConnectionState::Connecting)
        {
            warn!(
                "[ws] Already connected to {} (state {:?}), connect is a no-op",
                self.namespace, current
            );
            return Ok(());
        }

        let url = self.websocket_url();
        info!("[ws] Connecting to: {}", url);

        // Authentication artifacts are read fresh on every attempt; the
        // session identifier can rotate between connects.
        let mut headers = Headers::new();
        headers.insert("User-Agent".to_string(), self.user_agent.clone());
        headers.insert("Cookie".to_string(), self.session.cookie_header());
        headers.insert("Origin".to_string(), self.session.base_url());

        let mut stream = match self.session.open_socket(&url, headers).await {
            Ok(stream) => stream,
            Err(e) => {
                self.state.set(ConnectionState::Disconnected);
                error!("[ws] Connection error on {}: {}", self.namespace, e);
                return Err(e);
            }
        };

        if let Err(e) = self.handshake(&mut stream).await {
            let _ = stream.close(None).await;
            self.state.set(ConnectionState::Disconnected);
            error!("[ws] Handshake failed on {}: {}", self.namespace, e);
            return Err(e);
        }

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let shutdown = Arc::new(Notify::new());
        let task = tokio::spawn(listen_loop(
            stream,
            self.namespace.clone(),
            Arc::clone(&self.decoder),
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.state),
            outbound_rx,
            Arc::clone(&shutdown),
        ));

        *self.live.lock() = Some(Live {
            outbound: outbound_tx,
            shutdown,
            task,
        });
        self.state.set(ConnectionState::Listening);
        info!("[ws] Connected to {}", self.namespace);
        Ok(())
    }

    /// The strictly ordered handshake, steps bounded by `step_timeout`.
    async fn handshake(&self, stream: &mut WsStream) -> Result<()> {
        // Step 1: transport-level open frame.
        let text = self.next_text(stream, "open frame").await?;
        let open = frame::parse(&text).map_err(|e| SioError::Handshake(e.to_string()))?;
        match open.kind {
            FrameKind::Open => {
                if let Some(sid) = payload_sid(&open) {
                    debug!("[ws] Transport open, sid: {}", sid);
                }
            }
            FrameKind::Close => {
                return Err(SioError::ConnectionClosed(
                    "close frame instead of open".to_string(),
                ))
            }
            other => {
                return Err(SioError::Handshake(format!(
                    "expected open frame, got {:?}",
                    other
                )))
            }
        }

        self.state.set(ConnectionState::Handshaking);

        // Step 2: namespace connect.
        let connect_packet = frame::connect_frame(&self.namespace);
        debug!("[ws] Sending connect: {}", connect_packet);
        self.send_text(stream, connect_packet).await?;

        // Step 3: namespace-connect acknowledgement. The server-assigned
        // session token is logged when present; absence is tolerated.
        let text = self.next_text(stream, "namespace ack").await?;
        let ack = frame::parse(&text).map_err(|e| SioError::Handshake(e.to_string()))?;
        if ack.kind == FrameKind::Close {
            return Err(SioError::ConnectionClosed(
                "close frame during namespace ack".to_string(),
            ));
        }
        if text.starts_with("40") {
            if let Some(sid) = payload_sid(&ack) {
                info!("[ws] Session token: {}", sid);
            }
        } else {
            debug!("[ws] Namespace ack: {}", text);
        }

        // Step 4 (variant point): some families send an explicit connected
        // acknowledgement before accepting authentication.
        if self.style == HandshakeStyle::AwaitConnectedAck {
            let text = self.next_text(stream, "connected ack").await?;
            let connected =
                frame::parse(&text).map_err(|e| SioError::Handshake(e.to_string()))?;
            if connected.kind == FrameKind::Close {
                return Err(SioError::ConnectionClosed(
                    "close frame during connected ack".to_string(),
                ));
            }
            debug!("[ws] Connected ack: {}", text);
        }

        // Step 5: cookie authentication. No identifier means no auth frame,
        // which is a valid anonymous flow.
        if let Some(session_id) = self.session.session_id() {
            let auth_packet = frame::auth_frame(&self.namespace, &session_id);
            debug!("[ws] Sending auth: {}", auth_packet);
            self.send_text(stream, auth_packet).await?;
        }

        // Step 6: one more inbound frame is treated as "authentication
        // acknowledged" regardless of content.
        let text = self.next_text(stream, "auth ack").await?;
        debug!("[ws] Auth ack: {}", text);

        self.state.set(ConnectionState::Authenticated);
        Ok(())
    }

    async fn send_text(&self, stream: &mut WsStream, text: String) -> Result<()> {
        stream
            .send(Message::Text(text))
            .await
            .map_err(|e| SioError::WebSocket(e.to_string()))
    }

    /// Wait for the next text frame, skipping WebSocket control frames.
    async fn next_text(&self, stream: &mut WsStream, step: &'static str) -> Result<String> {
        loop {
            let msg = tokio::time::timeout(self.step_timeout, stream.next())
                .await
                .map_err(|_| SioError::HandshakeTimeout(step))?;
            match msg {
                Some(Ok(Message::Text(text))) => return Ok(text),
                Some(Ok(Message::Close(_))) => {
                    return Err(SioError::ConnectionClosed(format!(
                        "socket closed waiting for {}",
                        step
                    )))
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(SioError::WebSocket(e.to_string())),
                None => {
                    return Err(SioError::ConnectionClosed(format!(
                        "stream ended waiting for {}",
                        step
                    )))
                }
            }
        }
    }

    /// Tear the connection down.
    ///
    /// Idempotent and safe to call from any state; cancels the read loop
    /// cooperatively and awaits its exit before returning, so no background
    /// activity survives this call. Never errors.
    pub async fn disconnect(&self) {
        let live = self.live.lock().take();
        if let Some(live) = live {
            live.shutdown.notify_one();
            if let Err(e) = live.task.await {
                debug!("[ws] Listen task join error: {}", e);
            }
            info!("[ws] Disconnected from {}", self.namespace);
        }
        self.state.set(ConnectionState::Disconnected);
    }
}

fn payload_sid(frame: &Frame) -> Option<String> {
    match frame.payload.as_ref()? {
        Payload::Json(value) => value.get("sid")?.as_str().map(str::to_string),
        Payload::Text(_) => None,
    }
}

/// The background read loop. Runs until cooperative cancellation or a
/// terminal socket event; termination is observed via `is_connected()`, it
/// never raises past this boundary.
async fn listen_loop<D: EventDecoder>(
    stream: WsStream,
    namespace: String,
    decoder: Arc<D>,
    dispatcher: Arc<EventDispatcher<D::Event>>,
    state: Arc<AtomicConnectionState>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    shutdown: Arc<Notify>,
) {
    let (mut write, mut read): (SplitSink<WsStream, Message>, SplitStream<WsStream>) =
        stream.split();

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!("[ws] Shutdown requested for {}", namespace);
                let _ = write.close().await;
                break;
            }

            frame = outbound.recv() => {
                match frame {
                    Some(text) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            warn!("[ws] Write failed on {}: {}", namespace, e);
                            break;
                        }
                    }
                    // Sender dropped with the connection handle.
                    None => break,
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        // Heartbeat is answered inline, ahead of any
                        // dispatch, so handler backpressure cannot starve
                        // it.
                        if text == "2" {
                            debug!("[ws] Ping received, sending pong");
                            let pong = frame::serialize(FrameKind::Pong, "", None);
                            if write.send(Message::Text(pong)).await.is_err() {
                                break;
                            }
                            continue;
                        }
                        if !handle_text(&text, &namespace, &decoder, &dispatcher) {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(reason))) => {
                        warn!(
                            "[ws] Socket closed by server on {}: {:?}",
                            namespace, reason
                        );
                        break;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        debug!("[ws] Dropping {} binary bytes on {}", data.len(), namespace);
                    }
                    Some(Ok(_)) => {
                        // WebSocket-level control frames; the transport
                        // handles these.
                    }
                    Some(Err(e)) => {
                        error!("[ws] Socket error on {}: {}", namespace, e);
                        break;
                    }
                    None => {
                        warn!("[ws] Stream ended on {}", namespace);
                        break;
                    }
                }
            }
        }
    }

    state.set(ConnectionState::Disconnected);
    info!("[ws] Listen loop ended for {}", namespace);
}

/// Parse one inbound text frame and dispatch message events. Returns false
/// when the frame terminates the connection.
fn handle_text<D: EventDecoder>(
    text: &str,
    namespace: &str,
    decoder: &Arc<D>,
    dispatcher: &Arc<EventDispatcher<D::Event>>,
) -> bool {
    let frame = match frame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!("[ws] Dropping unparseable frame on {}: {}", namespace, e);
            return true;
        }
    };

    match frame.kind {
        FrameKind::Message => {
            if let Some(Payload::Json(Value::Array(items))) = frame.payload {
                let mut items = items.into_iter();
                match items.next() {
                    Some(Value::String(event)) => {
                        let data = items.next();
                        let decoded = decoder.decode(&event, data);
                        dispatcher.dispatch(&event, decoded);
                    }
                    other => debug!("[ws] Message without event name: {:?}", other),
                }
            } else {
                debug!("[ws] Dropping non-event message on {}: {}", namespace, text);
            }
            true
        }
        FrameKind::Close => {
            warn!("[ws] Close frame received on {}", namespace);
            false
        }
        other => {
            debug!("[ws] Dropping {:?} frame on {}", other, namespace);
            true
        }
    }
}
