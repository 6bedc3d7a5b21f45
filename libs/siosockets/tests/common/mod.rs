//! Common test utilities for SioSockets integration tests.
//!
//! Provides a mock WebSocket server that speaks the Engine.IO handshake
//! script of either namespace family and records every frame the client
//! sends.

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// How the mock server drives the handshake for each accepted connection.
#[derive(Debug, Clone)]
pub enum ServerScript {
    /// Lines family: open → namespace ack → explicit connected ack → wait
    /// for auth → ack frame.
    Lines { namespace: String },
    /// Breaks family: open → namespace ack → wait for auth → ack frame.
    Breaks { namespace: String },
    /// Accept the socket but never send anything (timeout testing).
    Silent,
}

/// A scripted mock server for one realtime namespace.
pub struct MockSioServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    received: Arc<Mutex<Vec<String>>>,
    handshakes: Arc<AtomicUsize>,
    client_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
}

impl MockSioServer {
    /// Create and start a mock server following `script` for every
    /// connection.
    pub async fn start(script: ServerScript) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let received = Arc::new(Mutex::new(Vec::new()));
        let handshakes = Arc::new(AtomicUsize::new(0));
        let client_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>> =
            Arc::new(Mutex::new(None));

        {
            let shutdown = Arc::clone(&shutdown);
            let received = Arc::clone(&received);
            let handshakes = Arc::clone(&handshakes);
            let client_tx = Arc::clone(&client_tx);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => {
                            match result {
                                Ok((stream, _)) => {
                                    let script = script.clone();
                                    let shutdown = Arc::clone(&shutdown);
                                    let received = Arc::clone(&received);
                                    let handshakes = Arc::clone(&handshakes);
                                    let client_tx = Arc::clone(&client_tx);
                                    tokio::spawn(async move {
                                        handle_connection(
                                            stream, script, shutdown, received,
                                            handshakes, client_tx,
                                        )
                                        .await;
                                    });
                                }
                                Err(e) => {
                                    eprintln!("Accept error: {}", e);
                                    break;
                                }
                            }
                        }
                        _ = shutdown.notified() => break,
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            received,
            handshakes,
            client_tx,
        }
    }

    /// The HTTP base URL clients should hand to their session bridge.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Snapshot of every text frame received from clients, in order.
    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Number of completed handshake scripts.
    pub fn handshake_count(&self) -> usize {
        self.handshakes.load(Ordering::SeqCst)
    }

    /// Push a text frame to the connected client. Returns false when no
    /// client is connected.
    pub fn push(&self, text: &str) -> bool {
        match self.client_tx.lock().as_ref() {
            Some(tx) => tx.send(Message::Text(text.to_string())).is_ok(),
            None => false,
        }
    }

    /// Close the client connection from the server side.
    pub fn close_client(&self) {
        if let Some(tx) = self.client_tx.lock().as_ref() {
            let _ = tx.send(Message::Close(None));
        }
    }

    /// Poll the received-frame log until `pred` holds or two seconds pass.
    pub async fn wait_for<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&[String]) -> bool,
    {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            if pred(&self.received.lock()) {
                return true;
            }
            if tokio::time::Instant::now() > deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockSioServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_connection(
    stream: TcpStream,
    script: ServerScript,
    shutdown: Arc<Notify>,
    received: Arc<Mutex<Vec<String>>>,
    handshakes: Arc<AtomicUsize>,
    client_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
) {
    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            eprintln!("WebSocket handshake failed: {}", e);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();

    // Helper to read the next text frame from the client, recording it.
    macro_rules! next_client_text {
        () => {
            loop {
                match read.next().await {
                    Some(Ok(Message::Text(text))) => {
                        received.lock().push(text.clone());
                        break text;
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => continue,
                }
            }
        };
    }

    match &script {
        ServerScript::Silent => {
            // Hold the socket open without ever speaking.
            loop {
                tokio::select! {
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => received.lock().push(text),
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                        Some(Ok(_)) => {}
                    },
                    _ = shutdown.notified() => return,
                }
            }
        }
        ServerScript::Lines { namespace } | ServerScript::Breaks { namespace } => {
            let explicit_ack = matches!(script, ServerScript::Lines { .. });

            if write
                .send(Message::Text(r#"0{"sid":"x"}"#.to_string()))
                .await
                .is_err()
            {
                return;
            }

            // Socket.IO connect packet from the client.
            let _connect = next_client_text!();

            if write
                .send(Message::Text(format!(
                    r#"40{},{{"sid":"abc"}}"#,
                    namespace
                )))
                .await
                .is_err()
            {
                return;
            }

            if explicit_ack
                && write
                    .send(Message::Text(format!(r#"42{},["connected"]"#, namespace)))
                    .await
                    .is_err()
            {
                return;
            }

            // Authentication packet from the client.
            let _auth = next_client_text!();

            // Register the push channel and count the handshake before the
            // final ack goes out, so tests observing a completed connect()
            // never race the bookkeeping.
            handshakes.fetch_add(1, Ordering::SeqCst);
            let (tx, mut rx) = mpsc::unbounded_channel();
            *client_tx.lock() = Some(tx);

            // First post-auth frame; the client consumes it as the auth ack.
            if write
                .send(Message::Text(format!(
                    r#"42{},["authData",{{}}]"#,
                    namespace
                )))
                .await
                .is_err()
            {
                return;
            }

            loop {
                tokio::select! {
                    msg = read.next() => match msg {
                        Some(Ok(Message::Text(text))) => received.lock().push(text),
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    },
                    out = rx.recv() => match out {
                        Some(msg) => {
                            if write.send(msg).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    _ = shutdown.notified() => break,
                }
            }

            client_tx.lock().take();
        }
    }
}
