//! Common test utilities for okc integration tests: a mock dashboard
//! serving the breaks-family handshake (no explicit connected ack).

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Notify};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::Message;

pub struct MockBreaksServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
    received: Arc<Mutex<Vec<String>>>,
    client_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
    upgrade_headers: Arc<Mutex<Vec<(String, String)>>>,
    namespace: String,
}

impl MockBreaksServer {
    pub async fn start(namespace: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let received = Arc::new(Mutex::new(Vec::new()));
        let client_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>> =
            Arc::new(Mutex::new(None));
        let upgrade_headers = Arc::new(Mutex::new(Vec::new()));

        {
            let namespace = namespace.to_string();
            let shutdown = Arc::clone(&shutdown);
            let received = Arc::clone(&received);
            let client_tx = Arc::clone(&client_tx);
            let upgrade_headers = Arc::clone(&upgrade_headers);

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        result = listener.accept() => match result {
                            Ok((stream, _)) => {
                                let namespace = namespace.clone();
                                let shutdown = Arc::clone(&shutdown);
                                let received = Arc::clone(&received);
                                let client_tx = Arc::clone(&client_tx);
                                let upgrade_headers = Arc::clone(&upgrade_headers);
                                tokio::spawn(async move {
                                    handle_connection(
                                        stream, namespace, shutdown, received, client_tx,
                                        upgrade_headers,
                                    )
                                    .await;
                                });
                            }
                            Err(_) => break,
                        },
                        _ = shutdown.notified() => break,
                    }
                }
            });
        }

        Self {
            addr,
            shutdown,
            received,
            client_tx,
            upgrade_headers,
            namespace: namespace.to_string(),
        }
    }

    /// Headers seen on the most recent upgrade request.
    pub fn upgrade_headers(&self) -> Vec<(String, String)> {
        self.upgrade_headers.lock().clone()
    }

    pub fn upgrade_header(&self, name: &str) -> Option<String> {
        self.upgrade_headers()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    /// Push an event frame under this server's namespace.
    pub fn push_event(&self, body: &str) -> bool {
        let frame = format!("42{},{}", self.namespace, body);
        match self.client_tx.lock().as_ref() {
            Some(tx) => tx.send(Message::Text(frame)).is_ok(),
            None => false,
        }
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockBreaksServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn handle_connection(
    stream: TcpStream,
    namespace: String,
    shutdown: Arc<Notify>,
    received: Arc<Mutex<Vec<String>>>,
    client_tx: Arc<Mutex<Option<mpsc::UnboundedSender<Message>>>>,
    upgrade_headers: Arc<Mutex<Vec<(String, String)>>>,
) {
    let header_sink = Arc::clone(&upgrade_headers);
    let capture = move |request: &Request, response: Response| {
        let mut seen = header_sink.lock();
        seen.clear();
        for (name, value) in request.headers() {
            if let Ok(value) = value.to_str() {
                seen.push((name.as_str().to_string(), value.to_string()));
            }
        }
        Ok(response)
    };

    let ws_stream = match accept_hdr_async(stream, capture).await {
        Ok(ws) => ws,
        Err(_) => return,
    };
    let (mut write, mut read) = ws_stream.split();

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

    // Breaks handshake: open → namespace ack → auth → first event frame.
    if write
        .send(Message::Text(r#"0{"sid":"x"}"#.to_string()))
        .await
        .is_err()
    {
        return;
    }
    let _connect = next_client_text!();
    if write
        .send(Message::Text(format!(r#"40{},{{"sid":"abc"}}"#, namespace)))
        .await
        .is_err()
    {
        return;
    }
    let _auth = next_client_text!();

    let (tx, mut rx) = mpsc::unbounded_channel();
    *client_tx.lock() = Some(tx);

    if write
        .send(Message::Text(format!(
            r#"42{},["userBreaks",{{"line5":0,"line10":0,"line15":3}}]"#,
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
