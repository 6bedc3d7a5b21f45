use thiserror::Error;

/// Main error type for siosockets
#[derive(Error, Debug)]
pub enum SioError {
    /// WebSocket connection error
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Connection closed unexpectedly
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Handshake failed before the connection became ready
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// A handshake step did not complete within its timeout
    #[error("Handshake timed out waiting for {0}")]
    HandshakeTimeout(&'static str),

    /// Frame could not be parsed
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Operation requires a live connection
    #[error("Not connected")]
    NotConnected,
}

impl SioError {
    /// True for errors `connect()` raises when an attempt fails.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            SioError::WebSocket(_)
                | SioError::ConnectionClosed(_)
                | SioError::Handshake(_)
                | SioError::HandshakeTimeout(_)
        )
    }
}

/// Result type for siosockets operations
pub type Result<T> = std::result::Result<T, SioError>;
