//! # SioSockets
//!
//! A Socket.IO-style realtime client over WebSockets, built for dashboards
//! that multiplex several logical namespaces over Engine.IO text framing.
//!
//! ## Features
//!
//! - **Pure frame codec**: parse/serialize Engine.IO frames with best-effort
//!   JSON payload decoding
//! - **Pluggable session bridge**: cookies and socket opening live behind a
//!   trait, so any authenticated HTTP session can back the realtime channel
//! - **Explicit handshake state machine**: transport open → namespace
//!   connect → cookie authentication, each step with its own timeout
//! - **Per-namespace event decoding**: typed events with raw fallback
//! - **Isolated fan-out**: one misbehaving handler never starves the rest

pub mod core;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    connection, dispatcher, frame, state,
    connection::{HandshakeStyle, SocketConnection},
    dispatcher::EventDispatcher,
    frame::{Frame, FrameKind, Payload},
    state::{AtomicConnectionState, ConnectionState},
};

/// Type alias for Result with SioError
pub type Result<T> = std::result::Result<T, traits::SioError>;
