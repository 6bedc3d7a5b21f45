//! Core connection machinery: frame codec, connection state machine and
//! event dispatcher.

pub mod connection;
pub mod dispatcher;
pub mod frame;
pub mod state;

// Re-export main types
pub use connection::{HandshakeStyle, SocketConnection};
pub use dispatcher::EventDispatcher;
pub use frame::{Frame, FrameKind, Payload};
pub use state::{AtomicConnectionState, ConnectionState};

// Re-export traits for convenience
pub use crate::traits::*;
