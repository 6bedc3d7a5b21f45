//! # SioSockets Traits
//!
//! Core traits and types for the SioSockets realtime client library:
//!
//! - **SessionBridge**: authentication artifacts + duplex-socket opening
//! - **EventDecoder**: per-namespace payload decoding before dispatch
//!
//! Both are implemented per deployment; the connection state machine only
//! ever talks to these abstractions.

pub mod decoder;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use decoder::{EventDecoder, PassthroughDecoder, RawEvent};
pub use error::{Result, SioError};
pub use session::{Headers, SessionBridge, StaticSession, WsStream};
