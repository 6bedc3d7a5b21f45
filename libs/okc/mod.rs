//! # okc
//!
//! Client library for the OKC operational dashboard's realtime channels.
//!
//! The dashboard multiplexes live call-center telemetry over Socket.IO-style
//! namespaces. Two feed families exist:
//!
//! - **lines** — per-line queue/agent telemetry (`rawData` roughly every
//!   second, `rawIncidents`, `authRoles`)
//! - **breaks** — break-room occupancy (`pageData`, `userBreaks`,
//!   `authMessage`)
//!
//! Both share the wire protocol but diverge in payload shape and handshake
//! nuance; the divergences live in [`sockets`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use okc::{LineNamespace, LineSocket, OkcSession};
//! use std::sync::Arc;
//!
//! let session = Arc::new(OkcSession::from_env()?);
//! let line = LineSocket::new(Arc::clone(&session), LineNamespace::Nck);
//! line.on("rawData", |event| println!("line update: {:?}", event));
//! line.connect().await?;
//! ```

pub mod config;
pub mod session;
pub mod sockets;

pub use config::Settings;
pub use session::OkcSession;
pub use sockets::breaks::{BreakEvent, BreakNamespace, BreaksSocket};
pub use sockets::lines::{LineEvent, LineNamespace, LineSocket};
pub use sockets::models;
