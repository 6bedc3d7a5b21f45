//! okc-rs - Realtime client for the OKC operational dashboard
//!
//! This crate re-exports the workspace libraries and hosts the small demo
//! binaries under `src/bin/`.
//!
//! - **siosockets**: the protocol-generic realtime client library
//! - **okc**: namespace clients for the dashboard's line and break feeds

// Re-export workspace libraries for convenience
pub use okc;
pub use siosockets;

// Binary common utilities
pub mod bin_common {
    //! Shared setup for the demo binaries.

    use tracing_subscriber::EnvFilter;

    /// Initialize tracing with standard configuration. `RUST_LOG` overrides
    /// the default `info` level.
    pub fn init_tracing() {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }
}
