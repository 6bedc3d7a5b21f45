//! Watch one break room's realtime occupancy.
//!
//! Usage: `watch_breaks [ntp-one|ntp-two|ntp-nck]` (defaults to ntp-nck).
//! Expects `OKC_BASE_URL` and `OKC_SESSION_ID` in the environment or `.env`.

use anyhow::{bail, Result};
use okc::{BreakEvent, BreakNamespace, BreaksSocket, OkcSession};
use okc_rs::bin_common::init_tracing;
use std::sync::Arc;
use tracing::info;

fn parse_namespace(arg: Option<String>) -> Result<BreakNamespace> {
    match arg.as_deref() {
        None | Some("ntp-nck") => Ok(BreakNamespace::NtpNck),
        Some("ntp-one") => Ok(BreakNamespace::NtpOne),
        Some("ntp-two") => Ok(BreakNamespace::NtpTwo),
        Some(other) => bail!(
            "unknown break room '{}', expected ntp-one, ntp-two or ntp-nck",
            other
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let namespace = parse_namespace(std::env::args().nth(1))?;
    let session = Arc::new(OkcSession::from_env()?);
    let breaks = BreaksSocket::new(session, namespace);

    let label = namespace.label();
    breaks.on("authMessage", move |event| {
        if let BreakEvent::Auth(auth) = event {
            info!("[{}] Authorized as {}", label, auth.user_name);
        }
    });
    breaks.on("userBreaks", move |event| {
        if let BreakEvent::UserBreaks(user_breaks) = event {
            info!(
                "[{}] Breaks available: {} (5m: {}, 10m: {}, 15m: {})",
                label,
                user_breaks.total(),
                user_breaks.breaks_5,
                user_breaks.breaks_10,
                user_breaks.breaks_15
            );
        }
    });
    breaks.on("pageData", move |event| match event {
        BreakEvent::PageData(page) => {
            info!("[{}] Page data: {} lines", label, page.lines.len());
        }
        BreakEvent::SimplePageData(page) => {
            info!("[{}] Page data: {} lines", label, page.lines.len());
        }
        BreakEvent::Raw { data, .. } => {
            info!("[{}] Page data (raw): {:?}", label, data.map(|d| d.to_string()));
        }
        _ => {}
    });

    breaks.connect().await?;
    println!("Connected to {} — press Ctrl+C to stop", breaks.namespace());

    tokio::signal::ctrl_c().await?;
    breaks.disconnect().await;
    println!("Disconnected");
    Ok(())
}
