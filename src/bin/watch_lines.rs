//! Watch one line's realtime telemetry.
//!
//! Usage: `watch_lines [ntp1|ntp2|nck]` (defaults to nck). Expects
//! `OKC_BASE_URL` and `OKC_SESSION_ID` in the environment or `.env`.

use anyhow::{bail, Result};
use okc::{LineEvent, LineNamespace, LineSocket, OkcSession};
use okc_rs::bin_common::init_tracing;
use std::sync::Arc;
use tracing::{info, warn};

fn parse_line(arg: Option<String>) -> Result<LineNamespace> {
    match arg.as_deref() {
        None | Some("nck") => Ok(LineNamespace::Nck),
        Some("ntp1") => Ok(LineNamespace::Ntp1),
        Some("ntp2") => Ok(LineNamespace::Ntp2),
        Some(other) => bail!("unknown line '{}', expected ntp1, ntp2 or nck", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let line_ns = parse_line(std::env::args().nth(1))?;
    let session = Arc::new(OkcSession::from_env()?);
    let line = LineSocket::new(session, line_ns);

    let label = line_ns.label();
    line.on("rawData", move |event| match event {
        LineEvent::Data(data) => {
            let day_sl = data.get("daySl").and_then(|v| v.as_f64());
            info!("[{}] rawData update, daySl: {:?}", label, day_sl);
        }
        other => warn!("[{}] Unexpected rawData shape: {:?}", label, other),
    });
    line.on("rawIncidents", move |event| {
        if let LineEvent::Incidents(incidents) = event {
            info!(
                "[{}] Incidents: {} priority, {} new, {} old",
                label,
                incidents.priority.len(),
                incidents.new.len(),
                incidents.old.len()
            );
        }
    });
    line.on("authRoles", move |event| {
        if let LineEvent::AuthRoles(roles) = event {
            info!("[{}] Roles: {:?}", label, roles.roles);
        }
    });

    line.connect().await?;
    println!("Connected to {} — press Ctrl+C to stop", line.namespace());

    tokio::signal::ctrl_c().await?;
    line.disconnect().await;
    println!("Disconnected");
    Ok(())
}
