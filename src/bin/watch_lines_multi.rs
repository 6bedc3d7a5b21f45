//! Watch all three lines concurrently.
//!
//! The clients run fully independently over their own sockets while sharing
//! one authenticated session. Expects `OKC_BASE_URL` and `OKC_SESSION_ID`
//! in the environment or `.env`.

use anyhow::Result;
use okc::{LineEvent, LineNamespace, LineSocket, OkcSession};
use okc_rs::bin_common::init_tracing;
use std::sync::Arc;
use tracing::{info, warn};

fn watch(session: Arc<OkcSession>, line_ns: LineNamespace) -> LineSocket {
    let line = LineSocket::new(session, line_ns);
    let label = line_ns.label();
    line.on("rawData", move |event| {
        if let LineEvent::Data(data) = event {
            let keys = data.as_object().map_or(0, |o| o.len());
            info!("[{}] rawData update ({} top-level fields)", label, keys);
        }
    });
    line
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let session = Arc::new(OkcSession::from_env()?);
    let lines = vec![
        watch(Arc::clone(&session), LineNamespace::Nck),
        watch(Arc::clone(&session), LineNamespace::Ntp1),
        watch(Arc::clone(&session), LineNamespace::Ntp2),
    ];

    for line in &lines {
        if let Err(e) = line.connect().await {
            warn!("[{}] Connect failed: {}", line.line().label(), e);
        }
    }
    println!("Watching 3 lines — press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;
    for line in &lines {
        line.disconnect().await;
    }
    println!("Disconnected from all lines");
    Ok(())
}
