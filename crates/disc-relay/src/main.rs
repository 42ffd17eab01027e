//! Disc relay server.

use std::sync::Arc;

use anyhow::Context;
use disc_relay::{DEFAULT_ADDR, RoomRegistry};
use tracing_subscriber::EnvFilter;

/// Relay and request logs at `info` unless `RUST_LOG` says otherwise.
/// JSON lines carry the per-connection span.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("disc_relay=info,tower_http=info"));
    let fmt = tracing_subscriber::fmt().with_env_filter(filter);

    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        fmt.json().with_current_span(true).with_span_list(false).init();
    } else {
        fmt.compact().init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional.
    let _ = dotenvy::dotenv();
    init_tracing();

    let addr = std::env::var("DISC_RELAY_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    let local = listener.local_addr()?;
    tracing::info!("Relay listening on {local}");
    tracing::info!("  - Broadcast: ws://{local}/broadcast/{{channel}}");

    disc_relay::run(listener, Arc::new(RoomRegistry::new())).await
}
