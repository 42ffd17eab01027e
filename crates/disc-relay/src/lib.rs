//! Disc Relay
//!
//! Room-scoped WebSocket broadcast. Peers connect to
//! `/broadcast/{channel}` and receive every text frame sent on the channel,
//! their own included. The relay keeps no game state.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod net;
pub mod rooms;

pub use rooms::RoomRegistry;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";

pub fn app(rooms: Arc<RoomRegistry>) -> Router {
    Router::new()
        .route("/broadcast/{channel}", get(net::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(rooms)
}

/// Serve the relay on an already bound listener until the process exits.
pub async fn run(listener: TcpListener, rooms: Arc<RoomRegistry>) -> anyhow::Result<()> {
    axum::serve(listener, app(rooms)).await?;
    Ok(())
}
