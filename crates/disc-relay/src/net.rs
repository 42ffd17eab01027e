//! WebSocket endpoint: `GET /broadcast/{channel}`.
//!
//! Every text frame a socket sends is forwarded to every socket on the same
//! channel, the sender included. Frames are passed through untouched.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::rooms::RoomRegistry;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(channel): Path<String>,
    State(rooms): State<Arc<RoomRegistry>>,
) -> impl IntoResponse {
    let conn_id: u32 = rand::random();
    let span = info_span!("conn", conn_id, %channel);
    ws.on_upgrade(move |socket| handle_socket(socket, channel, rooms).instrument(span))
}

async fn handle_socket(socket: WebSocket, channel: String, rooms: Arc<RoomRegistry>) {
    let membership = rooms.join(&channel);
    info!(members = rooms.member_count(&channel), "client joined");

    let (mut sink, mut stream) = socket.split();
    let mut rx = membership.rx;
    let tx = membership.tx;

    // Channel -> socket.
    let mut forward = tokio::spawn(
        async move {
            loop {
                match rx.recv().await {
                    Ok(text) => {
                        if sink.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "client lagged; frames dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
        .in_current_span(),
    );

    // Socket -> channel.
    let mut receive = tokio::spawn(
        async move {
            let mut frames: u64 = 0;
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        frames += 1;
                        // Only fails when no receivers are left.
                        let _ = tx.send(text);
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(err) => {
                        debug!(error = %err, "socket read failed");
                        break;
                    }
                }
            }
            frames
        }
        .in_current_span(),
    );

    let frames = tokio::select! {
        _ = &mut forward => {
            receive.abort();
            None
        }
        result = &mut receive => {
            forward.abort();
            result.ok()
        }
    };

    rooms.leave(&channel);
    info!(frames_in = ?frames, "client left");
}
