//! WebSocket transport to the relay.

use anyhow::Context;
use disc_core::{FrameEvent, Transport, TransportError};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{info, warn};

/// Sending half handed to the session. Frames are written by a background
/// task; once that task is gone every send fails.
pub struct WsTransport {
    tx: mpsc::UnboundedSender<String>,
}

impl Transport for WsTransport {
    fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.tx.send(text).map_err(|_| TransportError::Closed)
    }
}

/// Open the channel and spawn the socket reader and writer tasks.
///
/// Inbound frames arrive on the returned receiver as
/// [`FrameEvent::Message`], followed by one [`FrameEvent::TransportClosed`]
/// when the socket goes away.
pub async fn connect(url: &str) -> anyhow::Result<(WsTransport, mpsc::UnboundedReceiver<FrameEvent>)> {
    let (socket, _response) = connect_async(url)
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    info!(url, "connected");

    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<FrameEvent>();

    let closed_tx = in_tx.clone();
    tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if let Err(err) = sink.send(Message::text(text)).await {
                warn!(error = %err, "socket write failed");
                let _ = closed_tx.send(FrameEvent::TransportClosed);
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if in_tx.send(FrameEvent::Message(text.as_str().to_owned())).is_err() {
                        return;
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(?frame, "relay closed the socket");
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "socket read failed");
                    break;
                }
            }
        }
        let _ = in_tx.send(FrameEvent::TransportClosed);
    });

    Ok((WsTransport { tx: out_tx }, in_rx))
}
