//! Per-connection task: register with the coordinator, then shuttle frames
//! both ways until either side closes.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tandem_common::ConnectionId;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::coordinator::CoordinatorEvent;
use crate::registry::Outgoing;

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    addr: SocketAddr,
    events: mpsc::Sender<CoordinatorEvent>,
    outbound_buffer: usize,
) {
    let id = ConnectionId::new();
    let (mut sink, mut stream) = ws.split();

    // 1. Register our outgoing channel.
    let (tx, mut rx) = mpsc::channel::<Outgoing>(outbound_buffer);
    if events
        .send(CoordinatorEvent::Opened { id, tx })
        .await
        .is_err()
    {
        tracing::warn!(peer = %addr, "Coordinator gone, refusing connection");
        return;
    }

    tracing::info!(peer = %addr, conn = %id.short(), "Client connected");

    // 2. Forwarding loop.
    loop {
        tokio::select! {
            // Coordinator → this client's WebSocket
            outgoing = rx.recv() => {
                let frame = match outgoing {
                    Some(Outgoing::Text(text)) => Message::Text(text.into()),
                    Some(Outgoing::Ping) => Message::Ping(Default::default()),
                    Some(Outgoing::Close) => {
                        tracing::info!(peer = %addr, conn = %id.short(), "Closing unresponsive client");
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                    None => break,
                };
                if sink.send(frame).await.is_err() {
                    break;
                }
            }

            // This client's WebSocket → coordinator
            frame = stream.next() => {
                let event = match frame {
                    Some(Ok(Message::Text(text))) => CoordinatorEvent::Inbound {
                        id,
                        text: text.to_string(),
                    },
                    Some(Ok(Message::Pong(_))) => CoordinatorEvent::Heartbeat { id },
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                        continue;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(peer = %addr, "Ignoring binary frame");
                        continue;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    Some(Ok(_)) => continue,
                };
                if events.send(event).await.is_err() {
                    break;
                }
            }
        }
    }

    // 3. Cleanup.
    tracing::info!(peer = %addr, conn = %id.short(), "Client disconnected");
    let _ = events.send(CoordinatorEvent::Closed { id }).await;
}
