//! Accept loop wiring sockets to the coordinator.

use tandem_common::TandemError;
use tandem_config::RelayConfig;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;

use crate::connection::handle_connection;
use crate::coordinator::{Coordinator, Timers, EVENT_QUEUE_CAPACITY};
use crate::session::SessionStore;

/// Bind the listening socket.
pub async fn bind(addr: &str) -> tandem_common::Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| TandemError::Network(format!("failed to bind {addr}: {e}")))
}

/// Spawn the coordinator and accept connections forever.
pub async fn serve(listener: TcpListener, config: RelayConfig, store: SessionStore) {
    let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);

    let coordinator = Coordinator::new(store, config.stale_session_after());
    let timers = Timers {
        heartbeat_every: config.heartbeat_interval(),
        reap_every: config.reaper_interval(),
    };
    tokio::spawn(coordinator.run(events_rx, timers));

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let events = events_tx.clone();
                let buffer = config.outbound_buffer;
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, events, buffer).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}
