//! Connection registry: outgoing channels plus heartbeat liveness.
//!
//! Dead peers are found across two sweeps. Each sweep closes connections that
//! never answered the previous sweep's probe, then marks the rest as
//! unconfirmed and probes them again. One unanswered probe is enough, so a
//! silent peer is gone on the second sweep after it was last heard from.

use std::collections::HashMap;

use tandem_common::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::handler::Outbound;
use crate::protocol::ServerMessage;

/// Frames the coordinator asks a connection task to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text(String),
    Ping,
    Close,
}

struct Entry {
    tx: mpsc::Sender<Outgoing>,
    alive: bool,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Entry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new connection. It counts as alive until its first probe.
    pub fn register(&mut self, id: ConnectionId, tx: mpsc::Sender<Outgoing>) {
        self.connections.insert(id, Entry { tx, alive: true });
    }

    /// Forget a connection. Returns whether it was known.
    pub fn unregister(&mut self, id: &ConnectionId) -> bool {
        self.connections.remove(id).is_some()
    }

    /// Heartbeat response received.
    pub fn mark_alive(&mut self, id: &ConnectionId) {
        if let Some(entry) = self.connections.get_mut(id) {
            entry.alive = true;
        }
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Push one message. Closed or unknown targets are skipped.
    pub fn push(&self, to: &ConnectionId, message: &ServerMessage) -> bool {
        let Some(entry) = self.connections.get(to) else {
            tracing::debug!(conn = %to.short(), "Skipping push to unknown connection");
            return false;
        };
        if entry.tx.is_closed() {
            tracing::debug!(conn = %to.short(), "Skipping push to closed connection");
            return false;
        }

        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize outbound message");
                return false;
            }
        };

        match entry.tx.try_send(Outgoing::Text(json)) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(conn = %to.short(), "Outbound queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Push every message in `batch`, returning how many were queued.
    pub fn deliver(&self, batch: &[Outbound]) -> usize {
        batch
            .iter()
            .filter(|out| self.push(&out.to, &out.message))
            .count()
    }

    /// Run one heartbeat sweep. Returns the evicted connections.
    pub fn sweep(&mut self) -> Vec<ConnectionId> {
        let mut evicted = Vec::new();

        self.connections.retain(|id, entry| {
            if !entry.alive || entry.tx.is_closed() {
                let _ = entry.tx.try_send(Outgoing::Close);
                evicted.push(*id);
                return false;
            }
            entry.alive = false;
            if let Err(TrySendError::Full(_)) = entry.tx.try_send(Outgoing::Ping) {
                tracing::debug!(conn = %id.short(), "Probe dropped, queue full");
            }
            true
        });

        for id in &evicted {
            tracing::info!(conn = %id.short(), "Evicting unresponsive connection");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_common::SessionCode;

    fn connection(registry: &mut ConnectionRegistry) -> (ConnectionId, mpsc::Receiver<Outgoing>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(8);
        registry.register(id, tx);
        (id, rx)
    }

    fn drain(rx: &mut mpsc::Receiver<Outgoing>) -> Vec<Outgoing> {
        let mut out = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            out.push(frame);
        }
        out
    }

    #[test]
    fn push_serializes_to_text() {
        let mut registry = ConnectionRegistry::new();
        let (id, mut rx) = connection(&mut registry);

        assert!(registry.push(&id, &ServerMessage::SyncComplete));
        assert_eq!(
            drain(&mut rx),
            vec![Outgoing::Text(r#"{"type":"sync_complete"}"#.into())]
        );
    }

    #[test]
    fn push_to_closed_connection_is_skipped() {
        let mut registry = ConnectionRegistry::new();
        let (id, rx) = connection(&mut registry);
        drop(rx);

        assert!(!registry.push(&id, &ServerMessage::SyncComplete));
    }

    #[test]
    fn push_to_unknown_connection_is_skipped() {
        let registry = ConnectionRegistry::new();
        assert!(!registry.push(&ConnectionId::new(), &ServerMessage::SyncComplete));
    }

    #[test]
    fn dead_target_does_not_block_the_other() {
        let mut registry = ConnectionRegistry::new();
        let (host, host_rx) = connection(&mut registry);
        let (guest, mut guest_rx) = connection(&mut registry);
        drop(host_rx);

        let batch = vec![
            Outbound {
                to: host,
                message: ServerMessage::SyncComplete,
            },
            Outbound {
                to: guest,
                message: ServerMessage::SyncComplete,
            },
        ];
        assert_eq!(registry.deliver(&batch), 1);
        assert_eq!(drain(&mut guest_rx).len(), 1);
    }

    #[test]
    fn full_queue_drops_message() {
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::channel(1);
        registry.register(id, tx);

        let msg = ServerMessage::Created {
            code: SessionCode::new("4821"),
        };
        assert!(registry.push(&id, &msg));
        assert!(!registry.push(&id, &msg));
    }

    #[test]
    fn sweep_pings_live_connections() {
        let mut registry = ConnectionRegistry::new();
        let (id, mut rx) = connection(&mut registry);

        assert!(registry.sweep().is_empty());
        assert!(registry.contains(&id));
        assert_eq!(drain(&mut rx), vec![Outgoing::Ping]);
    }

    #[test]
    fn answering_pings_keeps_connection() {
        let mut registry = ConnectionRegistry::new();
        let (id, mut rx) = connection(&mut registry);

        for _ in 0..5 {
            assert!(registry.sweep().is_empty());
            registry.mark_alive(&id);
        }
        assert!(registry.contains(&id));
        assert_eq!(drain(&mut rx).len(), 5);
    }

    #[test]
    fn silent_connection_evicted_on_second_sweep() {
        let mut registry = ConnectionRegistry::new();
        let (silent, mut silent_rx) = connection(&mut registry);
        let (chatty, _chatty_rx) = connection(&mut registry);

        // First probe: both unconfirmed, nobody evicted.
        assert!(registry.sweep().is_empty());
        registry.mark_alive(&chatty);

        // Second sweep: the silent one never answered its single probe.
        assert_eq!(registry.sweep(), vec![silent]);
        assert!(!registry.contains(&silent));
        assert!(registry.contains(&chatty));
        assert_eq!(drain(&mut silent_rx), vec![Outgoing::Ping, Outgoing::Close]);
    }

    #[test]
    fn late_answer_resets_the_grace_period() {
        let mut registry = ConnectionRegistry::new();
        let (id, mut rx) = connection(&mut registry);

        assert!(registry.sweep().is_empty());
        registry.mark_alive(&id);
        assert!(registry.sweep().is_empty());
        assert_eq!(registry.sweep(), vec![id]);

        // Two probes went out; only the second went unanswered.
        assert_eq!(
            drain(&mut rx),
            vec![Outgoing::Ping, Outgoing::Ping, Outgoing::Close]
        );
    }

    #[test]
    fn closed_channel_is_reclaimed_on_sweep() {
        let mut registry = ConnectionRegistry::new();
        let (id, rx) = connection(&mut registry);
        drop(rx);

        assert_eq!(registry.sweep(), vec![id]);
        assert!(registry.is_empty());
    }

    #[test]
    fn mark_alive_unknown_is_noop() {
        let mut registry = ConnectionRegistry::new();
        registry.mark_alive(&ConnectionId::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_reports_presence() {
        let mut registry = ConnectionRegistry::new();
        let (id, _rx) = connection(&mut registry);
        assert!(registry.unregister(&id));
        assert!(!registry.unregister(&id));
    }
}
