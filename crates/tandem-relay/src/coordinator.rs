//! Single owner of the session store and connection registry.
//!
//! Connection tasks report what happens on their sockets as events; the
//! coordinator applies them one at a time alongside the heartbeat and reaper
//! timers, so every session mutation is serialized.

use std::time::{Duration, Instant};

use tandem_common::ConnectionId;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::handler;
use crate::reaper;
use crate::registry::{ConnectionRegistry, Outgoing};
use crate::session::SessionStore;

/// Capacity of the shared event queue feeding the coordinator.
pub const EVENT_QUEUE_CAPACITY: usize = 1024;

#[derive(Debug)]
pub enum CoordinatorEvent {
    Opened {
        id: ConnectionId,
        tx: mpsc::Sender<Outgoing>,
    },
    Inbound {
        id: ConnectionId,
        text: String,
    },
    /// Heartbeat response (WebSocket pong).
    Heartbeat {
        id: ConnectionId,
    },
    Closed {
        id: ConnectionId,
    },
}

/// Timer periods for the coordinator loop.
#[derive(Debug, Clone, Copy)]
pub struct Timers {
    pub heartbeat_every: Duration,
    pub reap_every: Duration,
}

pub struct Coordinator {
    store: SessionStore,
    registry: ConnectionRegistry,
    stale_after: Duration,
}

impl Coordinator {
    pub fn new(store: SessionStore, stale_after: Duration) -> Self {
        Self {
            store,
            registry: ConnectionRegistry::new(),
            stale_after,
        }
    }

    pub fn handle_event(&mut self, event: CoordinatorEvent) {
        match event {
            CoordinatorEvent::Opened { id, tx } => {
                self.registry.register(id, tx);
                tracing::debug!(conn = %id.short(), connections = self.registry.len(), "Connection registered");
            }
            CoordinatorEvent::Inbound { id, text } => {
                let outbound = handler::handle_text(&mut self.store, id, &text);
                self.registry.deliver(&outbound);
            }
            CoordinatorEvent::Heartbeat { id } => self.registry.mark_alive(&id),
            CoordinatorEvent::Closed { id } => {
                self.registry.unregister(&id);
                tracing::debug!(conn = %id.short(), connections = self.registry.len(), "Connection unregistered");
            }
        }
    }

    pub fn heartbeat_tick(&mut self) -> Vec<ConnectionId> {
        self.registry.sweep()
    }

    pub fn reaper_tick(&mut self, now: Instant) -> usize {
        reaper::sweep(&mut self.store, now, self.stale_after)
    }

    #[cfg(test)]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    #[cfg(test)]
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// Process events and timer ticks until every event sender is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<CoordinatorEvent>, timers: Timers) {
        let mut heartbeat = tokio::time::interval(timers.heartbeat_every);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut reaper = tokio::time::interval(timers.reap_every);
        reaper.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Both intervals fire immediately on the first tick.
        heartbeat.tick().await;
        reaper.tick().await;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = heartbeat.tick() => {
                    self.heartbeat_tick();
                }
                _ = reaper.tick() => {
                    self.reaper_tick(Instant::now());
                }
            }
        }

        tracing::debug!("Coordinator stopped");
    }
}
