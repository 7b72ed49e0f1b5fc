use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Relay server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address to bind the listener to.
    pub bind_address: String,
    /// Port to accept WebSocket connections on.
    pub port: u16,
    /// Dead-peer sweep period.
    pub heartbeat_interval_ms: u64,
    /// Sessions without a completion report for this long are reaped.
    pub stale_session_ms: u64,
    /// How often the reaper scans the session store.
    pub reaper_interval_ms: u64,
    /// Capacity of each connection's outgoing frame queue.
    pub outbound_buffer: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".into(),
            port: 8080,
            heartbeat_interval_ms: 30_000,
            stale_session_ms: 3_600_000,
            reaper_interval_ms: 600_000,
            outbound_buffer: 64,
        }
    }
}

impl RelayConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }

    pub fn stale_session_after(&self) -> Duration {
        Duration::from_millis(self.stale_session_ms)
    }

    pub fn reaper_interval(&self) -> Duration {
        Duration::from_millis(self.reaper_interval_ms)
    }
}

/// Values supplied on the command line; `None` keeps the loaded value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub heartbeat_interval_ms: Option<u64>,
    pub stale_session_ms: Option<u64>,
    pub reaper_interval_ms: Option<u64>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(ref addr) = self.bind_address {
            config.bind_address = addr.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ms) = self.heartbeat_interval_ms {
            config.heartbeat_interval_ms = ms;
        }
        if let Some(ms) = self.stale_session_ms {
            config.stale_session_ms = ms;
        }
        if let Some(ms) = self.reaper_interval_ms {
            config.reaper_interval_ms = ms;
        }
    }
}
