/// Default TOML config content with comments.
pub(super) fn default_config_toml() -> &'static str {
    r##"# Tandem relay configuration
# Only override what you want to change -- missing fields use defaults.

# bind_address = "0.0.0.0"
# port = 8080

# Dead-peer sweep period. A connection that misses two probes is closed.
# heartbeat_interval_ms = 30000

# Sessions with no completion report for this long are removed.
# stale_session_ms = 3600000
# reaper_interval_ms = 600000

# Per-connection outgoing queue (1-4096).
# outbound_buffer = 64
"##
}
