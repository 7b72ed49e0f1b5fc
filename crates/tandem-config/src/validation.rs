//! Config validation. Every problem is collected into a single error.

use tandem_common::ConfigError;

use crate::schema::RelayConfig;

/// Shortest interval accepted for any timer.
const MIN_INTERVAL_MS: u64 = 100;

pub fn validate(config: &RelayConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.port == 0 {
        errors.push("port = 0 is not a usable listening port".into());
    }
    if config.bind_address.trim().is_empty() {
        errors.push("bind_address must not be empty".into());
    }

    validate_min(&mut errors, "heartbeat_interval_ms", config.heartbeat_interval_ms);
    validate_min(&mut errors, "stale_session_ms", config.stale_session_ms);
    validate_min(&mut errors, "reaper_interval_ms", config.reaper_interval_ms);

    if config.stale_session_ms < config.heartbeat_interval_ms {
        errors.push(format!(
            "stale_session_ms = {} is shorter than heartbeat_interval_ms = {}",
            config.stale_session_ms, config.heartbeat_interval_ms
        ));
    }

    if config.outbound_buffer == 0 || config.outbound_buffer > 4096 {
        errors.push(format!(
            "outbound_buffer = {} is out of range [1, 4096]",
            config.outbound_buffer
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_min(errors: &mut Vec<String>, name: &str, value: u64) {
    if value < MIN_INTERVAL_MS {
        errors.push(format!("{name} = {value} is below the minimum of {MIN_INTERVAL_MS}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let config = RelayConfig {
            port: 0,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("port = 0"));
    }

    #[test]
    fn tiny_intervals_are_rejected() {
        let config = RelayConfig {
            heartbeat_interval_ms: 5,
            reaper_interval_ms: 0,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("heartbeat_interval_ms = 5"));
        assert!(err.contains("reaper_interval_ms = 0"));
    }

    #[test]
    fn stale_threshold_must_cover_a_heartbeat() {
        let config = RelayConfig {
            heartbeat_interval_ms: 60_000,
            stale_session_ms: 1_000,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("shorter than heartbeat_interval_ms"));
    }

    #[test]
    fn outbound_buffer_range() {
        for bad in [0, 5000] {
            let config = RelayConfig {
                outbound_buffer: bad,
                ..Default::default()
            };
            assert!(validate(&config).is_err(), "buffer {bad} should be rejected");
        }
    }

    #[test]
    fn errors_are_joined() {
        let config = RelayConfig {
            port: 0,
            outbound_buffer: 0,
            ..Default::default()
        };
        let err = validate(&config).unwrap_err().to_string();
        assert!(err.contains("; "));
    }
}
