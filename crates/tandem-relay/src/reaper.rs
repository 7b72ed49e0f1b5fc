//! Stale session reaper.
//!
//! Staleness is the only way sessions leave the store. A session whose
//! participants disconnected lingers until its last report is older than
//! the threshold.

use std::time::{Duration, Instant};

use crate::session::{Session, SessionStore};

pub fn is_stale(session: &Session, now: Instant, max_age: Duration) -> bool {
    now.saturating_duration_since(session.last_active_at) > max_age
}

/// Remove every session idle for longer than `max_age`. Returns how many
/// were removed.
pub fn sweep(store: &mut SessionStore, now: Instant, max_age: Duration) -> usize {
    let removed = store.remove_where(|session| is_stale(session, now, max_age));
    for code in &removed {
        tracing::info!(code = %code, "Reaping stale session");
    }
    tracing::debug!(removed = removed.len(), sessions = store.len(), "Reaper tick");
    removed.len()
}
