//! Session store: maps session codes to paired host/guest connections and
//! their completion flags.
//!
//! The store only mutates state and reports what happened. Delivering the
//! resulting messages is the protocol handler's job.

use std::collections::HashMap;
use std::time::Instant;

use tandem_common::{ConnectionId, ProtocolError, Role, SessionCode};

use crate::code::{CodeSource, RandomCodes, CODE_MAX, CODE_MIN, CODE_SPACE};

/// Random draws tried before falling back to a linear scan for a free code.
const MAX_RANDOM_ATTEMPTS: usize = 64;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingGuest,
    Active,
}

/// A session pairs one host and at most one guest.
#[derive(Debug)]
pub struct Session {
    pub code: SessionCode,
    pub host: ConnectionId,
    pub guest: Option<ConnectionId>,
    pub host_done: bool,
    pub guest_done: bool,
    pub last_active_at: Instant,
}

impl Session {
    pub fn state(&self) -> SessionState {
        if self.guest.is_some() {
            SessionState::Active
        } else {
            SessionState::AwaitingGuest
        }
    }
}

/// Both participants of a session once the guest has joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub host: ConnectionId,
    pub guest: ConnectionId,
}

/// Outcome of a completion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierStatus {
    /// Still waiting on the other participant.
    Pending,
    /// Both reported; the flags have been cleared for the next round.
    BothComplete(Pairing),
}

/// In-memory session store. Owned by a single coordinator.
pub struct SessionStore {
    sessions: HashMap<SessionCode, Session>,
    codes: Box<dyn CodeSource>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_codes(Box::new(RandomCodes::new()))
    }

    pub fn with_codes(codes: Box<dyn CodeSource>) -> Self {
        Self {
            sessions: HashMap::new(),
            codes,
        }
    }

    /// Create a session hosted by `host` and return its code.
    pub fn create_session(&mut self, host: ConnectionId) -> Result<SessionCode, ProtocolError> {
        self.create_session_at(host, Instant::now())
    }

    pub fn create_session_at(
        &mut self,
        host: ConnectionId,
        now: Instant,
    ) -> Result<SessionCode, ProtocolError> {
        let code = self.allocate_code()?;
        self.sessions.insert(
            code.clone(),
            Session {
                code: code.clone(),
                host,
                guest: None,
                host_done: false,
                guest_done: false,
                last_active_at: now,
            },
        );
        Ok(code)
    }

    /// Attach `guest` to the session. Fails if the code is unknown or the
    /// guest slot is already taken.
    pub fn join_session(
        &mut self,
        code: &SessionCode,
        guest: ConnectionId,
    ) -> Result<Pairing, ProtocolError> {
        let session = self
            .sessions
            .get_mut(code)
            .filter(|s| s.guest.is_none())
            .ok_or_else(|| ProtocolError::SessionNotJoinable(code.clone()))?;

        session.guest = Some(guest);
        Ok(Pairing {
            host: session.host,
            guest,
        })
    }

    /// Record that `role` finished its task.
    pub fn report_completion(
        &mut self,
        code: &SessionCode,
        role: Role,
    ) -> Result<BarrierStatus, ProtocolError> {
        self.report_completion_at(code, role, Instant::now())
    }

    pub fn report_completion_at(
        &mut self,
        code: &SessionCode,
        role: Role,
        now: Instant,
    ) -> Result<BarrierStatus, ProtocolError> {
        let session = self
            .sessions
            .get_mut(code)
            .ok_or_else(|| ProtocolError::UnknownSession(code.clone()))?;

        // Without a guest a report changes nothing, not even the idle clock.
        let Some(guest) = session.guest else {
            return Ok(BarrierStatus::Pending);
        };

        session.last_active_at = now;

        match role {
            Role::Host => session.host_done = true,
            Role::Guest => session.guest_done = true,
        }

        if session.host_done && session.guest_done {
            session.host_done = false;
            session.guest_done = false;
            return Ok(BarrierStatus::BothComplete(Pairing {
                host: session.host,
                guest,
            }));
        }

        Ok(BarrierStatus::Pending)
    }

    /// Remove every session matching `pred`, returning the removed codes.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Vec<SessionCode>
    where
        F: FnMut(&Session) -> bool,
    {
        let mut removed = Vec::new();
        self.sessions.retain(|_, session| {
            let remove = pred(session);
            if remove {
                removed.push(session.code.clone());
            }
            !remove
        });
        removed
    }

    pub fn get(&self, code: &SessionCode) -> Option<&Session> {
        self.sessions.get(code)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn contains(&self, code: &SessionCode) -> bool {
        self.sessions.contains_key(code)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn allocate_code(&mut self) -> Result<SessionCode, ProtocolError> {
        if self.sessions.len() >= CODE_SPACE {
            return Err(ProtocolError::CodesExhausted);
        }

        for _ in 0..MAX_RANDOM_ATTEMPTS {
            let candidate = self.codes.next_code();
            if !(CODE_MIN..=CODE_MAX).contains(&candidate) {
                continue;
            }
            let code = SessionCode::from_number(candidate);
            if !self.sessions.contains_key(&code) {
                return Ok(code);
            }
        }

        // Crowded store: take the first free code.
        (CODE_MIN..=CODE_MAX)
            .map(SessionCode::from_number)
            .find(|code| !self.sessions.contains_key(code))
            .ok_or(ProtocolError::CodesExhausted)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
