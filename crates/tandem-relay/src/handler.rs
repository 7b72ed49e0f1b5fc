//! Session protocol handler.
//!
//! Turns one inbound frame into store mutations plus the list of messages to
//! push. Nothing here touches a socket, so the whole protocol can be driven
//! from tests with a bare `SessionStore`.

use tandem_common::{ConnectionId, ProtocolError, Role};

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{BarrierStatus, SessionStore};

/// A message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub message: ServerMessage,
}

impl Outbound {
    fn new(to: ConnectionId, message: ServerMessage) -> Self {
        Self { to, message }
    }
}

/// Handle a raw text frame from `from`.
///
/// Malformed frames are logged and produce no reply.
pub fn handle_text(store: &mut SessionStore, from: ConnectionId, text: &str) -> Vec<Outbound> {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(msg) => handle_message(store, from, msg),
        Err(e) => {
            let err = ProtocolError::MalformedMessage(e.to_string());
            tracing::warn!(conn = %from.short(), error = %err, "Dropping inbound frame");
            Vec::new()
        }
    }
}

/// Apply a parsed message to the store.
pub fn handle_message(
    store: &mut SessionStore,
    from: ConnectionId,
    msg: ClientMessage,
) -> Vec<Outbound> {
    match msg {
        ClientMessage::Create => match store.create_session(from) {
            Ok(code) => {
                tracing::info!(conn = %from.short(), code = %code, "Session created");
                vec![Outbound::new(from, ServerMessage::Created { code })]
            }
            Err(e) => {
                tracing::warn!(conn = %from.short(), error = %e, "Session create failed");
                vec![error_reply(from, &e)]
            }
        },

        ClientMessage::Join { code } => match store.join_session(&code, from) {
            Ok(pairing) => {
                tracing::info!(
                    code = %code,
                    host = %pairing.host.short(),
                    guest = %pairing.guest.short(),
                    "Session started"
                );
                vec![
                    Outbound::new(pairing.host, ServerMessage::StartGame { role: Role::Host }),
                    Outbound::new(
                        pairing.guest,
                        ServerMessage::StartGame { role: Role::Guest },
                    ),
                ]
            }
            Err(e) => {
                let state = store.get(&code).map(|s| s.state());
                tracing::info!(conn = %from.short(), code = %code, state = ?state, "Join rejected");
                vec![error_reply(from, &e)]
            }
        },

        ClientMessage::UpdateTask { code, role } => {
            match store.report_completion(&code, role) {
                Ok(BarrierStatus::BothComplete(pairing)) => {
                    tracing::info!(code = %code, "Barrier released");
                    vec![
                        Outbound::new(pairing.host, ServerMessage::SyncComplete),
                        Outbound::new(pairing.guest, ServerMessage::SyncComplete),
                    ]
                }
                Ok(BarrierStatus::Pending) => {
                    tracing::debug!(code = %code, role = %role, "Completion recorded");
                    Vec::new()
                }
                Err(e) => {
                    tracing::debug!(conn = %from.short(), error = %e, "Dropping report");
                    Vec::new()
                }
            }
        }
    }
}

fn error_reply(to: ConnectionId, err: &ProtocolError) -> Outbound {
    Outbound::new(
        to,
        ServerMessage::Error {
            msg: err.to_string(),
        },
    )
}
