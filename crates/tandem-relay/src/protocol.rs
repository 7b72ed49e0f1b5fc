//! Wire protocol. Every frame is a JSON object; inbound frames are tagged by
//! `action`, outbound frames by `type`.

use serde::{Deserialize, Deserializer, Serialize};
use tandem_common::{Role, SessionCode};

/// Messages a participant sends to the relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "create")]
    Create,

    #[serde(rename = "join")]
    Join {
        #[serde(deserialize_with = "code_from_string_or_number")]
        code: SessionCode,
    },

    #[serde(rename = "update_task")]
    UpdateTask {
        #[serde(deserialize_with = "code_from_string_or_number")]
        code: SessionCode,
        role: Role,
    },
}

/// Messages the relay pushes to participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "created")]
    Created { code: SessionCode },

    #[serde(rename = "start_game")]
    StartGame { role: Role },

    #[serde(rename = "error")]
    Error { msg: String },

    #[serde(rename = "sync_complete")]
    SyncComplete,
}

/// Browser clients often send the code as typed into a numeric field.
fn code_from_string_or_number<'de, D>(deserializer: D) -> Result<SessionCode, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCode {
        Text(String),
        Number(u64),
    }

    Ok(match RawCode::deserialize(deserializer)? {
        RawCode::Text(s) => SessionCode::new(s.trim()),
        RawCode::Number(n) => SessionCode::new(n.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_create() {
        let msg: ClientMessage = serde_json::from_str(r#"{"action":"create"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Create);
    }

    #[test]
    fn parse_join_with_string_or_number_code() {
        let from_str: ClientMessage =
            serde_json::from_str(r#"{"action":"join","code":"4821"}"#).unwrap();
        let from_num: ClientMessage =
            serde_json::from_str(r#"{"action":"join","code":4821}"#).unwrap();
        let expected = ClientMessage::Join {
            code: SessionCode::new("4821"),
        };
        assert_eq!(from_str, expected);
        assert_eq!(from_num, expected);
    }

    #[test]
    fn parse_update_task() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"update_task","code":"4821","role":"guest"}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::UpdateTask {
                code: SessionCode::new("4821"),
                role: Role::Guest,
            }
        );
    }

    #[test]
    fn extra_fields_are_ignored() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"create","player":"ann"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Create);
    }

    #[test]
    fn malformed_envelopes_fail() {
        for raw in [
            "not json",
            r#"{"code":"4821"}"#,
            r#"{"action":"teleport"}"#,
            r#"{"action":"join"}"#,
            r#"{"action":"update_task","code":"4821","role":"referee"}"#,
            r#""create""#,
        ] {
            assert!(
                serde_json::from_str::<ClientMessage>(raw).is_err(),
                "should reject {raw}"
            );
        }
    }

    #[test]
    fn serialize_outbound() {
        let created = ServerMessage::Created {
            code: SessionCode::new("4821"),
        };
        assert_eq!(
            serde_json::to_string(&created).unwrap(),
            r#"{"type":"created","code":"4821"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerMessage::StartGame { role: Role::Host }).unwrap(),
            r#"{"type":"start_game","role":"host"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerMessage::Error { msg: "nope".into() }).unwrap(),
            r#"{"type":"error","msg":"nope"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerMessage::SyncComplete).unwrap(),
            r#"{"type":"sync_complete"}"#
        );
    }
}
