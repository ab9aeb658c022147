use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ChatMessage, DocumentId, UserId};

/// Kind of a collaboration event, carried in the `type` field
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    ContentChange,
    CursorMove,
    UserJoin,
    UserLeave,
    ChatMessage,
    Typing,
}

/// Envelope exchanged over the collaboration socket.
///
/// The payload stays untyped so the relay can forward it exactly as received;
/// the dispatcher reads the typed shapes below only where it needs a field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub payload: Value,
    pub user_id: UserId,
    pub document_id: DocumentId,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl CollaborationEvent {
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// `user-join` / `user-leave` notification emitted by the server
    pub fn presence(kind: EventKind, user_id: UserId, document_id: DocumentId) -> Self {
        let payload = PresencePayload { user_id };
        Self {
            kind,
            payload: json!(payload),
            user_id,
            document_id,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Extend a chat payload with the id and creation time it was stored under
    pub fn with_chat_record(mut self, message: &ChatMessage) -> Self {
        let record = [
            ("id".to_string(), json!(message.id)),
            ("createdAt".to_string(), json!(message.created_at)),
        ];
        match &mut self.payload {
            Value::Object(fields) => fields.extend(record),
            other => {
                let mut fields = serde_json::Map::new();
                fields.insert("content".to_string(), json!(message.content));
                fields.extend(record);
                *other = Value::Object(fields);
            }
        }
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: UserId,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContentChangePayload {
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub line: u32,
    pub column: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CursorMovePayload {
    pub cursor: Cursor,
    /// Display info about the moving user, forwarded untouched
    #[serde(default)]
    pub user: Value,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub is_typing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_envelope() {
        let raw = r#"{"type":"cursor-move","payload":{"cursor":{"line":3,"column":14},"user":{"name":"ada"}},"userId":2,"documentId":7,"timestamp":1700000000000}"#;
        let event = CollaborationEvent::decode(raw).unwrap();
        assert_eq!(event.kind, EventKind::CursorMove);
        assert_eq!(event.user_id, 2);
        assert_eq!(event.document_id, 7);

        let payload: CursorMovePayload = event.payload_as().unwrap();
        assert_eq!(payload.cursor, Cursor { line: 3, column: 14 });
        assert_eq!(payload.user["name"], "ada");
    }

    #[test]
    fn encodes_type_and_camel_case_fields() {
        let event = CollaborationEvent::presence(EventKind::UserLeave, 4, 9);
        let value: Value = serde_json::from_str(&event.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "user-leave");
        assert_eq!(value["userId"], 4);
        assert_eq!(value["documentId"], 9);
        assert_eq!(value["payload"]["userId"], 4);
    }

    #[test]
    fn rejects_unknown_type_and_missing_fields() {
        assert!(CollaborationEvent::decode(r#"{"type":"rename","userId":1,"documentId":1,"timestamp":0}"#).is_err());
        assert!(CollaborationEvent::decode(r#"{"type":"typing","payload":{"isTyping":true}}"#).is_err());
        assert!(CollaborationEvent::decode("not json").is_err());
    }

    #[test]
    fn chat_record_extends_payload() {
        let event = CollaborationEvent::decode(
            r#"{"type":"chat-message","payload":{"content":"hi"},"userId":1,"documentId":2,"timestamp":5}"#,
        )
        .unwrap();
        let stored = ChatMessage {
            id: 11,
            document_id: 2,
            author_id: 1,
            content: "hi".to_string(),
            created_at: Utc::now(),
        };

        let payload: ChatMessagePayload = event.with_chat_record(&stored).payload_as().unwrap();
        assert_eq!(payload.content, "hi");
        assert_eq!(payload.id, Some(11));
        assert_eq!(payload.created_at, Some(stored.created_at));
    }
}
