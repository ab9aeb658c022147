use std::collections::HashMap;
use tracing::{debug, error, info, warn};

use super::session::{ConnectionId, Session};
use crate::models::{CollaborationEvent, Cursor, DocumentId, EventKind, UserId};

/// Counts reported by the diagnostics endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub connections: usize,
    pub rooms: usize,
    pub joined: usize,
}

/// Document rooms and the sessions in them.
///
/// Owned by a single dispatcher task, so every operation runs to completion
/// before the next one starts and delivery within a room follows call order.
/// A session is in at most one room, and rooms never stay around empty.
#[derive(Debug, Default)]
pub struct SessionRelay {
    sessions: HashMap<ConnectionId, Session>,
    rooms: HashMap<DocumentId, Vec<ConnectionId>>,
}

impl SessionRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly opened connection that has not joined a document yet
    pub fn connect(&mut self, session: Session) {
        debug!("Session {} connected", session.connection_id);
        self.sessions.insert(session.connection_id, session);
    }

    /// Join `document_id`, leaving any other room first, and announce the join
    /// to the rest of the room.
    ///
    /// Returns false if the session is unknown and nothing changed.
    pub fn register(&mut self, connection_id: ConnectionId, user_id: UserId, document_id: DocumentId) -> bool {
        let current = match self.sessions.get(&connection_id) {
            Some(session) => session.document_id,
            None => {
                warn!("Register for unknown session {} ignored", connection_id);
                return false;
            }
        };
        if current.is_some_and(|current| current != document_id) {
            self.unregister(connection_id);
        }

        if let Some(session) = self.sessions.get_mut(&connection_id) {
            session.user_id = Some(user_id);
            session.document_id = Some(document_id);
        }
        let members = self.rooms.entry(document_id).or_default();
        if !members.contains(&connection_id) {
            members.push(connection_id);
        }
        info!("User {} joined document {} on session {}", user_id, document_id, connection_id);

        let joined = CollaborationEvent::presence(EventKind::UserJoin, user_id, document_id);
        self.relay(document_id, &joined, Some(connection_id));
        true
    }

    /// Leave the current room, announcing the departure to whoever remains.
    ///
    /// Returns the user and document that were left, `None` if the session was
    /// not in a room.
    pub fn unregister(&mut self, connection_id: ConnectionId) -> Option<(UserId, DocumentId)> {
        let session = self.sessions.get_mut(&connection_id)?;
        let (user_id, document_id) = match (session.user_id, session.document_id.take()) {
            (Some(user_id), Some(document_id)) => (user_id, document_id),
            _ => return None,
        };

        if let Some(members) = self.rooms.get_mut(&document_id) {
            members.retain(|member| *member != connection_id);
            if members.is_empty() {
                self.rooms.remove(&document_id);
                debug!("Room for document {} closed", document_id);
            }
        }
        info!("User {} left document {} on session {}", user_id, document_id, connection_id);

        let left = CollaborationEvent::presence(EventKind::UserLeave, user_id, document_id);
        self.relay(document_id, &left, None);
        Some((user_id, document_id))
    }

    /// Unregister and forget the session; nothing reaches it afterwards
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<(UserId, DocumentId)> {
        let left = self.unregister(connection_id);
        if self.sessions.remove(&connection_id).is_some() {
            debug!("Session {} disconnected", connection_id);
        }
        left
    }

    /// Forward `event` to every writable session in the room except `exclude`.
    ///
    /// Returns how many sessions the event was queued for. Closed sessions are
    /// skipped; their disconnect is on its way. A session whose queue is full
    /// misses the event.
    pub fn relay(&self, document_id: DocumentId, event: &CollaborationEvent, exclude: Option<ConnectionId>) -> usize {
        let Some(members) = self.rooms.get(&document_id) else {
            return 0;
        };
        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(e) => {
                error!("Failed to encode {:?} event for document {}: {}", event.kind, document_id, e);
                return 0;
            }
        };

        let mut delivered = 0;
        for member in members {
            if Some(*member) == exclude {
                continue;
            }
            let Some(session) = self.sessions.get(member) else {
                continue;
            };
            if !session.is_writable() {
                debug!("Skipping closed session {} in document {}", member, document_id);
                continue;
            }
            if session.send(frame.clone()) {
                delivered += 1;
            }
        }
        delivered
    }

    pub fn set_cursor(&mut self, connection_id: ConnectionId, cursor: Cursor) {
        if let Some(session) = self.sessions.get_mut(&connection_id) {
            session.last_cursor = Some(cursor);
        }
    }

    pub fn session(&self, connection_id: ConnectionId) -> Option<&Session> {
        self.sessions.get(&connection_id)
    }

    /// Sessions in the room, in join order
    pub fn room_members(&self, document_id: DocumentId) -> Vec<ConnectionId> {
        self.rooms.get(&document_id).cloned().unwrap_or_default()
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.sessions.len(),
            rooms: self.rooms.len(),
            joined: self.rooms.values().map(Vec::len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::ws::session::{outbound_channel, OUTBOUND_CAPACITY};
    use tokio::sync::mpsc::Receiver;
    use uuid::Uuid;

    fn open(relay: &mut SessionRelay) -> (ConnectionId, Receiver<String>) {
        let (tx, rx) = outbound_channel();
        let id = Uuid::new_v4();
        relay.connect(Session::new(id, tx));
        (id, rx)
    }

    fn drain(rx: &mut Receiver<String>) -> Vec<CollaborationEvent> {
        let mut events = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            events.push(CollaborationEvent::decode(&frame).unwrap());
        }
        events
    }

    fn content_change(user_id: UserId, document_id: DocumentId, content: &str) -> CollaborationEvent {
        CollaborationEvent {
            kind: EventKind::ContentChange,
            payload: json!({ "content": content }),
            user_id,
            document_id,
            timestamp: 0,
        }
    }

    #[test]
    fn relay_skips_the_excluded_sender() {
        let mut relay = SessionRelay::new();
        let (a, mut a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(a, 1, 7);
        relay.register(b, 2, 7);
        drain(&mut a_rx);

        let delivered = relay.relay(7, &content_change(1, 7, "x=1"), Some(a));

        assert_eq!(delivered, 1);
        assert!(drain(&mut a_rx).is_empty());
        let received = drain(&mut b_rx);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind, EventKind::ContentChange);
        assert_eq!(received[0].payload["content"], "x=1");
    }

    #[test]
    fn join_is_announced_to_others_only() {
        let mut relay = SessionRelay::new();
        let (a, mut a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(a, 1, 7);
        relay.register(b, 2, 7);

        let seen_by_a = drain(&mut a_rx);
        assert_eq!(seen_by_a.len(), 1);
        assert_eq!(seen_by_a[0].kind, EventKind::UserJoin);
        assert_eq!(seen_by_a[0].payload["userId"], 2);
        assert!(drain(&mut b_rx).is_empty());
    }

    #[test]
    fn last_leave_drops_the_room() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        relay.register(a, 1, 7);
        assert_eq!(relay.stats().rooms, 1);

        assert_eq!(relay.unregister(a), Some((1, 7)));
        assert_eq!(relay.stats().rooms, 0);
        assert!(relay.room_members(7).is_empty());

        let (b, _b_rx) = open(&mut relay);
        relay.register(b, 2, 7);
        assert_eq!(relay.room_members(7), vec![b]);
    }

    #[test]
    fn register_for_unknown_session_is_ignored() {
        let mut relay = SessionRelay::new();
        assert!(!relay.register(Uuid::new_v4(), 1, 7));
        assert_eq!(relay.stats(), RelayStats::default());

        let (a, _a_rx) = open(&mut relay);
        assert!(relay.register(a, 1, 7));
    }

    #[test]
    fn stalled_recipient_is_capped_while_others_keep_receiving() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        let (c, mut stalled_rx) = open(&mut relay);
        relay.register(a, 1, 7);
        relay.register(b, 2, 7);
        relay.register(c, 3, 7);
        drain(&mut b_rx);

        let big = "x".repeat(10 * 1024);
        let mut seen_by_b = 0;
        for _ in 0..(OUTBOUND_CAPACITY * 20) {
            relay.relay(7, &content_change(1, 7, &big), Some(a));
            seen_by_b += drain(&mut b_rx).len();
        }

        assert_eq!(seen_by_b, OUTBOUND_CAPACITY * 20);
        assert_eq!(relay.relay(7, &content_change(1, 7, "late"), Some(a)), 1);
        assert_eq!(drain(&mut stalled_rx).len(), OUTBOUND_CAPACITY);
        assert_eq!(relay.room_members(7), vec![a, b, c]);
    }

    #[test]
    fn unregister_without_room_is_a_noop() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        assert_eq!(relay.unregister(a), None);
        assert_eq!(relay.unregister(Uuid::new_v4()), None);
    }

    #[test]
    fn switching_documents_moves_the_session() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(b, 2, 1);
        relay.register(a, 1, 1);
        drain(&mut b_rx);

        relay.register(a, 1, 2);

        assert_eq!(relay.room_members(1), vec![b]);
        assert_eq!(relay.room_members(2), vec![a]);
        assert_eq!(relay.session(a).and_then(|s| s.document_id), Some(2));
        let seen_by_b = drain(&mut b_rx);
        assert_eq!(seen_by_b.len(), 1);
        assert_eq!(seen_by_b[0].kind, EventKind::UserLeave);
    }

    #[test]
    fn repeated_register_keeps_single_membership() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        relay.register(a, 1, 3);
        relay.register(a, 1, 3);
        assert_eq!(relay.room_members(3), vec![a]);
        assert_eq!(relay.stats(), RelayStats { connections: 1, rooms: 1, joined: 1 });
    }

    #[test]
    fn documents_never_cross_deliver() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(a, 1, 1);
        relay.register(b, 2, 2);

        assert_eq!(relay.relay(1, &content_change(1, 1, "only d1"), None), 1);
        assert!(drain(&mut b_rx).is_empty());
    }

    #[test]
    fn disconnect_announces_leave_and_stops_delivery() {
        let mut relay = SessionRelay::new();
        let (a, a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(b, 2, 7);
        relay.register(a, 1, 7);
        drain(&mut b_rx);

        assert_eq!(relay.disconnect(a), Some((1, 7)));
        let seen_by_b = drain(&mut b_rx);
        assert_eq!(seen_by_b.len(), 1);
        assert_eq!(seen_by_b[0].kind, EventKind::UserLeave);
        assert_eq!(seen_by_b[0].payload["userId"], 1);

        drop(a_rx);
        assert_eq!(relay.relay(7, &content_change(2, 7, "after"), None), 1);
        assert!(relay.session(a).is_none());
    }

    #[test]
    fn closed_sessions_are_skipped() {
        let mut relay = SessionRelay::new();
        let (a, a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(a, 1, 7);
        relay.register(b, 2, 7);
        drop(a_rx);

        assert_eq!(relay.relay(7, &content_change(2, 7, "x"), None), 1);
        assert_eq!(drain(&mut b_rx).len(), 1);
    }

    #[test]
    fn delivery_follows_call_order() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        let (b, mut b_rx) = open(&mut relay);
        relay.register(a, 1, 7);
        relay.register(b, 2, 7);

        for content in ["1", "2", "3"] {
            relay.relay(7, &content_change(1, 7, content), Some(a));
        }
        let contents: Vec<_> = drain(&mut b_rx).into_iter().map(|e| e.payload["content"].clone()).collect();
        assert_eq!(contents, vec![json!("1"), json!("2"), json!("3")]);
    }

    #[test]
    fn relays_are_independent() {
        let mut first = SessionRelay::new();
        let second = SessionRelay::new();
        let (a, _a_rx) = open(&mut first);
        first.register(a, 1, 7);

        assert_eq!(first.room_members(7), vec![a]);
        assert!(second.room_members(7).is_empty());
    }

    #[test]
    fn cursor_is_remembered_on_the_session() {
        let mut relay = SessionRelay::new();
        let (a, _a_rx) = open(&mut relay);
        relay.set_cursor(a, Cursor { line: 4, column: 2 });
        assert_eq!(relay.session(a).and_then(|s| s.last_cursor), Some(Cursor { line: 4, column: 2 }));
    }
}
