use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use super::relay::{RelayStats, SessionRelay};
use super::session::{ConnectionId, Outbound, Session};
use crate::db::Storage;
use crate::models::{
    ChatMessagePayload, CollaborationEvent, ContentChangePayload, CursorMovePayload, DocumentUpdate,
    EventKind, InsertChatMessage, TypingPayload,
};

/// Work item for the dispatcher loop
#[derive(Debug)]
pub enum Command {
    Connect { connection_id: ConnectionId, outbound: Outbound },
    Inbound { connection_id: ConnectionId, frame: String },
    Disconnect { connection_id: ConnectionId },
    Stats { reply: oneshot::Sender<RelayStats> },
}

/// Cloneable entry point into the dispatcher queue.
///
/// Sends never block; if the dispatcher has stopped the command is dropped.
#[derive(Clone, Debug)]
pub struct DispatcherHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DispatcherHandle {
    pub fn connect(&self, connection_id: ConnectionId, outbound: Outbound) {
        self.submit(Command::Connect { connection_id, outbound });
    }

    pub fn inbound(&self, connection_id: ConnectionId, frame: String) {
        self.submit(Command::Inbound { connection_id, frame });
    }

    pub fn disconnect(&self, connection_id: ConnectionId) {
        self.submit(Command::Disconnect { connection_id });
    }

    pub async fn stats(&self) -> Option<RelayStats> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Stats { reply });
        rx.await.ok()
    }

    fn submit(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("Dispatcher is not running, command dropped");
        }
    }
}

/// Start the dispatcher on its own task and return a handle to it
pub fn spawn(store: Arc<dyn Storage>) -> DispatcherHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(store);
    tokio::spawn(dispatcher.run(rx));
    DispatcherHandle { tx }
}

/// The single event loop that owns the session relay.
///
/// Commands are handled one at a time to completion. Persistence failures are
/// logged and never stop an event from being relayed.
pub struct Dispatcher {
    relay: SessionRelay,
    store: Arc<dyn Storage>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            relay: SessionRelay::new(),
            store,
        }
    }

    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        info!("Collaboration dispatcher started");
        while let Some(command) = rx.recv().await {
            self.handle(command).await;
        }
        info!("Collaboration dispatcher stopped");
    }

    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::Connect { connection_id, outbound } => {
                self.relay.connect(Session::new(connection_id, outbound));
            }
            Command::Inbound { connection_id, frame } => {
                self.handle_frame(connection_id, &frame).await;
            }
            Command::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id).await;
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.relay.stats());
            }
        }
    }

    async fn handle_frame(&mut self, connection_id: ConnectionId, frame: &str) {
        let event = match CollaborationEvent::decode(frame) {
            Ok(event) => event,
            Err(e) => {
                warn!("Dropping malformed frame from session {}: {}", connection_id, e);
                return;
            }
        };
        debug!("Received {:?} for document {} from user {}", event.kind, event.document_id, event.user_id);

        if let Err(e) = self.handle_event(connection_id, event).await {
            warn!("Dropping event with malformed payload from session {}: {}", connection_id, e);
        }
    }

    async fn handle_event(&mut self, connection_id: ConnectionId, event: CollaborationEvent) -> Result<(), serde_json::Error> {
        let document_id = event.document_id;
        match event.kind {
            EventKind::UserJoin => {
                if !self.relay.register(connection_id, event.user_id, document_id) {
                    return Ok(());
                }
                if let Err(e) = self.store.add_collaborator(document_id, event.user_id).await {
                    warn!("Failed to record collaborator {} on document {}: {}", event.user_id, document_id, e);
                }
                if let Err(e) = self.store.update_user_online_status(event.user_id, true).await {
                    warn!("Failed to mark user {} online: {}", event.user_id, e);
                }
            }
            EventKind::ContentChange => {
                self.relay.relay(document_id, &event, Some(connection_id));
                // Only text content is stored; anything else is relayed as is
                match event.payload_as::<ContentChangePayload>() {
                    Ok(change) => {
                        if let Err(e) = self.store.update_document(document_id, DocumentUpdate::content(change.content)).await {
                            warn!("Failed to persist content of document {}: {}", document_id, e);
                        }
                    }
                    Err(e) => debug!("Not persisting non-text content for document {}: {}", document_id, e),
                }
            }
            EventKind::CursorMove => {
                let moved: CursorMovePayload = event.payload_as()?;
                self.relay.set_cursor(connection_id, moved.cursor);
                self.relay.relay(document_id, &event, Some(connection_id));
            }
            EventKind::ChatMessage => {
                let chat: ChatMessagePayload = event.payload_as()?;
                let stored = self
                    .store
                    .create_chat_message(InsertChatMessage {
                        document_id,
                        author_id: event.user_id,
                        content: chat.content,
                    })
                    .await;
                // Chat goes to the sender too, so it sees the stored id
                let event = match stored {
                    Ok(message) => event.with_chat_record(&message),
                    Err(e) => {
                        warn!("Failed to store chat message for document {}: {}", document_id, e);
                        event
                    }
                };
                self.relay.relay(document_id, &event, None);
            }
            EventKind::Typing => {
                let _: TypingPayload = event.payload_as()?;
                self.relay.relay(document_id, &event, Some(connection_id));
            }
            EventKind::UserLeave => {
                debug!("Ignoring client-sent user-leave from session {}", connection_id);
            }
        }
        Ok(())
    }

    async fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        let Some((user_id, document_id)) = self.relay.disconnect(connection_id) else {
            return;
        };
        if let Err(e) = self.store.update_user_online_status(user_id, false).await {
            warn!("Failed to mark user {} offline after leaving document {}: {}", user_id, document_id, e);
        }
    }

    #[cfg(test)]
    pub fn relay(&self) -> &SessionRelay {
        &self.relay
    }
}
