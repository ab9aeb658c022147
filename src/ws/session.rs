use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;
use uuid::Uuid;

use crate::models::{Cursor, DocumentId, UserId};

pub type ConnectionId = Uuid;

/// Frames a session may have queued before further events are dropped for it
pub const OUTBOUND_CAPACITY: usize = 100;

/// Queue of encoded frames waiting to be written to one socket
pub type Outbound = mpsc::Sender<String>;

/// Create the bounded queue between the relay and a socket writer
pub fn outbound_channel() -> (Outbound, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOUND_CAPACITY)
}

/// One live connection plus its join state
#[derive(Debug)]
pub struct Session {
    pub connection_id: ConnectionId,
    pub user_id: Option<UserId>,
    pub document_id: Option<DocumentId>,
    pub last_cursor: Option<Cursor>,
    outbound: Outbound,
}

impl Session {
    pub fn new(connection_id: ConnectionId, outbound: Outbound) -> Self {
        Self {
            connection_id,
            user_id: None,
            document_id: None,
            last_cursor: None,
            outbound,
        }
    }

    /// False once the writer half of the connection has gone away
    pub fn is_writable(&self) -> bool {
        !self.outbound.is_closed()
    }

    /// Queue a frame without waiting for the socket.
    ///
    /// Returns false when the frame was not queued: the writer is gone, or it
    /// has fallen `OUTBOUND_CAPACITY` frames behind and this one is dropped.
    pub fn send(&self, frame: String) -> bool {
        match self.outbound.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Outbound queue full for session {}, frame dropped", self.connection_id);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}
