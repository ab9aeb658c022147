use axum::{
    extract::{ws::{Message, WebSocket, WebSocketUpgrade}, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dispatcher::DispatcherHandle;
use super::session::{outbound_channel, ConnectionId};
use crate::state::AppState;

/// WebSocket handler
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    info!("New WebSocket connection attempt");
    let ping_interval = state.config.ping_interval();
    ws.on_upgrade(move |socket| handle_socket(socket, state.dispatcher, ping_interval))
}

/// Tells the dispatcher the connection is gone, however the socket task ends
struct DisconnectGuard {
    connection_id: ConnectionId,
    dispatcher: DispatcherHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        self.dispatcher.disconnect(self.connection_id);
    }
}

/// Handle WebSocket connection
async fn handle_socket(socket: WebSocket, dispatcher: DispatcherHandle, ping_interval: Duration) {
    let connection_id = Uuid::new_v4();
    info!("WebSocket connection established with connection_id: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (outbound, mut outbound_rx) = outbound_channel();
    dispatcher.connect(connection_id, outbound);
    let _guard = DisconnectGuard {
        connection_id,
        dispatcher: dispatcher.clone(),
    };

    // Drain relayed frames into the socket and keep it alive with pings.
    // A write stuck for a whole ping interval ends the connection.
    let mut send_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_interval);
        ping.tick().await;
        loop {
            let message = tokio::select! {
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => Message::Text(frame),
                    None => break,
                },
                _ = ping.tick() => Message::Ping(Vec::new()),
            };
            match timeout(ping_interval, sender.send(message)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!("WebSocket write error on {}: {}", connection_id, e);
                    break;
                }
                Err(_) => {
                    warn!("WebSocket write on {} stalled for {:?}, closing", connection_id, ping_interval);
                    break;
                }
            }
        }
    });

    // Forward every inbound frame to the dispatcher
    let mut recv_task = tokio::spawn(async move {
        while let Some(message) = receiver.next().await {
            match message {
                Ok(Message::Text(text)) => dispatcher.inbound(connection_id, text),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => dispatcher.inbound(connection_id, text),
                    Err(_) => warn!("Dropping non UTF-8 binary frame from {}", connection_id),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!("WebSocket read error on {}: {}", connection_id, e);
                    break;
                }
            }
        }
    });

    // Wait for either task to finish (and finish the other)
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };
    info!("WebSocket connection {} terminated", connection_id);
}
