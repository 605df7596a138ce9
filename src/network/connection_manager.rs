use std::collections::HashMap;

use futures_util::{stream::SplitSink, SinkExt};
use log::{debug, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};

use crate::errors::{AppError, AppResult};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Owns the write half of every live websocket. Reads happen in each
/// connection's own task; all writes funnel through here via the command
/// processor.
pub struct ConnectionManager {
    connections: HashMap<String, WsSink>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    pub fn add_connection(&mut self, id: String, sender: WsSink) {
        debug!("Registered connection {}", id);
        self.connections.insert(id, sender);
    }

    pub fn remove_connection(&mut self, id: &str) {
        if self.connections.remove(id).is_some() {
            debug!("Dropped connection {}", id);
        }
    }

    pub async fn send_to_player(&mut self, connection_id: &str, message: &str) -> AppResult<()> {
        let sender =
            self.connections
                .get_mut(connection_id)
                .ok_or_else(|| AppError::ConnectionNotFound {
                    connection_id: connection_id.to_string(),
                })?;

        sender
            .send(Message::Text(message.to_string()))
            .await
            .map_err(|_| AppError::MessageSendFailed {
                connection_id: connection_id.to_string(),
            })
    }

    /// Best-effort fan-out to a set of connections. A connection that fails
    /// to accept the write is evicted; the others still get the message.
    pub async fn send_to_many(&mut self, connection_ids: &[String], message: &str) {
        let mut failed = Vec::new();

        for connection_id in connection_ids {
            if let Err(err) = self.send_to_player(connection_id, message).await {
                warn!("Evicting connection {}: {}", connection_id, err);
                failed.push(connection_id.clone());
            }
        }

        for connection_id in failed {
            self.remove_connection(&connection_id);
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
