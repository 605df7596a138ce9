use std::error::Error;
use std::sync::Arc;

use futures_util::StreamExt;
use log::{info, warn};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

use crate::errors::{AppError, AppResult};
use crate::network::connection_commands::ConnectionCommand;
use crate::network::lobby::LobbyState;
use crate::network::message_handler::MessageHandler;
use crate::network::messages::{serialize_response, ServerResponse};

pub struct ConnectionHandler;

impl ConnectionHandler {
    /// Full lifecycle of one websocket: handshake, room assignment, read
    /// loop, and teardown. Joining happens immediately on connect; leaving
    /// happens on any exit from the read loop, clean or not.
    pub async fn handle_connection(
        stream: TcpStream,
        connection_id: String,
        lobby_state: Arc<Mutex<LobbyState>>,
        cmd_sender: mpsc::UnboundedSender<ConnectionCommand>,
    ) -> Result<(), Box<dyn Error>> {
        let ws_stream = accept_async(stream).await?;
        info!("🔗 Connection {} established", connection_id);

        let (ws_sender, mut ws_receiver) = ws_stream.split();

        cmd_sender.send(ConnectionCommand::AddConnection {
            id: connection_id.clone(),
            sender: ws_sender,
        })?;

        if let Err(err) = Self::join_room(&connection_id, &lobby_state, &cmd_sender).await {
            warn!("Join failed for connection {}: {}", connection_id, err);
        }

        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    MessageHandler::handle_text_message(
                        text,
                        &connection_id,
                        &lobby_state,
                        &cmd_sender,
                    )
                    .await;
                }
                Ok(Message::Close(_)) => {
                    info!("👋 Connection {} requested close", connection_id);
                    break;
                }
                Ok(_) => {
                    // Binary/ping/pong frames carry nothing for us.
                }
                Err(err) => {
                    warn!("Connection {} errored: {}", connection_id, err);
                    break;
                }
            }
        }

        Self::leave_room(&connection_id, &lobby_state).await;
        cmd_sender.send(ConnectionCommand::RemoveConnection {
            id: connection_id.clone(),
        })?;

        info!("📴 Connection {} closed", connection_id);
        Ok(())
    }

    /// Pairs the connection into a room and sends its init payload. If this
    /// fills the room, the game loop starts.
    async fn join_room(
        connection_id: &str,
        lobby_state: &Arc<Mutex<LobbyState>>,
        cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
    ) -> AppResult<()> {
        let mut guard = lobby_state.lock().await;
        let state = &mut *guard;

        let joined = state.room_manager.find_or_create_room(connection_id)?;
        info!(
            "Player {} joined room {} as {:?} ({}/2)",
            connection_id, joined.room_id, joined.side, joined.player_count
        );

        let init = serialize_response(&ServerResponse::game_init(
            joined.room_id.clone(),
            connection_id.to_string(),
            joined.side,
        ))?;
        cmd_sender
            .send(ConnectionCommand::SendToPlayer {
                connection_id: connection_id.to_string(),
                message: init,
            })
            .map_err(|err| AppError::Internal {
                message: err.to_string(),
            })?;

        if joined.player_count == 2 {
            state.start_room_loop(&joined.room_id, lobby_state.clone(), cmd_sender.clone());
        }
        Ok(())
    }

    /// Disconnect is a lifecycle event, not an error. An emptied room is
    /// destroyed outright; a half-empty room has its loop stopped and waits
    /// for a new opponent.
    async fn leave_room(connection_id: &str, lobby_state: &Arc<Mutex<LobbyState>>) {
        let mut state = lobby_state.lock().await;
        if let Some(outcome) = state.room_manager.leave(connection_id) {
            state.game_loop_registry.stop_loop(&outcome.room_id);
            if outcome.room_empty {
                state.room_manager.remove_room(&outcome.room_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnect_of_last_player_destroys_the_room() {
        let lobby = Arc::new(Mutex::new(LobbyState::new()));
        let room_id = {
            let mut state = lobby.lock().await;
            state.room_manager.find_or_create_room("c1").unwrap().room_id
        };

        ConnectionHandler::leave_room("c1", &lobby).await;

        let state = lobby.lock().await;
        assert!(state.room_manager.get_room(&room_id).is_none());
        assert_eq!(state.room_manager.room_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn disconnect_of_one_player_stops_the_loop_but_keeps_the_room() {
        let lobby = Arc::new(Mutex::new(LobbyState::new()));
        let (cmd_sender, _cmd_receiver) = mpsc::unbounded_channel();
        let room_id = {
            let mut state = lobby.lock().await;
            let joined = state.room_manager.find_or_create_room("c1").unwrap();
            state.room_manager.find_or_create_room("c2").unwrap();
            state.start_room_loop(&joined.room_id, lobby.clone(), cmd_sender.clone());
            assert!(state.game_loop_registry.is_running(&joined.room_id));
            joined.room_id
        };

        ConnectionHandler::leave_room("c2", &lobby).await;

        let state = lobby.lock().await;
        assert!(!state.game_loop_registry.is_running(&room_id));
        assert_eq!(
            state.room_manager.member_connections(&room_id).unwrap(),
            vec!["c1"]
        );
    }

    #[tokio::test]
    async fn disconnect_of_unknown_connection_is_harmless() {
        let lobby = Arc::new(Mutex::new(LobbyState::new()));
        ConnectionHandler::leave_room("ghost", &lobby).await;
        assert_eq!(lobby.lock().await.room_manager.room_count(), 0);
    }
}
