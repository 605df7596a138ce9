use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{mpsc, Mutex};

use crate::errors::{AppError, AppResult};
use crate::network::connection_commands::ConnectionCommand;
use crate::network::lobby::LobbyState;
use crate::network::messages::{
    deserialize_message, serialize_response, ClientMessage, ServerResponse,
};

pub struct MessageHandler;

impl MessageHandler {
    /// Entry point for every inbound text frame. Parse failures and
    /// non-silent errors are reported back to the sender; lifecycle races
    /// (moves from a player who just disconnected, stale restarts) are
    /// dropped quietly.
    pub async fn handle_text_message(
        text: String,
        connection_id: &str,
        lobby_state: &Arc<Mutex<LobbyState>>,
        cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
    ) {
        let message = match deserialize_message(&text) {
            Ok(message) => message,
            Err(err) => {
                warn!("Unparseable message from {}: {}", connection_id, err);
                Self::report_error(
                    connection_id,
                    AppError::SerializationError {
                        message: err.to_string(),
                    },
                    cmd_sender,
                );
                return;
            }
        };

        if let Err(err) =
            Self::process_message(message, connection_id, lobby_state, cmd_sender).await
        {
            if err.is_silent() {
                debug!("Ignored from {}: {}", connection_id, err);
            } else {
                warn!("Error handling message from {}: {}", connection_id, err);
                Self::report_error(connection_id, err, cmd_sender);
            }
        }
    }

    async fn process_message(
        message: ClientMessage,
        connection_id: &str,
        lobby_state: &Arc<Mutex<LobbyState>>,
        cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
    ) -> AppResult<()> {
        match message {
            ClientMessage::Ping => {
                let pong = serialize_response(&ServerResponse::Pong)?;
                Self::send_to_player(cmd_sender, connection_id, pong)
            }
            ClientMessage::MovePaddle { direction } => {
                let mut state = lobby_state.lock().await;
                let room_id = state
                    .room_manager
                    .room_id_for_connection(connection_id)
                    .ok_or_else(|| AppError::PlayerNotInRoom {
                        player_id: connection_id.to_string(),
                    })?;
                let room = state
                    .room_manager
                    .get_room_mut(&room_id)
                    .ok_or_else(|| AppError::RoomNotFound {
                        room_id: room_id.clone(),
                    })?;

                let paddle_y = room.move_paddle(connection_id, direction).ok_or_else(|| {
                    AppError::PlayerNotInRoom {
                        player_id: connection_id.to_string(),
                    }
                })?;

                // Relay to the opponent so the paddle renders between ticks.
                let moved = serialize_response(&ServerResponse::PaddleMoved {
                    player_id: connection_id.to_string(),
                    paddle_y,
                })?;
                cmd_sender
                    .send(ConnectionCommand::SendToRoomExceptPlayer {
                        connection_id: connection_id.to_string(),
                        room_id,
                        message: moved,
                    })
                    .map_err(|err| AppError::Internal {
                        message: err.to_string(),
                    })
            }
            ClientMessage::RestartGame => {
                let mut guard = lobby_state.lock().await;
                let state = &mut *guard;
                let room_id = state
                    .room_manager
                    .room_id_for_connection(connection_id)
                    .ok_or_else(|| AppError::PlayerNotInRoom {
                        player_id: connection_id.to_string(),
                    })?;
                let room = state
                    .room_manager
                    .get_room_mut(&room_id)
                    .ok_or_else(|| AppError::RoomNotFound {
                        room_id: room_id.clone(),
                    })?;

                if !room.is_game_over() {
                    return Err(AppError::InvalidRestart);
                }

                debug!("Restarting game in room {}", room_id);
                let snapshot = room.reset();
                let restart = serialize_response(&ServerResponse::GameRestart(snapshot))?;
                cmd_sender
                    .send(ConnectionCommand::SendToRoom {
                        room_id: room_id.clone(),
                        message: restart,
                    })
                    .map_err(|err| AppError::Internal {
                        message: err.to_string(),
                    })?;

                state.start_room_loop(&room_id, lobby_state.clone(), cmd_sender.clone());
                Ok(())
            }
        }
    }

    fn send_to_player(
        cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
        connection_id: &str,
        message: String,
    ) -> AppResult<()> {
        cmd_sender
            .send(ConnectionCommand::SendToPlayer {
                connection_id: connection_id.to_string(),
                message,
            })
            .map_err(|err| AppError::Internal {
                message: err.to_string(),
            })
    }

    fn report_error(
        connection_id: &str,
        error: AppError,
        cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
    ) {
        if let Ok(message) = serialize_response(&ServerResponse::from_app_error(error)) {
            let _ = cmd_sender.send(ConnectionCommand::SendToPlayer {
                connection_id: connection_id.to_string(),
                message,
            });
        }
    }
}
