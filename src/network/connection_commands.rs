use futures_util::stream::SplitSink;
use tokio::net::TcpStream;
use tokio_tungstenite::{tungstenite::Message, WebSocketStream};

use crate::errors::AppResult;
use crate::network::lobby::LobbyState;

/// Outbound side of the server: every write to a websocket is expressed as a
/// command and drained by a single processor task, so connection sinks are
/// never touched from two tasks at once.
#[derive(Debug)]
pub enum ConnectionCommand {
    AddConnection {
        id: String,
        sender: SplitSink<WebSocketStream<TcpStream>, Message>,
    },
    RemoveConnection {
        id: String,
    },
    SendToPlayer {
        connection_id: String,
        message: String,
    },
    SendToRoom {
        room_id: String,
        message: String,
    },
    SendToRoomExceptPlayer {
        connection_id: String,
        room_id: String,
        message: String,
    },
}

pub struct CommandProcessor;

impl CommandProcessor {
    pub async fn process_command(command: ConnectionCommand, state: &mut LobbyState) -> AppResult<()> {
        match command {
            ConnectionCommand::AddConnection { id, sender } => {
                state.connection_manager.add_connection(id, sender);
            }
            ConnectionCommand::RemoveConnection { id } => {
                state.connection_manager.remove_connection(&id);
            }
            ConnectionCommand::SendToPlayer {
                connection_id,
                message,
            } => {
                state
                    .connection_manager
                    .send_to_player(&connection_id, &message)
                    .await?;
            }
            ConnectionCommand::SendToRoom { room_id, message } => {
                if let Some(members) = state.room_manager.member_connections(&room_id) {
                    state
                        .connection_manager
                        .send_to_many(&members, &message)
                        .await;
                }
            }
            ConnectionCommand::SendToRoomExceptPlayer {
                connection_id,
                room_id,
                message,
            } => {
                if let Some(mut members) = state.room_manager.member_connections(&room_id) {
                    members.retain(|member| member != &connection_id);
                    state
                        .connection_manager
                        .send_to_many(&members, &message)
                        .await;
                }
            }
        }
        Ok(())
    }
}
