use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Serialize)]
pub enum AppError {
    // Room-related errors
    #[error("Room '{room_id}' is full")]
    RoomFull { room_id: String },

    #[error("Room '{room_id}' not found")]
    RoomNotFound { room_id: String },

    #[error("Player '{player_id}' is not in the room")]
    PlayerNotInRoom { player_id: String },

    #[error("Restart requested while the game is still running")]
    InvalidRestart,

    // Connection-related errors
    #[error("Connection '{connection_id}' not found")]
    ConnectionNotFound { connection_id: String },

    #[error("Failed to send message to connection '{connection_id}'")]
    MessageSendFailed { connection_id: String },

    // Game-loop errors
    #[error("Failed to hand off a game loop broadcast: {reason}")]
    GameLoopSendFailed { reason: String },

    // Serialization errors
    #[error("Failed to serialize response: {message}")]
    SerializationError { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Errors that legitimately race with a disconnect or a stale client
    /// state are dropped without a response; everything else is reported
    /// back to the offending connection.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            AppError::PlayerNotInRoom { .. } | AppError::InvalidRestart
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_races_are_silent() {
        assert!(AppError::PlayerNotInRoom {
            player_id: "x".to_string()
        }
        .is_silent());
        assert!(AppError::InvalidRestart.is_silent());
        assert!(!AppError::RoomFull {
            room_id: "x".to_string()
        }
        .is_silent());
        assert!(!AppError::GameLoopSendFailed {
            reason: "x".to_string()
        }
        .is_silent());
    }
}
