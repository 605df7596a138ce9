use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};
use crate::game::player::Side;
use crate::game::room::{Direction, GameSnapshot, PlayerSnapshot};
use crate::game::{CANVAS_HEIGHT, CANVAS_WIDTH, PADDLE_HEIGHT, PADDLE_WIDTH};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum ClientMessage {
    Ping,
    MovePaddle { direction: Direction },
    RestartGame,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn canvas() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }

    pub fn paddle() -> Self {
        Self {
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

#[derive(Debug, Serialize)]
pub enum ServerResponse {
    Pong,
    /// Sent once to a joining connection only.
    GameInit {
        room_id: String,
        player_id: String,
        side: Side,
        canvas: Dimensions,
        paddle: Dimensions,
    },
    /// Broadcast to the room every tick while the game runs.
    GameUpdate(GameSnapshot),
    /// Relayed to the opponent when a paddle moves, so it renders between ticks.
    PaddleMoved {
        player_id: String,
        paddle_y: f64,
    },
    /// Broadcast once when a player reaches the win threshold.
    GameOver {
        winner_id: String,
        winner_side: Side,
        scores: Vec<PlayerSnapshot>,
    },
    /// Broadcast when a finished game is restarted.
    GameRestart(GameSnapshot),
    Error {
        message: AppError,
    },
}

impl ServerResponse {
    pub fn from_app_error(error: AppError) -> Self {
        ServerResponse::Error { message: error }
    }

    /// The per-joiner init payload; the client derives all canvas layout from
    /// this so the constants never need to live in two places.
    pub fn game_init(room_id: String, player_id: String, side: Side) -> Self {
        ServerResponse::GameInit {
            room_id,
            player_id,
            side,
            canvas: Dimensions::canvas(),
            paddle: Dimensions::paddle(),
        }
    }
}

pub fn deserialize_message(json: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn serialize_response(response: &ServerResponse) -> AppResult<String> {
    serde_json::to_string(response).map_err(|err| AppError::SerializationError {
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ball::{Ball, Vec2};

    #[test]
    fn client_messages_deserialize() {
        let msg = deserialize_message(r#"{"MovePaddle":{"direction":"down"}}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::MovePaddle {
                direction: Direction::Down
            }
        ));

        let msg = deserialize_message(r#""RestartGame""#).unwrap();
        assert!(matches!(msg, ClientMessage::RestartGame));

        let msg = deserialize_message(r#""Ping""#).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn malformed_client_message_is_an_error() {
        assert!(deserialize_message("not json").is_err());
        assert!(deserialize_message(r#"{"MovePaddle":{"direction":"sideways"}}"#).is_err());
    }

    #[test]
    fn game_init_carries_the_canonical_dimensions() {
        let response = ServerResponse::game_init("r1".to_string(), "p1".to_string(), Side::Left);
        let json = serialize_response(&response).unwrap();

        assert!(json.contains(r#""room_id":"r1""#));
        assert!(json.contains(r#""side":"left""#));
        assert!(json.contains(r#""width":800.0"#));
        assert!(json.contains(r#""height":80.0"#));
    }

    #[test]
    fn game_update_serializes_ball_and_players() {
        let snapshot = GameSnapshot {
            ball: Ball {
                position: Vec2 { x: 400.0, y: 200.0 },
                velocity: Vec2 { x: 5.0, y: -2.0 },
            },
            players: vec![PlayerSnapshot {
                id: "p1".to_string(),
                side: Side::Left,
                paddle_y: 160.0,
                score: 3,
            }],
        };

        let json = serialize_response(&ServerResponse::GameUpdate(snapshot)).unwrap();

        assert!(json.contains(r#""GameUpdate""#));
        assert!(json.contains(r#""score":3"#));
        assert!(json.contains(r#""velocity":{"x":5.0,"y":-2.0}"#));
    }

    #[test]
    fn game_over_serializes_winner_and_final_scores() {
        let response = ServerResponse::GameOver {
            winner_id: "p2".to_string(),
            winner_side: Side::Right,
            scores: vec![
                PlayerSnapshot {
                    id: "p1".to_string(),
                    side: Side::Left,
                    paddle_y: 160.0,
                    score: 4,
                },
                PlayerSnapshot {
                    id: "p2".to_string(),
                    side: Side::Right,
                    paddle_y: 200.0,
                    score: 10,
                },
            ],
        };

        let json = serialize_response(&response).unwrap();

        assert!(json.contains(r#""GameOver""#));
        assert!(json.contains(r#""winner_id":"p2""#));
        assert!(json.contains(r#""winner_side":"right""#));
        assert!(json.contains(r#""score":10"#));
        assert!(json.contains(r#""score":4"#));
    }
}
