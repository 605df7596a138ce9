use serde::{Deserialize, Serialize};

use crate::game::{CANVAS_HEIGHT, CANVAS_WIDTH, PADDLE_HEIGHT, PADDLE_WIDTH};

/// A player's assigned half of the canvas, fixed at join time. `Left` is the
/// first joiner ("player 1" on the client).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Horizontal position of this side's paddle.
    pub fn paddle_x(&self) -> f64 {
        match self {
            Side::Left => 0.0,
            Side::Right => CANVAS_WIDTH - PADDLE_WIDTH,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: String,
    pub side: Side,
    pub paddle_y: f64,
    pub score: u32,
}

impl Player {
    pub fn new(id: String, side: Side) -> Self {
        Self {
            id,
            side,
            paddle_y: paddle_center_y(),
            score: 0,
        }
    }
}

/// Vertical paddle position that centers the paddle on the canvas.
pub fn paddle_center_y() -> f64 {
    (CANVAS_HEIGHT - PADDLE_HEIGHT) / 2.0
}
