use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{BALL_SPEED, CANVAS_HEIGHT, CANVAS_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Ball {
    /// Spawns a ball at canvas center with a random serve velocity.
    pub fn new() -> Self {
        let mut ball = Ball {
            position: Vec2 { x: 0.0, y: 0.0 },
            velocity: Vec2 { x: 0.0, y: 0.0 },
        };
        ball.reset();
        ball
    }

    /// One tick of integration: position advances by velocity, then the
    /// vertical velocity reflects off the top/bottom walls. The left/right
    /// edges are scoring boundaries and never reflect.
    pub fn update(&mut self) {
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;

        if self.position.y <= 0.0 || self.position.y >= CANVAS_HEIGHT {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Re-centers the ball and serves it toward a random side with a random
    /// vertical component in [-BALL_SPEED, BALL_SPEED].
    pub fn reset(&mut self) {
        let mut rng = rand::rng();
        self.position = Vec2 {
            x: CANVAS_WIDTH / 2.0,
            y: CANVAS_HEIGHT / 2.0,
        };
        self.velocity = Vec2 {
            x: BALL_SPEED * if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            y: BALL_SPEED * rng.random_range(-1.0..=1.0),
        };
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}
