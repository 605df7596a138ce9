use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::game::ball::Ball;
use crate::game::player::{paddle_center_y, Player, Side};
use crate::game::{
    BALL_SIZE, CANVAS_HEIGHT, CANVAS_WIDTH, PADDLE_HEIGHT, PADDLE_SPEED, PADDLE_WIDTH, WIN_SCORE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub id: String,
    pub side: Side,
    pub paddle_y: f64,
    pub score: u32,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            side: player.side,
            paddle_y: player.paddle_y,
            score: player.score,
        }
    }
}

/// Owned copy of a room's visible state, safe to retain across ticks.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub ball: Ball,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug)]
pub struct TickOutcome {
    pub state: GameSnapshot,
    pub winner: Option<PlayerSnapshot>,
}

/// An isolated two-player match: two paddles, one ball, one game-over flag.
/// All mutation is serialized by the lobby lock; the room itself is plain data.
#[derive(Debug)]
pub struct GameRoom {
    id: String,
    players: Vec<Player>,
    ball: Ball,
    game_over: bool,
    round: u64,
}

impl GameRoom {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            players: Vec::new(),
            ball: Ball::new(),
            game_over: false,
            round: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player_ids(&self) -> Vec<String> {
        self.players.iter().map(|p| p.id.clone()).collect()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Bumped on every restart; a pending removal timer compares it to detect
    /// that the game it was scheduled for has been superseded.
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Adds a player on the first free side: left if unoccupied, else right.
    /// A third join is refused without mutating the room.
    pub fn add_player(&mut self, id: &str) -> AppResult<Side> {
        if self.players.len() >= 2 {
            return Err(AppError::RoomFull {
                room_id: self.id.clone(),
            });
        }
        let side = if self.players.iter().any(|p| p.side == Side::Left) {
            Side::Right
        } else {
            Side::Left
        };
        self.players.push(Player::new(id.to_string(), side));
        Ok(side)
    }

    /// Removes a player by id. The remaining player keeps its side and score.
    pub fn remove_player(&mut self, id: &str) -> bool {
        let initial_count = self.players.len();
        self.players.retain(|p| p.id != id);
        self.players.len() != initial_count
    }

    /// Steps the named paddle up or down, clamped to the canvas. Returns the
    /// new paddle position, or `None` for an unknown id (which legitimately
    /// races with a disconnect and is not an error).
    pub fn move_paddle(&mut self, id: &str, direction: Direction) -> Option<f64> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        let step = match direction {
            Direction::Up => -PADDLE_SPEED,
            Direction::Down => PADDLE_SPEED,
        };
        player.paddle_y = (player.paddle_y + step).clamp(0.0, CANVAS_HEIGHT - PADDLE_HEIGHT);
        Some(player.paddle_y)
    }

    /// One fixed-timestep update: ball integration, paddle collisions,
    /// scoring, win detection. Returns `None` once the room is game-over; a
    /// finished room never advances until it is restarted.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.game_over {
            return None;
        }

        self.ball.update();
        self.check_paddle_collisions();
        let winner = self.check_scoring();
        if winner.is_some() {
            self.game_over = true;
        }

        Some(TickOutcome {
            state: self.state(),
            winner,
        })
    }

    /// Axis-aligned overlap test between the ball (treated as a square) and
    /// each paddle, with strict inequalities so a grazing edge contact does
    /// not double-trigger. A hit reverses and accelerates the ball, and the
    /// vertical velocity is set from where the ball struck the paddle so the
    /// return angle depends on the hit location.
    fn check_paddle_collisions(&mut self) {
        for player in &self.players {
            let paddle_left = player.side.paddle_x();
            let paddle_right = paddle_left + PADDLE_WIDTH;
            let paddle_top = player.paddle_y;
            let paddle_bottom = player.paddle_y + PADDLE_HEIGHT;

            let ball_left = self.ball.position.x;
            let ball_right = ball_left + BALL_SIZE;
            let ball_top = self.ball.position.y;
            let ball_bottom = ball_top + BALL_SIZE;

            if ball_right > paddle_left
                && ball_left < paddle_right
                && ball_bottom > paddle_top
                && ball_top < paddle_bottom
            {
                self.ball.velocity.x *= -1.1;
                let hit = (self.ball.position.y - player.paddle_y) / PADDLE_HEIGHT;
                self.ball.velocity.y = (hit - 0.5) * 10.0;
            }
        }
    }

    /// A ball past the left edge scores for the right player and vice versa.
    /// Reaching the win threshold ends the game and leaves the ball where it
    /// is; otherwise the ball is re-served from center.
    fn check_scoring(&mut self) -> Option<PlayerSnapshot> {
        let scoring_side = if self.ball.position.x < 0.0 {
            Side::Right
        } else if self.ball.position.x > CANVAS_WIDTH {
            Side::Left
        } else {
            return None;
        };

        // The scorer can be absent if its player disconnected mid-rally; the
        // ball still resets so the remaining player is not stuck.
        if let Some(scorer) = self.players.iter_mut().find(|p| p.side == scoring_side) {
            scorer.score += 1;
            info!(
                "{:?} scored in room {} (score: {})",
                scorer.side, self.id, scorer.score
            );
            if scorer.score >= WIN_SCORE {
                return Some(PlayerSnapshot::from(&*scorer));
            }
        }
        self.ball.reset();
        None
    }

    pub fn state(&self) -> GameSnapshot {
        GameSnapshot {
            ball: self.ball.clone(),
            players: self.players.iter().map(PlayerSnapshot::from).collect(),
        }
    }

    /// Restart after game-over: scores to zero, paddles re-centered, fresh
    /// serve, flag cleared. Returns the snapshot to broadcast.
    pub fn reset(&mut self) -> GameSnapshot {
        for player in &mut self.players {
            player.score = 0;
            player.paddle_y = paddle_center_y();
        }
        self.ball.reset();
        self.game_over = false;
        self.round += 1;
        self.state()
    }
}

impl Default for GameRoom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl GameRoom {
    pub(crate) fn set_game_over(&mut self, game_over: bool) {
        self.game_over = game_over;
    }

    pub(crate) fn set_score(&mut self, side: Side, score: u32) {
        if let Some(player) = self.players.iter_mut().find(|p| p.side == side) {
            player.score = score;
        }
    }

    pub(crate) fn set_ball(
        &mut self,
        position: crate::game::ball::Vec2,
        velocity: crate::game::ball::Vec2,
    ) {
        self.ball.position = position;
        self.ball.velocity = velocity;
    }
}
