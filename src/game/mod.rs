pub mod ball;
pub mod player;
pub mod room;

// Canonical gameplay constants. The browser client derives its layout from
// the `GameInit` message, so these are the single source of truth.
pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 400.0;
pub const PADDLE_WIDTH: f64 = 15.0;
pub const PADDLE_HEIGHT: f64 = 80.0;
pub const BALL_SIZE: f64 = 15.0;
pub const PADDLE_SPEED: f64 = 8.0;
pub const BALL_SPEED: f64 = 5.0;
pub const WIN_SCORE: u32 = 10;
pub const TICK_RATE: u32 = 60;
pub const ROOM_REMOVAL_DELAY_SECS: u64 = 30;
