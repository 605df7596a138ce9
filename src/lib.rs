pub mod errors;
pub mod game;
pub mod network;

// Re-export commonly used items for convenience
pub use errors::{AppError, AppResult};
pub use game::room::GameRoom;
pub use network::lobby::LobbyState;
pub use network::room_manager::RoomManager;
