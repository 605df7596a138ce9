pub mod connection_commands;
pub mod connection_handler;
pub mod connection_manager;
pub mod game_loop_registry;
pub mod lobby;
pub mod message_handler;
pub mod messages;
pub mod room_manager;
pub mod server;

pub use connection_commands::ConnectionCommand;
pub use server::WebsocketServer;
