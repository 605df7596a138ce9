use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::network::connection_commands::ConnectionCommand;
use crate::network::connection_manager::ConnectionManager;
use crate::network::game_loop_registry::GameLoopRegistry;
use crate::network::room_manager::RoomManager;

/// Everything mutable the server owns, behind one lock: the room registry,
/// the websocket sinks, and the per-room loop handles. Ticks and inbound
/// messages both take this lock, so a room is only ever mutated from one
/// place at a time.
pub struct LobbyState {
    pub room_manager: RoomManager,
    pub connection_manager: ConnectionManager,
    pub game_loop_registry: GameLoopRegistry,
}

impl LobbyState {
    pub fn new() -> Self {
        Self {
            room_manager: RoomManager::new(),
            connection_manager: ConnectionManager::new(),
            game_loop_registry: GameLoopRegistry::new(),
        }
    }

    /// Starts the tick loop for a room if it is eligible: two players, not
    /// game-over, and no loop already running. Anything else is a no-op,
    /// which makes repeated start requests harmless.
    pub fn start_room_loop(
        &mut self,
        room_id: &str,
        lobby_state: Arc<Mutex<LobbyState>>,
        cmd_sender: mpsc::UnboundedSender<ConnectionCommand>,
    ) {
        let eligible = self
            .room_manager
            .get_room(room_id)
            .map(|room| room.player_count() == 2 && !room.is_game_over())
            .unwrap_or(false);
        if !eligible {
            return;
        }
        self.game_loop_registry
            .start_loop(room_id, lobby_state, cmd_sender);
    }
}

impl Default for LobbyState {
    fn default() -> Self {
        Self::new()
    }
}
