use std::collections::HashMap;

use log::info;

use crate::errors::{AppError, AppResult};
use crate::game::player::Side;
use crate::game::room::GameRoom;

#[derive(Debug)]
pub struct JoinOutcome {
    pub room_id: String,
    pub side: Side,
    pub player_count: usize,
}

#[derive(Debug)]
pub struct LeaveOutcome {
    pub room_id: String,
    pub room_empty: bool,
}

/// Process-wide room registry: pairs incoming connections into rooms and owns
/// every `GameRoom`. Player ids are connection ids; one connection sits in at
/// most one room. All access is serialized by the lobby lock.
pub struct RoomManager {
    rooms: HashMap<String, GameRoom>,
    connection_to_room: HashMap<String, String>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            connection_to_room: HashMap::new(),
        }
    }

    /// Places a connection in the first room found with an open slot, or a
    /// fresh room if none qualifies. The scan order is whatever the map
    /// yields; no fairness is promised when several rooms have one occupant.
    /// Rooms waiting out their game-over removal are not joinable.
    pub fn find_or_create_room(&mut self, connection_id: &str) -> AppResult<JoinOutcome> {
        let available = self
            .rooms
            .values()
            .find(|room| room.player_count() == 1 && !room.is_game_over())
            .map(|room| room.id().to_string());

        let room_id = match available {
            Some(room_id) => room_id,
            None => {
                let room = GameRoom::new();
                let room_id = room.id().to_string();
                info!("Created room {}", room_id);
                self.rooms.insert(room_id.clone(), room);
                room_id
            }
        };

        let room = self
            .rooms
            .get_mut(&room_id)
            .ok_or_else(|| AppError::RoomNotFound {
                room_id: room_id.clone(),
            })?;
        let side = room.add_player(connection_id)?;
        let player_count = room.player_count();

        self.connection_to_room
            .insert(connection_id.to_string(), room_id.clone());

        Ok(JoinOutcome {
            room_id,
            side,
            player_count,
        })
    }

    /// Removes a connection from its room, destroying the room if it is now
    /// empty. `None` when the connection was not in any room.
    pub fn leave(&mut self, connection_id: &str) -> Option<LeaveOutcome> {
        let room_id = self.connection_to_room.remove(connection_id)?;
        let room = self.rooms.get_mut(&room_id)?;
        room.remove_player(connection_id);

        let room_empty = room.player_count() == 0;
        if room_empty {
            self.rooms.remove(&room_id);
            info!("Room {} removed (no players left)", room_id);
        }

        Some(LeaveOutcome {
            room_id,
            room_empty,
        })
    }

    /// Deletes a room and any connection mappings pointing at it. A no-op for
    /// unknown ids, so a removal timer firing after the room is already gone
    /// is harmless.
    pub fn remove_room(&mut self, room_id: &str) {
        self.rooms.remove(room_id);
        self.connection_to_room
            .retain(|_, mapped| mapped.as_str() != room_id);
    }

    pub fn get_room(&self, room_id: &str) -> Option<&GameRoom> {
        self.rooms.get(room_id)
    }

    pub fn get_room_mut(&mut self, room_id: &str) -> Option<&mut GameRoom> {
        self.rooms.get_mut(room_id)
    }

    pub fn room_id_for_connection(&self, connection_id: &str) -> Option<String> {
        self.connection_to_room.get(connection_id).cloned()
    }

    /// Connection ids of a room's current members (player id == connection id).
    pub fn member_connections(&self, room_id: &str) -> Option<Vec<String>> {
        self.rooms.get(room_id).map(|room| room.player_ids())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new()
    }
}
