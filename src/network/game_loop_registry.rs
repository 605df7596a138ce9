use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};

use crate::errors::{AppError, AppResult};
use crate::game::{ROOM_REMOVAL_DELAY_SECS, TICK_RATE};
use crate::network::connection_commands::ConnectionCommand;
use crate::network::lobby::LobbyState;
use crate::network::messages::{serialize_response, ServerResponse};

enum TickControl {
    Continue,
    Stop,
    GameOver { round: u64 },
}

/// One fixed-rate tick task per active room. The handle map is the source of
/// truth for "is this room's loop running": a loop that wakes up and no
/// longer finds its own entry exits without ticking, so `stop_loop` under the
/// lobby lock guarantees no tick runs against a removed room.
pub struct GameLoopRegistry {
    loops: HashMap<String, mpsc::Sender<()>>,
}

impl GameLoopRegistry {
    pub fn new() -> Self {
        Self {
            loops: HashMap::new(),
        }
    }

    pub fn is_running(&self, room_id: &str) -> bool {
        self.loops.contains_key(room_id)
    }

    /// Spawns the 60 Hz tick task for a room. Idempotent: a second start for
    /// the same room is a no-op. Eligibility (two players, not game-over) is
    /// checked by `LobbyState::start_room_loop`.
    pub fn start_loop(
        &mut self,
        room_id: &str,
        lobby_state: Arc<Mutex<LobbyState>>,
        cmd_sender: mpsc::UnboundedSender<ConnectionCommand>,
    ) {
        if self.loops.contains_key(room_id) {
            return;
        }

        let (stop_sender, mut stop_receiver) = mpsc::channel::<()>(1);
        self.loops.insert(room_id.to_string(), stop_sender);

        let room_id = room_id.to_string();
        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs_f64(1.0 / TICK_RATE as f64));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!("🎮 Game loop started for room {}", room_id);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut state = lobby_state.lock().await;
                        if !state.game_loop_registry.is_running(&room_id) {
                            break;
                        }
                        match run_tick(&mut state, &room_id, &cmd_sender) {
                            Ok(TickControl::Continue) => {}
                            Ok(TickControl::Stop) => {
                                state.game_loop_registry.stop_loop(&room_id);
                                break;
                            }
                            Ok(TickControl::GameOver { round }) => {
                                state.game_loop_registry.stop_loop(&room_id);
                                schedule_room_removal(
                                    lobby_state.clone(),
                                    room_id.clone(),
                                    round,
                                );
                                break;
                            }
                            Err(err) => {
                                // A broken room is abandoned; other rooms keep running.
                                error!("Tick failed in room {}: {}", room_id, err);
                                state.game_loop_registry.stop_loop(&room_id);
                                break;
                            }
                        }
                    }
                    _ = stop_receiver.recv() => {
                        // Stop signal, or the registry dropped our handle.
                        break;
                    }
                }
            }
            info!("Game loop stopped for room {}", room_id);
        });
    }

    /// Drops the loop handle; the task notices on its next wake-up (or via
    /// the closed channel) and exits. Safe to call when not running.
    pub fn stop_loop(&mut self, room_id: &str) {
        self.loops.remove(room_id);
    }
}

impl Default for GameLoopRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A single scheduler tick: advance the room, broadcast the result. Runs
/// under the lobby lock.
fn run_tick(
    state: &mut LobbyState,
    room_id: &str,
    cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
) -> AppResult<TickControl> {
    let Some(room) = state.room_manager.get_room_mut(room_id) else {
        return Ok(TickControl::Stop);
    };
    let Some(outcome) = room.tick() else {
        return Ok(TickControl::Stop);
    };
    let round = room.round();

    if let Some(winner) = outcome.winner {
        info!("Game over in room {}: {:?} wins", room_id, winner.side);
        let message = serialize_response(&ServerResponse::GameOver {
            winner_id: winner.id,
            winner_side: winner.side,
            scores: outcome.state.players,
        })?;
        send_to_room(cmd_sender, room_id, message)?;
        return Ok(TickControl::GameOver { round });
    }

    let message = serialize_response(&ServerResponse::GameUpdate(outcome.state))?;
    send_to_room(cmd_sender, room_id, message)?;
    Ok(TickControl::Continue)
}

fn send_to_room(
    cmd_sender: &mpsc::UnboundedSender<ConnectionCommand>,
    room_id: &str,
    message: String,
) -> AppResult<()> {
    cmd_sender
        .send(ConnectionCommand::SendToRoom {
            room_id: room_id.to_string(),
            message,
        })
        .map_err(|err| AppError::GameLoopSendFailed {
            reason: err.to_string(),
        })
}

/// Finished rooms linger so the players can ask for a restart; after the
/// delay the room is reclaimed. The `round` captured at game-over makes the
/// timer revocable: a restart bumps the round and the timer then fires as a
/// no-op.
pub fn schedule_room_removal(lobby_state: Arc<Mutex<LobbyState>>, room_id: String, round: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(ROOM_REMOVAL_DELAY_SECS)).await;

        let mut state = lobby_state.lock().await;
        let expired = state
            .room_manager
            .get_room(&room_id)
            .map(|room| room.is_game_over() && room.round() == round)
            .unwrap_or(false);
        if expired {
            info!("Removing room {} after game-over timeout", room_id);
            state.game_loop_registry.stop_loop(&room_id);
            state.room_manager.remove_room(&room_id);
        }
    });
}
