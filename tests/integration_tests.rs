// tests/integration_tests.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use pong_server::game::player::Side;
use pong_server::network::message_handler::MessageHandler;
use pong_server::network::ConnectionCommand;
use pong_server::LobbyState;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_player_match_workflow() {
    println!("=== Testing two-player match workflow ===");

    let lobby = Arc::new(Mutex::new(LobbyState::new()));
    let (cmd_sender, mut cmd_receiver) = mpsc::unbounded_channel();

    // First player joins: a fresh room in Waiting state, no loop yet.
    let room_id = {
        let mut state = lobby.lock().await;
        let joined = state.room_manager.find_or_create_room("alice").unwrap();
        assert_eq!(joined.side, Side::Left);
        assert_eq!(joined.player_count, 1);
        println!("✓ Alice joined room {} on the left", joined.room_id);

        state.start_room_loop(&joined.room_id, lobby.clone(), cmd_sender.clone());
        assert!(!state.game_loop_registry.is_running(&joined.room_id));
        joined.room_id
    };

    // Second player joins the same room and the loop starts.
    {
        let mut state = lobby.lock().await;
        let joined = state.room_manager.find_or_create_room("bob").unwrap();
        assert_eq!(joined.room_id, room_id, "pairing should reuse the room");
        assert_eq!(joined.side, Side::Right);
        println!("✓ Bob joined the same room on the right");

        state.start_room_loop(&room_id, lobby.clone(), cmd_sender.clone());
        assert!(state.game_loop_registry.is_running(&room_id));
    }

    // The loop broadcasts updates to the room.
    let command = tokio::time::timeout(Duration::from_secs(1), cmd_receiver.recv())
        .await
        .expect("expected a broadcast within a second")
        .expect("command channel closed");
    match command {
        ConnectionCommand::SendToRoom {
            room_id: target,
            message,
        } => {
            assert_eq!(target, room_id);
            assert!(message.contains("GameUpdate"));
            println!("✓ Received a GameUpdate broadcast");
        }
        other => panic!("unexpected command: {:?}", other),
    }

    // Paddle input flows through the message handler into the simulation.
    MessageHandler::handle_text_message(
        r#"{"MovePaddle":{"direction":"down"}}"#.to_string(),
        "alice",
        &lobby,
        &cmd_sender,
    )
    .await;
    {
        let state = lobby.lock().await;
        let snapshot = state.room_manager.get_room(&room_id).unwrap().state();
        let alice = snapshot.players.iter().find(|p| p.id == "alice").unwrap();
        assert_eq!(alice.paddle_y, 168.0);
        println!("✓ Alice's paddle moved to {}", alice.paddle_y);
    }

    // Restarting a running game is refused (silently).
    MessageHandler::handle_text_message(r#""RestartGame""#.to_string(), "alice", &lobby, &cmd_sender)
        .await;
    {
        let state = lobby.lock().await;
        let snapshot = state.room_manager.get_room(&room_id).unwrap().state();
        let alice = snapshot.players.iter().find(|p| p.id == "alice").unwrap();
        assert_eq!(alice.paddle_y, 168.0, "restart must not reset a live game");
        println!("✓ Restart while running was a no-op");
    }

    // Bob disconnects: the loop stops but the room waits for a new opponent.
    {
        let mut state = lobby.lock().await;
        let outcome = state.room_manager.leave("bob").unwrap();
        assert!(!outcome.room_empty);
        state.game_loop_registry.stop_loop(&room_id);
        assert!(!state.game_loop_registry.is_running(&room_id));
        println!("✓ Bob left; loop stopped, room kept");
    }

    // A newcomer fills Bob's old slot on the right.
    {
        let mut state = lobby.lock().await;
        let joined = state.room_manager.find_or_create_room("carol").unwrap();
        assert_eq!(joined.room_id, room_id);
        assert_eq!(joined.side, Side::Right);
        println!("✓ Carol rejoined the half-empty room on the right");
    }

    // Everyone leaves: the room is destroyed.
    {
        let mut state = lobby.lock().await;
        state.room_manager.leave("alice").unwrap();
        let outcome = state.room_manager.leave("carol").unwrap();
        assert!(outcome.room_empty);
        assert_eq!(state.room_manager.room_count(), 0);
        println!("✓ Room destroyed once empty");
    }
}

#[tokio::test]
async fn test_pairing_overflow_opens_a_second_room() {
    let lobby = Arc::new(Mutex::new(LobbyState::new()));
    let mut state = lobby.lock().await;

    let first = state.room_manager.find_or_create_room("p1").unwrap();
    let second = state.room_manager.find_or_create_room("p2").unwrap();
    let third = state.room_manager.find_or_create_room("p3").unwrap();

    assert_eq!(first.room_id, second.room_id);
    assert_ne!(third.room_id, first.room_id);
    assert_eq!(state.room_manager.room_count(), 2);
}
