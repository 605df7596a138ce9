use std::{error::Error, sync::Arc};

use log::{info, warn};
use tokio::{
    net::TcpListener,
    sync::{mpsc, Mutex},
};
use uuid::Uuid;

use crate::network::connection_commands::{CommandProcessor, ConnectionCommand};
use crate::network::connection_handler::ConnectionHandler;
use crate::network::lobby::LobbyState;

pub struct WebsocketServer {
    address: String,
}

impl WebsocketServer {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error>> {
        let listener = TcpListener::bind(&self.address).await?;
        info!("🎮 Pong server listening on {}", self.address);

        let lobby_state = Arc::new(Mutex::new(LobbyState::new()));
        let (cmd_sender, mut cmd_receiver) = mpsc::unbounded_channel::<ConnectionCommand>();

        // Single drain point for all outbound traffic.
        let lobby_state_clone = lobby_state.clone();
        tokio::spawn(async move {
            while let Some(command) = cmd_receiver.recv().await {
                let mut state = lobby_state_clone.lock().await;
                if let Err(err) = CommandProcessor::process_command(command, &mut state).await {
                    warn!("Failed to deliver message: {}", err);
                }
            }
        });

        while let Ok((stream, addr)) = listener.accept().await {
            let connection_id = Uuid::new_v4().to_string();
            info!("New connection from {} ({})", addr, connection_id);

            let lobby_state = lobby_state.clone();
            let cmd_sender = cmd_sender.clone();

            tokio::spawn(async move {
                if let Err(err) = ConnectionHandler::handle_connection(
                    stream,
                    connection_id,
                    lobby_state,
                    cmd_sender,
                )
                .await
                {
                    warn!("Error handling connection: {}", err);
                }
            });
        }

        Ok(())
    }
}
