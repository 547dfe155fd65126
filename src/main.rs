//! Multi-user chat server - entry point
//!
//! Starts the TCP listener and the ChatServer actor, accepting connections.

use std::env;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use mudchat::server::INPUT_BUFFER_SIZE;
use mudchat::{handle_connection, ChatServer};

/// Default server address
const DEFAULT_ADDR: &str = "127.0.0.1:2323";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=mudchat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mudchat=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args().nth(1).unwrap_or_else(|| DEFAULT_ADDR.to_string());

    // Start TCP listener
    let listener = TcpListener::bind(&addr).await?;
    info!("Chat server listening on {}", addr);

    // Create the event loop's input mailbox and start the actor
    let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER_SIZE);
    let server = ChatServer::new(input_rx);
    tokio::spawn(server.run());

    info!("ChatServer actor started");

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let input_tx = input_tx.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, input_tx).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
