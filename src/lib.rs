//! Multi-User Chat Server Library
//!
//! A telnet-style multi-user chat server built with tokio, using the Actor
//! pattern for state management.
//!
//! # Features
//! - Line-oriented TCP connection handling
//! - Display-name registration with uniqueness enforcement
//! - Room-wide chat broadcast
//! - Slash-commands: `/who`, `/whisper`, `/help`, `/quit`
//! - Extensible command dispatch table
//! - Best-effort, drop-on-full delivery to slow consumers
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning all session, room, and
//!   username state
//! - Each connection has a handler task that feeds the actor input events
//!   and drains a per-session outbound mailbox
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use mudchat::server::INPUT_BUFFER_SIZE;
//! use mudchat::{ChatServer, handle_connection};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:2323").await.unwrap();
//!     let (input_tx, input_rx) = mpsc::channel(INPUT_BUFFER_SIZE);
//!
//!     tokio::spawn(ChatServer::new(input_rx).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let input_tx = input_tx.clone();
//!         tokio::spawn(handle_connection(stream, input_tx));
//!     }
//! }
//! ```

pub mod commands;
pub mod delivery;
pub mod error;
pub mod event;
pub mod handler;
pub mod room;
pub mod server;
pub mod session;
pub mod types;
pub mod world;

// Re-export main types for convenience
pub use commands::{CommandContext, CommandHandler, CommandTable};
pub use delivery::Delivery;
pub use error::{AppError, RegistryError};
pub use event::{InputEvent, OutputEvent, Recipient};
pub use handler::handle_connection;
pub use room::{Room, RoomRegistry, LOBBY};
pub use server::ChatServer;
pub use session::{Session, SessionRegistry};
pub use types::SessionId;
pub use world::World;
