//! TCP connection handler
//!
//! Owns everything the core does not: sockets, line framing, and the close
//! handshake. Each connection gets a fresh session identity, announces
//! itself to the event loop, then runs a read task (lines in → input
//! events) and a write task (output events → lines out) until either side
//! ends.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::event::InputEvent;
use crate::types::SessionId;

/// Greeting written before the session is announced to the core
const BANNER: &str = "Welcome to the MUD server!";

/// Telnet out-of-band end-of-session signal (IAC IP, IAC DO TIMING-MARK),
/// written after the final message so line-mode clients disconnect cleanly
const TELNET_END_OF_SESSION: [u8; 5] = [255, 244, 255, 253, 6];

/// Handle a new TCP connection
///
/// Announces the session to the event loop, then shuttles lines until the
/// peer disconnects or the core terminates the session.
pub async fn handle_connection(
    stream: TcpStream,
    input_tx: mpsc::Sender<InputEvent>,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let session_id = SessionId::new();
    info!("Session {} connected from {}", session_id, peer_addr);

    let (read_half, mut write_half) = stream.into_split();

    write_half.write_all(format!("{BANNER}\n").as_bytes()).await?;

    // Announce the session; the confirmation carries our outbound mailbox
    let (ack, confirmed) = oneshot::channel();
    if input_tx
        .send(InputEvent::Connect { session_id, ack })
        .await
        .is_err()
    {
        error!("Failed to register session {} - server closed", session_id);
        return Err(AppError::ChannelSend);
    }
    let mut outbox = match confirmed.await {
        Ok(outbox) => outbox,
        Err(_) => {
            error!("Session {} was not confirmed - server closed", session_id);
            return Err(AppError::ChannelSend);
        }
    };

    // Read task: lines from the socket into the event loop's input mailbox.
    // A full mailbox makes `send` wait, which is the intended backpressure.
    let input_tx_read = input_tx.clone();
    let read_task = tokio::spawn(async move {
        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let text = line.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let event = InputEvent::Line {
                        session_id,
                        text: text.to_string(),
                    };
                    if input_tx_read.send(event).await.is_err() {
                        debug!("Server closed, ending read task for {}", session_id);
                        break;
                    }
                }
                Ok(None) => {
                    debug!("Session {} reached end of stream", session_id);
                    break;
                }
                Err(e) => {
                    warn!("Read error for {}: {}", session_id, e);
                    break;
                }
            }
        }
    });

    // Write task: drain the outbound mailbox onto the socket. An event with
    // the quit flag is written, then the connection is closed in order.
    let write_task = tokio::spawn(async move {
        while let Some(event) = outbox.recv().await {
            if write_half
                .write_all(format!("{}\n", event.text).as_bytes())
                .await
                .is_err()
            {
                debug!("Write failed, ending write task for {}", session_id);
                break;
            }
            if event.quit {
                let _ = write_half.write_all(&TELNET_END_OF_SESSION).await;
                let _ = write_half.flush().await;
                let _ = write_half.shutdown().await;
                break;
            }
        }
        debug!("Write task ended for {}", session_id);
    });

    // Wait for either task to complete
    tokio::select! {
        _ = read_task => {
            debug!("Read task completed for {}", session_id);
        }
        _ = write_task => {
            debug!("Write task completed for {}", session_id);
        }
    }

    // Tell the core the connection is gone. If the session already quit,
    // the core ignores this.
    let _ = input_tx.send(InputEvent::Hangup { session_id }).await;

    info!("Session {} disconnected", session_id);

    Ok(())
}
