//! Per-connection task: wires the framer, parser and dispatcher onto a real
//! socket and owns the cleanup path for every way a connection can end.
//!
//! The source drives this loop with exceptions for control flow (timeout,
//! decode error, peer close); here each read attempt instead returns an
//! explicit [`ReadOutcome`], and the loop matches on it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::{broadcast, mpsc};

use crate::constants::READ_CHUNK_SIZE;
use crate::dispatch::{DispatchOutcome, dispatch};
use crate::framer::{FrameError, LineFramer};
use crate::handlers::registration::handle_quit;
use crate::replies::IrcReply;
use crate::server_state::ServerState;
use crate::user_state::Client;

const OUTBOUND_QUEUE_SIZE: usize = 64;

enum ReadOutcome {
    Data(usize),
    Closed,
    Timeout,
    Error(std::io::Error),
}

async fn read_chunk(reader: &mut OwnedReadHalf, buf: &mut [u8], timeout: Duration) -> ReadOutcome {
    match tokio::time::timeout(timeout, reader.read(buf)).await {
        Ok(Ok(0)) => ReadOutcome::Closed,
        Ok(Ok(n)) => ReadOutcome::Data(n),
        Ok(Err(err)) => ReadOutcome::Error(err),
        Err(_) => ReadOutcome::Timeout,
    }
}

fn read_timeout_for(client: &Client, state: &ServerState) -> Duration {
    let limits = &state.config().limits;
    let secs = if client.is_registered() {
        limits.read_timeout_secs
    } else {
        limits.unregistered_timeout_secs
    };
    Duration::from_secs(secs)
}

/// Drives one accepted connection to completion: registers the client,
/// spawns its writer task, reads and dispatches lines until the connection
/// ends, then tears down its presence in shared state exactly once.
pub async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    state: ServerState,
    mut shutdown: broadcast::Receiver<()>,
) {
    if let Err(err) = socket.set_nodelay(true) {
        debug!("failed to set TCP_NODELAY for {addr}: {err}");
    }

    let (mut read_half, mut write_half) = socket.into_split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_SIZE);

    let client = Arc::new(Client::new(addr, outbound_tx));
    state.register_client(Arc::clone(&client));
    info!("client {} connected from {addr}", client.id);

    let writer_id = client.id;
    let writer = tokio::spawn(async move {
        while let Some(line) = outbound_rx.recv().await {
            if let Err(err) = write_half.write_all(line.as_bytes()).await {
                warn!("write to client {writer_id} failed: {err}");
                break;
            }
        }
        let _ = write_half.shutdown().await;
    });

    let mut framer = LineFramer::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];

    'read_loop: loop {
        let timeout = read_timeout_for(&client, &state);
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                let _ = client.try_send(
                    IrcReply::Notice {
                        target: &client.nickname_or_star(),
                        text: "Server shutting down",
                    }
                    .format(),
                );
                break 'read_loop;
            }
            outcome = read_chunk(&mut read_half, &mut buf, timeout) => {
                match outcome {
                    ReadOutcome::Data(n) => match framer.push(&buf[..n]) {
                        Ok(lines) => {
                            for line in lines {
                                debug!("client {} << {line}", client.id);
                                if dispatch(&client, &state, &line) == DispatchOutcome::Disconnect {
                                    break 'read_loop;
                                }
                            }
                        }
                        Err(FrameError::Decode) => {
                            warn!("client {} sent a chunk that failed UTF-8 decoding; skipping it", client.id);
                        }
                        Err(FrameError::Overflow) => {
                            warn!("client {} exceeded the line buffer without a terminator", client.id);
                            break 'read_loop;
                        }
                    },
                    ReadOutcome::Closed => break 'read_loop,
                    ReadOutcome::Timeout => {
                        info!("client {} timed out", client.id);
                        break 'read_loop;
                    }
                    ReadOutcome::Error(err) => {
                        warn!("client {} read error: {err}", client.id);
                        break 'read_loop;
                    }
                }
            }
        }
    }

    let quit_message = format!("{} has quit (connection lost)", client.nickname_or_star());
    handle_quit(&client, &state, &quit_message);
    drop(client);
    let _ = writer.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpStream as TokioTcpStream};

    #[tokio::test]
    async fn registration_round_trip_over_a_real_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ServerState::new(Default::default());
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server_state = state.clone();
        tokio::spawn(async move {
            let (socket, peer) = listener.accept().await.unwrap();
            handle_connection(socket, peer, server_state, shutdown_rx).await;
        });

        let mut client = TokioTcpStream::connect(addr).await.unwrap();
        client.write_all(b"NICK alice\r\nUSER alice 0 * :Alice\r\n").await.unwrap();

        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        let reply = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(reply.contains(" 001 alice "), "got: {reply}");
    }

    #[tokio::test]
    async fn non_utf8_chunk_is_skipped_without_closing_the_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = ServerState::new(Default::default());
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let server_state = state.clone();
        tokio::spawn(async move {
            let (socket, peer) = listener.accept().await.unwrap();
            handle_connection(socket, peer, server_state, shutdown_rx).await;
        });

        let mut client = TokioTcpStream::connect(addr).await.unwrap();
        // An invalid UTF-8 byte sequence, sent on its own with no CRLF, should
        // be dropped rather than tearing down the connection; a well-formed
        // line sent afterwards must still be processed.
        client.write_all(&[0xFF, 0xFE]).await.unwrap();
        client.write_all(b"NICK alice\r\nUSER alice 0 * :Alice\r\n").await.unwrap();

        let mut buf = [0u8; 256];
        let n = client.read(&mut buf).await.unwrap();
        let reply = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(reply.contains(" 001 alice "), "got: {reply}");
    }
}
