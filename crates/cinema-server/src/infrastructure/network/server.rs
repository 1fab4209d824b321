//! TCP server: accept loop and per-connection session handling.
//!
//! This module is responsible for:
//!
//! 1. Binding a TCP listener on the configured address.
//! 2. Accepting incoming connections until the `running` flag is cleared.
//! 3. Running each connection in its own Tokio task, identified by a UUID
//!    session id in every log line.
//! 4. Decoding request frames from the byte stream, dispatching each one, and
//!    writing back a response that echoes the request id.
//!
//! # Binary streaming protocol
//!
//! TCP is a *stream* protocol: a single `read()` call may return less than one
//! complete frame, or more than one.  Each session accumulates bytes in a
//! buffer and calls [`decode_message`] in a loop until it reports that more
//! bytes are needed.  A frame that can never decode (bad version, unknown
//! type, oversized or malformed payload) ends that session only; other
//! connections are unaffected.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use cinema_core::{decode_message, encode_message, CinemaMessage, Status, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::application::dispatch::Dispatcher;

/// How long `accept()` may block before the loop re-checks `running`.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

// ── Public API ────────────────────────────────────────────────────────────────

/// Binds the server's TCP listener.
///
/// # Errors
///
/// Returns an error if the port is already in use or the process lacks
/// permission to bind it.
pub async fn bind(addr: SocketAddr) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind listener on {addr}"))?;
    info!("cinema seating server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Runs the accept loop until `running` is set to `false`.
///
/// Each accepted connection is handed off to a dedicated Tokio task so that
/// one slow client never blocks others.  Sessions already in progress when
/// the loop stops are left to finish on their own.
///
/// # Errors
///
/// Currently never returns an error; transient accept failures are logged and
/// the loop continues.
pub async fn serve(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    running: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the loop notices the shutdown flag even when idle.
        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                let dispatcher = Arc::clone(&dispatcher);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, dispatcher).await;
                });
            }
            Ok(Err(e)) => {
                // e.g. too many open file descriptors
                error!("accept error: {e}");
            }
            Err(_) => {
                // Timeout – no new connection in the last poll interval.
            }
        }
    }

    Ok(())
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Wraps [`run_session`] and logs the outcome.
async fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, dispatcher: Arc<Dispatcher>) {
    let session_id = Uuid::new_v4();
    info!(%session_id, %peer_addr, "connection accepted");

    match run_session(stream, session_id, dispatcher).await {
        Ok(()) => info!(%session_id, "connection closed"),
        Err(e) => warn!(%session_id, "connection closed with error: {e:#}"),
    }
}

/// Serves requests on one connection until the peer disconnects or sends an
/// undecodable frame.
async fn run_session(
    mut stream: TcpStream,
    session_id: Uuid,
    dispatcher: Arc<Dispatcher>,
) -> anyhow::Result<()> {
    // Accumulates bytes across reads until at least one full frame is present.
    let mut recv_buf: Vec<u8> = Vec::with_capacity(4096);
    let mut read_tmp = vec![0u8; 4096];

    loop {
        let n = stream
            .read(&mut read_tmp)
            .await
            .context("read from client failed")?;
        if n == 0 {
            if !recv_buf.is_empty() {
                debug!(%session_id, pending = recv_buf.len(), "peer closed mid-frame");
            }
            return Ok(());
        }
        recv_buf.extend_from_slice(&read_tmp[..n]);

        // One read may deliver several frames.
        loop {
            let (frame, consumed) = match decode_message(&recv_buf) {
                Ok(decoded) => decoded,
                Err(e) if e.is_incomplete() => break,
                Err(e) => return Err(e).context("undecodable frame"),
            };
            recv_buf.drain(..consumed);

            debug!(
                %session_id,
                request_id = frame.request_id,
                message_type = ?frame.message.message_type(),
                "request received"
            );

            let response = dispatcher.handle(frame.message);
            let bytes = encode_response(&response, frame.request_id)?;
            stream
                .write_all(&bytes)
                .await
                .context("write to client failed")?;
        }
    }
}

/// Encodes `response`, substituting a bodiless 500 response if it does not
/// fit in one frame.
fn encode_response(response: &CinemaMessage, request_id: u64) -> anyhow::Result<Vec<u8>> {
    match encode_message(response, request_id) {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            warn!(request_id, "response could not be encoded: {e}");
            let status = Status::new(StatusCode::InternalError, format!("response could not be encoded: {e}"));
            let fallback = match response {
                CinemaMessage::SeatsResponse { .. } => CinemaMessage::SeatsResponse {
                    status,
                    seats: Vec::new(),
                },
                _ => CinemaMessage::CinemaResponse { status, cinema: None },
            };
            encode_message(&fallback, request_id).context("failed to encode fallback response")
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repository::{CinemaRepository, SeatRepository};
    use cinema_core::protocol::{MAX_PAYLOAD_LEN, MAX_SNAPSHOT_SEATS};
    use cinema_core::{CinemaSnapshot, Seat};

    #[test]
    fn test_encode_response_passes_small_response_through() {
        let response = CinemaMessage::SeatsResponse {
            status: Status::success(),
            seats: vec![Seat::new(0, 0)],
        };

        let bytes = encode_response(&response, 5).unwrap();

        let (frame, _) = decode_message(&bytes).unwrap();
        assert_eq!(frame.request_id, 5);
        assert_eq!(frame.message, response);
    }

    #[test]
    fn test_encode_response_replaces_oversized_snapshot_with_500() {
        // Arrange – more reserved seats than fit in one payload
        let too_many = MAX_PAYLOAD_LEN / 8 + 1;
        let response = CinemaMessage::CinemaResponse {
            status: Status::success(),
            cinema: Some(CinemaSnapshot {
                rows: 1,
                columns: too_many as u32,
                minimum_distance: 0,
                reserved_seats: (0..too_many as u32).map(|c| Seat::new(0, c)).collect(),
            }),
        };

        // Act
        let bytes = encode_response(&response, 9).unwrap();

        // Assert
        let (frame, _) = decode_message(&bytes).unwrap();
        assert_eq!(frame.request_id, 9);
        let CinemaMessage::CinemaResponse { status, cinema } = frame.message else {
            panic!("expected CinemaResponse");
        };
        assert_eq!(status.code, 500);
        assert!(cinema.is_none());
    }

    #[test]
    fn test_reservation_filling_largest_grid_is_answered_with_200() {
        // Arrange – the largest grid the default limit admits, all but the
        // last seat already taken
        let columns = MAX_SNAPSHOT_SEATS as u32;
        let repo = Arc::new(CinemaRepository::with_cinema(1, columns, 0));
        let taken: Vec<Seat> = (0..columns - 1).map(|c| Seat::new(0, c)).collect();
        repo.reserve_seats(&taken).unwrap();
        let dispatcher = Dispatcher::new(repo.clone(), 1_000_000);

        // Act
        let response = dispatcher.handle(CinemaMessage::ReserveSeats {
            seats: vec![Seat::new(0, columns - 1)],
        });
        let bytes = encode_response(&response, 11).unwrap();

        // Assert – the committed state is reported, not a failure
        let (frame, _) = decode_message(&bytes).unwrap();
        let CinemaMessage::CinemaResponse { status, cinema } = frame.message else {
            panic!("expected CinemaResponse");
        };
        assert_eq!(status.code, 200);
        assert_eq!(cinema.map(|c| c.reserved_seats.len()), Some(columns as usize));
        assert_eq!(repo.get_cinema().unwrap().reserved_seats.len(), columns as usize);
    }

    #[test]
    fn test_grid_too_large_to_report_is_rejected_up_front() {
        // Arrange
        let repo = Arc::new(CinemaRepository::with_cinema(2, 2, 0));
        let dispatcher = Dispatcher::new(repo.clone(), 1_000_000);

        // Act – 1000 × 1000 would let reservations outgrow one frame
        let response = dispatcher.handle(CinemaMessage::ConfigureCinemaSize {
            rows: 1000,
            columns: 1000,
        });

        // Assert
        assert_eq!(response.status().map(|s| s.code), Some(400));
        assert_eq!(repo.get_cinema().unwrap().rows, 2);
    }
}
