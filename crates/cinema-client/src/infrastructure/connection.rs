//! TCP connection to the seating server.
//!
//! [`CinemaClient`] runs one request at a time: it writes a request frame
//! tagged with a fresh request id, then reads until one complete response
//! frame is buffered.  The response must carry the same id, otherwise the
//! connection is out of step and the call fails with
//! [`ClientError::RequestIdMismatch`].
//!
//! A timeout, an id mismatch, or a transport failure leaves the stream in an
//! unknown position (a late or half-read response may still be pending), so
//! the client refuses every later request with [`ClientError::Broken`].
//! Reconnect to continue.

use std::time::Duration;

use cinema_core::{
    decode_message, encode_message, protocol::SequenceCounter, CinemaMessage, CinemaSnapshot,
    ProtocolError, Seat, Status,
};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tracing::{debug, warn};

/// How long a request may wait for its response by default.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur in the client network layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
    /// The server closed the connection before answering.
    #[error("connection closed by server")]
    Closed,
    /// No response arrived within the request timeout.
    #[error("no response within {0:?}")]
    Timeout(Duration),
    /// The response answers a different request.
    #[error("response id {actual} does not match request id {expected}")]
    RequestIdMismatch { expected: u64, actual: u64 },
    /// The response type does not fit the request.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    /// An earlier request failed at the transport level; reconnect.
    #[error("connection is unusable after an earlier failure; reconnect")]
    Broken,
    /// The server answered with a non-success status.
    #[error("server rejected request ({code}): {message}")]
    Rejected { code: u16, message: String },
}

/// An open connection to a seating server.
pub struct CinemaClient {
    stream: TcpStream,
    recv_buf: Vec<u8>,
    ids: SequenceCounter,
    request_timeout: Duration,
    broken: bool,
}

impl CinemaClient {
    /// Connects to the server at `addr` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConnectFailed`] if the TCP connection cannot be
    /// established.
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;
        debug!("connected to {addr}");

        Ok(Self {
            stream,
            recv_buf: Vec::with_capacity(4096),
            ids: SequenceCounter::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            broken: false,
        })
    }

    /// Replaces the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Replaces the cinema with an empty `rows × columns` grid.
    pub async fn create_cinema(
        &mut self,
        rows: u32,
        columns: u32,
        minimum_distance: u32,
    ) -> Result<CinemaSnapshot, ClientError> {
        let response = self
            .request(CinemaMessage::CreateCinema {
                rows,
                columns,
                minimum_distance,
            })
            .await?;
        expect_cinema(response)
    }

    /// Reads the current cinema.
    pub async fn get_cinema(&mut self) -> Result<CinemaSnapshot, ClientError> {
        let response = self.request(CinemaMessage::GetCinema).await?;
        expect_cinema(response)
    }

    /// Resizes the grid; shrinking releases every reservation.
    pub async fn configure_cinema_size(
        &mut self,
        rows: u32,
        columns: u32,
    ) -> Result<CinemaSnapshot, ClientError> {
        let response = self
            .request(CinemaMessage::ConfigureCinemaSize { rows, columns })
            .await?;
        expect_cinema(response)
    }

    /// Changes the minimum distance; releases every reservation.
    pub async fn change_minimum_distance(
        &mut self,
        minimum_distance: u32,
    ) -> Result<CinemaSnapshot, ClientError> {
        let response = self
            .request(CinemaMessage::ChangeMinimumDistance { minimum_distance })
            .await?;
        expect_cinema(response)
    }

    /// Finds `count` adjacent free seats; an empty result means none fit.
    pub async fn find_available_seats(&mut self, count: u32) -> Result<Vec<Seat>, ClientError> {
        match self.request(CinemaMessage::FindAvailableSeats { count }).await? {
            CinemaMessage::SeatsResponse { status, seats } => {
                check_status(status)?;
                Ok(seats)
            }
            other => Err(ClientError::UnexpectedResponse(format!(
                "{:?} in reply to FindAvailableSeats",
                other.message_type()
            ))),
        }
    }

    /// Reserves every seat in `seats`, or none of them.
    pub async fn reserve_seats(&mut self, seats: &[Seat]) -> Result<CinemaSnapshot, ClientError> {
        let response = self
            .request(CinemaMessage::ReserveSeats {
                seats: seats.to_vec(),
            })
            .await?;
        expect_cinema(response)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Sends `message` and waits for the response carrying the same id.
    async fn request(&mut self, message: CinemaMessage) -> Result<CinemaMessage, ClientError> {
        if self.broken {
            return Err(ClientError::Broken);
        }
        let request_id = self.ids.next();
        let bytes = encode_message(&message, request_id)?;
        debug!(request_id, message_type = ?message.message_type(), "sending request");

        let limit = self.request_timeout;
        let result = match time::timeout(limit, self.exchange(&bytes, request_id)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(limit)),
        };
        if let Err(e) = &result {
            if leaves_stream_unsynchronised(e) {
                warn!(request_id, "connection unusable: {e}");
                self.broken = true;
            }
        }
        result
    }

    async fn exchange(&mut self, bytes: &[u8], request_id: u64) -> Result<CinemaMessage, ClientError> {
        self.stream.write_all(bytes).await?;

        let mut read_tmp = [0u8; 4096];
        loop {
            match decode_message(&self.recv_buf) {
                Ok((frame, consumed)) => {
                    self.recv_buf.drain(..consumed);
                    if frame.request_id != request_id {
                        return Err(ClientError::RequestIdMismatch {
                            expected: request_id,
                            actual: frame.request_id,
                        });
                    }
                    return Ok(frame.message);
                }
                Err(e) if e.is_incomplete() => {}
                Err(e) => return Err(e.into()),
            }

            let n = self.stream.read(&mut read_tmp).await?;
            if n == 0 {
                return Err(ClientError::Closed);
            }
            self.recv_buf.extend_from_slice(&read_tmp[..n]);
        }
    }
}

/// Whether `err` may leave unread response bytes on the connection.
fn leaves_stream_unsynchronised(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Io(_)
            | ClientError::Protocol(_)
            | ClientError::Closed
            | ClientError::Timeout(_)
            | ClientError::RequestIdMismatch { .. }
    )
}

fn check_status(status: Status) -> Result<(), ClientError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::Rejected {
            code: status.code,
            message: status.message,
        })
    }
}

fn expect_cinema(response: CinemaMessage) -> Result<CinemaSnapshot, ClientError> {
    match response {
        CinemaMessage::CinemaResponse { status, cinema } => {
            check_status(status)?;
            cinema.ok_or_else(|| {
                ClientError::UnexpectedResponse("successful response without a cinema".to_string())
            })
        }
        other => Err(ClientError::UnexpectedResponse(format!(
            "{:?} where a CinemaResponse was expected",
            other.message_type()
        ))),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
