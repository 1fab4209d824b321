//! All cinema seating protocol message types.
//!
//! Requests travel client → server and use type codes `0x01–0x7F`; responses
//! travel server → client and use `0x80–0xFF`.  Every request is answered by
//! exactly one response carrying the same request id (see [`super::codec`]).

use serde::{Deserialize, Serialize};

use crate::domain::plan::CinemaSnapshot;
use crate::domain::seat::Seat;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x01;

/// Total size of the common message header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Largest payload a decoder will accept (1 MiB).
pub const MAX_PAYLOAD_LEN: usize = 1024 * 1024;

/// Message carried by every successful status.
pub const SUCCESS_MESSAGE: &str = "Success";

/// Encoded size of one seat (row and column, `u32` each).
pub const SEAT_WIRE_SIZE: usize = 8;

/// Fixed part of a successful `CinemaResponse` payload: status code, message
/// length and text, presence flag, rows, columns, distance, seat count.
const SNAPSHOT_RESPONSE_OVERHEAD: usize = 2 + 2 + SUCCESS_MESSAGE.len() + 1 + 3 * 4 + 4;

/// Most reserved seats a successful `CinemaResponse` can carry.
///
/// A grid with more cells than this could reach a state whose snapshot no
/// longer fits in one frame, so servers must not accept such grids.
pub const MAX_SNAPSHOT_SEATS: u64 =
    ((MAX_PAYLOAD_LEN - SNAPSHOT_RESPONSE_OVERHEAD) / SEAT_WIRE_SIZE) as u64;

// ── Message type codes ────────────────────────────────────────────────────────

/// All message type codes understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum MessageType {
    // Requests (0x01–0x7F)
    CreateCinema = 0x01,
    GetCinema = 0x02,
    ConfigureCinemaSize = 0x03,
    ChangeMinimumDistance = 0x04,
    FindAvailableSeats = 0x05,
    ReserveSeats = 0x06,
    // Responses (0x80–0xFF)
    CinemaResponse = 0x81,
    SeatsResponse = 0x82,
}

impl TryFrom<u8> for MessageType {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0x01 => Ok(MessageType::CreateCinema),
            0x02 => Ok(MessageType::GetCinema),
            0x03 => Ok(MessageType::ConfigureCinemaSize),
            0x04 => Ok(MessageType::ChangeMinimumDistance),
            0x05 => Ok(MessageType::FindAvailableSeats),
            0x06 => Ok(MessageType::ReserveSeats),
            0x81 => Ok(MessageType::CinemaResponse),
            0x82 => Ok(MessageType::SeatsResponse),
            _ => Err(()),
        }
    }
}

// ── Status ────────────────────────────────────────────────────────────────────

/// Well-known status codes carried in every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u16)]
pub enum StatusCode {
    /// The request was applied.
    Success = 200,
    /// The request frame was malformed or was not a request.
    BadRequest = 400,
    /// No cinema exists yet.
    NotFound = 404,
    /// The request was well-formed but violates the seating rules.
    Conflict = 409,
    /// The server failed one of its own invariants.
    InternalError = 500,
}

impl TryFrom<u16> for StatusCode {
    type Error = ();

    fn try_from(value: u16) -> Result<Self, ()> {
        match value {
            200 => Ok(StatusCode::Success),
            400 => Ok(StatusCode::BadRequest),
            404 => Ok(StatusCode::NotFound),
            409 => Ok(StatusCode::Conflict),
            500 => Ok(StatusCode::InternalError),
            _ => Err(()),
        }
    }
}

/// Outcome of a request: a numeric code plus a human-readable message.
///
/// The code is kept as a raw `u16` so that a client can still display a code
/// it does not recognise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// HTTP-style status code, see [`StatusCode`].
    pub code: u16,
    /// Description of the outcome; `"Success"` on success.
    pub message: String,
}

impl Status {
    /// The status attached to every successful response.
    pub fn success() -> Self {
        Self::new(StatusCode::Success, SUCCESS_MESSAGE)
    }

    /// Creates a status with the given code and message.
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: code as u16,
            message: message.into(),
        }
    }

    /// Returns `true` when `code` is 200.
    pub fn is_success(&self) -> bool {
        self.code == StatusCode::Success as u16
    }

    /// The recognised [`StatusCode`], if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        StatusCode::try_from(self.code).ok()
    }
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// Top-level enum wrapping all cinema seating protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CinemaMessage {
    /// Replace the current cinema with an empty one.
    CreateCinema {
        rows: u32,
        columns: u32,
        minimum_distance: u32,
    },
    /// Read the current cinema.
    GetCinema,
    /// Resize the grid, releasing reservations if it shrinks.
    ConfigureCinemaSize { rows: u32, columns: u32 },
    /// Change the minimum distance, releasing all reservations.
    ChangeMinimumDistance { minimum_distance: u32 },
    /// Search for a run of `count` adjacent free seats.
    FindAvailableSeats { count: u32 },
    /// Reserve every seat in `seats`, or none of them.
    ReserveSeats { seats: Vec<Seat> },
    /// Answer to every request except `FindAvailableSeats`.
    ///
    /// `cinema` is `None` when the request failed.
    CinemaResponse {
        status: Status,
        cinema: Option<CinemaSnapshot>,
    },
    /// Answer to `FindAvailableSeats`; `seats` is empty when nothing fits.
    SeatsResponse { status: Status, seats: Vec<Seat> },
}

impl CinemaMessage {
    /// Returns the [`MessageType`] code for this message.
    pub fn message_type(&self) -> MessageType {
        match self {
            CinemaMessage::CreateCinema { .. } => MessageType::CreateCinema,
            CinemaMessage::GetCinema => MessageType::GetCinema,
            CinemaMessage::ConfigureCinemaSize { .. } => MessageType::ConfigureCinemaSize,
            CinemaMessage::ChangeMinimumDistance { .. } => MessageType::ChangeMinimumDistance,
            CinemaMessage::FindAvailableSeats { .. } => MessageType::FindAvailableSeats,
            CinemaMessage::ReserveSeats { .. } => MessageType::ReserveSeats,
            CinemaMessage::CinemaResponse { .. } => MessageType::CinemaResponse,
            CinemaMessage::SeatsResponse { .. } => MessageType::SeatsResponse,
        }
    }

    /// Returns `true` for client → server messages.
    pub fn is_request(&self) -> bool {
        (self.message_type() as u8) < 0x80
    }

    /// The response status, or `None` for requests.
    pub fn status(&self) -> Option<&Status> {
        match self {
            CinemaMessage::CinemaResponse { status, .. }
            | CinemaMessage::SeatsResponse { status, .. } => Some(status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_try_from_accepts_every_known_code() {
        for code in [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x81, 0x82] {
            let parsed = MessageType::try_from(code).expect("known code");
            assert_eq!(parsed as u8, code);
        }
    }

    #[test]
    fn test_message_type_try_from_rejects_unknown_code() {
        assert!(MessageType::try_from(0x00).is_err());
        assert!(MessageType::try_from(0x80).is_err());
        assert!(MessageType::try_from(0xFF).is_err());
    }

    #[test]
    fn test_status_success_has_code_200() {
        let status = Status::success();
        assert_eq!(status.code, 200);
        assert_eq!(status.message, "Success");
        assert!(status.is_success());
    }

    #[test]
    fn test_status_code_of_unknown_value_is_none() {
        let status = Status { code: 418, message: "teapot".into() };
        assert!(!status.is_success());
        assert_eq!(status.status_code(), None);
    }

    #[test]
    fn test_requests_and_responses_are_classified() {
        assert!(CinemaMessage::GetCinema.is_request());
        assert!(CinemaMessage::ReserveSeats { seats: vec![] }.is_request());
        let response = CinemaMessage::SeatsResponse { status: Status::success(), seats: vec![] };
        assert!(!response.is_request());
        assert_eq!(response.status(), Some(&Status::success()));
    }
}
