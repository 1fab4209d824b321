//! Binary codec for encoding and decoding cinema seating protocol messages.
//!
//! Wire format:
//! ```text
//! [version:1][msg_type:1][reserved:2][payload_len:4][request_id:8][payload:N]
//! ```
//! Total header size: 16 bytes. All multi-byte integers are big-endian.
//!
//! Payload building blocks:
//!
//! | Value          | Encoding                                             |
//! |----------------|------------------------------------------------------|
//! | `Seat`         | `row:u32` `column:u32`                               |
//! | seat list      | `count:u32` followed by `count` seats                |
//! | `Status`       | `code:u16` `len:u16` `len` bytes of UTF-8            |
//! | snapshot       | `rows:u32` `columns:u32` `minimum_distance:u32` seat list |
//! | optional value | presence byte `0x00`/`0x01`, then the value if present |

use thiserror::Error;

use crate::domain::plan::CinemaSnapshot;
use crate::domain::seat::Seat;
use crate::protocol::messages::{
    CinemaMessage, MessageType, Status, HEADER_SIZE, MAX_PAYLOAD_LEN, PROTOCOL_VERSION,
    SEAT_WIRE_SIZE as SEAT_SIZE,
};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The byte slice is shorter than a message header.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The message type byte in the header is not a recognized value.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The protocol version in the header is not supported.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// The declared payload is larger than [`MAX_PAYLOAD_LEN`].
    #[error("payload too large: {declared} bytes exceeds the {max}-byte limit")]
    PayloadTooLarge { declared: usize, max: usize },

    /// The payload could not be parsed (truncated field, bad flag, UTF-8 error, etc.).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The header declares more payload bytes than are available yet.
    #[error("payload length mismatch: header says {declared}, available is {available}")]
    PayloadLengthMismatch { declared: usize, available: usize },
}

impl ProtocolError {
    /// Returns `true` when the input is a valid prefix of a frame and the
    /// caller should read more bytes before retrying.
    pub fn is_incomplete(&self) -> bool {
        matches!(
            self,
            ProtocolError::InsufficientData { .. } | ProtocolError::PayloadLengthMismatch { .. }
        )
    }
}

/// One decoded frame: the correlating request id and the message it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Chosen by the client; echoed unchanged by the server.
    pub request_id: u64,
    /// The decoded message.
    pub message: CinemaMessage,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`CinemaMessage`] into a byte vector including the 16-byte header.
///
/// The request id is **not** chosen by this function – clients pass a fresh
/// value from a [`crate::protocol::SequenceCounter`], servers echo the id of
/// the request they are answering.
///
/// # Errors
///
/// Returns [`ProtocolError::PayloadTooLarge`] if the payload would exceed
/// [`MAX_PAYLOAD_LEN`], or [`ProtocolError::MalformedPayload`] if a status
/// message is longer than a `u16` length prefix can describe.
///
/// # Examples
///
/// ```rust
/// use cinema_core::protocol::{decode_message, encode_message, CinemaMessage};
///
/// let msg = CinemaMessage::FindAvailableSeats { count: 3 };
/// let bytes = encode_message(&msg, 7).unwrap();
/// let (frame, consumed) = decode_message(&bytes).unwrap();
/// assert_eq!(frame.message, msg);
/// assert_eq!(frame.request_id, 7);
/// assert_eq!(consumed, bytes.len());
/// ```
pub fn encode_message(msg: &CinemaMessage, request_id: u64) -> Result<Vec<u8>, ProtocolError> {
    let payload = encode_payload(msg)?;
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge {
            declared: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    let payload_len = payload.len() as u32;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());

    // Header: version (1) + msg_type (1) + reserved (2) + payload_len (4) +
    //         request_id (8) = 16 bytes
    buf.push(PROTOCOL_VERSION);
    buf.push(msg.message_type() as u8);
    buf.push(0x00); // reserved
    buf.push(0x00); // reserved
    buf.extend_from_slice(&payload_len.to_be_bytes());
    buf.extend_from_slice(&request_id.to_be_bytes());

    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decodes one [`Frame`] from the beginning of `bytes`.
///
/// Returns the frame and the total number of bytes consumed (header +
/// payload), so the caller can advance their read cursor.  Any bytes after the
/// frame are left untouched.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are malformed.  Use
/// [`ProtocolError::is_incomplete`] to tell a partial frame apart from a
/// broken one.
pub fn decode_message(bytes: &[u8]) -> Result<(Frame, usize), ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Err(ProtocolError::InsufficientData {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != PROTOCOL_VERSION {
        return Err(ProtocolError::UnsupportedVersion(version));
    }

    let msg_type_byte = bytes[1];
    let msg_type = MessageType::try_from(msg_type_byte)
        .map_err(|_| ProtocolError::UnknownMessageType(msg_type_byte))?;

    // bytes[2..4] are reserved – ignored on decode

    let payload_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge {
            declared: payload_len,
            max: MAX_PAYLOAD_LEN,
        });
    }

    let request_id = read_u64(bytes, 8)?;

    let total_needed = HEADER_SIZE + payload_len;
    if bytes.len() < total_needed {
        return Err(ProtocolError::PayloadLengthMismatch {
            declared: payload_len,
            available: bytes.len() - HEADER_SIZE,
        });
    }

    let payload = &bytes[HEADER_SIZE..total_needed];
    let message = decode_payload(msg_type, payload)?;
    Ok((Frame { request_id, message }, total_needed))
}

// ── Payload encoding ──────────────────────────────────────────────────────────

fn encode_payload(msg: &CinemaMessage) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::new();
    match msg {
        CinemaMessage::CreateCinema {
            rows,
            columns,
            minimum_distance,
        } => {
            buf.extend_from_slice(&rows.to_be_bytes());
            buf.extend_from_slice(&columns.to_be_bytes());
            buf.extend_from_slice(&minimum_distance.to_be_bytes());
        }
        CinemaMessage::GetCinema => {} // empty payload
        CinemaMessage::ConfigureCinemaSize { rows, columns } => {
            buf.extend_from_slice(&rows.to_be_bytes());
            buf.extend_from_slice(&columns.to_be_bytes());
        }
        CinemaMessage::ChangeMinimumDistance { minimum_distance } => {
            buf.extend_from_slice(&minimum_distance.to_be_bytes());
        }
        CinemaMessage::FindAvailableSeats { count } => {
            buf.extend_from_slice(&count.to_be_bytes());
        }
        CinemaMessage::ReserveSeats { seats } => encode_seat_list(&mut buf, seats)?,
        CinemaMessage::CinemaResponse { status, cinema } => {
            encode_status(&mut buf, status)?;
            match cinema {
                Some(snapshot) => {
                    buf.push(0x01);
                    encode_snapshot(&mut buf, snapshot)?;
                }
                None => buf.push(0x00),
            }
        }
        CinemaMessage::SeatsResponse { status, seats } => {
            encode_status(&mut buf, status)?;
            encode_seat_list(&mut buf, seats)?;
        }
    }
    Ok(buf)
}

fn encode_seat_list(buf: &mut Vec<u8>, seats: &[Seat]) -> Result<(), ProtocolError> {
    if seats.len() > MAX_PAYLOAD_LEN / SEAT_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            declared: seats.len().saturating_mul(SEAT_SIZE),
            max: MAX_PAYLOAD_LEN,
        });
    }
    buf.extend_from_slice(&(seats.len() as u32).to_be_bytes());
    for seat in seats {
        buf.extend_from_slice(&seat.row.to_be_bytes());
        buf.extend_from_slice(&seat.column.to_be_bytes());
    }
    Ok(())
}

fn encode_status(buf: &mut Vec<u8>, status: &Status) -> Result<(), ProtocolError> {
    buf.extend_from_slice(&status.code.to_be_bytes());
    write_length_prefixed_string(buf, &status.message)
}

fn encode_snapshot(buf: &mut Vec<u8>, snapshot: &CinemaSnapshot) -> Result<(), ProtocolError> {
    buf.extend_from_slice(&snapshot.rows.to_be_bytes());
    buf.extend_from_slice(&snapshot.columns.to_be_bytes());
    buf.extend_from_slice(&snapshot.minimum_distance.to_be_bytes());
    encode_seat_list(buf, &snapshot.reserved_seats)
}

// ── Payload decoding ──────────────────────────────────────────────────────────

fn decode_payload(msg_type: MessageType, payload: &[u8]) -> Result<CinemaMessage, ProtocolError> {
    let mut offset = 0;
    let msg = match msg_type {
        MessageType::CreateCinema => {
            let rows = read_field_u32(payload, &mut offset, "CreateCinema.rows")?;
            let columns = read_field_u32(payload, &mut offset, "CreateCinema.columns")?;
            let minimum_distance =
                read_field_u32(payload, &mut offset, "CreateCinema.minimum_distance")?;
            CinemaMessage::CreateCinema {
                rows,
                columns,
                minimum_distance,
            }
        }
        MessageType::GetCinema => CinemaMessage::GetCinema,
        MessageType::ConfigureCinemaSize => {
            let rows = read_field_u32(payload, &mut offset, "ConfigureCinemaSize.rows")?;
            let columns = read_field_u32(payload, &mut offset, "ConfigureCinemaSize.columns")?;
            CinemaMessage::ConfigureCinemaSize { rows, columns }
        }
        MessageType::ChangeMinimumDistance => {
            let minimum_distance =
                read_field_u32(payload, &mut offset, "ChangeMinimumDistance.minimum_distance")?;
            CinemaMessage::ChangeMinimumDistance { minimum_distance }
        }
        MessageType::FindAvailableSeats => {
            let count = read_field_u32(payload, &mut offset, "FindAvailableSeats.count")?;
            CinemaMessage::FindAvailableSeats { count }
        }
        MessageType::ReserveSeats => {
            let seats = decode_seat_list(payload, &mut offset, "ReserveSeats.seats")?;
            CinemaMessage::ReserveSeats { seats }
        }
        MessageType::CinemaResponse => {
            let status = decode_status(payload, &mut offset)?;
            let cinema = match read_field_u8(payload, &mut offset, "CinemaResponse.present")? {
                0x00 => None,
                0x01 => Some(decode_snapshot(payload, &mut offset)?),
                other => {
                    return Err(ProtocolError::MalformedPayload(format!(
                        "CinemaResponse: invalid presence flag 0x{other:02X}"
                    )))
                }
            };
            CinemaMessage::CinemaResponse { status, cinema }
        }
        MessageType::SeatsResponse => {
            let status = decode_status(payload, &mut offset)?;
            let seats = decode_seat_list(payload, &mut offset, "SeatsResponse.seats")?;
            CinemaMessage::SeatsResponse { status, seats }
        }
    };

    if offset != payload.len() {
        return Err(ProtocolError::MalformedPayload(format!(
            "{msg_type:?}: {} trailing bytes",
            payload.len() - offset
        )));
    }
    Ok(msg)
}

fn decode_seat_list(buf: &[u8], offset: &mut usize, context: &str) -> Result<Vec<Seat>, ProtocolError> {
    let count = read_field_u32(buf, offset, context)? as usize;

    // Check the whole list up front so a bogus count cannot trigger a huge
    // allocation.
    let remaining = buf.len() - *offset;
    if count > remaining / SEAT_SIZE {
        return Err(ProtocolError::MalformedPayload(format!(
            "{context}: {count} seats declared but only {remaining} bytes remain"
        )));
    }

    let mut seats = Vec::with_capacity(count);
    for _ in 0..count {
        let row = read_field_u32(buf, offset, context)?;
        let column = read_field_u32(buf, offset, context)?;
        seats.push(Seat::new(row, column));
    }
    Ok(seats)
}

fn decode_status(buf: &[u8], offset: &mut usize) -> Result<Status, ProtocolError> {
    let code = read_field_u16(buf, offset, "Status.code")?;
    let message = read_length_prefixed_string(buf, offset, "Status.message")?;
    Ok(Status { code, message })
}

fn decode_snapshot(buf: &[u8], offset: &mut usize) -> Result<CinemaSnapshot, ProtocolError> {
    let rows = read_field_u32(buf, offset, "Cinema.rows")?;
    let columns = read_field_u32(buf, offset, "Cinema.columns")?;
    let minimum_distance = read_field_u32(buf, offset, "Cinema.minimum_distance")?;
    let reserved_seats = decode_seat_list(buf, offset, "Cinema.reserved_seats")?;
    Ok(CinemaSnapshot {
        rows,
        columns,
        minimum_distance,
        reserved_seats,
    })
}

// ── Primitive helpers ─────────────────────────────────────────────────────────

fn require_len(buf: &[u8], offset: usize, needed: usize, context: &str) -> Result<(), ProtocolError> {
    if buf.len().saturating_sub(offset) < needed {
        Err(ProtocolError::MalformedPayload(format!(
            "{context}: need {needed} bytes at offset {offset}, got {}",
            buf.len().saturating_sub(offset)
        )))
    } else {
        Ok(())
    }
}

fn read_field_u8(buf: &[u8], offset: &mut usize, context: &str) -> Result<u8, ProtocolError> {
    require_len(buf, *offset, 1, context)?;
    let value = buf[*offset];
    *offset += 1;
    Ok(value)
}

fn read_field_u16(buf: &[u8], offset: &mut usize, context: &str) -> Result<u16, ProtocolError> {
    require_len(buf, *offset, 2, context)?;
    let value = u16::from_be_bytes([buf[*offset], buf[*offset + 1]]);
    *offset += 2;
    Ok(value)
}

fn read_field_u32(buf: &[u8], offset: &mut usize, context: &str) -> Result<u32, ProtocolError> {
    require_len(buf, *offset, 4, context)?;
    let value = u32::from_be_bytes([
        buf[*offset],
        buf[*offset + 1],
        buf[*offset + 2],
        buf[*offset + 3],
    ]);
    *offset += 4;
    Ok(value)
}

/// Reads the header's request id; the caller has already checked the length.
fn read_u64(buf: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    if buf.len() < offset + 8 {
        return Err(ProtocolError::InsufficientData {
            needed: offset + 8,
            available: buf.len(),
        });
    }
    Ok(u64::from_be_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
        buf[offset + 4],
        buf[offset + 5],
        buf[offset + 6],
        buf[offset + 7],
    ]))
}

/// Writes a 2-byte length prefix followed by the UTF-8 string bytes.
fn write_length_prefixed_string(buf: &mut Vec<u8>, s: &str) -> Result<(), ProtocolError> {
    let bytes = s.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| {
        ProtocolError::MalformedPayload(format!(
            "string of {} bytes does not fit a u16 length prefix",
            bytes.len()
        ))
    })?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Reads a 2-byte length prefix followed by that many UTF-8 bytes.
fn read_length_prefixed_string(buf: &[u8], offset: &mut usize, context: &str) -> Result<String, ProtocolError> {
    let len = read_field_u16(buf, offset, context)? as usize;
    require_len(buf, *offset, len, context)?;
    let s = std::str::from_utf8(&buf[*offset..*offset + len])
        .map_err(|e| ProtocolError::MalformedPayload(format!("{context}: invalid UTF-8: {e}")))?
        .to_string();
    *offset += len;
    Ok(s)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
