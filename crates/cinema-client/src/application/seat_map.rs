//! Seat list parsing and text rendering of a cinema.
//!
//! Seats are typed as `row:column` pairs separated by commas, e.g.
//! `0:0,0:1,2:5`.  The map printed by `cinema-client get --map` uses one
//! character per seat:
//!
//! | Char | Meaning                                   |
//! |------|-------------------------------------------|
//! | `#`  | reserved                                  |
//! | `x`  | free but too close to a reserved seat     |
//! | `.`  | available                                 |
//!
//! Row 0 (the front row) is printed first.

use cinema_core::{CinemaSnapshot, Seat, SeatingError, SeatingPlan};
use thiserror::Error;

/// Errors from parsing a `row:column` seat list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeatParseError {
    /// The list contains no seats.
    #[error("no seats given")]
    Empty,
    /// An entry is not of the form `row:column`.
    #[error("'{0}' is not a row:column pair")]
    InvalidPair(String),
    /// A coordinate is not a non-negative integer that fits in `u32`.
    #[error("'{value}' in '{entry}' is not a valid coordinate")]
    InvalidCoordinate { entry: String, value: String },
}

/// Parses `"r:c,r:c,..."` into seats, keeping their order.
///
/// Whitespace around entries and coordinates is ignored.
///
/// # Errors
///
/// Returns [`SeatParseError`] for an empty list, a malformed pair, or a
/// coordinate that is negative or too large.
pub fn parse_seat_list(input: &str) -> Result<Vec<Seat>, SeatParseError> {
    let seats = input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_seat)
        .collect::<Result<Vec<_>, _>>()?;

    if seats.is_empty() {
        return Err(SeatParseError::Empty);
    }
    Ok(seats)
}

fn parse_seat(entry: &str) -> Result<Seat, SeatParseError> {
    let (row, column) = entry
        .split_once(':')
        .ok_or_else(|| SeatParseError::InvalidPair(entry.to_string()))?;
    Ok(Seat::new(
        parse_coordinate(entry, row)?,
        parse_coordinate(entry, column)?,
    ))
}

fn parse_coordinate(entry: &str, value: &str) -> Result<u32, SeatParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| SeatParseError::InvalidCoordinate {
            entry: entry.to_string(),
            value: value.trim().to_string(),
        })
}

/// Formats seats as `r:c` pairs, the same syntax [`parse_seat_list`] reads.
pub fn format_seat_list(seats: &[Seat]) -> String {
    seats
        .iter()
        .map(|s| format!("{}:{}", s.row, s.column))
        .collect::<Vec<_>>()
        .join(",")
}

/// Renders `snapshot` as a seat map, one line per row.
///
/// # Errors
///
/// Returns [`SeatingError`] if the snapshot's reservations are out of bounds
/// or repeated.
pub fn render_seat_map(snapshot: &CinemaSnapshot) -> Result<String, SeatingError> {
    let plan = SeatingPlan::from_snapshot(snapshot)?;
    let map = plan.availability();

    let mut reserved = vec![false; map.len()];
    let columns = snapshot.columns as usize;
    for seat in &snapshot.reserved_seats {
        reserved[seat.row as usize * columns + seat.column as usize] = true;
    }

    let mut out = String::with_capacity(map.len() + snapshot.rows as usize);
    for row in 0..snapshot.rows {
        let Some(cells) = map.row(row) else {
            break;
        };
        let base = row as usize * columns;
        for (offset, blocked) in cells.iter().enumerate() {
            out.push(match (reserved[base + offset], *blocked) {
                (true, _) => '#',
                (false, true) => 'x',
                (false, false) => '.',
            });
        }
        out.push('\n');
    }
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
