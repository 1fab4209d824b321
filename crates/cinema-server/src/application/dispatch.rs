//! Request dispatcher: one decoded request in, one response out.
//!
//! The dispatcher is the transport boundary of the seating service.  It owns
//! the mapping from [`SeatingError`] to wire status codes:
//!
//! | Outcome                                               | Code |
//! |-------------------------------------------------------|------|
//! | success                                               | 200  |
//! | response-type message sent as a request, grid too big | 400  |
//! | no cinema created yet                                 | 404  |
//! | seat unavailable, out of bounds, or repeated          | 409  |
//! | internal failure (poisoned lock, map fault)           | 500  |
//!
//! `FindAvailableSeats` is answered with a `SeatsResponse`; every other request
//! with a `CinemaResponse`, whose snapshot is present only on success.

use std::sync::Arc;

use cinema_core::protocol::MAX_SNAPSHOT_SEATS;
use cinema_core::{CinemaMessage, CinemaSnapshot, Seat, SeatingError, Status, StatusCode};
use tracing::{debug, warn};

use crate::application::repository::SeatRepository;

/// Maps a seating failure to the status sent back to the caller.
pub fn status_for_error(err: &SeatingError) -> Status {
    let code = match err {
        SeatingError::SeatUnavailable(_)
        | SeatingError::SeatOutOfBounds { .. }
        | SeatingError::DuplicateSeat(_) => StatusCode::Conflict,
        SeatingError::NotInitialized => StatusCode::NotFound,
        SeatingError::Internal(_) => StatusCode::InternalError,
    };
    Status::new(code, err.to_string())
}

/// Routes requests to a [`SeatRepository`].
pub struct Dispatcher {
    repo: Arc<dyn SeatRepository>,
    max_cells: u64,
}

impl Dispatcher {
    /// Creates a dispatcher that rejects grids with more than `max_cells`
    /// seats.
    ///
    /// The limit is capped at [`MAX_SNAPSHOT_SEATS`] so that every reachable
    /// state of an accepted grid can be sent back in one response.
    pub fn new(repo: Arc<dyn SeatRepository>, max_cells: u64) -> Self {
        if max_cells > MAX_SNAPSHOT_SEATS {
            warn!(
                max_cells,
                cap = MAX_SNAPSHOT_SEATS,
                "max_cells exceeds what one response frame can carry; capping"
            );
        }
        Self {
            repo,
            max_cells: max_cells.min(MAX_SNAPSHOT_SEATS),
        }
    }

    /// The grid size limit in effect.
    pub fn max_cells(&self) -> u64 {
        self.max_cells
    }

    /// Handles one request and returns its response.
    ///
    /// Never fails: every error becomes a non-200 status in the response.
    pub fn handle(&self, request: CinemaMessage) -> CinemaMessage {
        debug!(message_type = ?request.message_type(), "dispatching request");

        match request {
            CinemaMessage::CreateCinema {
                rows,
                columns,
                minimum_distance,
            } => match self.check_grid(rows, columns) {
                Ok(()) => cinema_response(self.repo.create_cinema(rows, columns, minimum_distance)),
                Err(status) => rejected_cinema(status),
            },
            CinemaMessage::GetCinema => cinema_response(self.repo.get_cinema()),
            CinemaMessage::ConfigureCinemaSize { rows, columns } => {
                match self.check_grid(rows, columns) {
                    Ok(()) => cinema_response(self.repo.configure_cinema_size(rows, columns)),
                    Err(status) => rejected_cinema(status),
                }
            }
            CinemaMessage::ChangeMinimumDistance { minimum_distance } => {
                cinema_response(self.repo.change_minimum_distance(minimum_distance))
            }
            CinemaMessage::FindAvailableSeats { count } => {
                seats_response(self.repo.find_available_seats(count))
            }
            CinemaMessage::ReserveSeats { seats } => cinema_response(self.repo.reserve_seats(&seats)),
            other => {
                warn!(message_type = ?other.message_type(), "response message received as a request");
                rejected_cinema(Status::new(
                    StatusCode::BadRequest,
                    format!("{:?} is not a request", other.message_type()),
                ))
            }
        }
    }

    /// Checks a `rows × columns` grid against [`Dispatcher::max_cells`].
    ///
    /// # Errors
    ///
    /// Returns a 400 status describing the limit when the grid is too large.
    pub fn check_grid(&self, rows: u32, columns: u32) -> Result<(), Status> {
        let cells = u64::from(rows) * u64::from(columns);
        if cells > self.max_cells {
            warn!(rows, columns, max_cells = self.max_cells, "grid size rejected");
            return Err(Status::new(
                StatusCode::BadRequest,
                format!(
                    "a {rows}x{columns} cinema has {cells} seats, more than the limit of {}",
                    self.max_cells
                ),
            ));
        }
        Ok(())
    }
}

// ── Response builders ─────────────────────────────────────────────────────────

fn cinema_response(result: Result<CinemaSnapshot, SeatingError>) -> CinemaMessage {
    match result {
        Ok(snapshot) => CinemaMessage::CinemaResponse {
            status: Status::success(),
            cinema: Some(snapshot),
        },
        Err(err) => rejected_cinema(log_failure(&err)),
    }
}

fn seats_response(result: Result<Vec<Seat>, SeatingError>) -> CinemaMessage {
    match result {
        Ok(seats) => CinemaMessage::SeatsResponse {
            status: Status::success(),
            seats,
        },
        Err(err) => CinemaMessage::SeatsResponse {
            status: log_failure(&err),
            seats: Vec::new(),
        },
    }
}

fn rejected_cinema(status: Status) -> CinemaMessage {
    CinemaMessage::CinemaResponse { status, cinema: None }
}

fn log_failure(err: &SeatingError) -> Status {
    if matches!(err, SeatingError::Internal(_)) {
        warn!("request failed: {err}");
    } else {
        debug!("request rejected: {err}");
    }
    status_for_error(err)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
