//! Shared, lock-guarded storage for the single cinema the server manages.
//!
//! # Locking discipline
//!
//! The whole [`SeatingPlan`] (configuration, reserved seats, and availability
//! map) sits behind one `std::sync::RwLock`:
//!
//! - `get_cinema` and `find_available_seats` take the **read** lock, so any
//!   number of readers run in parallel.
//! - Every mutation takes the **write** lock for its entire
//!   validate-then-commit sequence.  Two reservations can therefore never both
//!   pass validation against the same stale map.
//!
//! The guard is released on every exit path, including early error returns,
//! because it is dropped at the end of each method.  Readers only ever see the
//! state before or after a mutation, never a half-applied one.
//!
//! The lock is `std`, not `tokio`: no guard is ever held across an `.await`.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cinema_core::{CinemaSnapshot, Seat, SeatingError, SeatingPlan};
use tracing::{error, info};

/// Storage abstraction for the seating use cases.
///
/// The dispatcher depends only on this trait; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
pub trait SeatRepository: Send + Sync {
    /// Replaces the current cinema (if any) with an empty one.
    fn create_cinema(
        &self,
        rows: u32,
        columns: u32,
        minimum_distance: u32,
    ) -> Result<CinemaSnapshot, SeatingError>;

    /// Returns the current cinema.
    fn get_cinema(&self) -> Result<CinemaSnapshot, SeatingError>;

    /// Resizes the grid, releasing reservations when it shrinks.
    fn configure_cinema_size(&self, rows: u32, columns: u32) -> Result<CinemaSnapshot, SeatingError>;

    /// Changes the minimum distance and releases every reservation.
    fn change_minimum_distance(&self, minimum_distance: u32) -> Result<CinemaSnapshot, SeatingError>;

    /// Returns the first run of `count` adjacent free seats, possibly empty.
    fn find_available_seats(&self, count: u32) -> Result<Vec<Seat>, SeatingError>;

    /// Reserves all of `seats` or none of them.
    fn reserve_seats(&self, seats: &[Seat]) -> Result<CinemaSnapshot, SeatingError>;
}

/// In-memory [`SeatRepository`] holding at most one cinema.
#[derive(Debug, Default)]
pub struct CinemaRepository {
    state: RwLock<Option<SeatingPlan>>,
}

impl CinemaRepository {
    /// Creates a repository with no cinema; every call except
    /// [`SeatRepository::create_cinema`] fails with
    /// [`SeatingError::NotInitialized`] until one is created.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds an empty cinema.
    pub fn with_cinema(rows: u32, columns: u32, minimum_distance: u32) -> Self {
        Self {
            state: RwLock::new(Some(SeatingPlan::new(rows, columns, minimum_distance))),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Option<SeatingPlan>>, SeatingError> {
        self.state.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Option<SeatingPlan>>, SeatingError> {
        self.state.write().map_err(|_| poisoned())
    }

    /// Runs `op` on the current plan under the write lock.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&mut SeatingPlan) -> Result<T, SeatingError>,
    ) -> Result<T, SeatingError> {
        let mut guard = self.write()?;
        let plan = guard.as_mut().ok_or(SeatingError::NotInitialized)?;
        op(plan)
    }
}

fn poisoned() -> SeatingError {
    error!("cinema state lock is poisoned");
    SeatingError::Internal("cinema state lock is poisoned".to_string())
}

impl SeatRepository for CinemaRepository {
    fn create_cinema(
        &self,
        rows: u32,
        columns: u32,
        minimum_distance: u32,
    ) -> Result<CinemaSnapshot, SeatingError> {
        let plan = SeatingPlan::new(rows, columns, minimum_distance);
        let snapshot = plan.snapshot();
        *self.write()? = Some(plan);
        info!(rows, columns, minimum_distance, "cinema created");
        Ok(snapshot)
    }

    fn get_cinema(&self) -> Result<CinemaSnapshot, SeatingError> {
        let guard = self.read()?;
        guard
            .as_ref()
            .map(SeatingPlan::snapshot)
            .ok_or(SeatingError::NotInitialized)
    }

    fn configure_cinema_size(&self, rows: u32, columns: u32) -> Result<CinemaSnapshot, SeatingError> {
        let snapshot = self.mutate(|plan| plan.configure(rows, columns))?;
        info!(rows, columns, reserved = snapshot.reserved_seats.len(), "cinema resized");
        Ok(snapshot)
    }

    fn change_minimum_distance(&self, minimum_distance: u32) -> Result<CinemaSnapshot, SeatingError> {
        let snapshot = self.mutate(|plan| plan.change_minimum_distance(minimum_distance))?;
        info!(minimum_distance, "minimum distance changed");
        Ok(snapshot)
    }

    fn find_available_seats(&self, count: u32) -> Result<Vec<Seat>, SeatingError> {
        let guard = self.read()?;
        let plan = guard.as_ref().ok_or(SeatingError::NotInitialized)?;
        Ok(plan.find_available_seats(count))
    }

    fn reserve_seats(&self, seats: &[Seat]) -> Result<CinemaSnapshot, SeatingError> {
        self.mutate(|plan| plan.reserve_seats(seats))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
