//! The seating plan aggregate: configuration, reserved seats, and the derived
//! availability map, plus the reservation and reconfiguration engines.
//!
//! [`SeatingPlan`] is the aggregate root.  Callers only ever see its state as a
//! [`CinemaSnapshot`]; every mutation goes through one of its methods, and each
//! method either commits completely or leaves the plan unchanged.
//!
//! # Reset policy
//!
//! | Operation                  | Reserved seats                        |
//! |----------------------------|---------------------------------------|
//! | `configure`, grid grows    | kept                                  |
//! | `configure`, any dim shrinks | released                            |
//! | `change_minimum_distance`  | always released                       |
//!
//! The availability map is rebuilt from scratch after every one of them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::availability::{AvailabilityMap, MapError};
use crate::domain::finder;
use crate::domain::seat::Seat;

/// Errors returned by seating operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeatingError {
    /// A requested seat is reserved or within the minimum distance of a
    /// reserved seat.
    #[error("seat {0} is not available")]
    SeatUnavailable(Seat),

    /// A requested seat lies outside the cinema grid.
    #[error("seat {seat} is outside the {rows}x{columns} cinema")]
    SeatOutOfBounds { seat: Seat, rows: u32, columns: u32 },

    /// The same seat appears more than once in a single request.
    #[error("seat {0} is requested more than once")]
    DuplicateSeat(Seat),

    /// No cinema has been created yet.
    #[error("no cinema has been created")]
    NotInitialized,

    /// The seating state failed one of its own invariants.
    #[error("internal seating failure: {0}")]
    Internal(String),
}

impl SeatingError {
    /// Returns `true` for rejections caused by the request itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SeatingError::SeatUnavailable(_)
                | SeatingError::SeatOutOfBounds { .. }
                | SeatingError::DuplicateSeat(_)
        )
    }
}

impl From<MapError> for SeatingError {
    fn from(err: MapError) -> Self {
        SeatingError::Internal(err.to_string())
    }
}

/// Immutable view of a cinema's configuration and reservations.
///
/// `reserved_seats` is in commit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CinemaSnapshot {
    /// Number of rows in the grid.
    pub rows: u32,
    /// Number of columns in the grid.
    pub columns: u32,
    /// Minimum Manhattan distance between a new reservation and every
    /// reserved seat.
    pub minimum_distance: u32,
    /// All reserved seats, oldest first.
    pub reserved_seats: Vec<Seat>,
}

/// A single cinema and its derived availability map.
///
/// Invariants, upheld by every method:
///
/// - `reserved_seats` has no duplicates and every entry is inside the grid.
/// - The map has exactly `rows × columns` cells, and a cell is blocked iff some
///   reserved seat lies within `minimum_distance` of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingPlan {
    rows: u32,
    columns: u32,
    minimum_distance: u32,
    reserved_seats: Vec<Seat>,
    availability: AvailabilityMap,
}

impl SeatingPlan {
    /// Creates an empty cinema with an all-free availability map.
    pub fn new(rows: u32, columns: u32, minimum_distance: u32) -> Self {
        Self {
            rows,
            columns,
            minimum_distance,
            reserved_seats: Vec::new(),
            availability: AvailabilityMap::new(rows, columns),
        }
    }

    /// Reconstructs a plan from a snapshot, rebuilding its availability map.
    ///
    /// # Errors
    ///
    /// Returns [`SeatingError::SeatOutOfBounds`] or
    /// [`SeatingError::DuplicateSeat`] if the snapshot breaks the plan's
    /// invariants.
    pub fn from_snapshot(snapshot: &CinemaSnapshot) -> Result<Self, SeatingError> {
        let mut plan = Self::new(snapshot.rows, snapshot.columns, snapshot.minimum_distance);
        plan.check_request(&snapshot.reserved_seats)?;
        plan.availability
            .rebuild(&snapshot.reserved_seats, snapshot.minimum_distance)?;
        plan.reserved_seats = snapshot.reserved_seats.clone();
        Ok(plan)
    }

    /// Returns a copy of the current configuration and reservations.
    pub fn snapshot(&self) -> CinemaSnapshot {
        CinemaSnapshot {
            rows: self.rows,
            columns: self.columns,
            minimum_distance: self.minimum_distance,
            reserved_seats: self.reserved_seats.clone(),
        }
    }

    /// The derived availability map.
    pub fn availability(&self) -> &AvailabilityMap {
        &self.availability
    }

    /// Reserved seats in commit order.
    pub fn reserved_seats(&self) -> &[Seat] {
        &self.reserved_seats
    }

    /// Returns the first run of `count` adjacent free seats (see
    /// [`finder::find_available_seats`]).
    pub fn find_available_seats(&self, count: u32) -> Vec<Seat> {
        finder::find_available_seats(&self.availability, count)
    }

    /// Reserves `seats` atomically.
    ///
    /// Every seat is checked against the availability map as it stood before
    /// the call.  Seats within the same request are not checked against each
    /// other for the minimum distance.  On success the seats are appended in
    /// request order and the map is updated incrementally.
    ///
    /// # Errors
    ///
    /// Returns a validation error ([`SeatingError::is_validation`]) if any
    /// seat is out of bounds, repeated, or blocked.  Nothing is committed in
    /// that case.
    pub fn reserve_seats(&mut self, seats: &[Seat]) -> Result<CinemaSnapshot, SeatingError> {
        self.check_request(seats)?;
        if let Some(seat) = seats.iter().find(|s| self.availability.is_blocked(**s)) {
            return Err(SeatingError::SeatUnavailable(*seat));
        }

        // The map rejects bad input before touching any cell, so a failure
        // here leaves both the map and the seat list as they were.
        self.availability.block_around(seats, self.minimum_distance)?;
        self.reserved_seats.extend_from_slice(seats);

        debug!(
            reserved = seats.len(),
            total = self.reserved_seats.len(),
            "seats reserved"
        );
        Ok(self.snapshot())
    }

    /// Resizes the grid.
    ///
    /// Shrinking either dimension releases every reservation; otherwise the
    /// reservations are kept.  The map is reallocated and rebuilt either way.
    ///
    /// # Errors
    ///
    /// Returns [`SeatingError::Internal`] if the rebuilt map fails its own
    /// checks; the plan is unchanged in that case.
    pub fn configure(&mut self, rows: u32, columns: u32) -> Result<CinemaSnapshot, SeatingError> {
        let shrinking = rows < self.rows || columns < self.columns;
        let reserved = if shrinking {
            Vec::new()
        } else {
            self.reserved_seats.clone()
        };

        let mut availability = AvailabilityMap::new(rows, columns);
        availability.rebuild(&reserved, self.minimum_distance)?;

        if shrinking && !self.reserved_seats.is_empty() {
            debug!(
                released = self.reserved_seats.len(),
                "grid shrank; releasing all reservations"
            );
        }

        self.rows = rows;
        self.columns = columns;
        self.reserved_seats = reserved;
        self.availability = availability;
        Ok(self.snapshot())
    }

    /// Changes the minimum distance and releases every reservation.
    ///
    /// # Errors
    ///
    /// Returns [`SeatingError::Internal`] if the rebuilt map fails its own
    /// checks; the plan is unchanged in that case.
    pub fn change_minimum_distance(&mut self, minimum_distance: u32) -> Result<CinemaSnapshot, SeatingError> {
        let mut availability = AvailabilityMap::new(self.rows, self.columns);
        availability.rebuild(&[], minimum_distance)?;

        if !self.reserved_seats.is_empty() {
            debug!(
                released = self.reserved_seats.len(),
                "minimum distance changed; releasing all reservations"
            );
        }

        self.minimum_distance = minimum_distance;
        self.reserved_seats.clear();
        self.availability = availability;
        Ok(self.snapshot())
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Rejects out-of-bounds and repeated seats.
    fn check_request(&self, seats: &[Seat]) -> Result<(), SeatingError> {
        let mut seen = HashSet::with_capacity(seats.len());
        for seat in seats {
            if !seat.is_within(self.rows, self.columns) {
                return Err(SeatingError::SeatOutOfBounds {
                    seat: *seat,
                    rows: self.rows,
                    columns: self.columns,
                });
            }
            if !seen.insert(*seat) {
                return Err(SeatingError::DuplicateSeat(*seat));
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_with_center_reserved() -> SeatingPlan {
        let mut plan = SeatingPlan::new(5, 5, 2);
        plan.reserve_seats(&[Seat::new(2, 2)]).unwrap();
        plan
    }

    // ── new / snapshot ────────────────────────────────────────────────────────

    #[test]
    fn test_new_plan_snapshot_has_no_reservations() {
        let plan = SeatingPlan::new(10, 15, 3);
        assert_eq!(
            plan.snapshot(),
            CinemaSnapshot { rows: 10, columns: 15, minimum_distance: 3, reserved_seats: vec![] }
        );
        assert_eq!(plan.availability().free_count(), 150);
    }

    // ── reserve_seats ─────────────────────────────────────────────────────────

    #[test]
    fn test_reserve_seats_appends_in_request_order() {
        // Arrange
        let mut plan = SeatingPlan::new(10, 10, 2);
        let seats = vec![Seat::new(1, 1), Seat::new(8, 8)];

        // Act
        let snapshot = plan.reserve_seats(&seats).unwrap();

        // Assert
        assert_eq!(snapshot.reserved_seats, seats);
    }

    #[test]
    fn test_reserve_seats_accepts_seats_close_to_each_other_in_one_request() {
        // (1,1) and (0,0) are distance 2 apart – both checked only against the
        // pre-call map, so the request goes through.
        let mut plan = SeatingPlan::new(10, 10, 2);
        let snapshot = plan.reserve_seats(&[Seat::new(1, 1), Seat::new(0, 0)]).unwrap();
        assert_eq!(snapshot.reserved_seats.len(), 2);
    }

    #[test]
    fn test_reserve_seats_rejects_already_reserved_seat() {
        let mut plan = plan_with_center_reserved();
        let result = plan.reserve_seats(&[Seat::new(2, 2)]);
        assert_eq!(result, Err(SeatingError::SeatUnavailable(Seat::new(2, 2))));
    }

    #[test]
    fn test_reserve_seats_rejects_seat_within_distance() {
        let mut plan = plan_with_center_reserved();
        let result = plan.reserve_seats(&[Seat::new(0, 2)]);
        assert_eq!(result, Err(SeatingError::SeatUnavailable(Seat::new(0, 2))));
    }

    #[test]
    fn test_reserve_seats_failure_leaves_plan_unchanged() {
        // Arrange
        let mut plan = plan_with_center_reserved();
        let before = plan.clone();

        // Act – first seat is free, second is blocked
        let result = plan.reserve_seats(&[Seat::new(0, 0), Seat::new(1, 2)]);

        // Assert
        assert!(result.is_err());
        assert_eq!(plan, before);
    }

    #[test]
    fn test_reserve_seats_rejects_out_of_bounds_seat() {
        let mut plan = SeatingPlan::new(3, 3, 1);
        let result = plan.reserve_seats(&[Seat::new(0, 3)]);
        assert_eq!(
            result,
            Err(SeatingError::SeatOutOfBounds { seat: Seat::new(0, 3), rows: 3, columns: 3 })
        );
        assert!(plan.reserved_seats().is_empty());
    }

    #[test]
    fn test_reserve_seats_rejects_duplicate_seat_in_request() {
        let mut plan = SeatingPlan::new(3, 3, 0);
        let result = plan.reserve_seats(&[Seat::new(1, 1), Seat::new(1, 1)]);
        assert_eq!(result, Err(SeatingError::DuplicateSeat(Seat::new(1, 1))));
    }

    #[test]
    fn test_reserve_empty_request_is_a_no_op() {
        let mut plan = plan_with_center_reserved();
        let before = plan.clone();
        let snapshot = plan.reserve_seats(&[]).unwrap();
        assert_eq!(snapshot, before.snapshot());
        assert_eq!(plan, before);
    }

    #[test]
    fn test_validation_errors_are_classified() {
        assert!(SeatingError::SeatUnavailable(Seat::new(0, 0)).is_validation());
        assert!(SeatingError::DuplicateSeat(Seat::new(0, 0)).is_validation());
        assert!(!SeatingError::NotInitialized.is_validation());
        assert!(!SeatingError::Internal("x".into()).is_validation());
    }

    // ── configure ─────────────────────────────────────────────────────────────

    #[test]
    fn test_configure_growing_keeps_reservations_and_blocked_pattern() {
        // Arrange
        let mut plan = plan_with_center_reserved();

        // Act
        let snapshot = plan.configure(8, 9).unwrap();

        // Assert
        assert_eq!(snapshot.reserved_seats, vec![Seat::new(2, 2)]);
        assert_eq!(plan.availability().len(), 72);
        assert_eq!(plan.availability().blocked_count(), 13);
        assert!(plan.availability().is_blocked(Seat::new(4, 2)));
        assert!(!plan.availability().is_blocked(Seat::new(5, 2)));
    }

    #[test]
    fn test_configure_same_size_keeps_reservations() {
        let mut plan = plan_with_center_reserved();
        let snapshot = plan.configure(5, 5).unwrap();
        assert_eq!(snapshot.reserved_seats, vec![Seat::new(2, 2)]);
    }

    #[test]
    fn test_configure_shrinking_rows_releases_reservations() {
        let mut plan = plan_with_center_reserved();
        let snapshot = plan.configure(3, 3).unwrap();
        assert!(snapshot.reserved_seats.is_empty());
        assert_eq!(plan.availability().free_count(), 9);
    }

    #[test]
    fn test_configure_shrinking_one_dimension_while_growing_other_releases() {
        let mut plan = plan_with_center_reserved();
        let snapshot = plan.configure(20, 4).unwrap();
        assert!(snapshot.reserved_seats.is_empty());
        assert_eq!(snapshot.rows, 20);
        assert_eq!(snapshot.columns, 4);
    }

    // ── change_minimum_distance ───────────────────────────────────────────────

    #[test]
    fn test_change_minimum_distance_releases_everything() {
        let mut plan = plan_with_center_reserved();
        let snapshot = plan.change_minimum_distance(0).unwrap();
        assert_eq!(snapshot.minimum_distance, 0);
        assert!(snapshot.reserved_seats.is_empty());
        assert_eq!(plan.availability().free_count(), 25);
    }

    // ── from_snapshot ─────────────────────────────────────────────────────────

    #[test]
    fn test_from_snapshot_rebuilds_equivalent_plan() {
        let plan = plan_with_center_reserved();
        let rebuilt = SeatingPlan::from_snapshot(&plan.snapshot()).unwrap();
        assert_eq!(rebuilt, plan);
    }

    #[test]
    fn test_from_snapshot_rejects_out_of_bounds_reservation() {
        let snapshot = CinemaSnapshot {
            rows: 2,
            columns: 2,
            minimum_distance: 0,
            reserved_seats: vec![Seat::new(5, 5)],
        };
        assert!(matches!(
            SeatingPlan::from_snapshot(&snapshot),
            Err(SeatingError::SeatOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_map_error_converts_to_internal() {
        let err: SeatingError = MapError::DimensionMismatch { expected: 4, actual: 3 }.into();
        assert!(matches!(err, SeatingError::Internal(_)));
    }
}
