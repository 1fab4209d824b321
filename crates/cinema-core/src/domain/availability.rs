//! The availability map: a derived blocked/free flag for every cell of the grid.
//!
//! A cell is **blocked** when it may not be newly reserved: it is itself
//! reserved, or it lies within the minimum distance of a reserved seat.  The
//! map is always recomputable from the reserved-seat list alone, but it is
//! maintained incrementally because a reservation only ever adds blocked cells.
//!
//! # Two update strategies (for beginners)
//!
//! - [`AvailabilityMap::rebuild`] resets every cell to free and re-blocks the
//!   neighbourhood of every seat in the list.  It is used whenever the grid
//!   dimensions or the minimum distance change, because old blocked cells may
//!   no longer be valid.
//!
//! - [`AvailabilityMap::block_around`] only *adds* blocked cells around the
//!   seats just reserved.  Cells blocked by earlier reservations are already
//!   marked, so there is nothing to re-evaluate.  Blocking is monotonic between
//!   two rebuilds: once a cell is blocked it stays blocked.
//!
//! Both strategies walk the "diamond" of cells within Manhattan distance `d`
//! of each seat, clamped to the grid, rather than scanning every cell.

use thiserror::Error;

use crate::domain::seat::Seat;

/// Internal consistency failures of the availability map.
///
/// These are unreachable when the map is driven through
/// [`crate::SeatingPlan`], which validates seats before touching the map.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A seat handed to the map lies outside the grid.
    #[error("seat {seat} lies outside the {rows}x{columns} availability map")]
    SeatOutsideGrid { seat: Seat, rows: u32, columns: u32 },

    /// The cell buffer no longer matches the grid dimensions.
    #[error("availability map holds {actual} cells, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Per-cell blocked/free grid for a `rows × columns` cinema.
///
/// Cells are stored row-major: cell `(r, c)` lives at index `r * columns + c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityMap {
    rows: u32,
    columns: u32,
    /// `true` = blocked, `false` = free.
    cells: Vec<bool>,
}

impl AvailabilityMap {
    /// Allocates an all-free map for a `rows × columns` grid.
    pub fn new(rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            cells: vec![false; cell_count(rows, columns)],
        }
    }

    /// Number of rows in the grid.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Total number of cells (`rows × columns`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` for a grid with no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the blocked flag for `seat`, or `None` if it lies outside the grid.
    pub fn get(&self, seat: Seat) -> Option<bool> {
        if seat.is_within(self.rows, self.columns) {
            self.cells.get(self.index(seat)).copied()
        } else {
            None
        }
    }

    /// Returns `true` if `seat` may not be newly reserved.
    ///
    /// Seats outside the grid are reported as blocked.
    pub fn is_blocked(&self, seat: Seat) -> bool {
        self.get(seat).unwrap_or(true)
    }

    /// Returns the blocked flags of one row, left to right.
    pub fn row(&self, row: u32) -> Option<&[bool]> {
        if row >= self.rows {
            return None;
        }
        let width = self.columns as usize;
        let start = row as usize * width;
        self.cells.get(start..start + width)
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.cells.iter().filter(|blocked| **blocked).count()
    }

    /// Number of free cells.
    pub fn free_count(&self) -> usize {
        self.len() - self.blocked_count()
    }

    /// Verifies that the cell buffer matches the grid dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DimensionMismatch`] if the buffer length differs
    /// from `rows × columns`.
    pub fn check_consistency(&self) -> Result<(), MapError> {
        let expected = cell_count(self.rows, self.columns);
        if self.cells.len() != expected {
            return Err(MapError::DimensionMismatch {
                expected,
                actual: self.cells.len(),
            });
        }
        Ok(())
    }

    /// Full rebuild: resets every cell to free, then blocks every cell within
    /// `minimum_distance` of each seat in `seats`.
    ///
    /// The map is left untouched if any seat lies outside the grid.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::SeatOutsideGrid`] for an out-of-range seat and
    /// [`MapError::DimensionMismatch`] if the buffer is inconsistent.
    pub fn rebuild(&mut self, seats: &[Seat], minimum_distance: u32) -> Result<(), MapError> {
        self.check_consistency()?;
        self.check_seats(seats)?;

        self.cells.fill(false);
        for seat in seats {
            self.block_diamond(*seat, minimum_distance);
        }
        Ok(())
    }

    /// Incremental update: blocks every cell within `minimum_distance` of any
    /// seat in `new_seats`.  Never frees a cell.
    ///
    /// Pass only the seats reserved since the last update; earlier
    /// reservations are already reflected in the map.
    ///
    /// # Errors
    ///
    /// Same as [`rebuild`](Self::rebuild); the map is left untouched on error.
    pub fn block_around(&mut self, new_seats: &[Seat], minimum_distance: u32) -> Result<(), MapError> {
        self.check_consistency()?;
        self.check_seats(new_seats)?;

        for seat in new_seats {
            self.block_diamond(*seat, minimum_distance);
        }
        Ok(())
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn index(&self, seat: Seat) -> usize {
        seat.row as usize * self.columns as usize + seat.column as usize
    }

    fn check_seats(&self, seats: &[Seat]) -> Result<(), MapError> {
        match seats.iter().find(|s| !s.is_within(self.rows, self.columns)) {
            Some(seat) => Err(MapError::SeatOutsideGrid {
                seat: *seat,
                rows: self.rows,
                columns: self.columns,
            }),
            None => Ok(()),
        }
    }

    /// Blocks the cells `(r, c)` with `|r - seat.row| + |c - seat.column| <= d`.
    ///
    /// `seat` must be in bounds.
    fn block_diamond(&mut self, seat: Seat, d: u32) {
        let first_row = seat.row.saturating_sub(d);
        let last_row = seat.row.saturating_add(d).min(self.rows - 1);

        for row in first_row..=last_row {
            let reach = d - row.abs_diff(seat.row);
            let first_col = seat.column.saturating_sub(reach);
            let last_col = seat.column.saturating_add(reach).min(self.columns - 1);

            let base = row as usize * self.columns as usize;
            self.cells[base + first_col as usize..=base + last_col as usize].fill(true);
        }
    }
}

fn cell_count(rows: u32, columns: u32) -> usize {
    rows as usize * columns as usize
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seat::manhattan_distance;

    /// Reference implementation: the per-cell scan over every seat.
    fn brute_force(rows: u32, columns: u32, seats: &[Seat], d: u32) -> Vec<bool> {
        let mut cells = Vec::new();
        for r in 0..rows {
            for c in 0..columns {
                let here = Seat::new(r, c);
                cells.push(seats.iter().any(|s| manhattan_distance(here, *s) <= d));
            }
        }
        cells
    }

    #[test]
    fn test_new_map_has_rows_times_columns_free_cells() {
        let map = AvailabilityMap::new(4, 7);
        assert_eq!(map.len(), 28);
        assert_eq!(map.free_count(), 28);
        assert!(map.check_consistency().is_ok());
    }

    #[test]
    fn test_new_map_with_zero_rows_is_empty() {
        let map = AvailabilityMap::new(0, 12);
        assert!(map.is_empty());
        assert_eq!(map.row(0), None);
    }

    #[test]
    fn test_rebuild_blocks_diamond_around_center_seat() {
        // Arrange
        let mut map = AvailabilityMap::new(5, 5);

        // Act
        map.rebuild(&[Seat::new(2, 2)], 2).unwrap();

        // Assert – exactly the 13 cells with |i-2|+|j-2| <= 2
        assert_eq!(map.blocked_count(), 13);
        for seat in [Seat::new(0, 2), Seat::new(1, 1), Seat::new(2, 0), Seat::new(4, 2)] {
            assert!(map.is_blocked(seat), "{seat} should be blocked");
        }
        for seat in [Seat::new(0, 0), Seat::new(0, 1), Seat::new(1, 0), Seat::new(4, 4)] {
            assert!(!map.is_blocked(seat), "{seat} should be free");
        }
    }

    #[test]
    fn test_rebuild_clamps_diamond_at_grid_corner() {
        let mut map = AvailabilityMap::new(3, 3);
        map.rebuild(&[Seat::new(0, 0)], 1).unwrap();
        assert_eq!(map.blocked_count(), 3);
        assert!(map.is_blocked(Seat::new(0, 1)));
        assert!(map.is_blocked(Seat::new(1, 0)));
        assert!(!map.is_blocked(Seat::new(1, 1)));
    }

    #[test]
    fn test_rebuild_with_zero_distance_blocks_only_the_seat() {
        let mut map = AvailabilityMap::new(3, 3);
        map.rebuild(&[Seat::new(1, 1)], 0).unwrap();
        assert_eq!(map.blocked_count(), 1);
        assert!(map.is_blocked(Seat::new(1, 1)));
    }

    #[test]
    fn test_rebuild_with_huge_distance_blocks_whole_grid() {
        let mut map = AvailabilityMap::new(4, 6);
        map.rebuild(&[Seat::new(3, 5)], u32::MAX).unwrap();
        assert_eq!(map.free_count(), 0);
    }

    #[test]
    fn test_rebuild_frees_cells_from_previous_seats() {
        // Arrange
        let mut map = AvailabilityMap::new(5, 5);
        map.rebuild(&[Seat::new(0, 0)], 1).unwrap();

        // Act
        map.rebuild(&[], 1).unwrap();

        // Assert
        assert_eq!(map.free_count(), 25);
    }

    #[test]
    fn test_rebuild_matches_brute_force_scan() {
        let seats = [Seat::new(0, 3), Seat::new(5, 1), Seat::new(6, 8), Seat::new(2, 9)];
        for d in 0..5 {
            let mut map = AvailabilityMap::new(7, 10);
            map.rebuild(&seats, d).unwrap();
            assert_eq!(map.cells, brute_force(7, 10, &seats, d), "distance {d}");
        }
    }

    #[test]
    fn test_rebuild_rejects_seat_outside_grid_and_leaves_map_untouched() {
        // Arrange
        let mut map = AvailabilityMap::new(3, 3);
        map.rebuild(&[Seat::new(1, 1)], 0).unwrap();
        let before = map.clone();

        // Act
        let result = map.rebuild(&[Seat::new(0, 0), Seat::new(3, 0)], 1);

        // Assert
        assert_eq!(
            result,
            Err(MapError::SeatOutsideGrid { seat: Seat::new(3, 0), rows: 3, columns: 3 })
        );
        assert_eq!(map, before);
    }

    #[test]
    fn test_block_around_never_frees_cells() {
        // Arrange
        let mut map = AvailabilityMap::new(5, 5);
        map.rebuild(&[Seat::new(0, 0)], 1).unwrap();

        // Act
        map.block_around(&[Seat::new(4, 4)], 1).unwrap();

        // Assert – both neighbourhoods are blocked
        assert_eq!(map.blocked_count(), 6);
        assert!(map.is_blocked(Seat::new(0, 1)));
        assert!(map.is_blocked(Seat::new(3, 4)));
    }

    #[test]
    fn test_block_around_equals_rebuild_over_full_history() {
        let first = [Seat::new(1, 1)];
        let second = [Seat::new(5, 6), Seat::new(0, 7)];

        let mut incremental = AvailabilityMap::new(6, 8);
        incremental.rebuild(&first, 2).unwrap();
        incremental.block_around(&second, 2).unwrap();

        let mut full = AvailabilityMap::new(6, 8);
        full.rebuild(&[first[0], second[0], second[1]], 2).unwrap();

        assert_eq!(incremental, full);
    }

    #[test]
    fn test_get_returns_none_outside_grid() {
        let map = AvailabilityMap::new(2, 2);
        assert_eq!(map.get(Seat::new(2, 0)), None);
        assert!(map.is_blocked(Seat::new(0, 2)));
    }

    #[test]
    fn test_row_returns_left_to_right_flags() {
        let mut map = AvailabilityMap::new(2, 4);
        map.rebuild(&[Seat::new(1, 3)], 0).unwrap();
        assert_eq!(map.row(1), Some(&[false, false, false, true][..]));
        assert_eq!(map.row(2), None);
    }

    #[test]
    fn test_check_consistency_detects_truncated_buffer() {
        let mut map = AvailabilityMap::new(2, 2);
        map.cells.pop();
        assert_eq!(
            map.check_consistency(),
            Err(MapError::DimensionMismatch { expected: 4, actual: 3 })
        );
        assert!(map.block_around(&[Seat::new(0, 0)], 0).is_err());
    }
}
