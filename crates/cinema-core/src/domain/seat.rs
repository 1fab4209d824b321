//! Seat coordinates and grid geometry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single seat in the cinema grid.
///
/// Coordinates are 0-indexed: `row` counts from the front row and `column`
/// from the left aisle.  A seat is *in bounds* for a cinema of
/// `rows × columns` when `row < rows` and `column < columns`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seat {
    /// Zero-based row index.
    pub row: u32,
    /// Zero-based column index.
    pub column: u32,
}

impl Seat {
    /// Creates a seat at `(row, column)`.
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Returns `true` if this seat lies inside a `rows × columns` grid.
    pub fn is_within(&self, rows: u32, columns: u32) -> bool {
        self.row < rows && self.column < columns
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// Returns the Manhattan distance `|Δrow| + |Δcolumn|` between two seats.
///
/// Saturates at `u32::MAX` instead of overflowing for coordinates at the far
/// ends of the `u32` range.
///
/// # Examples
///
/// ```rust
/// use cinema_core::{manhattan_distance, Seat};
///
/// assert_eq!(manhattan_distance(Seat::new(2, 2), Seat::new(0, 3)), 3);
/// assert_eq!(manhattan_distance(Seat::new(4, 1), Seat::new(4, 1)), 0);
/// ```
pub fn manhattan_distance(a: Seat, b: Seat) -> u32 {
    a.row
        .abs_diff(b.row)
        .saturating_add(a.column.abs_diff(b.column))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
