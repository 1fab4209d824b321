//! Seat finder: locates the first contiguous run of free seats.
//!
//! Rows are scanned front to back and each row left to right, keeping a
//! running count of consecutive free cells.  The first time the count reaches
//! the requested size, the run ending at the current column is returned.
//! Ties are therefore broken by earliest row, then earliest starting column.

use crate::domain::availability::AvailabilityMap;
use crate::domain::seat::Seat;

/// Returns the first run of `count` adjacent free seats in one row, ordered
/// left to right.
///
/// Returns an empty vector when `count` is zero or when no row holds a long
/// enough run.  Neither case is an error.
///
/// # Examples
///
/// ```rust
/// use cinema_core::{find_available_seats, AvailabilityMap, Seat};
///
/// let map = AvailabilityMap::new(5, 5);
/// assert_eq!(find_available_seats(&map, 1), vec![Seat::new(0, 0)]);
/// assert!(find_available_seats(&map, 6).is_empty());
/// ```
pub fn find_available_seats(map: &AvailabilityMap, count: u32) -> Vec<Seat> {
    if count == 0 || count > map.columns() {
        return Vec::new();
    }

    for row in 0..map.rows() {
        let Some(cells) = map.row(row) else {
            break;
        };

        let mut run = 0u32;
        for (column, blocked) in (0u32..).zip(cells) {
            if *blocked {
                run = 0;
                continue;
            }
            run += 1;
            if run == count {
                let start = column + 1 - count;
                return (start..=column).map(|c| Seat::new(row, c)).collect();
            }
        }
    }

    Vec::new()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
