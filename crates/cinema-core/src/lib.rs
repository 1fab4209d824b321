//! # cinema-core
//!
//! Shared library for the cinema seating service containing the seat-allocation
//! domain model and the binary RPC protocol codec.
//!
//! This crate is used by both the server and the command-line client.
//! It has zero dependencies on sockets, async runtimes, or the file system.
//!
//! # Architecture overview (for beginners)
//!
//! The service manages a single rectangular cinema: a grid of `rows × columns`
//! seats, a *minimum distance* rule, and the list of seats already reserved.
//! A new reservation must keep at least the minimum Manhattan distance from
//! every seat reserved before it.
//!
//! This crate (`cinema-core`) is the shared foundation.  It defines:
//!
//! - **`domain`** – Pure business logic with no I/O.  The most important piece
//!   is the [`SeatingPlan`]: the cinema configuration, its reserved seats, and a
//!   derived [`AvailabilityMap`] marking every cell that may not be reserved.
//!
//! - **`protocol`** – How requests and responses travel over the network.
//!   Messages are encoded into a compact binary format (16-byte header +
//!   payload) and decoded back into typed Rust structs on the other end.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `cinema_core::SeatingPlan` instead of `cinema_core::domain::plan::SeatingPlan`.
pub use domain::availability::{AvailabilityMap, MapError};
pub use domain::finder::find_available_seats;
pub use domain::plan::{CinemaSnapshot, SeatingError, SeatingPlan};
pub use domain::seat::{manhattan_distance, Seat};
pub use protocol::codec::{decode_message, encode_message, Frame, ProtocolError};
pub use protocol::messages::{CinemaMessage, Status, StatusCode};
