//! Domain entities for the cinema seating service.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain** (or "entities" layer).  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from network libraries, async runtimes, or the file
//!   system.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here the rules are: which cells of the grid are blocked by existing
//! reservations, which contiguous run of free seats a search returns, when a
//! reservation request is accepted, and which reservations survive a change of
//! grid size or minimum distance.
//!
//! # Sub-modules (leaves first)
//!
//! - **`seat`**         – The [`seat::Seat`] coordinate and Manhattan distance.
//! - **`availability`** – The derived blocked/free grid and its two update
//!   strategies (full rebuild and incremental update).
//! - **`finder`**       – Row-major search for the first run of free seats.
//! - **`plan`**         – The [`plan::SeatingPlan`] aggregate: reservation and
//!   reconfiguration engines on top of the map.

pub mod availability;
pub mod finder;
pub mod plan;
pub mod seat;
