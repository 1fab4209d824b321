//! Application layer for the command-line client.
//!
//! # Sub-modules
//!
//! - **`seat_map`** – Parses `row:column` seat lists typed on the command
//!   line and renders a cinema snapshot as a text seat map.

pub mod seat_map;
