//! Network infrastructure for the seating server.
//!
//! # Sub-modules
//!
//! - **`server`** – Binds the TCP listener, runs the accept loop until the
//!   shutdown flag is cleared, and drives one request/response session per
//!   connection.

pub mod server;

pub use server::{bind, serve};
