//! cinema-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does cinema-client do? (for beginners)
//!
//! The client talks to `cinema-server` over one TCP connection.  Each call on
//! [`CinemaClient`] sends one request frame, waits for the matching response
//! frame, and turns a non-success status into a [`ClientError::Rejected`].
//!
//! The `cinema-client` binary wraps the library in a small command-line tool:
//!
//! ```text
//! cinema-client get --map
//! cinema-client find 3
//! cinema-client reserve 0:0,0:1,0:2
//! ```

/// Application layer: seat list parsing and seat map rendering.
pub mod application;

/// Infrastructure layer: the TCP connection to the server.
pub mod infrastructure;

pub use infrastructure::connection::{CinemaClient, ClientError};
