//! Infrastructure layer for the client.
//!
//! # Sub-modules
//!
//! - **`connection`** – Owns the TCP stream to the server, encodes requests
//!   with fresh request ids, and decodes the matching responses.

pub mod connection;
