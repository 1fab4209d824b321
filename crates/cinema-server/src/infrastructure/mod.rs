//! Infrastructure layer for the seating server.
//!
//! Contains the OS-facing adapters: the TCP listener and per-connection
//! sessions, and the TOML configuration file.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `cinema_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod network;
pub mod storage;
