//! Storage infrastructure: configuration file persistence.
//!
//! The server keeps no seating state on disk; the cinema lives in memory only.
//! The `config` sub-module reads (and, for tooling and tests, writes) the TOML
//! configuration file, falling back to defaults when it does not exist yet.

pub mod config;
