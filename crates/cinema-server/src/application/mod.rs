//! Application layer use cases for the seating server.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules) and the infrastructure (network/storage).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a caller's goal (e.g., "reserve
//!   these three seats, or none of them").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the storage can be swapped without changing this code.
//! - **Contain no network I/O and no file system access**.
//!
//! # Sub-modules
//!
//! - **`repository`** – The [`repository::SeatRepository`] trait and the
//!   in-memory, lock-guarded cinema that implements it.  Every operation runs
//!   under one reader-writer lock so that concurrent requests can never
//!   double-book a seat.
//!
//! - **`dispatch`** – Turns one decoded request into one response: calls the
//!   repository, enforces the grid size limit, and maps errors to status codes.

pub mod dispatch;
pub mod repository;
