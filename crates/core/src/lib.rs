//! Domain logic for the keyholder backend.
//!
//! Everything in this crate is pure: no database, no clock, no I/O. Callers
//! pass `now` explicitly so the timer projection, the lock state machine and
//! the history aggregation can be tested without wall-clock tricks.

pub mod error;
pub mod lock;
pub mod lock_stats;
pub mod notifications;
pub mod pagination;
pub mod profile;
pub mod relationship;
pub mod roles;
pub mod task;
pub mod timer;
pub mod types;
