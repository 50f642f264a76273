//! Request handlers.
//!
//! Handlers extract the caller and inputs, delegate state changes to
//! [`crate::commands`] and reads to the repositories in `keyholder_db`, and
//! map errors via [`crate::error::AppError`].

pub mod admin;
pub mod lock;
pub mod notification;
pub mod relationship;
pub mod stats;
pub mod task;
pub mod user;
