//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request DTOs consumed by the API layer
//! - Conversions from stored strings into `keyholder_core` domain types

pub mod lock;
pub mod lock_history;
pub mod notification;
pub mod relationship;
pub mod stats;
pub mod task;
pub mod user;
