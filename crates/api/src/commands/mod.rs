//! State-changing operations.
//!
//! Each command runs in a single transaction: the rows it changes are loaded
//! `FOR UPDATE`, the pure transition from `keyholder_core` decides the new
//! state, and the row update, the history entry and any notifications are
//! written before one commit. A failure at any step rolls everything back.
//!
//! Commands take `now` explicitly; handlers pass `Utc::now()`.

pub mod lock;
pub mod relationship;
pub mod task;
