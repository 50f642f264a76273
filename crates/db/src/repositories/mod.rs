//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` as the first argument. Methods that participate in a command
//! take the open transaction instead so every write of the command commits
//! together.

pub mod lock_history_repo;
pub mod lock_repo;
pub mod notification_repo;
pub mod relationship_repo;
pub mod stats_repo;
pub mod task_repo;
pub mod user_repo;

pub use lock_history_repo::LockHistoryRepo;
pub use lock_repo::LockRepo;
pub use notification_repo::NotificationRepo;
pub use relationship_repo::RelationshipRepo;
pub use stats_repo::StatsRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
