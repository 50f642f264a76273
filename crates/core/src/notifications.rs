//! In-app notification types and message builders.
//!
//! Notifications are side effects of lock, task and relationship commands.
//! The builders here produce the row contents; the command layer inserts
//! them inside the same transaction as the change they describe.

use serde::Serialize;

use crate::lock::LockAction;
use crate::types::DbId;

pub const NOTIFY_LOCK_CREATED: &str = "lock_created";
pub const NOTIFY_LOCK_TIME_CHANGED: &str = "lock_time_changed";
pub const NOTIFY_LOCK_PAUSED: &str = "lock_paused";
pub const NOTIFY_LOCK_RESUMED: &str = "lock_resumed";
pub const NOTIFY_LOCK_COMPLETED: &str = "lock_completed";
pub const NOTIFY_LOCK_CANCELLED: &str = "lock_cancelled";
pub const NOTIFY_TASK_ASSIGNED: &str = "task_assigned";
pub const NOTIFY_TASK_SUBMITTED: &str = "task_submitted";
pub const NOTIFY_TASK_REVIEWED: &str = "task_reviewed";
pub const NOTIFY_RELATIONSHIP_INVITED: &str = "relationship_invited";
pub const NOTIFY_RELATIONSHIP_ACCEPTED: &str = "relationship_accepted";
pub const NOTIFY_RELATIONSHIP_PAUSED: &str = "relationship_paused";
pub const NOTIFY_RELATIONSHIP_RESUMED: &str = "relationship_resumed";
pub const NOTIFY_RELATIONSHIP_ENDED: &str = "relationship_ended";

pub const LINK_LOCKS: &str = "/locks";
pub const LINK_TASKS: &str = "/tasks";
pub const LINK_RELATIONSHIPS: &str = "/relationships";

/// A notification ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationDraft {
    pub user_id: DbId,
    pub notification_type: &'static str,
    pub title: String,
    pub message: String,
    pub link: Option<&'static str>,
}

impl NotificationDraft {
    fn new(
        user_id: DbId,
        notification_type: &'static str,
        title: impl Into<String>,
        message: impl Into<String>,
        link: &'static str,
    ) -> Self {
        Self {
            user_id,
            notification_type,
            title: title.into(),
            message: message.into(),
            link: Some(link),
        }
    }
}

/// Compact human duration, e.g. `"1d 2h 30m"`. Seconds below a minute are
/// dropped; zero renders as `"0m"`.
pub fn format_duration_short(seconds: i64) -> String {
    let seconds = seconds.unsigned_abs();
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if parts.is_empty() {
        "0m".to_string()
    } else {
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// Locks
// ---------------------------------------------------------------------------

pub fn lock_created(sub_id: DbId, lock_name: &str) -> NotificationDraft {
    NotificationDraft::new(
        sub_id,
        NOTIFY_LOCK_CREATED,
        "New lock created",
        format!("Lock \"{lock_name}\" has been created"),
        LINK_LOCKS,
    )
}

pub fn lock_time_changed(user_id: DbId, lock_name: &str, change_seconds: i64) -> NotificationDraft {
    let verb = if change_seconds > 0 {
        "increased"
    } else {
        "decreased"
    };
    NotificationDraft::new(
        user_id,
        NOTIFY_LOCK_TIME_CHANGED,
        "Lock time changed",
        format!(
            "Time on lock \"{lock_name}\" was {verb} by {}",
            format_duration_short(change_seconds)
        ),
        LINK_LOCKS,
    )
}

pub fn lock_paused(user_id: DbId, lock_name: &str) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_LOCK_PAUSED,
        "Lock paused",
        format!("Lock \"{lock_name}\" has been paused"),
        LINK_LOCKS,
    )
}

pub fn lock_resumed(user_id: DbId, lock_name: &str) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_LOCK_RESUMED,
        "Lock resumed",
        format!("Lock \"{lock_name}\" is running again"),
        LINK_LOCKS,
    )
}

pub fn lock_completed(user_id: DbId, lock_name: &str) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_LOCK_COMPLETED,
        "Lock completed",
        format!("Lock \"{lock_name}\" has been completed"),
        LINK_LOCKS,
    )
}

pub fn lock_cancelled(user_id: DbId, lock_name: &str) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_LOCK_CANCELLED,
        "Lock cancelled",
        format!("Lock \"{lock_name}\" has been cancelled"),
        LINK_LOCKS,
    )
}

/// The notification describing a lock history action.
pub fn lock_event(
    recipient_id: DbId,
    action: LockAction,
    lock_name: &str,
    time_change_seconds: i64,
) -> NotificationDraft {
    match action {
        LockAction::Created => lock_created(recipient_id, lock_name),
        LockAction::Paused => lock_paused(recipient_id, lock_name),
        LockAction::Resumed => lock_resumed(recipient_id, lock_name),
        LockAction::TimeAdded | LockAction::TimeRemoved => {
            lock_time_changed(recipient_id, lock_name, time_change_seconds)
        }
        LockAction::Completed => lock_completed(recipient_id, lock_name),
        LockAction::Cancelled => lock_cancelled(recipient_id, lock_name),
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub fn task_assigned(sub_id: DbId, task_title: &str) -> NotificationDraft {
    NotificationDraft::new(
        sub_id,
        NOTIFY_TASK_ASSIGNED,
        "New task",
        format!("You have a new task: \"{task_title}\""),
        LINK_TASKS,
    )
}

pub fn task_submitted(keyholder_id: DbId, task_title: &str) -> NotificationDraft {
    NotificationDraft::new(
        keyholder_id,
        NOTIFY_TASK_SUBMITTED,
        "Task submitted",
        format!("Task \"{task_title}\" is waiting for your review"),
        LINK_TASKS,
    )
}

pub fn task_reviewed(sub_id: DbId, task_title: &str, approved: bool) -> NotificationDraft {
    let (title, verdict) = if approved {
        ("Task approved", "approved")
    } else {
        ("Task rejected", "rejected")
    };
    NotificationDraft::new(
        sub_id,
        NOTIFY_TASK_REVIEWED,
        title,
        format!("Task \"{task_title}\" was {verdict}"),
        LINK_TASKS,
    )
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

pub fn relationship_invited(invitee_id: DbId, inviter_name: &str) -> NotificationDraft {
    NotificationDraft::new(
        invitee_id,
        NOTIFY_RELATIONSHIP_INVITED,
        "New relationship invitation",
        format!("{inviter_name} invited you to a relationship"),
        LINK_RELATIONSHIPS,
    )
}

pub fn relationship_accepted(inviter_id: DbId) -> NotificationDraft {
    NotificationDraft::new(
        inviter_id,
        NOTIFY_RELATIONSHIP_ACCEPTED,
        "Invitation accepted",
        "Your relationship invitation was accepted",
        LINK_RELATIONSHIPS,
    )
}

pub fn relationship_rejected(inviter_id: DbId) -> NotificationDraft {
    NotificationDraft::new(
        inviter_id,
        NOTIFY_RELATIONSHIP_ENDED,
        "Invitation declined",
        "Your relationship invitation was declined",
        LINK_RELATIONSHIPS,
    )
}

pub fn relationship_paused(user_id: DbId) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_RELATIONSHIP_PAUSED,
        "Relationship paused",
        "Your relationship has been paused",
        LINK_RELATIONSHIPS,
    )
}

pub fn relationship_resumed(user_id: DbId) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_RELATIONSHIP_RESUMED,
        "Relationship resumed",
        "Your relationship is active again",
        LINK_RELATIONSHIPS,
    )
}

pub fn relationship_ended(user_id: DbId) -> NotificationDraft {
    NotificationDraft::new(
        user_id,
        NOTIFY_RELATIONSHIP_ENDED,
        "Relationship ended",
        "Your relationship has been ended",
        LINK_RELATIONSHIPS,
    )
}
