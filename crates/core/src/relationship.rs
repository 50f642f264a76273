//! Keyholder/sub pairing rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Pending,
    Active,
    Paused,
    Ended,
}

impl RelationshipStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipStatus::Pending => "pending",
            RelationshipStatus::Active => "active",
            RelationshipStatus::Paused => "paused",
            RelationshipStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RelationshipStatus::Pending),
            "active" => Ok(RelationshipStatus::Active),
            "paused" => Ok(RelationshipStatus::Paused),
            "ended" => Ok(RelationshipStatus::Ended),
            other => Err(CoreError::Validation(format!(
                "Invalid relationship status '{other}'"
            ))),
        }
    }
}

/// Operations a participant can perform on a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipAction {
    Accept,
    Reject,
    Pause,
    Resume,
    End,
}

impl RelationshipAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipAction::Accept => "accept",
            RelationshipAction::Reject => "reject",
            RelationshipAction::Pause => "pause",
            RelationshipAction::Resume => "resume",
            RelationshipAction::End => "end",
        }
    }
}

/// Status reached by applying `action` in `current`, if allowed.
pub fn next_status(
    current: RelationshipStatus,
    action: RelationshipAction,
) -> Result<RelationshipStatus, CoreError> {
    use RelationshipAction as A;
    use RelationshipStatus as S;

    match (current, action) {
        (S::Pending, A::Accept) => Ok(S::Active),
        (S::Pending, A::Reject) => Ok(S::Ended),
        (S::Active, A::Pause) => Ok(S::Paused),
        (S::Paused, A::Resume) => Ok(S::Active),
        (S::Active | S::Paused, A::End) => Ok(S::Ended),
        _ => Err(CoreError::Conflict(format!(
            "Cannot {} a relationship that is {current}",
            action.as_str()
        ))),
    }
}

/// Which side of the pairing a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Keyholder,
    Sub,
}

/// The two users of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participants {
    pub keyholder_id: DbId,
    pub sub_id: DbId,
}

impl Participants {
    pub fn role_of(&self, user_id: DbId) -> Option<ParticipantRole> {
        if user_id == self.keyholder_id {
            Some(ParticipantRole::Keyholder)
        } else if user_id == self.sub_id {
            Some(ParticipantRole::Sub)
        } else {
            None
        }
    }

    /// The other participant, or `None` when `user_id` is not part of the pair.
    pub fn counterpart(&self, user_id: DbId) -> Option<DbId> {
        match self.role_of(user_id)? {
            ParticipantRole::Keyholder => Some(self.sub_id),
            ParticipantRole::Sub => Some(self.keyholder_id),
        }
    }
}

/// Validate an invitation between two users.
pub fn validate_invite(keyholder_id: DbId, sub_id: DbId) -> Result<(), CoreError> {
    if keyholder_id == sub_id {
        return Err(CoreError::Validation(
            "A user cannot enter a relationship with themselves".to_string(),
        ));
    }
    Ok(())
}

/// Only the invited side may accept or reject a pending invitation.
pub fn ensure_can_respond(initiated_by: DbId, actor_id: DbId) -> Result<(), CoreError> {
    if initiated_by == actor_id {
        Err(CoreError::Forbidden(
            "Only the invited user can respond to this invitation".to_string(),
        ))
    } else {
        Ok(())
    }
}
