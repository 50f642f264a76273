//! Relationship models and DTOs.

use keyholder_core::error::CoreError;
use keyholder_core::relationship::{Participants, RelationshipStatus};
use keyholder_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `relationships` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Relationship {
    pub id: DbId,
    pub keyholder_id: DbId,
    pub sub_id: DbId,
    pub initiated_by: DbId,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Relationship {
    pub fn participants(&self) -> Participants {
        Participants {
            keyholder_id: self.keyholder_id,
            sub_id: self.sub_id,
        }
    }

    pub fn status(&self) -> Result<RelationshipStatus, CoreError> {
        self.status.parse()
    }
}

/// Relationship row joined with both participants' display names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RelationshipSummary {
    pub id: DbId,
    pub keyholder_id: DbId,
    pub keyholder_name: String,
    pub sub_id: DbId,
    pub sub_name: String,
    pub initiated_by: DbId,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for inviting another user. The inviter's side is taken from their
/// account role; the invitee fills the other side.
#[derive(Debug, Deserialize)]
pub struct InviteRelationship {
    pub invitee_id: DbId,
}
