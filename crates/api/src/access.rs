//! Relationship-scoped authorization.
//!
//! Account roles only say which side of a pairing a user can take. What a
//! user may do to a particular lock or task depends on their side of that
//! lock's relationship, so these checks run after the relationship is loaded.
//! Admins pass every check.

use keyholder_core::error::CoreError;
use keyholder_core::relationship::{ParticipantRole, RelationshipStatus};
use keyholder_core::types::DbId;
use keyholder_db::models::relationship::Relationship;
use keyholder_db::repositories::RelationshipRepo;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

pub fn not_found(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}

/// The caller must be one of the two participants.
pub fn ensure_participant(rel: &Relationship, user: &AuthUser) -> Result<(), CoreError> {
    if user.is_admin() || rel.participants().role_of(user.user_id).is_some() {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You are not part of this relationship".to_string(),
        ))
    }
}

/// The caller must be the relationship's keyholder.
pub fn ensure_keyholder(rel: &Relationship, user: &AuthUser) -> Result<(), CoreError> {
    ensure_side(rel, user, ParticipantRole::Keyholder, "Only the keyholder can do this")
}

/// The caller must be the relationship's sub.
pub fn ensure_sub(rel: &Relationship, user: &AuthUser) -> Result<(), CoreError> {
    ensure_side(rel, user, ParticipantRole::Sub, "Only the sub can do this")
}

fn ensure_side(
    rel: &Relationship,
    user: &AuthUser,
    side: ParticipantRole,
    message: &str,
) -> Result<(), CoreError> {
    if user.is_admin() || rel.participants().role_of(user.user_id) == Some(side) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(message.to_string()))
    }
}

/// New locks and tasks need an active relationship.
pub fn ensure_active(rel: &Relationship) -> Result<(), CoreError> {
    match rel.status()? {
        RelationshipStatus::Active => Ok(()),
        other => Err(CoreError::Conflict(format!(
            "The relationship is {other}; it must be active"
        ))),
    }
}

/// Who to notify about something `actor` did: the other participant, or
/// the sub when an admin acted.
pub fn counterpart_of(rel: &Relationship, actor: &AuthUser) -> DbId {
    rel.participants()
        .counterpart(actor.user_id)
        .unwrap_or(rel.sub_id)
}

/// Load a relationship the caller takes part in.
pub async fn visible_relationship(
    pool: &PgPool,
    id: DbId,
    user: &AuthUser,
) -> AppResult<Relationship> {
    let rel = RelationshipRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found("Relationship", id))?;
    ensure_participant(&rel, user)?;
    Ok(rel)
}
