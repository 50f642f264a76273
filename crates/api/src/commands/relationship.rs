//! Relationship commands: invite and the accept/reject/pause/resume/end flow.

use keyholder_core::error::CoreError;
use keyholder_core::notifications::{self, NotificationDraft};
use keyholder_core::relationship::{
    ensure_can_respond, next_status, validate_invite, RelationshipAction,
};
use keyholder_core::roles::{Role, USER_STATUS_ACTIVE};
use keyholder_core::types::{DbId, Timestamp};
use keyholder_db::models::relationship::{InviteRelationship, Relationship};
use keyholder_db::repositories::{NotificationRepo, RelationshipRepo, UserRepo};
use sqlx::PgPool;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;

/// Invite another user. A keyholder invites a sub and vice versa.
pub async fn invite(
    pool: &PgPool,
    actor: &AuthUser,
    input: &InviteRelationship,
) -> AppResult<Relationship> {
    let inviter = UserRepo::find_by_id(pool, actor.user_id)
        .await?
        .ok_or_else(|| access::not_found("User", actor.user_id))?;
    let invitee = UserRepo::find_by_id(pool, input.invitee_id)
        .await?
        .ok_or_else(|| access::not_found("User", input.invitee_id))?;

    if inviter.status != USER_STATUS_ACTIVE {
        return Err(CoreError::Forbidden(format!(
            "Your account is {}; invitations cannot be sent",
            inviter.status
        ))
        .into());
    }
    if invitee.status != USER_STATUS_ACTIVE {
        return Err(CoreError::Conflict(format!(
            "User {} cannot be invited while their account is {}",
            invitee.id, invitee.status
        ))
        .into());
    }

    let inviter_role: Role = inviter.role.parse()?;
    let invitee_role: Role = invitee.role.parse()?;
    if inviter_role.counterpart() != Some(invitee_role) {
        return Err(CoreError::Validation(
            "A relationship pairs one keyholder with one sub".to_string(),
        )
        .into());
    }
    let (keyholder_id, sub_id) = if inviter_role == Role::Keyholder {
        (inviter.id, invitee.id)
    } else {
        (invitee.id, inviter.id)
    };
    validate_invite(keyholder_id, sub_id)?;

    let mut tx = pool.begin().await?;
    let rel = RelationshipRepo::create(&mut tx, keyholder_id, sub_id, inviter.id).await?;
    NotificationRepo::insert(
        &mut tx,
        &notifications::relationship_invited(invitee.id, &inviter.display_name),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        relationship_id = rel.id,
        keyholder_id,
        sub_id,
        user_id = actor.user_id,
        "Relationship invitation sent"
    );

    Ok(rel)
}

/// Apply a lifecycle action.
///
/// Either participant may pause, resume or end; only the invited side may
/// accept or reject a pending invitation.
pub async fn transition(
    pool: &PgPool,
    actor: &AuthUser,
    relationship_id: DbId,
    action: RelationshipAction,
    now: Timestamp,
) -> AppResult<Relationship> {
    let mut tx = pool.begin().await?;

    let rel = RelationshipRepo::find_for_update(&mut tx, relationship_id)
        .await?
        .ok_or_else(|| access::not_found("Relationship", relationship_id))?;
    access::ensure_participant(&rel, actor)?;

    if matches!(action, RelationshipAction::Accept | RelationshipAction::Reject) {
        if rel.participants().role_of(actor.user_id).is_none() {
            return Err(CoreError::Forbidden(
                "Only the invited user can respond to this invitation".to_string(),
            )
            .into());
        }
        ensure_can_respond(rel.initiated_by, actor.user_id)?;
    }

    let next = next_status(rel.status()?, action)?;
    let updated = RelationshipRepo::update_status(&mut tx, rel.id, next, now).await?;
    NotificationRepo::insert(&mut tx, &notification_for(&rel, actor, action)).await?;

    tx.commit().await?;

    tracing::info!(
        relationship_id = updated.id,
        user_id = actor.user_id,
        action = action.as_str(),
        status = %updated.status,
        "Relationship updated"
    );

    Ok(updated)
}

fn notification_for(
    rel: &Relationship,
    actor: &AuthUser,
    action: RelationshipAction,
) -> NotificationDraft {
    let other = access::counterpart_of(rel, actor);
    match action {
        RelationshipAction::Accept => notifications::relationship_accepted(rel.initiated_by),
        RelationshipAction::Reject => notifications::relationship_rejected(rel.initiated_by),
        RelationshipAction::Pause => notifications::relationship_paused(other),
        RelationshipAction::Resume => notifications::relationship_resumed(other),
        RelationshipAction::End => notifications::relationship_ended(other),
    }
}
