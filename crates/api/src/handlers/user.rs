//! Handlers for the `/users` resource: own profile, other users' public
//! profiles, and partner search.

use axum::extract::{Path, Query, State};
use axum::Json;
use keyholder_core::error::CoreError;
use keyholder_core::profile::{
    search_pattern, validate_avatar_url, validate_display_name, validate_profile_text,
};
use keyholder_core::roles::Role;
use keyholder_core::types::DbId;
use keyholder_db::models::user::{UpdateProfile, User, UserProfile};
use keyholder_db::repositories::UserRepo;
use serde::Deserialize;

use crate::access;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /users/search`.
#[derive(Debug, Deserialize)]
pub struct UserSearchParams {
    /// Matched against display name and country.
    pub q: String,
    /// Defaults to the side the caller can pair with.
    pub role: Option<Role>,
    pub limit: Option<i64>,
}

/// GET /api/v1/users/me
pub async fn get_me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| access::not_found("User", auth.user_id))?;
    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/users/me
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<User>>> {
    validate_display_name(&input.display_name)?;
    validate_profile_text(input.bio.as_deref(), input.country.as_deref())?;
    validate_avatar_url(input.avatar_url.as_deref())?;

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or_else(|| access::not_found("User", auth.user_id))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/users/{id}
///
/// Suspended and banned accounts are not shown.
pub async fn get_profile(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = UserRepo::find_profile(&state.pool, id)
        .await?
        .ok_or_else(|| access::not_found("User", id))?;
    Ok(Json(DataResponse { data: profile }))
}

/// GET /api/v1/users/search?q=&role=&limit=
///
/// Keyholders find subs and subs find keyholders; admins must name the
/// role they are looking for.
pub async fn search_users(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserSearchParams>,
) -> AppResult<Json<DataResponse<Vec<UserProfile>>>> {
    let role = target_role(&auth, params.role)?;
    let pattern = search_pattern(&params.q)?;
    let limit = state.config.limits.user_search_page.clamp(params.limit);

    let users =
        UserRepo::search(&state.pool, role.as_str(), &pattern, auth.user_id, limit).await?;
    Ok(Json(DataResponse { data: users }))
}

fn target_role(auth: &AuthUser, requested: Option<Role>) -> Result<Role, CoreError> {
    if auth.is_admin() {
        return requested.ok_or_else(|| {
            CoreError::Validation("role is required when searching as an admin".to_string())
        });
    }
    let partner = auth
        .role
        .counterpart()
        .ok_or_else(|| CoreError::Forbidden("Your role cannot be paired".to_string()))?;
    match requested {
        None => Ok(partner),
        Some(role) if role == partner => Ok(role),
        Some(role) => Err(CoreError::Validation(format!(
            "A {} can only search for {partner} accounts, not {role}",
            auth.role
        ))),
    }
}
