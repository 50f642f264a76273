//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Generic pagination parameters (`?limit=&offset=`).
///
/// Handlers clamp the limit with the matching `PageLimits` from
/// [`crate::config::LimitsConfig`] and the offset with `clamp_offset`.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for endpoints scoped to one relationship.
#[derive(Debug, Deserialize)]
pub struct RelationshipParams {
    pub relationship_id: keyholder_core::types::DbId,
}
