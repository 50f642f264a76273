//! Well-known role and account status constants.
//!
//! These must match the CHECK constraints in `20260301000001_create_users.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_KEYHOLDER: &str = "keyholder";
pub const ROLE_SUB: &str = "sub";

/// All valid account roles.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_KEYHOLDER, ROLE_SUB];

pub const USER_STATUS_ACTIVE: &str = "active";
pub const USER_STATUS_SUSPENDED: &str = "suspended";
pub const USER_STATUS_BANNED: &str = "banned";

/// All valid account statuses.
pub const VALID_USER_STATUSES: &[&str] =
    &[USER_STATUS_ACTIVE, USER_STATUS_SUSPENDED, USER_STATUS_BANNED];

/// An account role, as carried in access tokens and stored on `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Keyholder,
    Sub,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Keyholder => ROLE_KEYHOLDER,
            Role::Sub => ROLE_SUB,
        }
    }

    /// The role on the other side of a pairing. Admins are never paired.
    pub fn counterpart(self) -> Option<Role> {
        match self {
            Role::Keyholder => Some(Role::Sub),
            Role::Sub => Some(Role::Keyholder),
            Role::Admin => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_KEYHOLDER => Ok(Role::Keyholder),
            ROLE_SUB => Ok(Role::Sub),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }
}

/// Validate that a role string is one of the accepted values.
pub fn validate_role(role: &str) -> Result<(), CoreError> {
    role.parse::<Role>().map(|_| ())
}

/// Validate that an account status string is one of the accepted values.
pub fn validate_user_status(status: &str) -> Result<(), CoreError> {
    if VALID_USER_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid user status '{status}'. Must be one of: {}",
            VALID_USER_STATUSES.join(", ")
        )))
    }
}
