//! Roles carried in access-token claims.
//!
//! Roles are ordered: a role satisfies any requirement at or below it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const ROLE_OPERATOR: &str = "operator";
pub const ROLE_ADMIN: &str = "admin";

/// Who a caller is allowed to act as.
///
/// Operators read progress and notification state; admins also change
/// preferences and subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Operator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Operator => ROLE_OPERATOR,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Whether this role meets a `required` minimum.
    pub fn satisfies(&self, required: Role) -> bool {
        *self >= required
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
            ROLE_OPERATOR => Ok(Role::Operator),
            ROLE_ADMIN => Ok(Role::Admin),
            other => Err(CoreError::InvalidArgument(format!("Unknown role '{other}'"))),
        }
    }
}
