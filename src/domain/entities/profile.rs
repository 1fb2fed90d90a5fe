//! Signed-in user profile and role.
//!
//! The profile is cached in session storage under the `user` key next to
//! the token and is cleared with it.

use serde::{Deserialize, Serialize};

/// Console role, which decides the landing view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    Admin,
    User,
}

impl Role {
    /// Convert to the wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }

    /// Route of the dashboard this role lands on after login.
    pub fn home_view(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "/super-admin",
            Self::Admin => "/admin",
            Self::User => "/user",
        }
    }

    /// Whether this role manages organizations and their admins.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Profile of the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID, or admin ID for admins (0 for the super admin)
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Role inside the organization; only users have one
    #[serde(default)]
    pub organization_role: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    /// Admin who owns this user
    #[serde(default)]
    pub admin_id: Option<i64>,
}
