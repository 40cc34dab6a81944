//! User models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tamarind_core::{Email, Phone, UserId};

/// A registered user.
///
/// The password hash and refresh credential are deliberately not part of this
/// struct; the repository exposes them through dedicated lookups so they never
/// travel further than the auth service.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub phone: Phone,
    pub name: String,
    /// Role name ("Admin" or "Customer"), resolved from the roles table.
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this user holds the Admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "Admin"
    }
}

/// The identity recovered from a verified access token.
///
/// Carried by the auth extractors; handlers use it for ownership and role
/// checks without touching the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    pub email: String,
    pub role: String,
}

impl AuthUser {
    /// Whether the token carries the Admin role claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "Admin"
    }
}
