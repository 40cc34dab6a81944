//! Stored refresh credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's stored refresh credential: the opaque token value and its expiry.
///
/// The two fields are always set together or cleared together; a user row
/// never has one without the other. Call sites compare supplied tokens via
/// [`RefreshCredential::matches`] rather than touching the raw value, so a
/// hashed-at-rest representation can be swapped in later without changing
/// callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshCredential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl RefreshCredential {
    /// Create a credential from a freshly issued token and its expiry.
    #[must_use]
    pub const fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Check a supplied token against the stored value.
    ///
    /// Length is compared first, then every byte is inspected so the
    /// comparison does not short-circuit on the first mismatch.
    #[must_use]
    pub fn matches(&self, supplied: &str) -> bool {
        let stored = self.token.as_bytes();
        let supplied = supplied.as_bytes();
        if stored.len() != supplied.len() {
            return false;
        }
        stored
            .iter()
            .zip(supplied)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }

    /// Whether the credential has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// The stored token value. Only the persistence layer should need this.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Expiry timestamp.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
