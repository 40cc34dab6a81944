//! Authentication flows: registration, login, refresh rotation, revocation.
//!
//! A failed login never reveals whether the email or the password was wrong.
//! Refresh tokens are single-use: every successful refresh rotates the
//! stored credential, so a replayed old token is rejected.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use tamarind_core::{Email, Phone, RefreshCredential};

use crate::db::users::{NewUser, UserRepository};
use crate::db::RepositoryError;
use crate::models::{AuthUser, User};
use crate::services::tokens::{TokenError, TokenService};

/// Errors from authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Deliberately a single variant.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Refresh token missing, mismatched, expired, or the paired access
    /// token failed verification.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Email or phone already registered.
    #[error("{0}")]
    AlreadyRegistered(String),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(message) => Self::AlreadyRegistered(message),
            other => Self::Repository(other),
        }
    }
}

/// A successfully established session: the user plus both freshly issued
/// tokens. The route layer turns the tokens into cookies; they never appear
/// in a response body.
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh: RefreshCredential,
}

/// Fields for a new account.
#[derive(Debug)]
pub struct Registration<'a> {
    pub email: &'a Email,
    pub phone: &'a Phone,
    pub name: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored Argon2 hash.
#[must_use]
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Orchestrates the session lifecycle over the user repository and the
/// token service.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self { pool, tokens }
    }

    /// Create an account and immediately establish a session for it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AlreadyRegistered` if the email or phone is
    /// taken.
    pub async fn register(&self, registration: Registration<'_>) -> Result<AuthSession, AuthError> {
        let password_hash = hash_password(registration.password)?;

        let user = UserRepository::new(self.pool)
            .create(NewUser {
                email: registration.email,
                phone: registration.phone,
                name: registration.name,
                password_hash: &password_hash,
                role: registration.role,
            })
            .await?;

        self.establish_session(user).await
    }

    /// Verify credentials and establish a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email and for
    /// a wrong password alike.
    pub async fn login(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        let Some((user, password_hash)) = UserRepository::new(self.pool)
            .get_with_password_hash(email)
            .await?
        else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(&password_hash, password) {
            return Err(AuthError::InvalidCredentials);
        }

        self.establish_session(user).await
    }

    /// Exchange an expired access token plus a live refresh token for a
    /// fresh session, rotating the stored refresh credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` when the access token fails
    /// verification (beyond being expired), when no credential is stored,
    /// or when the presented token mismatches or has expired.
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<AuthSession, AuthError> {
        let claims = self
            .tokens
            .claims_from_expired(access_token)
            .map_err(|_| AuthError::InvalidToken)?;
        let email = Email::parse(&claims.email).map_err(|_| AuthError::InvalidToken)?;

        let Some((user, Some(credential))) = UserRepository::new(self.pool)
            .get_with_refresh_credential(&email)
            .await?
        else {
            return Err(AuthError::InvalidToken);
        };

        if !credential.matches(refresh_token) || credential.is_expired(Utc::now()) {
            return Err(AuthError::InvalidToken);
        }

        self.establish_session(user).await
    }

    /// Clear the stored refresh credential, ending the session's ability to
    /// refresh. Idempotent; returns whether a credential-bearing user row
    /// was found.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the update fails.
    pub async fn revoke(&self, user: &AuthUser) -> Result<bool, AuthError> {
        Ok(UserRepository::new(self.pool)
            .clear_refresh_credential(user.id)
            .await?)
    }

    /// Issue both tokens and persist the refresh credential.
    async fn establish_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let auth_user = AuthUser {
            id: user.id,
            email: user.email.as_str().to_owned(),
            role: user.role.clone(),
        };

        let (access_token, access_expires_at) = self.tokens.issue_access_token(&auth_user)?;
        let refresh = self.tokens.issue_refresh_token();

        UserRepository::new(self.pool)
            .set_refresh_credential(user.id, &refresh)
            .await?;

        Ok(AuthSession {
            user,
            access_token,
            access_expires_at,
            refresh,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "correct horse battery staple"));
        assert!(!verify_password(&hash, "wrong password"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
