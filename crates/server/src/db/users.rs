//! User repository.
//!
//! Exposes only the operations the auth and user-management flows need:
//! lookups by email/id, creation, refresh-credential updates, and profile
//! changes. The refresh credential's two columns are always written together
//! or cleared together.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use tamarind_core::{Email, Phone, RefreshCredential, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Fields required to insert a new user.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub email: &'a Email,
    pub phone: &'a Phone,
    pub name: &'a str,
    pub password_hash: &'a str,
    /// Role name to attach ("Customer" for self-registration).
    pub role: &'a str,
}

/// Raw user row joined with its role name.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    phone: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let phone = Phone::parse(&self.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            email,
            phone,
            name: self.name,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "u.id, u.email, u.phone, u.name, r.name AS role, \
                            u.created_at, u.updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored email/phone is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON u.role_id = r.id \
             WHERE u.id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN roles r ON u.role_id = r.id \
             ORDER BY u.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    /// Create a new user with the given role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone already
    /// exists, `RepositoryError::DataCorruption` if the role is not seeded,
    /// and `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let role_id: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM roles WHERE name = $1")
            .bind(new_user.role)
            .fetch_optional(self.pool)
            .await?;

        let Some((role_id,)) = role_id else {
            return Err(RepositoryError::DataCorruption(format!(
                "role '{}' is not seeded",
                new_user.role
            )));
        };

        let row = sqlx::query_as::<_, UserRow>(
            "WITH inserted AS (
                 INSERT INTO users (email, phone, name, password_hash, role_id)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, email, phone, name, role_id, created_at, updated_at
             )
             SELECT u.id, u.email, u.phone, u.name, r.name AS role,
                    u.created_at, u.updated_at
             FROM inserted u JOIN roles r ON u.role_id = r.id",
        )
        .bind(new_user.email.as_str())
        .bind(new_user.phone.as_str())
        .bind(new_user.name)
        .bind(new_user.password_hash)
        .bind(role_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email or phone already exists"))?;

        row.into_user()
    }

    /// Get a user together with their password hash, for login.
    ///
    /// Returns `None` if no user exists with that email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, Row>(&format!(
            "SELECT {USER_COLUMNS}, u.password_hash \
             FROM users u JOIN roles r ON u.role_id = r.id \
             WHERE u.email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.into_user()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Get a user together with their stored refresh credential, for refresh.
    ///
    /// The credential is `None` when it has been revoked or never issued.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if exactly one of the two
    /// credential columns is set.
    pub async fn get_with_refresh_credential(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<RefreshCredential>)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            user: UserRow,
            refresh_token: Option<String>,
            refresh_token_expires_at: Option<DateTime<Utc>>,
        }

        let row = sqlx::query_as::<_, Row>(&format!(
            "SELECT {USER_COLUMNS}, u.refresh_token, u.refresh_token_expires_at \
             FROM users u JOIN roles r ON u.role_id = r.id \
             WHERE u.email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let credential = match (r.refresh_token, r.refresh_token_expires_at) {
            (Some(token), Some(expires_at)) => Some(RefreshCredential::new(token, expires_at)),
            (None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(
                    "refresh token and expiry must be set together".to_owned(),
                ));
            }
        };

        Ok(Some((r.user.into_user()?, credential)))
    }

    /// Store a new refresh credential, overwriting any previous one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_refresh_credential(
        &self,
        user_id: UserId,
        credential: &RefreshCredential,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET refresh_token = $1, refresh_token_expires_at = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(credential.token())
        .bind(credential.expires_at())
        .bind(user_id.as_uuid())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Clear the stored refresh credential.
    ///
    /// Returns `true` if a user row was updated, `false` if the user doesn't
    /// exist. Idempotent: clearing an already-clear credential succeeds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_refresh_credential(&self, user_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users \
             SET refresh_token = NULL, refresh_token_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update a user's display name and phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone is already taken and
    /// `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: &str,
        phone: &Phone,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "WITH updated AS (
                 UPDATE users SET name = $1, phone = $2, updated_at = NOW()
                 WHERE id = $3
                 RETURNING id, email, phone, name, role_id, created_at, updated_at
             )
             SELECT u.id, u.email, u.phone, u.name, r.name AS role,
                    u.created_at, u.updated_at
             FROM updated u JOIN roles r ON u.role_id = r.id",
        )
        .bind(name)
        .bind(phone.as_str())
        .bind(user_id.as_uuid())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "phone already exists"))?;

        row.map_or(Err(RepositoryError::NotFound), UserRow::into_user)
    }

    /// Get just the password hash for a user, for password changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        user_id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT password_hash FROM users WHERE id = $1")
                .bind(user_id.as_uuid())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(hash,)| hash))
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_password_hash(
        &self,
        user_id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
                .bind(password_hash)
                .bind(user_id.as_uuid())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
