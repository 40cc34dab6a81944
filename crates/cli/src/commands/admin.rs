//! Admin account creation command.

use tamarind_core::{Email, Phone};
use tamarind_server::db::users::{NewUser, UserRepository};
use tamarind_server::services::auth::hash_password;

use super::connect;

/// Create an admin account.
///
/// The password comes from the `--password` flag or, preferably, from the
/// `TAMARIND_ADMIN_PASSWORD` environment variable so it stays out of shell
/// history.
///
/// # Errors
///
/// Returns an error if validation fails, the email or phone is taken, or
/// the database is unreachable.
pub async fn create(
    email: &str,
    name: &str,
    phone: &str,
    password: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let password = match password {
        Some(p) => p.to_owned(),
        None => std::env::var("TAMARIND_ADMIN_PASSWORD")
            .map_err(|_| "pass --password or set TAMARIND_ADMIN_PASSWORD")?,
    };
    if password.len() < 8 {
        return Err("password must be at least 8 characters".into());
    }

    let email = Email::parse(email)?;
    let phone = Phone::parse(phone)?;
    let password_hash = hash_password(&password)?;

    let pool = connect().await?;

    let user = UserRepository::new(&pool)
        .create(NewUser {
            email: &email,
            phone: &phone,
            name,
            password_hash: &password_hash,
            role: "Admin",
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "Admin account created");
    Ok(())
}
