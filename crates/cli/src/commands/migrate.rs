//! Database migration command.
//!
//! Runs the migrations embedded in the server crate
//! (`crates/server/migrations/`). The server never migrates on startup;
//! this command is the only migration path.

use super::connect;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    tamarind_server::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
