//! Database migration command.
//!
//! Applies the server crate's migrations. The tower-sessions table is not
//! part of these; the server migrates its own session store at startup.

use super::{CliError, connect};

/// Run database migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
