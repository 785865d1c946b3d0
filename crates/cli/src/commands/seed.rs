//! Seed the guest table with demo data.
//!
//! Useful for trying the dashboard and scan flow against a fresh database.
//! Roughly a third of the seeded guests arrive already checked in so the
//! stats and activity panel have something to show.

use rand::seq::IndexedRandom;

use gatecheck_core::CheckInCode;

use super::{CliError, connect};

const FIRST_NAMES: &[&str] = &[
    "Alex", "Bailey", "Casey", "Devon", "Emery", "Finley", "Harper", "Jordan", "Kendall", "Logan",
    "Morgan", "Parker", "Quinn", "Riley", "Sage", "Taylor",
];

const LAST_NAMES: &[&str] = &[
    "Adler", "Brooks", "Castillo", "Dawson", "Ellis", "Fischer", "Grant", "Hale", "Ibarra",
    "Jensen", "Keller", "Lindqvist", "Moreau", "Novak", "Okafor", "Petrov",
];

/// Insert `count` demo guests.
///
/// Codes are minted the same way the server mints them; a collision with an
/// existing guest is retried with a fresh code.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails for
/// a reason other than a code collision.
pub async fn guests(count: usize) -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Seeding {count} demo guests...");

    let mut rng = rand::rng();
    let mut inserted = 0usize;

    while inserted < count {
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Alex");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Adler");
        let full_name = format!("{first} {last}");
        let email = format!(
            "{}.{}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        );
        let code = CheckInCode::generate(&mut rng);
        let checked_in = inserted % 3 == 0;

        let result = sqlx::query(
            "INSERT INTO guest (unique_code, full_name, email, scanned, scanned_at) \
             VALUES ($1, $2, $3, $4, CASE WHEN $4 THEN NOW() ELSE NULL END)",
        )
        .bind(&code)
        .bind(&full_name)
        .bind(&email)
        .bind(checked_in)
        .execute(&pool)
        .await;

        match result {
            Ok(_) => inserted += 1,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                tracing::debug!(%code, "seed code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!("Seeded {inserted} guests");
    Ok(())
}
