//! Staff account management commands.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use rand::Rng;
use rand::distr::Alphanumeric;

use gatecheck_core::Email;

use super::{CliError, connect};

/// Length of a generated password when none is supplied.
const GENERATED_PASSWORD_LENGTH: usize = 16;

/// Create a new staff account.
///
/// When no password is given, a random one is generated and logged so the
/// account holder can sign in once and change it.
///
/// # Errors
///
/// Returns an error if the email is invalid, the account already exists,
/// or the database operation fails.
pub async fn create(email: &str, name: &str, password: Option<&str>) -> Result<i32, CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let pool = connect().await?;

    let existing: Option<i32> = sqlx::query_scalar("SELECT id FROM app_user WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(CliError::UserExists(email.as_str().to_string()));
    }

    let generated;
    let password = match password {
        Some(p) => p,
        None => {
            generated = random_password();
            tracing::info!("Generated password: {generated}");
            generated.as_str()
        }
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CliError::PasswordHash)?
        .to_string();

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO app_user (email, full_name, password_hash) \
         VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&email)
    .bind(name)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Staff account created! ID: {}, Email: {}",
        user_id,
        email.as_str()
    );

    Ok(user_id)
}

fn random_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_password_length() {
        assert_eq!(random_password().len(), GENERATED_PASSWORD_LENGTH);
    }
}
