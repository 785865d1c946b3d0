//! Guest repository for database operations.
//!
//! Queries are runtime-checked `query_as` calls against row structs; rows are
//! converted into validated domain types on the way out.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatecheck_core::{CheckInCode, Email, GuestId, UserId};

use super::RepositoryError;
use crate::models::guest::{Guest, NewGuest};

const GUEST_COLUMNS: &str =
    "id, unique_code, full_name, email, scanned, scanned_at, created_by, created_at";

/// Raw database row for a guest.
#[derive(Debug, sqlx::FromRow)]
struct GuestRow {
    id: i32,
    unique_code: String,
    full_name: String,
    email: Option<String>,
    scanned: bool,
    scanned_at: Option<DateTime<Utc>>,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<GuestRow> for Guest {
    type Error = RepositoryError;

    fn try_from(row: GuestRow) -> Result<Self, Self::Error> {
        let unique_code = CheckInCode::parse(&row.unique_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid check-in code in database: {e}"))
        })?;

        let email = row
            .email
            .as_deref()
            .map(Email::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
            })?;

        Ok(Self {
            id: GuestId::new(row.id),
            unique_code,
            full_name: row.full_name,
            email,
            scanned: row.scanned,
            scanned_at: row.scanned_at,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
        })
    }
}

/// Repository for guest database operations.
pub struct GuestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GuestRepository<'a> {
    /// Create a new guest repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new guest with the given code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists (the
    /// caller regenerates and retries).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        new_guest: &NewGuest,
        code: &CheckInCode,
    ) -> Result<Guest, RepositoryError> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "INSERT INTO guest (unique_code, full_name, email, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {GUEST_COLUMNS}"
        ))
        .bind(code.as_str())
        .bind(&new_guest.full_name)
        .bind(new_guest.email.as_ref().map(Email::as_str))
        .bind(new_guest.created_by.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("unique_code already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Look up a guest by their check-in code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code(
        &self,
        code: &CheckInCode,
    ) -> Result<Option<Guest>, RepositoryError> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest WHERE unique_code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Guest::try_from).transpose()
    }

    /// Atomically check in the guest with the given code.
    ///
    /// The not-yet-scanned test and the write are a single conditional
    /// update, so concurrent attempts for the same code can produce at most
    /// one success. Returns the updated guest, or `None` when no unscanned
    /// guest matched (unknown code or already checked in - the caller
    /// distinguishes via [`Self::find_by_code`]).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn check_in(&self, code: &CheckInCode) -> Result<Option<Guest>, RepositoryError> {
        let row = sqlx::query_as::<_, GuestRow>(&format!(
            "UPDATE guest SET scanned = TRUE, scanned_at = NOW() \
             WHERE unique_code = $1 AND scanned = FALSE \
             RETURNING {GUEST_COLUMNS}"
        ))
        .bind(code.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(Guest::try_from).transpose()
    }

    /// Load all guests, newest first.
    ///
    /// The guest set is small by design; no pagination.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Guest>, RepositoryError> {
        let rows = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Guest::try_from).collect()
    }

    /// The most recently registered guests.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_created(&self, limit: i64) -> Result<Vec<Guest>, RepositoryError> {
        let rows = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest ORDER BY created_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Guest::try_from).collect()
    }

    /// The most recently checked-in guests.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_checkins(&self, limit: i64) -> Result<Vec<Guest>, RepositoryError> {
        let rows = sqlx::query_as::<_, GuestRow>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guest \
             WHERE scanned ORDER BY scanned_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Guest::try_from).collect()
    }
}
