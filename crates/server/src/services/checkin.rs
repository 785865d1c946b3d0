//! Check-in workflow.
//!
//! Both the scan page (QR payload) and the check page (manual entry) resolve
//! a code through [`CheckInService::check_in`]. The not-yet-scanned test and
//! the write are one conditional update in the repository, so two concurrent
//! attempts for the same code produce exactly one success.

use sqlx::PgPool;

use gatecheck_core::CheckInCode;

use crate::db::RepositoryError;
use crate::db::guests::GuestRepository;
use crate::models::guest::Guest;

/// Result of a check-in attempt.
#[derive(Debug)]
pub enum CheckInOutcome {
    /// The guest has been checked in by this attempt.
    CheckedIn(Guest),
    /// The guest was already checked in; `scanned_at` is unchanged.
    AlreadyCheckedIn(Guest),
    /// No guest has this code.
    InvalidCode,
}

/// Check-in service.
pub struct CheckInService<'a> {
    guests: GuestRepository<'a>,
}

impl<'a> CheckInService<'a> {
    /// Create a new check-in service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            guests: GuestRepository::new(pool),
        }
    }

    /// Attempt to check in the guest with the given code.
    ///
    /// Unknown codes and repeat attempts are normal outcomes, not errors;
    /// neither mutates anything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only for database failures.
    pub async fn check_in(&self, code: &CheckInCode) -> Result<CheckInOutcome, RepositoryError> {
        if let Some(guest) = self.guests.check_in(code).await? {
            tracing::info!(guest_id = %guest.id, %code, "guest checked in");
            return Ok(CheckInOutcome::CheckedIn(guest));
        }

        // The conditional update matched nothing: either the code is unknown
        // or the guest already checked in.
        match self.guests.find_by_code(code).await? {
            Some(guest) => Ok(CheckInOutcome::AlreadyCheckedIn(guest)),
            None => Ok(CheckInOutcome::InvalidCode),
        }
    }
}
