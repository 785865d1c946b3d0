//! Guest domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use gatecheck_core::{CheckInCode, Email, GuestId, UserId};

/// A registered guest (domain type).
///
/// Created once by the registry, checked in at most once, never deleted.
/// `scanned_at` is non-null exactly when `scanned` is true; the database
/// enforces this with a CHECK constraint.
#[derive(Debug, Clone)]
pub struct Guest {
    /// Unique guest ID.
    pub id: GuestId,
    /// The guest's check-in code (QR payload and manual-entry token).
    pub unique_code: CheckInCode,
    /// The guest's display name.
    pub full_name: String,
    /// Optional contact email.
    pub email: Option<Email>,
    /// Whether the guest has checked in.
    pub scanned: bool,
    /// When the guest checked in, set exactly once.
    pub scanned_at: Option<DateTime<Utc>>,
    /// Staff account that registered the guest, if known.
    pub created_by: Option<UserId>,
    /// When the guest record was created.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new guest record.
#[derive(Debug, Clone)]
pub struct NewGuest {
    /// The guest's display name.
    pub full_name: String,
    /// Optional contact email.
    pub email: Option<Email>,
    /// Staff account registering the guest.
    pub created_by: Option<UserId>,
}
