//! Staff account domain types.

use chrono::{DateTime, Utc};

use gatecheck_core::{Email, UserId};

/// A staff account (domain type).
///
/// Staff accounts gate access to guest management; guests themselves never
/// sign in.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// The account's email address.
    pub email: Email,
    /// Display name shown in the dashboard header.
    pub full_name: String,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
