//! Session-related types.
//!
//! Types stored in the session for authentication state. The session is the
//! only place the signed-in identity lives; handlers receive it through the
//! extractors in [`crate::middleware::auth`] rather than any ambient global.

use serde::{Deserialize, Serialize};

use gatecheck_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name shown in the dashboard header.
    pub full_name: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
