//! Domain models for the Gatecheck server.

pub mod guest;
pub mod session;
pub mod user;

pub use guest::Guest;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
