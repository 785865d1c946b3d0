//! Business logic services for the Gatecheck server.

pub mod auth;
pub mod checkin;
pub mod guests;
pub mod qr;
