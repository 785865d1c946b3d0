//! Core types for Gatecheck.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod code;
pub mod email;
pub mod id;

pub use code::{CheckInCode, CodeError};
pub use email::{Email, EmailError};
pub use id::*;
