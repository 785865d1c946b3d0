//! Gatecheck Core - Shared types library.
//!
//! This crate provides common types used across all Gatecheck components:
//! - `server` - Guest check-in web application
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and check-in codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
