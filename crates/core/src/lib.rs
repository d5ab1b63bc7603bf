//! Pandí Dorty Core - Shared domain types.
//!
//! This crate provides the types used across the Pandí Dorty components:
//! - `web` - Order forms API, admin API and photo serving
//! - `cli` - Migrations, admin seeding and capacity reports
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. Validation of user-supplied values happens here so
//! that every layer above works with already-valid data.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, contact values, money and the order model
//! - [`catalog`] - Product catalog (sweets, tasting boxes) and payment rules

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod types;

pub use types::*;
