//! Core types for Pandí Dorty.
//!
//! This module provides type-safe wrappers for the bakery's domain concepts.

pub mod contact;
pub mod email;
pub mod id;
pub mod money;
pub mod order;

pub use contact::{ContactError, CustomerName, Phone};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Czk;
pub use order::*;
