//! Core types for EcoFinds.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, CurrencyCodeError, Price};
pub use status::{LineStatus, LineStatusError};
