//! EcoFinds Core - Shared types library.
//!
//! This crate provides common types used across all EcoFinds components:
//! - `cart` - Cart ledger, pricing policy, and checkout
//! - `cli` - Command-line driver for the cart ledger
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no async runtime,
//! no backend clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and line statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
