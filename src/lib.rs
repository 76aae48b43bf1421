//! Voucher Ledger - household voucher claim and redemption engine
//!
//! Households claim fixed tranches of $2/$5/$10 vouchers and spend them at
//! registered merchants. Every committed redemption is compiled into an
//! hour-bucketed, append-only CSV audit trail.
//!
//! # Architecture
//!
//! - `config`: Path and settings management
//! - `error`: Custom error types
//! - `models`: Core data models (vouchers, households, merchants, tranches)
//! - `catalog`: Tranche definitions, built-in or loaded from a file
//! - `storage`: JSON file storage layer with per-household locking
//! - `services`: Business logic (ledger, redemption selection, registration)
//! - `audit`: Hour-bucketed CSV audit trail
//! - `display`: Terminal output formatting
//! - `cli`: clap command handlers

pub mod audit;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{VoucherError, VoucherResult};
