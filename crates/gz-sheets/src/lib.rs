//! gz-sheets: Google Sheets ledger writer for gastozap
//!
//! Appends one row per processed message to a fixed spreadsheet,
//! authenticating with a service-account credential file on every
//! call.

pub mod auth;
pub mod client;
pub mod error;

pub use auth::ServiceAccountKey;
pub use client::SheetsClient;
pub use error::{Result, SheetsError};
