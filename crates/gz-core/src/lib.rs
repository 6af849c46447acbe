//! gz-core: gastozap core library
//!
//! Configuration, domain types, label normalization and the
//! chat-completion extraction client shared by the gastozap crates.

pub mod config;
pub mod error;
pub mod expense;
pub mod extractor;
pub mod llm;
pub mod text;

pub use config::Config;
pub use error::{Error, Result};
pub use expense::{ExtractedExpense, IncomingMessage, Kind, LedgerRow, Provider};
pub use extractor::Extractor;
pub use llm::{ChatMessage, CompletionClient};
pub use text::normalize_label;
