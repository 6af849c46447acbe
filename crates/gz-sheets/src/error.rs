//! Error types for gz-sheets

use thiserror::Error;

/// gz-sheets error type
#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Credential file error: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Sheets API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Spreadsheet has no worksheets")]
    NoWorksheets,
}

impl From<reqwest::Error> for SheetsError {
    fn from(err: reqwest::Error) -> Self {
        SheetsError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for SheetsError {
    fn from(err: serde_json::Error) -> Self {
        SheetsError::Credentials(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, SheetsError>;
