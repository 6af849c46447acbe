//! Error types for gz-whatsapp

use thiserror::Error;

/// gz-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("Delivery credentials not set")]
    CredentialsNotSet,

    #[error("Webhook signature verification failed")]
    SignatureVerificationFailed,

    #[error("Webhook verification failed")]
    WebhookVerificationFailed,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Delivery API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for WhatsAppError {
    fn from(err: reqwest::Error) -> Self {
        WhatsAppError::Http(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
