//! gz-whatsapp: WhatsApp delivery providers for gastozap
//!
//! Two integrations reach the same phone: Twilio's WhatsApp API and
//! Meta's Cloud API. The notifier prefers Twilio when fully
//! configured and falls back to Meta.

pub mod error;
pub mod meta;
pub mod notifier;
pub mod phone;
pub mod twilio;
pub mod types;

pub use error::{Result, WhatsAppError};
pub use meta::MetaClient;
pub use notifier::Notifier;
pub use twilio::TwilioClient;
pub use types::{MetaWebhookPayload, TwilioForm};
