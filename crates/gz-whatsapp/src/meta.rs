//! Meta WhatsApp Cloud API client

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{Result, WhatsAppError};
use crate::phone;

/// Cloud API base URL
const META_API_URL: &str = "https://graph.facebook.com/v17.0";

/// Meta Cloud API client
#[derive(Debug, Clone)]
pub struct MetaClient {
    client: Client,
    access_token: String,
    phone_id: String,
    fix_missing_nine: bool,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendMessagePayload {
    messaging_product: &'static str,
    to: String,
    #[serde(rename = "type")]
    message_type: &'static str,
    text: MessageText,
}

#[derive(Debug, Serialize)]
struct MessageText {
    body: String,
}

impl MetaClient {
    /// Create a new Cloud API client
    pub fn new(access_token: &str, phone_id: &str, fix_missing_nine: bool) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.to_string(),
            phone_id: phone_id.to_string(),
            fix_missing_nine,
            base_url: META_API_URL.to_string(),
        }
    }

    /// Override the API base URL (for testing)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Recipient form for the Cloud API: digits only, optionally
    /// corrected for the missing Brazilian mobile "9"
    pub fn format_recipient(&self, to: &str) -> String {
        let digits = phone::clean_digits(to);
        if self.fix_missing_nine {
            phone::fix_missing_nine(&digits)
        } else {
            digits
        }
    }

    /// Send a WhatsApp text message
    pub async fn send_message(&self, to: &str, body: &str) -> Result<()> {
        let recipient = self.format_recipient(to);
        info!("Sending WhatsApp message via Meta to {}", recipient);

        let url = format!("{}/{}/messages", self.base_url, self.phone_id);

        let payload = SendMessagePayload {
            messaging_product: "whatsapp",
            to: recipient,
            message_type: "text",
            text: MessageText {
                body: body.to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Meta API error: {} - {}", status, body);
            return Err(WhatsAppError::Api(format!("{} - {}", status, body)));
        }

        info!("Meta API accepted message: {}", status);
        Ok(())
    }
}

/// Check the one-time webhook subscription handshake: echo the
/// challenge back when the mode is "subscribe" and the token matches.
pub fn verify_webhook(
    verify_token: &str,
    mode: &str,
    token: &str,
    challenge: &str,
) -> Result<String> {
    if mode == "subscribe" && !verify_token.is_empty() && token == verify_token {
        info!("Webhook verified successfully");
        Ok(challenge.to_string())
    } else {
        error!("Webhook verification failed: invalid mode or token");
        Err(WhatsAppError::WebhookVerificationFailed)
    }
}
