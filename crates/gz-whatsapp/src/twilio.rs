//! Twilio API client for WhatsApp

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WhatsAppError};
use crate::phone;

/// Twilio API client
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

/// Outgoing message payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendMessagePayload {
    from: String,
    to: String,
    body: String,
}

impl TwilioClient {
    /// Create a new Twilio client
    pub fn new(account_sid: &str, auth_token: &str, from_number: &str) -> Self {
        Self {
            client: Client::new(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from_number: from_number.to_string(),
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    /// Override the API base URL (for testing)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Send a WhatsApp message
    pub async fn send_message(&self, to: &str, body: &str) -> Result<String> {
        let recipient = phone::to_twilio_recipient(to);
        info!("Sending WhatsApp message via Twilio to {}", recipient);

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let payload = SendMessagePayload {
            from: phone::to_twilio_sender(&self.from_number),
            to: recipient,
            body: body.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api(format!(
                "Failed to send message: {} - {}",
                status, text
            )));
        }

        #[derive(Deserialize)]
        struct SendMessageResponse {
            sid: String,
        }

        let result: SendMessageResponse = response.json().await?;
        Ok(result.sid)
    }

    /// Verify a webhook signature against this client's auth token
    pub fn verify_signature(&self, url: &str, params: &[(String, String)], signature: &str) -> bool {
        verify_signature(&self.auth_token, url, params, signature)
    }
}

/// Verify a webhook signature: HMAC over the full webhook URL plus
/// the form parameters sorted by name.
pub fn verify_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = match HmacSha256::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut data = url.to_string();
    for (key, value) in sorted {
        data.push_str(key);
        data.push_str(value);
    }
    mac.update(data.as_bytes());

    let expected = mac.finalize().into_bytes();
    let expected_hex = hex::encode(expected);

    expected_hex == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TwilioClient::new("AC123", "token123", "+14155238886");
        assert_eq!(client.account_sid, "AC123");
        assert_eq!(client.from_number, "+14155238886");
    }

    #[test]
    fn test_verify_signature_round_trip() {
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        let client = TwilioClient::new("AC123", "secret", "+14155238886");
        let url = "https://bot.example.com/webhook";
        let params = vec![
            ("From".to_string(), "whatsapp:+5511999998888".to_string()),
            ("Body".to_string(), "Pizza 50".to_string()),
        ];

        // Expected digest over url + params sorted by name
        let mut mac = Hmac::<Sha256>::new_from_slice(b"secret").unwrap();
        mac.update(b"https://bot.example.com/webhookBodyPizza 50Fromwhatsapp:+5511999998888");
        let valid = hex::encode(mac.finalize().into_bytes());

        assert!(client.verify_signature(url, &params, &valid));
        assert!(!client.verify_signature(url, &params, "deadbeef"));
    }

    #[test]
    fn test_payload_uses_twilio_field_names() {
        let payload = SendMessagePayload {
            from: "whatsapp:+14155238886".to_string(),
            to: "whatsapp:+5511999998888".to_string(),
            body: "ok".to_string(),
        };
        let encoded = serde_urlencoded::to_string(&payload).unwrap();
        assert!(encoded.contains("From="));
        assert!(encoded.contains("To="));
        assert!(encoded.contains("Body="));
    }
}
