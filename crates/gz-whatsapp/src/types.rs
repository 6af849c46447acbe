//! Webhook payload shapes for both delivery providers

use serde::Deserialize;

/// Form-encoded delivery from Twilio. Twilio posts many more fields;
/// only sender and body matter here.
#[derive(Debug, Deserialize)]
pub struct TwilioForm {
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "MessageSid", default)]
    pub message_sid: Option<String>,
}

/// Top of the Meta business-account webhook tree
#[derive(Debug, Deserialize)]
pub struct MetaWebhookPayload {
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<MetaEntry>,
}

#[derive(Debug, Deserialize)]
pub struct MetaEntry {
    #[serde(default)]
    pub changes: Vec<MetaChange>,
}

#[derive(Debug, Deserialize)]
pub struct MetaChange {
    pub value: Option<MetaChangeValue>,
}

#[derive(Debug, Deserialize)]
pub struct MetaChangeValue {
    #[serde(default)]
    pub messages: Vec<MetaMessage>,
}

#[derive(Debug, Deserialize)]
pub struct MetaMessage {
    pub from: Option<String>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
    pub text: Option<MetaText>,
}

#[derive(Debug, Deserialize)]
pub struct MetaText {
    pub body: Option<String>,
}

impl MetaWebhookPayload {
    /// True when the payload's object tag identifies a WhatsApp
    /// business account delivery
    pub fn is_whatsapp(&self) -> bool {
        self.object.as_deref() == Some("whatsapp_business_account")
    }

    /// Sender and body of the first message whose type is "text"
    pub fn first_text_message(&self) -> Option<(String, String)> {
        for entry in &self.entry {
            for change in &entry.changes {
                let Some(value) = &change.value else { continue };
                for message in &value.messages {
                    if message.message_type.as_deref() != Some("text") {
                        continue;
                    }
                    if let (Some(from), Some(body)) = (
                        message.from.as_ref(),
                        message.text.as_ref().and_then(|t| t.body.as_ref()),
                    ) {
                        return Some((from.clone(), body.clone()));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META_PAYLOAD: &str = r#"{
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "123456789",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "messages": [
                        {"from": "557591234567", "id": "wamid.1", "type": "image"},
                        {"from": "557591234567", "id": "wamid.2", "type": "text",
                         "text": {"body": "Pizza 50 reais no crédito"}}
                    ]
                }
            }]
        }]
    }"#;

    #[test]
    fn test_first_text_message_skips_non_text() {
        let payload: MetaWebhookPayload = serde_json::from_str(META_PAYLOAD).unwrap();
        assert!(payload.is_whatsapp());

        let (from, body) = payload.first_text_message().unwrap();
        assert_eq!(from, "557591234567");
        assert_eq!(body, "Pizza 50 reais no crédito");
    }

    #[test]
    fn test_status_only_payload_has_no_message() {
        let body = r#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"statuses": [{"status": "delivered"}]}}]}]
        }"#;

        let payload: MetaWebhookPayload = serde_json::from_str(body).unwrap();
        assert!(payload.is_whatsapp());
        assert!(payload.first_text_message().is_none());
    }

    #[test]
    fn test_foreign_object_tag() {
        let payload: MetaWebhookPayload =
            serde_json::from_str(r#"{"object": "page", "entry": []}"#).unwrap();
        assert!(!payload.is_whatsapp());
    }

    #[test]
    fn test_twilio_form_decoding() {
        let body = "From=whatsapp%3A%2B5511999998888&Body=Pizza+50+reais&MessageSid=SM123&AccountSid=AC123";
        let form: TwilioForm = serde_urlencoded::from_str(body).unwrap();
        assert_eq!(form.from, "whatsapp:+5511999998888");
        assert_eq!(form.body, "Pizza 50 reais");
        assert_eq!(form.message_sid.as_deref(), Some("SM123"));
    }
}
