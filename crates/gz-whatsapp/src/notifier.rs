//! Dual-provider outbound delivery with fallback

use tracing::{error, info};

use gz_core::{Config, Provider};

use crate::meta::MetaClient;
use crate::twilio::TwilioClient;

/// Outbound sender. Twilio is primary when its credential triple is
/// complete; Meta is used when Twilio is unconfigured or its send
/// attempt fails.
pub struct Notifier {
    twilio: Option<TwilioClient>,
    meta: Option<MetaClient>,
}

impl Notifier {
    /// Build from configuration, instantiating only the providers
    /// whose credentials are complete
    pub fn from_config(config: &Config) -> Self {
        let twilio = config
            .twilio_credentials()
            .map(|(sid, token, from)| TwilioClient::new(sid, token, from));
        let meta = config
            .meta_credentials()
            .map(|(token, phone_id)| MetaClient::new(token, phone_id, config.fix_missing_nine));

        Self { twilio, meta }
    }

    pub fn has_primary(&self) -> bool {
        self.twilio.is_some()
    }

    pub fn has_fallback(&self) -> bool {
        self.meta.is_some()
    }

    /// Send `text` to `recipient`, at most one successful attempt per
    /// provider. Failures are logged, never retried or escalated.
    /// Returns the provider that delivered, for logging and tests.
    pub async fn notify(&self, recipient: &str, text: &str) -> Option<Provider> {
        if let Some(twilio) = &self.twilio {
            match twilio.send_message(recipient, text).await {
                Ok(sid) => {
                    info!("Notification delivered via Twilio: {}", sid);
                    return Some(Provider::Twilio);
                }
                Err(e) => error!("Twilio send failed, trying fallback: {}", e),
            }
        }

        if let Some(meta) = &self.meta {
            match meta.send_message(recipient, text).await {
                Ok(()) => {
                    info!("Notification delivered via Meta");
                    return Some(Provider::Meta);
                }
                Err(e) => error!("Meta send failed: {}", e),
            }
        }

        if self.twilio.is_none() && self.meta.is_none() {
            error!("No delivery provider configured, notification dropped");
        }
        None
    }
}
