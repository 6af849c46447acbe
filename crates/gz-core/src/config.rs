//! Configuration management
//!
//! Every setting comes from the process environment, read once at
//! startup. Components receive the loaded `Config` by reference;
//! nothing looks at the environment after `from_env` returns.

/// Process-wide configuration for gastozap
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,

    /// Shared secret for the Meta webhook subscription handshake
    pub verify_token: Option<String>,

    /// Identifier of the spreadsheet holding the ledger
    pub spreadsheet_id: String,

    /// Worksheet the ledger rows go to (first sheet when absent)
    pub worksheet_name: String,

    /// Fallback path to the service-account credential file, used when
    /// the deployment secret mount is not present
    pub credentials_path: String,

    /// Completion API key
    pub openai_api_key: String,

    /// Completion model
    pub openai_model: String,

    /// Completion API endpoint
    pub openai_base_url: String,

    /// Twilio account SID (optional)
    pub twilio_account_sid: Option<String>,

    /// Twilio auth token (optional)
    pub twilio_auth_token: Option<String>,

    /// Twilio WhatsApp sender address (optional)
    pub twilio_from: Option<String>,

    /// Meta Cloud API access token (optional)
    pub meta_token: Option<String>,

    /// Meta Cloud API phone number id (optional)
    pub meta_phone_id: Option<String>,

    /// Insert the missing mobile-prefix "9" into 12-digit Brazilian
    /// numbers on the Meta send path
    pub fix_missing_nine: bool,

    /// Check the X-Twilio-Signature header on form webhooks
    pub validate_twilio_signature: bool,

    /// Externally visible base URL, needed to reconstruct the signed
    /// webhook URL when signature validation is on
    pub public_url: Option<String>,
}

fn default_port() -> u16 {
    5000
}

fn default_worksheet_name() -> String {
    "Gastos".to_string()
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Read an optional env var, treating empty values as unset
fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing credentials never fail the load; the component that
    /// needs them logs and aborts its own operation at use time.
    pub fn from_env() -> Self {
        Config {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or_else(default_port),
            verify_token: env_opt("WHATSAPP_VERIFY_TOKEN"),
            spreadsheet_id: env_opt("SPREADSHEET_ID").unwrap_or_default(),
            worksheet_name: env_opt("WORKSHEET_NAME").unwrap_or_else(default_worksheet_name),
            credentials_path: env_opt("GOOGLE_CREDENTIALS_PATH")
                .unwrap_or_else(default_credentials_path),
            openai_api_key: env_opt("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env_opt("OPENAI_MODEL").unwrap_or_else(default_openai_model),
            openai_base_url: env_opt("OPENAI_BASE_URL").unwrap_or_else(default_openai_base_url),
            twilio_account_sid: env_opt("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: env_opt("TWILIO_AUTH_TOKEN"),
            twilio_from: env_opt("TWILIO_WHATSAPP_FROM"),
            meta_token: env_opt("WHATSAPP_TOKEN"),
            meta_phone_id: env_opt("WHATSAPP_PHONE_ID"),
            fix_missing_nine: env_flag("META_FIX_MISSING_NINE"),
            validate_twilio_signature: env_flag("TWILIO_VALIDATE_SIGNATURE"),
            public_url: env_opt("PUBLIC_URL"),
        }
    }

    /// The Twilio credential triple, present only when all of SID,
    /// auth token and sender address are configured
    pub fn twilio_credentials(&self) -> Option<(&str, &str, &str)> {
        match (
            self.twilio_account_sid.as_deref(),
            self.twilio_auth_token.as_deref(),
            self.twilio_from.as_deref(),
        ) {
            (Some(sid), Some(token), Some(from)) => Some((sid, token, from)),
            _ => None,
        }
    }

    /// The Meta credential pair, present only when both token and
    /// phone id are configured
    pub fn meta_credentials(&self) -> Option<(&str, &str)> {
        match (self.meta_token.as_deref(), self.meta_phone_id.as_deref()) {
            (Some(token), Some(phone_id)) => Some((token, phone_id)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: default_port(),
            verify_token: None,
            spreadsheet_id: String::new(),
            worksheet_name: default_worksheet_name(),
            credentials_path: default_credentials_path(),
            openai_api_key: String::new(),
            openai_model: default_openai_model(),
            openai_base_url: default_openai_base_url(),
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from: None,
            meta_token: None,
            meta_phone_id: None,
            fix_missing_nine: false,
            validate_twilio_signature: false,
            public_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.worksheet_name, "Gastos");
        assert_eq!(config.credentials_path, "credentials.json");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.openai_base_url, "https://api.openai.com/v1");
        assert!(!config.fix_missing_nine);
        assert!(!config.validate_twilio_signature);
    }

    #[test]
    fn test_twilio_credentials_require_all_three() {
        let mut config = Config {
            twilio_account_sid: Some("AC123".to_string()),
            twilio_auth_token: Some("token".to_string()),
            ..Config::default()
        };
        assert!(config.twilio_credentials().is_none());

        config.twilio_from = Some("+14155238886".to_string());
        assert_eq!(
            config.twilio_credentials(),
            Some(("AC123", "token", "+14155238886"))
        );
    }

    #[test]
    fn test_meta_credentials_require_both() {
        let mut config = Config {
            meta_token: Some("token".to_string()),
            ..Config::default()
        };
        assert!(config.meta_credentials().is_none());

        config.meta_phone_id = Some("12345".to_string());
        assert_eq!(config.meta_credentials(), Some(("token", "12345")));
    }
}
