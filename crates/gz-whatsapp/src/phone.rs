//! Phone-number surface forms
//!
//! The same number arrives as `+551199998888`, `551199998888` or
//! `whatsapp:+551199998888` depending on the provider. Each provider
//! wants its own form back.

/// Transport prefix carried by Twilio addresses
const WHATSAPP_PREFIX: &str = "whatsapp:";

/// Drop a leading `whatsapp:` prefix
pub fn strip_transport_prefix(addr: &str) -> &str {
    addr.strip_prefix(WHATSAPP_PREFIX).unwrap_or(addr)
}

/// Twilio sender form: `whatsapp:` prefix present
pub fn to_twilio_sender(addr: &str) -> String {
    if addr.starts_with(WHATSAPP_PREFIX) {
        addr.to_string()
    } else {
        format!("{}{}", WHATSAPP_PREFIX, addr)
    }
}

/// Twilio recipient form: `whatsapp:` prefix present and a leading
/// `+` on the bare number
pub fn to_twilio_recipient(addr: &str) -> String {
    if addr.starts_with(WHATSAPP_PREFIX) {
        return addr.to_string();
    }
    if addr.starts_with('+') {
        format!("{}{}", WHATSAPP_PREFIX, addr)
    } else {
        format!("{}+{}", WHATSAPP_PREFIX, addr)
    }
}

/// Meta recipient form: digits only, no `+`, no transport prefix
pub fn clean_digits(addr: &str) -> String {
    strip_transport_prefix(addr).replace('+', "")
}

/// Brazil mobile correction.
///
/// A 12-digit number starting with country code 55 is missing the
/// mobile-prefix "9"; insert it after the country code and two-digit
/// area code. 13-digit numbers and non-Brazilian numbers pass through
/// unchanged.
pub fn fix_missing_nine(number: &str) -> String {
    if number.starts_with("55")
        && number.len() == 12
        && number.chars().all(|c| c.is_ascii_digit())
    {
        format!("{}9{}", &number[..4], &number[4..])
    } else {
        number.to_string()
    }
}
