//! Domain types for the expense pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

/// Messaging integration a message came from (or goes out through)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Meta,
    Twilio,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Meta => write!(f, "meta"),
            Provider::Twilio => write!(f, "twilio"),
        }
    }
}

/// One inbound WhatsApp text, transport prefix already stripped from
/// the sender
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub sender: String,
    pub text: String,
    pub provider: Provider,
}

/// Transaction direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Expense,
    Income,
}

impl Kind {
    /// Parse a model-produced label; anything other than "income" is
    /// an expense
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case("income") {
            Kind::Income
        } else {
            Kind::Expense
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Expense => "expense",
            Kind::Income => "income",
        }
    }
}

/// Structured fields pulled out of a free-form message
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedExpense {
    pub amount: f64,
    pub category: String,
    pub note: String,
    pub payment_method: String,
    pub kind: Kind,
}

impl ExtractedExpense {
    /// Defaults used whenever extraction fails or yields nothing
    /// parsable. The original message text survives as the note.
    pub fn fallback(text: &str) -> Self {
        ExtractedExpense {
            amount: 0.0,
            category: "Geral".to_string(),
            note: text.to_string(),
            payment_method: "Outros".to_string(),
            kind: Kind::Expense,
        }
    }
}

/// One spreadsheet line, fixed column order
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub timestamp: String,
    pub signed_amount: String,
    pub category: String,
    pub note: String,
    pub payment_method: String,
    pub kind: String,
    pub raw_text: String,
}

impl LedgerRow {
    pub fn new(expense: &ExtractedExpense, raw_text: &str, timestamp: String) -> Self {
        LedgerRow {
            timestamp,
            signed_amount: signed_amount(expense.kind, expense.amount),
            category: expense.category.clone(),
            note: expense.note.clone(),
            payment_method: expense.payment_method.clone(),
            kind: expense.kind.as_str().to_string(),
            raw_text: raw_text.to_string(),
        }
    }

    /// Column values in append order
    pub fn values(&self) -> [&str; 7] {
        [
            &self.timestamp,
            &self.signed_amount,
            &self.category,
            &self.note,
            &self.payment_method,
            &self.kind,
            &self.raw_text,
        ]
    }
}

/// Two decimal places, comma as decimal separator, negative magnitude
/// for expenses
pub fn signed_amount(kind: Kind, amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs()).replace('.', ",");
    match kind {
        Kind::Expense => format!("-{}", formatted),
        Kind::Income => formatted,
    }
}
