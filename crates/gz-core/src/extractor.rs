//! Free-form message text to structured expense fields

use serde_json::Value;
use tracing::warn;

use crate::expense::{ExtractedExpense, Kind};
use crate::llm::{ChatMessage, CompletionClient};
use crate::text::normalize_label;

/// Output cap for the JSON reply
const MAX_REPLY_TOKENS: u32 = 256;

fn build_prompt(text: &str) -> String {
    format!(
        r#"Você é um assistente financeiro. Extraia os dados da mensagem abaixo e responda SOMENTE com um objeto JSON com as chaves:
amount (número), category (texto), note (texto), payment (texto), type ("expense" ou "income").

Mensagem: "{}""#,
        text
    )
}

/// Expense extractor backed by a chat-completion model
#[derive(Clone)]
pub struct Extractor {
    client: CompletionClient,
}

impl Extractor {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Extract structured fields from `text`.
    ///
    /// Total: transport failures, API errors and unparsable replies
    /// all degrade to `ExtractedExpense::fallback`, never an error.
    /// The model's output is trusted structurally, not semantically.
    pub async fn extract(&self, text: &str) -> ExtractedExpense {
        let request = self
            .client
            .request(vec![ChatMessage::user(build_prompt(text))], 0.0, MAX_REPLY_TOKENS);

        match self.client.complete(request).await {
            Ok(reply) => parse_reply(&reply, text),
            Err(e) => {
                warn!("Extraction failed, using defaults: {}", e);
                ExtractedExpense::fallback(text)
            }
        }
    }
}

/// Parse the JSON object embedded in a model reply: the substring from
/// the first `{` to the last `}`.
fn parse_reply(reply: &str, original: &str) -> ExtractedExpense {
    let (Some(start), Some(end)) = (reply.find('{'), reply.rfind('}')) else {
        warn!("No JSON object in model reply");
        return ExtractedExpense::fallback(original);
    };
    if end < start {
        return ExtractedExpense::fallback(original);
    }

    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(value) => coerce_fields(&value, original),
        Err(e) => {
            warn!("Model reply is not valid JSON: {}", e);
            ExtractedExpense::fallback(original)
        }
    }
}

fn coerce_fields(value: &Value, original: &str) -> ExtractedExpense {
    let amount = match value.get("amount") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().replace(',', ".").parse().unwrap_or(0.0),
        _ => 0.0,
    };

    let category = normalize_label(value.get("category").and_then(Value::as_str).unwrap_or(""));
    let payment_method =
        normalize_label(value.get("payment").and_then(Value::as_str).unwrap_or(""));

    let note = value
        .get("note")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(original)
        .to_string();

    let kind = Kind::from_label(value.get("type").and_then(Value::as_str).unwrap_or("expense"));

    ExtractedExpense {
        amount,
        category,
        note,
        payment_method,
        kind,
    }
}
