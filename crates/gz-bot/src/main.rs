//! gastozap: WhatsApp expense-tracking webhook bot
//!
//! Receives WhatsApp messages, extracts structured expense data with
//! a language model, appends one row per message to a Google Sheet
//! and confirms back to the sender through Twilio or Meta.

mod pipeline;
mod webhook;

use std::sync::Arc;

use gz_core::{CompletionClient, Config, Extractor};
use gz_sheets::SheetsClient;
use gz_whatsapp::Notifier;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing::info!("Starting gastozap...");
    tracing::info!("Model: {}", config.openai_model);

    let completion = CompletionClient::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to create completion client: {}", e))?;
    let extractor = Extractor::new(completion);
    let sheets = SheetsClient::new(&config);
    let notifier = Notifier::from_config(&config);

    if notifier.has_primary() {
        tracing::info!("Twilio delivery configured (primary)");
    }
    if notifier.has_fallback() {
        tracing::info!("Meta delivery configured (fallback)");
    }
    if !notifier.has_primary() && !notifier.has_fallback() {
        tracing::warn!("No delivery provider configured, confirmations will be dropped");
    }
    if config.spreadsheet_id.is_empty() {
        tracing::warn!("SPREADSHEET_ID not set, ledger appends will fail");
    }

    let port = config.port;
    let state = Arc::new(webhook::AppState {
        config,
        extractor,
        sheets,
        notifier,
    });
    let app = webhook::create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Webhook server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
