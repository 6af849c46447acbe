//! Webhook server: provider handshake and inbound message delivery

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use gz_core::{Config, Extractor, IncomingMessage, Provider};
use gz_sheets::SheetsClient;
use gz_whatsapp::{MetaWebhookPayload, Notifier, TwilioForm, meta, phone, twilio};

use crate::pipeline;

/// Shared state for the webhook handlers
pub struct AppState {
    pub config: Config,
    pub extractor: Extractor,
    pub sheets: SheetsClient,
    pub notifier: Notifier,
}

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Handshake query parameters
#[derive(Debug, Deserialize)]
struct VerifyParams {
    #[serde(rename = "hub.mode", default)]
    mode: String,
    #[serde(rename = "hub.verify_token", default)]
    verify_token: String,
    #[serde(rename = "hub.challenge", default)]
    challenge: String,
}

/// GET /webhook: the provider's one-time subscription handshake.
/// The only endpoint allowed to answer with an auth failure.
async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    let configured = state.config.verify_token.as_deref().unwrap_or("");
    match meta::verify_webhook(configured, &params.mode, &params.verify_token, &params.challenge) {
        Ok(challenge) => (StatusCode::OK, challenge),
        Err(_) => (StatusCode::FORBIDDEN, "Verification failed".to_string()),
    }
}

/// What the POST handler decided about a request body
enum ParsedBody {
    Message(IncomingMessage),
    Ignored,
}

/// Route a request body by shape: Twilio's form encoding first, then
/// Meta's business-account JSON. Anything else is ignored.
fn parse_body(body: &[u8]) -> ParsedBody {
    if let Ok(form) = serde_urlencoded::from_bytes::<TwilioForm>(body) {
        return ParsedBody::Message(IncomingMessage {
            sender: phone::strip_transport_prefix(&form.from).to_string(),
            text: form.body,
            provider: Provider::Twilio,
        });
    }

    if let Ok(payload) = serde_json::from_slice::<MetaWebhookPayload>(body) {
        if payload.is_whatsapp() {
            if let Some((from, text)) = payload.first_text_message() {
                return ParsedBody::Message(IncomingMessage {
                    sender: from,
                    text,
                    provider: Provider::Meta,
                });
            }
        }
    }

    ParsedBody::Ignored
}

/// Check the X-Twilio-Signature header when validation is enabled.
/// Misconfiguration (no token, no public URL) fails closed.
fn twilio_signature_ok(state: &AppState, headers: &HeaderMap, body: &[u8]) -> bool {
    if !state.config.validate_twilio_signature {
        return true;
    }

    let Some(token) = state.config.twilio_auth_token.as_deref() else {
        warn!("Signature validation enabled without a Twilio auth token");
        return false;
    };
    let Some(base) = state.config.public_url.as_deref() else {
        warn!("Signature validation enabled without PUBLIC_URL");
        return false;
    };

    let signature = headers
        .get("x-twilio-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let params: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap_or_default();
    let url = format!("{}/webhook", base.trim_end_matches('/'));

    twilio::verify_signature(token, &url, &params, signature)
}

/// POST /webhook: inbound message delivery.
///
/// Always acknowledges with 200 so the provider never redelivers; the
/// body carries "ok", "error" or "ignored".
async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let message = match parse_body(&body) {
        ParsedBody::Message(message) => message,
        ParsedBody::Ignored => {
            info!("Unrecognized webhook payload, acknowledging as ignored");
            return (StatusCode::OK, Json(json!({"status": "ignored"})));
        }
    };

    if message.text.trim().is_empty() {
        return (StatusCode::OK, Json(json!({"status": "ignored"})));
    }

    if message.provider == Provider::Twilio && !twilio_signature_ok(&state, &headers, &body) {
        warn!("Twilio signature mismatch, acknowledging as ignored");
        return (StatusCode::OK, Json(json!({"status": "ignored"})));
    }

    info!(
        "Received WhatsApp message via {} from {}",
        message.provider, message.sender
    );

    let report = pipeline::process_message(&state, &message).await;
    let status = if report.appended { "ok" } else { "error" };
    (StatusCode::OK, Json(json!({"status": status})))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use gz_core::CompletionClient;
    use tower::util::ServiceExt;

    fn test_state(config: Config) -> Arc<AppState> {
        let extractor = Extractor::new(CompletionClient::new(&config).unwrap());
        let sheets = SheetsClient::new(&config);
        let notifier = Notifier::from_config(&config);
        Arc::new(AppState {
            config,
            extractor,
            sheets,
            notifier,
        })
    }

    #[test]
    fn test_parse_body_twilio_form() {
        let body = b"From=whatsapp%3A%2B5511999998888&Body=Pizza+50+reais&MessageSid=SM1";
        match parse_body(body) {
            ParsedBody::Message(message) => {
                assert_eq!(message.sender, "+5511999998888");
                assert_eq!(message.text, "Pizza 50 reais");
                assert_eq!(message.provider, Provider::Twilio);
            }
            ParsedBody::Ignored => panic!("form body should parse"),
        }
    }

    #[test]
    fn test_parse_body_meta_json() {
        let body = br#"{
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"messages": [
                {"from": "557591234567", "type": "text", "text": {"body": "Mercado 120"}}
            ]}}]}]
        }"#;
        match parse_body(body) {
            ParsedBody::Message(message) => {
                assert_eq!(message.sender, "557591234567");
                assert_eq!(message.text, "Mercado 120");
                assert_eq!(message.provider, Provider::Meta);
            }
            ParsedBody::Ignored => panic!("meta body should parse"),
        }
    }

    #[test]
    fn test_parse_body_unknown_shapes() {
        assert!(matches!(parse_body(b"not a payload"), ParsedBody::Ignored));
        assert!(matches!(
            parse_body(br#"{"object": "page", "entry": []}"#),
            ParsedBody::Ignored
        ));
        // WhatsApp payload carrying only a status update
        assert!(matches!(
            parse_body(
                br#"{"object": "whatsapp_business_account",
                     "entry": [{"changes": [{"value": {"statuses": []}}]}]}"#
            ),
            ParsedBody::Ignored
        ));
    }

    #[tokio::test]
    async fn test_handshake_echoes_challenge() {
        let config = Config {
            verify_token: Some("segredo".to_string()),
            ..Config::default()
        };
        let app = create_router(test_state(config));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhook?hub.mode=subscribe&hub.verify_token=segredo&hub.challenge=4242")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"4242");
    }

    #[tokio::test]
    async fn test_handshake_rejects_bad_token() {
        let config = Config {
            verify_token: Some("segredo".to_string()),
            ..Config::default()
        };
        let app = create_router(test_state(config));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/webhook?hub.mode=subscribe&hub.verify_token=errado&hub.challenge=4242")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unrecognized_post_is_acknowledged() {
        let app = create_router(test_state(Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"object": "page"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ignored");
    }

    #[tokio::test]
    async fn test_signature_gate_fails_closed_when_misconfigured() {
        let config = Config {
            validate_twilio_signature: true,
            ..Config::default()
        };
        let state = test_state(config);
        assert!(!twilio_signature_ok(&state, &HeaderMap::new(), b"From=x&Body=y"));
    }

    #[tokio::test]
    async fn test_signature_gate_disabled_by_default() {
        let state = test_state(Config::default());
        assert!(twilio_signature_ok(&state, &HeaderMap::new(), b"From=x&Body=y"));
    }
}
