//! Submission gateway to the storage backend.
//!
//! The backend accepts one JSON batch per request and answers with success
//! or a message. One call is one attempt: there is no retry and no
//! idempotency key.

use crate::config::IntakeConfig;
use crate::constants::GENERIC_SUBMISSION_FAILURE;
use crate::error::{IntakeError, Result};
use crate::models::SubmissionEnvelope;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

/// Backend answer to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOutcome {
    pub ok: bool,
    pub message: Option<String>,
}

impl GatewayOutcome {
    pub fn success() -> Self {
        Self {
            ok: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}

/// Anything that can deliver a submission envelope to storage
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, envelope: &SubmissionEnvelope) -> GatewayOutcome;
}

#[derive(Debug, Deserialize)]
struct BackendReply {
    message: Option<String>,
}

/// Gateway posting JSON to an HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(config: &IntakeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| IntakeError::configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionGateway for HttpGateway {
    async fn submit(&self, envelope: &SubmissionEnvelope) -> GatewayOutcome {
        debug!(
            "POST {} ({} rows)",
            self.endpoint,
            envelope.payload.data.len()
        );

        let response = match self.client.post(&self.endpoint).json(envelope).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Submission transport failure: {}", e);
                return GatewayOutcome::failure(e.to_string());
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        interpret_response(status, &body)
    }
}

/// Map an HTTP status and body to an outcome
///
/// Success needs only a 2xx status. On failure the body's `message` field
/// is passed through verbatim when present.
pub fn interpret_response(status: StatusCode, body: &str) -> GatewayOutcome {
    let message = serde_json::from_str::<BackendReply>(body)
        .ok()
        .and_then(|reply| reply.message)
        .filter(|message| !message.trim().is_empty());

    if status.is_success() {
        GatewayOutcome { ok: true, message }
    } else {
        warn!("Backend rejected submission with status {}", status);
        GatewayOutcome::failure(message.unwrap_or_else(|| GENERIC_SUBMISSION_FAILURE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_without_body() {
        let outcome = interpret_response(StatusCode::CREATED, "");
        assert!(outcome.ok);
        assert_eq!(outcome.message, None);
    }

    #[test]
    fn test_success_keeps_message() {
        let outcome = interpret_response(StatusCode::OK, r#"{"message":"stored 3 planets"}"#);
        assert!(outcome.ok);
        assert_eq!(outcome.message.as_deref(), Some("stored 3 planets"));
    }

    #[test]
    fn test_failure_message_used_verbatim() {
        let outcome = interpret_response(
            StatusCode::BAD_REQUEST,
            r#"{"message":"pl_rade must be numeric"}"#,
        );
        assert_eq!(outcome, GatewayOutcome::failure("pl_rade must be numeric"));
    }

    #[test]
    fn test_failure_without_message_falls_back() {
        for body in ["", "<html>oops</html>", r#"{"error":"x"}"#, r#"{"message":""}"#] {
            let outcome = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, body);
            assert!(!outcome.ok);
            assert_eq!(outcome.message.as_deref(), Some(GENERIC_SUBMISSION_FAILURE));
        }
    }

    #[test]
    fn test_http_gateway_uses_configured_endpoint() {
        let config = IntakeConfig::default().with_endpoint("http://127.0.0.1:9/planets");
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.endpoint(), "http://127.0.0.1:9/planets");
    }
}
