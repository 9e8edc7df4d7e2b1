//! # Assistant Gateway Client
//!
//! Client for the remote tuition assistant service. The service is an opaque
//! collaborator reached over HTTP: it accepts free text and replies with free
//! text or structured data, which is normalized to a display string here.
//!
//! The [`AssistantGateway`] trait is the seam that lets the relay be tested
//! without a network.

use async_trait::async_trait;
use shared::dto::chat::AskRequest;

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};

/// Path of the chat endpoint on the gateway.
const CHAT_ENDPOINT: &str = "/api/v1/ai/chat";

/// Remote service that turns a user utterance into an assistant reply.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Ask the assistant a question. Returns the reply normalized to a
    /// display string.
    async fn ask(&self, message: &str) -> Result<String>;
}

/// HTTP client for the tuition assistant gateway.
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Build a gateway client from the relay configuration. The request
    /// timeout covers the whole call, including connect time.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl AssistantGateway for HttpGateway {
    async fn ask(&self, message: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, CHAT_ENDPOINT);
        let request = AskRequest {
            message: message.to_string(),
        };

        tracing::debug!(url = %url, "Calling assistant gateway");

        let response = self.http.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Gateway(format!(
                "gateway returned {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        Ok(normalize_reply(&body))
    }
}

/// Normalize an opaque gateway payload to a display string.
///
/// A JSON string payload is used as-is, any other JSON payload is serialized
/// back to its compact text, and a body that is not JSON at all is used
/// verbatim.
pub fn normalize_reply(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(value) => value.to_string(),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_json_string() {
        assert_eq!(normalize_reply("\"Your balance is 1000\""), "Your balance is 1000");
    }

    #[test]
    fn test_normalize_structured_payload() {
        let normalized = normalize_reply(r#"{"intent":"CHECK_BALANCE","amount":1000}"#);
        assert_eq!(normalized, r#"{"amount":1000,"intent":"CHECK_BALANCE"}"#);
    }

    #[test]
    fn test_normalize_plain_text() {
        assert_eq!(normalize_reply("Your balance is 1000"), "Your balance is 1000");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = RelayConfig {
            gateway_url: "http://localhost:3001/".to_string(),
            ..RelayConfig::default()
        };
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.base_url, "http://localhost:3001");
    }
}
