use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::error::TransportError;
use super::health::{decode_health, HealthReport};
use super::traits::ChatTransport;
use super::types::{decode_reply, ChatModule, ChatReply, ChatRequest};
use crate::app::Config;
use crate::constants::{HEALTH_CHECK_TIMEOUT_MS, TRACE_ID_HEADER};
use crate::utils::NativeAiError;

/// reqwest-backed transport for the NativeAI service
pub struct HttpTransport {
    client: Client,
    base_url: String,
    api_prefix: String,
    bearer_token: Option<String>,
}

impl HttpTransport {
    /// Build a transport from the endpoint section of the config.
    ///
    /// The bearer token comes from the environment variable named by
    /// `api_key_env`, falling back to `api_key` from the config.
    pub fn new(config: &Config) -> Result<Self, NativeAiError> {
        let endpoint = &config.endpoint;
        let base_url = endpoint.base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(NativeAiError::ConfigError(format!(
                "endpoint.base_url must start with http:// or https:// (got '{}')",
                endpoint.base_url
            )));
        }

        let bearer_token = std::env::var(&endpoint.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| endpoint.api_key.clone());

        let client = Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| NativeAiError::ConfigError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_prefix: normalize_prefix(&endpoint.api_prefix),
            bearer_token,
        })
    }

    /// Full URL for a path below the API prefix
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    /// Chat URL for a module
    pub fn endpoint_url(&self, module: ChatModule) -> String {
        self.url_for(module.route())
    }

    /// Query the service health endpoint with a short timeout
    pub async fn check_health(&self) -> Result<HealthReport, TransportError> {
        let mut request = self
            .client
            .get(self.url_for("/health"))
            .timeout(Duration::from_millis(HEALTH_CHECK_TIMEOUT_MS));
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        decode_health(status, &body)
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, TransportError> {
        let url = self.endpoint_url(request.module);
        debug!(%url, trace_id = %request.trace_id, session_id = %request.session_id, "Sending chat request");

        let mut http_request = self
            .client
            .post(&url)
            .header(TRACE_ID_HEADER, &request.trace_id)
            .json(&request.to_body());
        if let Some(token) = &self.bearer_token {
            http_request = http_request.bearer_auth(token);
        }

        let response = http_request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), trace_id = %request.trace_id, "Chat response received");

        decode_reply(status, &body)
    }

    fn describe(&self) -> String {
        format!("{}{}", self.base_url, self.api_prefix)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport_with(base_url: &str, prefix: &str) -> HttpTransport {
        let mut config = Config::default();
        config.endpoint.base_url = base_url.to_string();
        config.endpoint.api_prefix = prefix.to_string();
        config.endpoint.api_key_env = "NATIVEAI_TEST_UNSET_KEY_VAR".to_string();
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let transport = transport_with("http://localhost:8000/", "/nativeai");
        assert_eq!(
            transport.endpoint_url(ChatModule::ShippingFee),
            "http://localhost:8000/nativeai/agents/shipping-fee/chat"
        );
        assert_eq!(
            transport.endpoint_url(ChatModule::Assistant),
            "http://localhost:8000/nativeai/llm/question"
        );
        assert_eq!(transport.url_for("/health"), "http://localhost:8000/nativeai/health");
    }

    #[test]
    fn test_prefix_normalization() {
        assert_eq!(normalize_prefix("nativeai/"), "/nativeai");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix(""), "");
        let transport = transport_with("http://api.example.com", "");
        assert_eq!(transport.describe(), "http://api.example.com");
    }

    #[test]
    fn test_rejects_base_url_without_scheme() {
        let mut config = Config::default();
        config.endpoint.base_url = "localhost:8000".to_string();
        assert!(matches!(
            HttpTransport::new(&config),
            Err(NativeAiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_bearer_token_falls_back_to_config() {
        let mut config = Config::default();
        config.endpoint.api_key_env = "NATIVEAI_TEST_UNSET_KEY_VAR".to_string();
        config.endpoint.api_key = Some("sk-local".to_string());
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.bearer_token.as_deref(), Some("sk-local"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_transport_error() {
        // Port 9 (discard) on localhost is essentially never listening
        let transport = transport_with("http://127.0.0.1:9", "/nativeai");
        let request = ChatRequest {
            module: ChatModule::ShippingFee,
            text: "hello".to_string(),
            session_id: "s1".to_string(),
            user_id: "u1".to_string(),
            trace_id: "t1".to_string(),
        };
        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Network(_) | TransportError::Timeout(_)
        ));
    }
}
