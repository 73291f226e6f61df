//! HTTP client for the OpenAI REST API
//!
//! One POST per call, bearer authentication, JSON in and out. Nothing is
//! retried: every failure is returned to the caller as-is.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};

use super::types::{
    ApiErrorBody, ChatRequest, ChatResponse, ImageGenerationRequest, ImageGenerationResponse,
};

/// OpenAI API base URL
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for OpenAiClient
pub struct OpenAiClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Default for OpenAiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: None,
        }
    }

    /// Set the API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL (defaults to api.openai.com)
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout in seconds; without one a call may block indefinitely
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Apply base URL and timeout from configuration
    pub fn config(mut self, config: &ApiConfig) -> Self {
        self.base_url = Some(config.base_url.clone());
        self.timeout_secs = config.timeout();
        self
    }

    /// Build the OpenAiClient
    pub fn build(self) -> Result<OpenAiClient> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(Error::MissingApiKey)?;

        let mut http_client = HttpClient::builder();
        if let Some(secs) = self.timeout_secs {
            http_client = http_client.timeout(Duration::from_secs(secs));
        }
        let http_client = http_client.build().map_err(Error::NetworkError)?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(OpenAiClient {
            http_client,
            api_key,
            base_url,
        })
    }
}

impl OpenAiClient {
    /// Create a new OpenAiClient with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        OpenAiClientBuilder::new().api_key(api_key).build()
    }

    /// Create a new builder
    pub fn builder() -> OpenAiClientBuilder {
        OpenAiClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `/chat/completions`
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        debug!(model = %request.model, "Sending chat completion request");
        self.post("chat/completions", request).await
    }

    /// Call `/images/generations`
    pub async fn generate_image(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse> {
        debug!(model = %request.model, size = %request.size, "Sending image generation request");
        self.post("images/generations", request).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(Error::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }

        let bytes = response.bytes().await.map_err(Error::NetworkError)?;
        serde_json::from_slice(&bytes).map_err(Error::unexpected)
    }
}

/// Map a non-2xx response to an error, keeping the API's own message
async fn error_from_response(status: reqwest::StatusCode, response: reqwest::Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    let message = api_error_message(status, &body);

    match status.as_u16() {
        401 => Error::Authentication(message),
        code => Error::Api {
            status: code,
            message,
        },
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    if !body.trim().is_empty() {
        return body.trim().to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_builder_requires_api_key() {
        let result = OpenAiClientBuilder::new().build();
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_builder_rejects_blank_api_key() {
        let result = OpenAiClient::new("   ");
        assert!(matches!(result, Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_builder_with_api_key() {
        let client = OpenAiClient::builder()
            .api_key("sk-test")
            .base_url("http://localhost:1234/v1/")
            .timeout_secs(5)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = OpenAiClient::new("sk-very-secret").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("OpenAiClient"));
        assert!(!debug.contains("sk-very-secret"));
    }

    #[test]
    fn test_api_error_message_prefers_error_body() {
        let body = r#"{"error": {"message": "Billing hard limit has been reached", "type": "invalid_request_error", "code": "billing_hard_limit_reached"}}"#;
        assert_eq!(
            api_error_message(StatusCode::BAD_REQUEST, body),
            "Billing hard limit has been reached"
        );
        assert_eq!(
            api_error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(
            api_error_message(StatusCode::SERVICE_UNAVAILABLE, ""),
            "Service Unavailable"
        );
    }
}
