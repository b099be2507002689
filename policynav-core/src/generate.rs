//! Generation capability.
//!
//! A trait seam over the language-model call, with a Google Gemini
//! implementation. Auth is via `?key=` query parameter; the prompt is
//! sent as a single user turn and the answer is read back from
//! `candidates[0].content.parts`. One request per question: no
//! retries, no streaming. Failures propagate to the caller.

use crate::config::GenerationConfig;
use crate::error::{ConfigError, GenerateError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A single-request text-generation capability.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Google Gemini API client.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_output_tokens: u32,
    temperature: f64,
}

impl GeminiClient {
    /// Create a client from configuration.
    ///
    /// Reads the API key from the environment variable named in
    /// `config.api_key_env`. A missing key fails here, at
    /// construction, so misconfiguration is caught before any
    /// document is loaded.
    pub fn new(config: &GenerationConfig) -> Result<Self, ConfigError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv {
                var: config.api_key_env.clone(),
            })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ConfigError::Invalid {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        })
    }

    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request_body(&self, prompt: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}],
            }],
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature,
            },
        })
    }

    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> GenerateError {
        match status.as_u16() {
            401 | 403 => GenerateError::AuthFailed {
                provider: "Gemini".to_string(),
            },
            429 => GenerateError::RateLimited {
                retry_after_secs: 30,
            },
            _ => GenerateError::ApiRequest {
                message: format!("HTTP {} from Gemini API: {}", status, body_text),
            },
        }
    }

    fn parse_response(body: &Value) -> Result<String, GenerateError> {
        let parts = body["candidates"][0]["content"]["parts"]
            .as_array()
            .ok_or_else(|| GenerateError::ResponseParse {
                message: "Response missing candidates[0].content.parts".to_string(),
            })?;

        let text: String = parts
            .iter()
            .filter_map(|p| p["text"].as_str())
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(GenerateError::ResponseParse {
                message: "Response contained no text parts".to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = self.endpoint_url();
        let body = self.build_request_body(prompt);

        debug!(model = self.model.as_str(), "Sending Gemini generation request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Connection {
                message: format!("Request to Gemini API failed: {}", e),
            })?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| GenerateError::ResponseParse {
                message: format!("Failed to read response body: {}", e),
            })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        let response_json: Value =
            serde_json::from_str(&body_text).map_err(|e| GenerateError::ResponseParse {
                message: format!("Invalid JSON in response: {}", e),
            })?;

        Self::parse_response(&response_json)
    }
}
