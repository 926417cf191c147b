use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use crate::errors::ApiError;

/// Passthrough client for the Mistral chat-completion API.
///
/// The caller's JSON body is forwarded untouched and the upstream status
/// and JSON payload are mirrored back, so the UI talks to the model
/// without the API key ever leaving the backend.
pub struct MistralClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl MistralClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url,
            api_key,
        }
    }

    pub async fn chat(&self, body: Value) -> Result<(StatusCode, Value), ApiError> {
        let response = self
            .http
            .post(completions_url(&self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream {
                status: None,
                message: format!("AI service unreachable: {}", e),
            })?;

        let status =
            StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);

        let payload = response.json::<Value>().await.map_err(|e| ApiError::Upstream {
            status: Some(status),
            message: format!("AI service returned malformed JSON: {}", e),
        })?;

        Ok((status, payload))
    }
}

fn completions_url(base_url: &str) -> String {
    format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
}
