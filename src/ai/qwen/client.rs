use super::types::{GenerationRequest, GenerationResponse};
use crate::{Error, Result};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com";
const GENERATION_PATH: &str = "/api/v1/services/aigc/multimodal-generation/generation";

pub struct QwenHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl QwenHttpClient {
    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let url = format!("{}{}", self.base_url, GENERATION_PATH);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to DashScope: {}", e);
                Error::from_transport("Qwen", e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Qwen API error (status {}): {}", status, error_text);
            return Err(Error::Upstream(format!(
                "Qwen API error (status {})",
                status
            )));
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body from DashScope: {}", e);
            Error::from_transport("Qwen", e)
        })?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Qwen response: {}\nBody: {}", e, body);
            Error::MalformedResponse(format!("Failed to parse Qwen response: {}", e))
        })
    }
}
