use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, InlineData, Part,
};
use crate::ai::CompletionService;
use crate::models::{GenerationParams, Prompt};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiChatClient {
    http: GeminiHttpClient,
    params: GenerationParams,
}

impl GeminiChatClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        params: GenerationParams,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
            params,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn extract_text(response: GenerateContentResponse) -> Option<String> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|content| {
                content.parts.into_iter().find_map(|p| match p {
                    Part::Text { text } => Some(text),
                    Part::InlineData { .. } => None,
                })
            })
    }
}

#[async_trait]
impl CompletionService for GeminiChatClient {
    fn provider_name(&self) -> &'static str {
        "Gemini"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &prompt.image {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            });
        }
        parts.push(Part::Text {
            text: prompt.text.clone(),
        });

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.params.max_tokens,
                temperature: self.params.temperature,
            },
        };

        tracing::debug!("Sending generateContent request to {}", self.http.model());
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        Self::extract_text(response).ok_or(Error::EmptyContent)
    }
}
