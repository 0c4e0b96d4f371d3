use super::client::QwenHttpClient;
use super::types::{
    ContentPart, GenerationInput, GenerationParameters, GenerationRequest, Message, MessageContent,
};
use crate::ai::CompletionService;
use crate::models::{GenerationParams, Prompt};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// DashScope client. The multimodal endpoint serves both text-only and
/// image prompts, so one client covers every mode.
pub struct QwenChatClient {
    http: QwenHttpClient,
    model: String,
    params: GenerationParams,
}

impl QwenChatClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        params: GenerationParams,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: QwenHttpClient::new_with_client(api_key, timeout, client),
            model,
            params,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl CompletionService for QwenChatClient {
    fn provider_name(&self) -> &'static str {
        "Qwen"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &prompt.image {
            parts.push(ContentPart::Image {
                image: image.data_url(),
            });
        }
        parts.push(ContentPart::Text {
            text: prompt.text.clone(),
        });

        let request = GenerationRequest {
            model: self.model.clone(),
            input: GenerationInput {
                messages: vec![Message {
                    role: "user".to_string(),
                    content: MessageContent::Parts(parts),
                }],
            },
            parameters: GenerationParameters {
                max_tokens: self.params.max_tokens,
                temperature: self.params.temperature,
            },
        };

        let response = self.http.generate(&request).await?;

        response
            .output
            .and_then(|output| output.choices.into_iter().next())
            .and_then(|choice| choice.message)
            .map(|message| message.content.into_text())
            .ok_or(Error::EmptyContent)
    }
}
