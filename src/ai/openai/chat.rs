use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ChatMessageContent, ImageUrl, MessagePart};
use crate::ai::CompletionService;
use crate::models::{GenerationParams, Prompt};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
    params: GenerationParams,
}

impl OpenAiChatClient {
    pub fn new_with_client(
        api_key: String,
        model: String,
        params: GenerationParams,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, timeout, client),
            model,
            params,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn user_message(prompt: &Prompt) -> ChatMessage {
        let content = match &prompt.image {
            None => ChatMessageContent::Text(prompt.text.clone()),
            Some(image) => ChatMessageContent::ImageContent(vec![
                MessagePart {
                    part_type: "image_url".to_string(),
                    text: None,
                    image_url: Some(ImageUrl {
                        url: image.data_url(),
                    }),
                },
                MessagePart {
                    part_type: "text".to_string(),
                    text: Some(prompt.text.clone()),
                    image_url: None,
                },
            ]),
        };

        ChatMessage {
            role: "user".to_string(),
            content: Some(content),
        }
    }
}

#[async_trait]
impl CompletionService for OpenAiChatClient {
    fn provider_name(&self) -> &'static str {
        "OpenAI"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![Self::user_message(prompt)],
            max_completion_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        };

        let response = self.http.chat_completion(&request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| match choice.message.content {
                Some(ChatMessageContent::Text(text)) => Some(text),
                _ => None,
            })
            .ok_or(Error::EmptyContent)
    }
}
