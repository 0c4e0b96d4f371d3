//! DashScope multimodal-generation payloads (Qwen-VL models).

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub input: GenerationInput,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
pub struct GenerationInput {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct GenerationParameters {
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: MessageContent,
}

/// Text-only replies may come back as a bare string.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Concatenated text of all text parts.
    pub fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => Some(text),
                    ContentPart::Image { .. } => None,
                })
                .collect(),
        }
    }
}

/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentPart {
    /// Image as a URL or `data:` URL.
    Image { image: String },
    Text { text: String },
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub output: Option<GenerationOutput>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationOutput {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: Option<Message>,
    pub finish_reason: Option<String>,
}
