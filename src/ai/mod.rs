//! AI provider integration for fortune generation
//!
//! Every upstream provider implements [`CompletionService`]: send one prompt,
//! get the generated text back. Which provider runs is configuration.

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod openai;
pub mod qwen;

#[cfg(test)]
pub(crate) mod test_support;

pub use gemini::GeminiChatClient;
pub use mock::MockCompletionClient;
pub use openai::OpenAiChatClient;
pub use qwen::QwenChatClient;

use crate::models::Prompt;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Provider name for logs.
    fn provider_name(&self) -> &'static str;

    /// Send a single-message prompt and return the first completion's text.
    ///
    /// Implementations make exactly one HTTP call and never retry.
    async fn complete(&self, prompt: &Prompt) -> Result<String>;
}
