use super::CompletionService;
use crate::models::Prompt;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Unavailable(String),
}

/// In-memory provider that records every prompt it receives.
///
/// Configured replies are returned in order and cycle; with none configured
/// it echoes a canned reading.
#[derive(Clone)]
pub struct MockCompletionClient {
    replies: Arc<Mutex<Vec<MockReply>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Text(response.into()));
        self
    }

    /// Reply with [`Error::Upstream`], as a provider outage would.
    pub fn with_unavailable(self, detail: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push(MockReply::Unavailable(detail.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn received_prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionService for MockCompletionClient {
    fn provider_name(&self) -> &'static str {
        "Mock"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String> {
        let count = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len()
        };

        let replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Ok(format!("A mock reading for: {}", prompt.text));
        }

        match &replies[(count - 1) % replies.len()] {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Unavailable(detail) => Err(Error::Upstream(detail.clone())),
        }
    }
}
