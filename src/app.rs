//! Request orchestration: validate, build the prompt, call the provider once,
//! shape the result.

use crate::ai::{CompletionService, GeminiChatClient, OpenAiChatClient, QwenChatClient};
use crate::models::{AiProvider, Config, FortuneRequest, Mode, TarotDraw};
use crate::reading::Reading;
use crate::{Error, Result};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Stateless fortune teller shared by every request.
pub struct App {
    provider: Option<Arc<dyn CompletionService>>,
    tarot_draw: TarotDraw,
}

impl App {
    /// Build an app from a concrete provider. `None` models a deployment with
    /// no credential; every valid request then fails with a configuration
    /// error.
    pub fn with_provider(
        provider: Option<Arc<dyn CompletionService>>,
        tarot_draw: TarotDraw,
    ) -> Self {
        Self {
            provider,
            tarot_draw,
        }
    }

    fn build_provider(config: &Config, api_key: String) -> Arc<dyn CompletionService> {
        let http_client = reqwest::Client::new();
        let model = config.model.clone();
        let params = config.generation;
        let timeout = config.timeout;

        info!(
            "AI provider: {} (model: {}, timeout: {}s)",
            config.provider,
            model,
            timeout.as_secs()
        );

        match config.provider {
            AiProvider::Qwen => {
                let client =
                    QwenChatClient::new_with_client(api_key, model, params, timeout, http_client);
                match &config.base_url {
                    Some(url) => Arc::new(client.with_base_url(url.clone())),
                    None => Arc::new(client),
                }
            }
            AiProvider::OpenAi => {
                let client =
                    OpenAiChatClient::new_with_client(api_key, model, params, timeout, http_client);
                match &config.base_url {
                    Some(url) => Arc::new(client.with_base_url(url.clone())),
                    None => Arc::new(client),
                }
            }
            AiProvider::Gemini => {
                let client =
                    GeminiChatClient::new_with_client(api_key, model, params, timeout, http_client);
                match &config.base_url {
                    Some(url) => Arc::new(client.with_base_url(url.clone())),
                    None => Arc::new(client),
                }
            }
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let provider = match &config.api_key {
            Some(key) => Some(Self::build_provider(config, key.clone())),
            None => {
                warn!("No AI API key configured; readings will fail");
                None
            }
        };

        Self::with_provider(provider, config.tarot_draw)
    }

    /// Produce the analysis text for one request.
    pub async fn tell(&self, request: &FortuneRequest) -> Result<String> {
        let mode: Mode = request
            .mode
            .as_deref()
            .ok_or(Error::InvalidMode(None))?
            .parse()?;

        let provider = self.provider.as_ref().ok_or_else(|| {
            error!("Rejecting {} request: AI API key is not configured", mode);
            Error::MissingApiKey
        })?;

        let reading = Reading::validate(mode, &request.payload, self.tarot_draw)?;
        let prompt = reading.prompt();

        debug!(
            "Sending {} prompt to {} ({} chars, image: {})",
            mode,
            provider.provider_name(),
            prompt.text.len(),
            prompt.image.is_some()
        );

        let text = provider.complete(&prompt).await?;
        let analysis = text.trim();
        if analysis.is_empty() {
            warn!("{} returned empty content for {}", provider.provider_name(), mode);
            return Err(Error::EmptyContent);
        }

        Ok(analysis.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockCompletionClient;
    use crate::models::FortunePayload;

    fn app_with(mock: &MockCompletionClient) -> App {
        App::with_provider(Some(Arc::new(mock.clone())), TarotDraw::Model)
    }

    fn request(mode: &str, payload: FortunePayload) -> FortuneRequest {
        FortuneRequest {
            mode: Some(mode.to_string()),
            payload,
        }
    }

    #[tokio::test]
    async fn test_tell_trims_analysis() {
        let mock = MockCompletionClient::new().with_response("\n  Sun in Taurus...  \n");
        let app = app_with(&mock);

        let payload = FortunePayload {
            birthday: Some("1990-05-01".to_string()),
            ..Default::default()
        };
        let analysis = app.tell(&request("astrology", payload)).await.unwrap();
        assert_eq!(analysis, "Sun in Taurus...");
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_mode_skips_provider() {
        let mock = MockCompletionClient::new();
        let app = app_with(&mock);

        let err = app
            .tell(&request("runes", FortunePayload::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMode(Some(_))));

        let err = app.tell(&FortuneRequest::default()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidMode(None)));
        assert_eq!(mock.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_mode_is_checked_before_credentials() {
        let app = App::with_provider(None, TarotDraw::Model);

        let err = app
            .tell(&request("numerology", FortunePayload::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMode(_)));

        let err = app
            .tell(&request("palm", FortunePayload::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }

    #[tokio::test]
    async fn test_whitespace_reply_is_empty_content() {
        let mock = MockCompletionClient::new().with_response("   \n");
        let app = app_with(&mock);

        let err = app
            .tell(&request("palm", FortunePayload::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmptyContent));
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let mock = MockCompletionClient::new().with_unavailable("status 503");
        let app = app_with(&mock);

        let payload = FortunePayload {
            question: Some("Will I pass my exam?".to_string()),
            ..Default::default()
        };
        let err = app.tell(&request("tarot", payload)).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(_)));
    }

    #[tokio::test]
    async fn test_from_config_without_key_has_no_provider() {
        let config = Config::from_vars(|_| None).unwrap();
        let app = App::from_config(&config);

        let payload = FortunePayload {
            birthday: Some("1990-05-01".to_string()),
            ..Default::default()
        };
        let err = app.tell(&request("astrology", payload)).await.unwrap_err();
        assert!(matches!(err, Error::MissingApiKey));
    }
}
