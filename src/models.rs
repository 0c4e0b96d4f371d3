//! Data models and configuration
//!
//! Defines the inbound request shapes, the prompt handed to AI providers, and
//! the environment-driven service configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Fortune-telling mode selected by the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Birth-chart numerology (four pillars).
    Bazi,
    Palm,
    Astrology,
    Tarot,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bazi" => Ok(Mode::Bazi),
            "palm" => Ok(Mode::Palm),
            "astrology" => Ok(Mode::Astrology),
            "tarot" => Ok(Mode::Tarot),
            other => Err(Error::InvalidMode(Some(other.to_string()))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Bazi => "bazi",
            Mode::Palm => "palm",
            Mode::Astrology => "astrology",
            Mode::Tarot => "tarot",
        };
        f.write_str(name)
    }
}

/// Union of every mode's `data` fields. Which ones are required depends on
/// the mode; see [`crate::reading::Reading`].
#[derive(Debug, Clone, Default)]
pub struct FortunePayload {
    pub birth: Option<String>,
    pub hour: Option<String>,
    pub image: Option<String>,
    pub birthday: Option<String>,
    pub question: Option<String>,
    pub cards: Option<Vec<String>>,
}

/// Strings pass through and numbers are rendered (`"hour": 23` is a valid
/// hour). Anything else counts as absent.
fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

impl FortunePayload {
    /// Reads each field on its own, so a mistyped or unknown field never
    /// hides the others. A non-object `data` is empty.
    pub fn from_value(data: &Value) -> Self {
        let field = |key: &str| data.get(key).and_then(text_field);

        let cards = data.get("cards").and_then(Value::as_array).map(|cards| {
            cards.iter().filter_map(text_field).collect::<Vec<_>>()
        });

        Self {
            birth: field("birth"),
            hour: field("hour"),
            image: field("image"),
            birthday: field("birthday"),
            question: field("question"),
            cards,
        }
    }
}

/// Inbound `{ type, data }` body, parsed leniently.
#[derive(Debug, Clone, Default)]
pub struct FortuneRequest {
    pub mode: Option<String>,
    pub payload: FortunePayload,
}

impl FortuneRequest {
    /// Never fails: unparseable JSON becomes an empty request so that mode
    /// validation produces the user-facing error.
    pub fn from_body(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!("Request body is not JSON ({}), treating as empty", e);
                Value::Null
            }
        };

        let mode = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        let payload = value
            .get("data")
            .map(FortunePayload::from_value)
            .unwrap_or_default();

        Self { mode, payload }
    }
}

/// Inline image attached to a prompt, already base64-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptImage {
    pub mime_type: String,
    pub data: String,
}

impl PromptImage {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The single user message sent upstream for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub text: String,
    pub image: Option<PromptImage>,
}

/// Successful response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

/// Failure response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    /// Alibaba DashScope multimodal generation (Qwen-VL).
    Qwen,
    OpenAi,
    Gemini,
}

impl AiProvider {
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Qwen => "qwen-vl-max",
            AiProvider::OpenAi => "gpt-4o-mini",
            AiProvider::Gemini => "gemini-2.5-flash",
        }
    }

    fn api_key_var(&self) -> &'static str {
        match self {
            AiProvider::Qwen => "QWEN_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
            AiProvider::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl FromStr for AiProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "qwen" | "dashscope" => Ok(AiProvider::Qwen),
            "openai" => Ok(AiProvider::OpenAi),
            "gemini" => Ok(AiProvider::Gemini),
            other => Err(Error::Config(format!(
                "Unknown AI_PROVIDER '{}'. Expected qwen, openai or gemini",
                other
            ))),
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiProvider::Qwen => "Qwen",
            AiProvider::OpenAi => "OpenAI",
            AiProvider::Gemini => "Gemini",
        };
        f.write_str(name)
    }
}

/// Who draws the tarot cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TarotDraw {
    /// The model draws past/present/future cards itself.
    #[default]
    Model,
    /// The request carries three cards drawn in the browser.
    Caller,
}

impl FromStr for TarotDraw {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(TarotDraw::Model),
            "caller" => Ok(TarotDraw::Caller),
            other => Err(Error::Config(format!(
                "Unknown TAROT_DRAW '{}'. Expected model or caller",
                other
            ))),
        }
    }
}

/// Sampling parameters forwarded to every provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            temperature: Some(0.8),
        }
    }
}

pub const MIN_TIMEOUT_SECS: u64 = 20;
pub const MAX_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: AiProvider,
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub generation: GenerationParams,
    pub tarot_draw: TarotDraw,
    pub max_body_bytes: usize,
}

impl Config {
    /// Load from `.env` and the process environment. A missing API key is
    /// fatal here.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from_vars(|key| std::env::var(key).ok())?;
        config.require_api_key()?;
        Ok(config)
    }

    /// Build from an arbitrary variable lookup without checking the API key.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let provider = match var("AI_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::Qwen,
        };

        let api_key = var(provider.api_key_var()).or_else(|| var("AI_API_KEY"));

        let model = var("AI_MODEL").unwrap_or_else(|| provider.default_model().to_string());

        let base_url = var("AI_BASE_URL").map(|url| url.trim_end_matches('/').to_string());

        let timeout_secs = match var("AI_TIMEOUT_SECS") {
            Some(value) => parse_number::<u64>("AI_TIMEOUT_SECS", &value)?,
            None => MAX_TIMEOUT_SECS,
        };
        let clamped = timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        if clamped != timeout_secs {
            tracing::warn!(
                "AI_TIMEOUT_SECS={} is outside {}-{}s, using {}s",
                timeout_secs,
                MIN_TIMEOUT_SECS,
                MAX_TIMEOUT_SECS,
                clamped
            );
        }

        let defaults = GenerationParams::default();
        let generation = GenerationParams {
            max_tokens: match var("AI_MAX_TOKENS") {
                Some(value) => parse_number("AI_MAX_TOKENS", &value)?,
                None => defaults.max_tokens,
            },
            temperature: match var("AI_TEMPERATURE") {
                Some(value) => Some(parse_number("AI_TEMPERATURE", &value)?),
                None => defaults.temperature,
            },
        };

        let tarot_draw = match var("TAROT_DRAW") {
            Some(value) => value.parse()?,
            None => TarotDraw::default(),
        };

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(value) => parse_number("MAX_BODY_BYTES", &value)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            provider,
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(clamped),
            generation,
            tarot_draw,
            max_body_bytes,
        })
    }

    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) => Ok(key),
            None => {
                tracing::error!(
                    "{} (or AI_API_KEY) is not set",
                    self.provider.api_key_var()
                );
                Err(Error::MissingApiKey)
            }
        }
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} must be a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("bazi".parse::<Mode>().unwrap(), Mode::Bazi);
        assert_eq!("tarot".parse::<Mode>().unwrap(), Mode::Tarot);
        assert!(matches!(
            "Tarot".parse::<Mode>(),
            Err(Error::InvalidMode(Some(_)))
        ));
    }

    #[test]
    fn test_from_body_reads_type_and_data() {
        let request = FortuneRequest::from_body(
            br#"{"type":"bazi","data":{"birth":"1990-05-01","hour":"zi"}}"#,
        );
        assert_eq!(request.mode.as_deref(), Some("bazi"));
        assert_eq!(request.payload.birth.as_deref(), Some("1990-05-01"));
        assert_eq!(request.payload.hour.as_deref(), Some("zi"));
    }

    #[test]
    fn test_from_body_invalid_json_is_empty() {
        let request = FortuneRequest::from_body(b"{not json");
        assert!(request.mode.is_none());
        assert!(request.payload.birth.is_none());

        let request = FortuneRequest::from_body(b"");
        assert!(request.mode.is_none());
    }

    #[test]
    fn test_from_body_stray_fields_do_not_hide_image() {
        let request = FortuneRequest::from_body(
            br#"{"type":"palm","data":{"image":"/9j/4AAQSkZJRgABAQ==","hand":"left","question":7,"extra":{"a":[1]}}}"#,
        );
        assert_eq!(
            request.payload.image.as_deref(),
            Some("/9j/4AAQSkZJRgABAQ==")
        );
        assert_eq!(request.payload.question.as_deref(), Some("7"));
    }

    #[test]
    fn test_from_body_numeric_hour_counts() {
        let request =
            FortuneRequest::from_body(br#"{"type":"bazi","data":{"birth":"1990-05-01","hour":23}}"#);
        assert_eq!(request.payload.birth.as_deref(), Some("1990-05-01"));
        assert_eq!(request.payload.hour.as_deref(), Some("23"));
    }

    #[test]
    fn test_from_body_non_scalar_fields_are_absent() {
        let request = FortuneRequest::from_body(
            br#"{"type":"tarot","data":{"question":null,"birthday":true,"cards":["The Fool",{"x":1},"The Moon"]}}"#,
        );
        assert!(request.payload.question.is_none());
        assert!(request.payload.birthday.is_none());
        assert_eq!(
            request.payload.cards,
            Some(vec!["The Fool".to_string(), "The Moon".to_string()])
        );
    }

    #[test]
    fn test_from_body_malformed_data_keeps_mode() {
        let request = FortuneRequest::from_body(br#"{"type":"tarot","data":"what?"}"#);
        assert_eq!(request.mode.as_deref(), Some("tarot"));
        assert!(request.payload.question.is_none());
    }

    #[test]
    fn test_data_url() {
        let image = PromptImage {
            mime_type: "image/png".to_string(),
            data: "iVBORw0KGgo=".to_string(),
        };
        assert_eq!(image.data_url(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[("QWEN_API_KEY", "sk-qwen")]).unwrap();
        assert_eq!(config.provider, AiProvider::Qwen);
        assert_eq!(config.api_key.as_deref(), Some("sk-qwen"));
        assert_eq!(config.model, "qwen-vl-max");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.generation, GenerationParams::default());
        assert_eq!(config.tarot_draw, TarotDraw::Model);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_config_provider_specific_key_wins_over_fallback() {
        let config = config_from(&[
            ("AI_PROVIDER", "openai"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("AI_API_KEY", "sk-generic"),
        ])
        .unwrap();
        assert_eq!(config.provider, AiProvider::OpenAi);
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.model, "gpt-4o-mini");

        let config = config_from(&[("AI_PROVIDER", "gemini"), ("AI_API_KEY", "generic")]).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("generic"));
    }

    #[test]
    fn test_config_missing_key_is_rejected() {
        let config = config_from(&[("QWEN_API_KEY", "   ")]).unwrap();
        assert!(config.api_key.is_none());
        assert!(matches!(
            config.require_api_key(),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn test_config_timeout_is_clamped() {
        let short = config_from(&[("AI_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(short.timeout, Duration::from_secs(MIN_TIMEOUT_SECS));

        let long = config_from(&[("AI_TIMEOUT_SECS", "120")]).unwrap();
        assert_eq!(long.timeout, Duration::from_secs(MAX_TIMEOUT_SECS));

        let ok = config_from(&[("AI_TIMEOUT_SECS", "25")]).unwrap();
        assert_eq!(ok.timeout, Duration::from_secs(25));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            config_from(&[("AI_PROVIDER", "claude-ish")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("AI_MAX_TOKENS", "lots")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("TAROT_DRAW", "dealer")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from(&[
            ("AI_MODEL", "qwen-vl-plus"),
            ("AI_BASE_URL", "http://localhost:8080/"),
            ("AI_MAX_TOKENS", "1200"),
            ("AI_TEMPERATURE", "0.3"),
            ("TAROT_DRAW", "caller"),
        ])
        .unwrap();
        assert_eq!(config.model, "qwen-vl-plus");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.generation.max_tokens, 1200);
        assert_eq!(config.generation.temperature, Some(0.3));
        assert_eq!(config.tarot_draw, TarotDraw::Caller);
    }
}
