//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror. Every
//! variant maps to an HTTP status and a message that is safe to show the
//! browser; upstream details stay in the `Display` output for logs only.

use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid fortune type: {0:?}")]
    InvalidMode(Option<String>),

    #[error("Missing birth date or birth hour")]
    MissingBirthInfo,

    #[error("Missing birthday")]
    MissingBirthday,

    #[error("Missing tarot question")]
    MissingQuestion,

    #[error("Tarot reading needs exactly three drawn cards")]
    MissingCards,

    #[error("Invalid palm image: {0}")]
    InvalidImage(String),

    #[error("AI API key is not configured")]
    MissingApiKey,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("AI provider unavailable: {0}")]
    Upstream(String),

    #[error("AI provider returned an unreadable response: {0}")]
    MalformedResponse(String),

    #[error("AI provider returned empty content")]
    EmptyContent,

    #[error("Request body exceeds the configured limit")]
    PayloadTooLarge,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidMode(_)
            | Error::MissingBirthInfo
            | Error::MissingBirthday
            | Error::MissingQuestion
            | Error::MissingCards
            | Error::InvalidImage(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::MissingApiKey
            | Error::Config(_)
            | Error::MalformedResponse(_)
            | Error::EmptyContent
            | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the browser. Never includes upstream bodies.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::MethodNotAllowed => "Only POST requests are supported",
            Error::InvalidMode(_) => "Invalid fortune type",
            Error::MissingBirthInfo => "Please provide your birth date and birth hour",
            Error::MissingBirthday => "Please provide your birthday",
            Error::MissingQuestion => "Please ask a specific question",
            Error::MissingCards => "Please draw three tarot cards first",
            Error::InvalidImage(_) => "The palm image must be base64-encoded",
            Error::PayloadTooLarge => "The request is too large, try a smaller image",
            Error::MissingApiKey => "The server has no AI key configured",
            Error::Upstream(_) => "The AI service is temporarily unavailable, please try again later",
            Error::EmptyContent => "The AI returned no content",
            Error::Config(_) | Error::MalformedResponse(_) | Error::Io(_) => {
                "Internal server error"
            }
        }
    }

    /// Any transport failure while talking to the provider (timeout, refused
    /// connection, reset, stalled body) means the provider is unavailable,
    /// not that we are broken.
    pub(crate) fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Upstream(format!("{} request timed out: {}", provider, err))
        } else {
            Error::Upstream(format!("{} request failed: {}", provider, err))
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
