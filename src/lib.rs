//! Fortune proxy - forwards fortune-telling requests to a generative AI provider
//!
//! Accepts birth-chart, palm, astrology and tarot requests over HTTP, turns
//! each into a single prompt, and returns the provider's reading as JSON.

pub mod ai;
pub mod app;
pub mod error;
pub mod models;
pub mod prompts;
pub mod reading;
pub mod server;

pub use error::{Error, Result};
