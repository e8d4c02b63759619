//! Completion-service configuration.
//!
//! The API key comes from the environment (a `.env` file is honored); the
//! remaining knobs have fixed defaults that can be overridden per deployment.

use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "deepseek-r1-distill-llama-70b";

pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 2048;
pub const TOP_P: f32 = 0.9;

/// How many transcript turns are replayed into each prompt.
pub const HISTORY_WINDOW: usize = 6;

/// Wait between the first failed completion call and the single retry.
pub const RETRY_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub top_p: f32,
}

impl LlmConfig {
    /// Reads the configuration from the environment. `GROQ_API_KEY` is
    /// required; `GROQ_MODEL` and `COURTSIM_LLM_ENDPOINT` override the
    /// defaults when set.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .context("Please set the GROQ_API_KEY environment variable")?;
        let endpoint = std::env::var("COURTSIM_LLM_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(LlmConfig {
            api_key,
            endpoint,
            model,
            top_p: TOP_P,
        })
    }
}
