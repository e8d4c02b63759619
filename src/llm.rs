//! Chat-completion wire types and transport.
//!
//! The completion service is an OpenAI-style `/chat/completions` endpoint:
//! an ordered list of role-tagged messages in, generated text out. The
//! [`CompletionClient`] trait is the boundary the rest of the crate talks
//! to, so tests substitute scripted or failing clients without any HTTP.

use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::LlmConfig;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// The seam between the simulation and the completion service.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Production client: bearer-authenticated JSON POST against the configured
/// endpoint.
#[derive(Clone)]
pub struct HttpCompletionClient {
    http: Client,
    cfg: LlmConfig,
}

impl HttpCompletionClient {
    pub fn new(cfg: LlmConfig) -> Self {
        HttpCompletionClient {
            http: Client::new(),
            cfg,
        }
    }
}

impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request_body = ChatRequest {
            model: self.cfg.model.clone(),
            messages: messages.to_vec(),
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
            top_p: Some(self.cfg.top_p),
        };

        let response = self
            .http
            .post(&self.cfg.endpoint)
            .bearer_auth(&self.cfg.api_key)
            .json(&request_body)
            .send()
            .await
            .context("completion request failed")?
            .error_for_status()
            .context("completion service returned an error status")?
            .json::<ChatCompletionResponse>()
            .await
            .context("could not parse completion response as JSON")?;

        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("completion response contained no choices")?;

        Ok(content)
    }
}

static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("invalid think-block regex"));

/// Strips reasoning markup some models emit ahead of their visible answer.
pub fn clean_response(raw: &str) -> String {
    THINK_RE.replace_all(raw, "").trim().to_string()
}

/// Calls the completion service, waiting `retry_delay` and retrying once on
/// failure. Both attempts failing (or an all-markup reply) yields `None`;
/// errors never cross this boundary.
pub async fn complete_with_retry<C: CompletionClient>(
    client: &C,
    messages: &[ChatMessage],
    max_tokens: u32,
    temperature: f32,
    retry_delay: Duration,
) -> Option<String> {
    let first = client.complete(messages, max_tokens, temperature).await;
    let raw = match first {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "completion call failed, retrying");
            tokio::time::sleep(retry_delay).await;
            match client.complete(messages, max_tokens, temperature).await {
                Ok(text) => text,
                Err(err) => {
                    warn!(error = %err, "completion retry failed");
                    return None;
                }
            }
        }
    };

    let cleaned = clean_response(&raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingClient {
        calls: AtomicUsize,
    }

    impl CompletionClient for FailingClient {
        async fn complete(&self, _: &[ChatMessage], _: u32, _: f32) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("transport down"))
        }
    }

    struct FlakyClient {
        calls: AtomicUsize,
    }

    impl CompletionClient for FlakyClient {
        async fn complete(&self, _: &[ChatMessage], _: u32, _: f32) -> Result<String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(anyhow!("transient"))
            } else {
                Ok("The court will come to order.".to_string())
            }
        }
    }

    #[test]
    fn strips_think_blocks() {
        let raw = "<think>weighing the motion\nover two lines</think>Motion denied.";
        assert_eq!(clean_response(raw), "Motion denied.");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(clean_response("  Sustained.  "), "Sustained.");
    }

    #[test]
    fn all_markup_reply_cleans_to_empty() {
        assert_eq!(clean_response("<think>nothing visible</think>"), "");
    }

    #[tokio::test]
    async fn retries_exactly_once_then_gives_up() {
        let client = FailingClient {
            calls: AtomicUsize::new(0),
        };
        let out =
            complete_with_retry(&client, &[ChatMessage::user("hi")], 64, 0.7, Duration::ZERO)
                .await;
        assert!(out.is_none());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_attempt_can_succeed() {
        let client = FlakyClient {
            calls: AtomicUsize::new(0),
        };
        let out =
            complete_with_retry(&client, &[ChatMessage::user("hi")], 64, 0.7, Duration::ZERO)
                .await;
        assert_eq!(out.as_deref(), Some("The court will come to order."));
    }
}
