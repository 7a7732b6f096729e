use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::RecommendationEngine;
use super::prompt::build_prompt;
use crate::config::LlmConfig;
use crate::domain::{Recommendation, UsageByNamespace};
use crate::utils::http_client::build_client;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Recommendation engine backed by an OpenAI-compatible chat-completions API.
pub struct LlmRecommendationEngine {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmRecommendationEngine {
    pub fn new(config: LlmConfig) -> Self {
        let client = build_client(config.timeout);
        Self::with_client(client, config)
    }

    pub fn with_client(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl RecommendationEngine for LlmRecommendationEngine {
    async fn recommend(&self, usage: &UsageByNamespace, style: &str) -> Result<Recommendation> {
        let prompt = build_prompt(usage, style);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            stream: false,
        };

        info!(url = %self.config.api_url, model = %self.config.model, "Requesting recommendations");

        let mut request = self.client.post(&self.config.api_url).json(&body);
        if let Some(key) = self.config.api_key.as_deref() {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.json::<serde_json::Value>().await.ok();
            return Err(match detail {
                Some(detail) => Error::recommendation(format!(
                    "model API returned status {}: {}",
                    status.as_u16(),
                    detail
                )),
                None => Error::recommendation(format!(
                    "model API returned status {}",
                    status.as_u16()
                )),
            });
        }

        let response: ChatResponse = response.json().await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::recommendation("model response has no choices"))?;

        debug!(content = %content, "Received model response");
        parse_recommendation(&content)
    }
}

/// Parse the model output, falling back to the outermost `{...}` span when
/// the content carries extra text or Markdown fences.
pub fn parse_recommendation(content: &str) -> Result<Recommendation> {
    match serde_json::from_str(content) {
        Ok(recommendation) => Ok(recommendation),
        Err(direct) => {
            let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
                return Err(Error::recommendation(format!(
                    "failed to parse recommendation: {direct}"
                )));
            };
            if end <= start {
                return Err(Error::recommendation(format!(
                    "failed to parse recommendation: {direct}"
                )));
            }
            serde_json::from_str(&content[start..=end]).map_err(|e| {
                Error::recommendation(format!(
                    "failed to extract and parse recommendation JSON: {e}"
                ))
            })
        }
    }
}
