//! # Analysis Client
//!
//! One synchronous call to a chat-completions style vision model. The reply
//! text is returned verbatim; no JSON validation of the model's output is
//! attempted. Failures of any kind become [`CoachError::RemoteCall`] and are
//! never retried.

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::ModelConfig;
use crate::error::{CoachError, CoachResult};
use crate::payload::ChatRequest;

/// Token counters reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Raw model output plus usage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Model text, expected but not guaranteed to be JSON.
    pub content: String,
    pub usage: Usage,
    pub model: String,
}

/// The remote analysis call, behind a seam for tests.
pub trait VisionModel {
    fn analyze(&self, request: &ChatRequest) -> CoachResult<AnalysisResult>;
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionResponse {
    fn into_result(self, requested_model: &str) -> CoachResult<AnalysisResult> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CoachError::remote_call("response contained no message content", None))?;
        Ok(AnalysisResult {
            content,
            usage: self.usage,
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
        })
    }
}

/// OpenAI-compatible `chat/completions` client.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig) -> CoachResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CoachError::remote_call("no API credential: OPENAI_API_KEY is not set", None))?;
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(CoachError::remote_call_from)?;
        Ok(Self {
            client,
            endpoint: completions_url(&config.api_base),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

impl VisionModel for OpenAiClient {
    fn analyze(&self, request: &ChatRequest) -> CoachResult<AnalysisResult> {
        info!(model = %request.model, images = request.image_count(), "calling vision model");

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .map_err(|e| {
                error!(error = %e, "vision model request failed");
                CoachError::remote_call_from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "vision model returned an error");
            return Err(CoachError::remote_call(
                if body.is_empty() { status.to_string() } else { body },
                Some(status.as_u16()),
            ));
        }

        let parsed: CompletionResponse = response.json().map_err(CoachError::remote_call_from)?;
        let result = parsed.into_result(&request.model)?;
        info!(
            prompt_tokens = result.usage.prompt_tokens,
            completion_tokens = result.usage.completion_tokens,
            total_tokens = result.usage.total_tokens,
            "token usage"
        );
        Ok(result)
    }
}
