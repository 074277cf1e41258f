//! The OpenAI-backed decision oracle.

use async_trait::async_trait;
use tracing::debug;

use wayfarer_protocols::error::OracleError;
use wayfarer_protocols::oracle::{DecisionContext, DecisionOracle, OracleReply};
use wayfarer_protocols::trace::Usage;

use crate::api::{ApiRequest, ApiResponse};
use crate::converter::{build_messages, build_tools, parse_decision};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";
const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 20000;

/// Decision oracle speaking the chat-completions protocol.
pub struct OpenAIOracle {
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OpenAIOracle {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            client: reqwest::Client::new(),
        }
    }

    /// Point at an OpenAI-compatible endpoint.
    pub fn with_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, ctx: &DecisionContext) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: build_messages(ctx),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
            tools: build_tools(&ctx.tools),
        }
    }
}

#[async_trait]
impl DecisionOracle for OpenAIOracle {
    fn id(&self) -> &str {
        "openai"
    }

    async fn decide(&self, ctx: &DecisionContext) -> Result<OracleReply, OracleError> {
        let api_request = self.build_request(ctx);
        debug!(
            "Requesting decision from {} ({} messages)",
            self.model,
            api_request.messages.len()
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| OracleError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            return Err(OracleError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(OracleError::Unavailable(format!(
                "API returned {status}: {text}"
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::MalformedResponse("Response had no choices".to_string()))?;

        let decision = parse_decision(&choice.message)?;
        let usage = api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(OracleReply {
            decision,
            finish_reason: choice.finish_reason,
            usage,
        })
    }
}

#[cfg(test)]
#[path = "oracle_tests.rs"]
mod tests;
