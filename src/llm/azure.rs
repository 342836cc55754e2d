//! Azure OpenAI chat-completions provider over reqwest.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::AzureConfig;
use crate::error::LlmError;
use crate::llm::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

const PROVIDER: &str = "azure";

/// Calls `{endpoint}/openai/deployments/{deployment}/chat/completions`.
pub struct AzureOpenAiProvider {
    client: reqwest::Client,
    url: String,
    api_key: SecretString,
    deployment: String,
    timeout: std::time::Duration,
}

#[derive(Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl AzureOpenAiProvider {
    pub fn new(config: &AzureConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            timeout: config.request_timeout,
        })
    }
}

#[async_trait]
impl LlmProvider for AzureOpenAiProvider {
    fn model_name(&self) -> &str {
        &self.deployment
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::debug!(deployment = %self.deployment, "Sending completion request");

        let response = self
            .client
            .post(&self.url)
            .header("api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout {
                        provider: PROVIDER.to_string(),
                        timeout: self.timeout,
                    }
                } else {
                    LlmError::RequestFailed {
                        provider: PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                provider: PROVIDER.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: e.to_string(),
        })?;
        let envelope: CompletionEnvelope = serde_json::from_str(&body)?;

        let first = envelope.choices.into_iter().next();
        let finish_reason = FinishReason::from_wire(
            first.as_ref().and_then(|c| c.finish_reason.as_deref()),
        );
        let content = first
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();
        let (input_tokens, output_tokens) = envelope
            .usage
            .map(|u| (u.prompt_tokens, u.completion_tokens))
            .unwrap_or((0, 0));

        Ok(CompletionResponse {
            content,
            input_tokens,
            output_tokens,
            finish_reason,
        })
    }
}
