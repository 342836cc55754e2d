//! Utterance → action resolution.
//!
//! `IntentResolver::resolve` never fails: every outcome, including transport
//! errors and unparseable replies, is a [`Resolution`] whose `raw` text is
//! meant for display.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::AssistantConfig;
use crate::error::LlmError;
use crate::intent::action::Action;
use crate::intent::extract::{ReplyError, parse_reply};
use crate::intent::local::LocalRules;
use crate::llm::{self, ChatMessage, CompletionRequest, LlmProvider};

/// Instruction sent with every remote request.
pub const SYSTEM_PROMPT: &str = r#"You are a Turkish banking voice assistant that ONLY returns a single valid JSON object (no extra text).
The JSON MUST follow this schema:
{
  "action": "navigate" | "show_balance" | "hide_balance" | "toggle_balance" | "speak" | "none" | "composite",
  "payload": object | null,
  "message": string | null
}
- "navigate": payload: { "menu": "Genel Bakış" | "Transferler" | "Hesaplarım" | "Kartlarım" | "Krediler" | "Yatırımlar" | "Ödemeler" | "Ayarlar" }
- "show_balance": payload null (the app will display and speak the balance)
- "hide_balance": payload null
- "toggle_balance": payload { "visible": true|false }
- "speak": payload { "text": "..." }
- "composite": payload { "actions": [ { action: ..., payload: ...}, ... ] }
If ambiguous, choose "none" and include a clarifying "message".
Return ONLY the JSON object."#;

const MAX_TOKENS: u32 = 400;
const TEMPERATURE: f32 = 0.12;

/// Why a resolution carries no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The endpoint could not be reached or its envelope was unreadable.
    Transport,
    /// The endpoint answered with a non-success status.
    Status,
    /// The reply held no parseable JSON.
    Parse,
    /// The JSON did not match the action schema.
    Invalid,
}

/// Outcome of resolving one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Diagnostic text: rule name, model content, or error text.
    pub raw: String,
    pub parsed: Option<Action>,
    pub failure: Option<FailureKind>,
}

impl Resolution {
    pub fn parsed(raw: impl Into<String>, action: Action) -> Self {
        Self {
            raw: raw.into(),
            parsed: Some(action),
            failure: None,
        }
    }

    pub fn failed(raw: impl Into<String>, failure: FailureKind) -> Self {
        Self {
            raw: raw.into(),
            parsed: None,
            failure: Some(failure),
        }
    }
}

enum Backend {
    Local(LocalRules),
    Remote(Arc<dyn LlmProvider>),
}

/// Resolves utterances locally or through a hosted model.
pub struct IntentResolver {
    backend: Backend,
}

impl IntentResolver {
    /// Keyword rules only.
    pub fn local() -> Self {
        Self::with_rules(LocalRules::default_rules())
    }

    pub fn with_rules(rules: LocalRules) -> Self {
        Self {
            backend: Backend::Local(rules),
        }
    }

    /// Delegate every utterance to `provider`.
    pub fn remote(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            backend: Backend::Remote(provider),
        }
    }

    /// Remote when Azure is fully configured, local otherwise.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, LlmError> {
        match &config.azure {
            Some(azure) => Ok(Self::remote(llm::create_provider(azure)?)),
            None => {
                info!("No remote intent endpoint configured, using local keyword rules");
                Ok(Self::local())
            }
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    pub async fn resolve(&self, utterance: &str) -> Resolution {
        match &self.backend {
            Backend::Local(rules) => rules.resolve(utterance),
            Backend::Remote(provider) => resolve_remote(provider.as_ref(), utterance).await,
        }
    }
}

async fn resolve_remote(provider: &dyn LlmProvider, utterance: &str) -> Resolution {
    let request = CompletionRequest::new(vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(utterance),
    ])
    .with_max_tokens(MAX_TOKENS)
    .with_temperature(TEMPERATURE);

    let response = match provider.complete(request).await {
        Ok(response) => response,
        Err(LlmError::HttpStatus { status, body, .. }) => {
            warn!(status, "Intent endpoint returned an error status");
            return Resolution::failed(format!("Azure hata: {body}"), FailureKind::Status);
        }
        Err(e) => {
            warn!(error = %e, "Intent endpoint request failed");
            return Resolution::failed(format!("Sunucu hatası: {e}"), FailureKind::Transport);
        }
    };

    debug!(
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "Intent reply received"
    );

    match parse_reply(&response.content) {
        Ok(action) => Resolution::parsed(response.content, action),
        Err(e) => {
            let failure = match &e {
                ReplyError::Json(_) => FailureKind::Parse,
                ReplyError::Schema(_) => FailureKind::Invalid,
            };
            warn!(error = %e, "Intent reply rejected");
            Resolution::failed(response.content, failure)
        }
    }
}
