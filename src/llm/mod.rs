//! LLM integration.
//!
//! The assistant only needs one thing from a language model: turn an
//! utterance into a JSON action. `LlmProvider` is the seam; the hosted
//! backend is Azure OpenAI, called directly over reqwest.

pub mod azure;
pub mod provider;

pub use azure::AzureOpenAiProvider;
pub use provider::*;

use std::sync::Arc;

use crate::config::AzureConfig;
use crate::error::LlmError;

/// Create an LLM provider from configuration.
pub fn create_provider(config: &AzureConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = AzureOpenAiProvider::new(config)?;
    tracing::info!(deployment = %config.deployment, "Using Azure OpenAI intent endpoint");
    Ok(Arc::new(provider))
}
