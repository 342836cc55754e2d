//! Voice bank — a voice-controlled demo banking assistant.

pub mod assistant;
pub mod camera;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod intent;
pub mod llm;
pub mod onboarding;
pub mod speech;

pub use assistant::Assistant;
pub use config::AssistantConfig;
pub use error::{Error, Result};
