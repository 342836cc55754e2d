//! Error types for the voice bank assistant.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Action error: {0}")]
    Action(#[from] ActionError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} returned HTTP {status}: {body}")]
    HttpStatus {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Speech input/output capability errors.
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("Speech recognition is not available in this environment")]
    RecognitionUnavailable,

    #[error("Speech input closed")]
    InputClosed,

    #[error("A listen session is already active")]
    AlreadyListening,

    #[error("Recognition failed: {0}")]
    Recognition(String),

    #[error("Listening stopped after {0} restarts without a transcript")]
    RestartLimit(u32),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
}

impl SpeechError {
    /// Whether retrying the input can never succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::RecognitionUnavailable | Self::InputClosed)
    }
}

/// Camera capability errors.
#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("No camera available")]
    Unavailable,

    #[error("Camera stream is not running")]
    NotStreaming,

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Action schema violations found while validating resolver output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("Action must be a JSON object")]
    NotAnObject,

    #[error("Missing or non-string \"action\" field")]
    MissingKind,

    #[error("Field {field} of {kind} has the wrong type: expected {expected}")]
    WrongType {
        kind: String,
        field: String,
        expected: String,
    },

    #[error("Field {field} of {kind} is required")]
    MissingField { kind: String, field: String },

    #[error("Unknown menu section: {0}")]
    UnknownSection(String),

    #[error("Composite actions nested deeper than {max}")]
    TooDeep { max: usize },
}

/// Onboarding interview errors.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("Speech recognition unavailable; onboarding cannot start")]
    InputUnavailable,

    #[error("Interview already complete")]
    AlreadyComplete,

    #[error("Interview cannot transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Interview is not waiting for {expected} (current step: {step})")]
    UnexpectedStep { expected: String, step: String },

    #[error("Speech error: {0}")]
    Speech(#[from] SpeechError),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
