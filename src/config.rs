//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// API version used when `VOICE_BANK_AZURE_API_VERSION` is not set.
pub const DEFAULT_API_VERSION: &str = "2024-06-01-preview";

/// Hosted intent endpoint (Azure OpenAI chat completions).
#[derive(Debug, Clone)]
pub struct AzureConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`.
    pub endpoint: String,
    pub api_key: SecretString,
    /// Deployment name of the chat model.
    pub deployment: String,
    pub api_version: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl AzureConfig {
    /// Full chat-completions URL for this deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Restart policy for continuous listening.
#[derive(Debug, Clone)]
pub struct ListenConfig {
    /// Consecutive restarts without a transcript before the session gives up.
    pub max_restarts: u32,
    /// Delay before the first restart; doubles on each consecutive restart.
    pub initial_backoff: Duration,
    /// Upper bound for the restart delay.
    pub max_backoff: Duration,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            max_restarts: 5,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl ListenConfig {
    /// Backoff before restart number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Voice used for spoken feedback.
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            language: "tr-TR".to_string(),
            rate: 1.0,
            pitch: 1.0,
        }
    }
}

/// Dispatcher timing and display limits.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// How long the balance highlight lasts after `show_balance`.
    pub highlight_duration: Duration,
    /// Highlight duration for a manual toggle from the dashboard.
    pub manual_highlight_duration: Duration,
    /// Raw resolver text longer than this is truncated before display.
    pub raw_display_limit: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            highlight_duration: Duration::from_millis(1800),
            manual_highlight_duration: Duration::from_millis(1200),
            raw_display_limit: 800,
        }
    }
}

/// Onboarding interview pacing.
#[derive(Debug, Clone)]
pub struct InterviewConfig {
    /// Pause between a spoken prompt and listening for the answer.
    pub prompt_delay: Duration,
    /// Pause before re-listening after "no speech".
    pub retry_delay: Duration,
    /// Pause between announcing and taking the photo.
    pub photo_delay: Duration,
    /// Pause before handing the record back to the caller.
    pub completion_delay: Duration,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            prompt_delay: Duration::from_millis(500),
            retry_delay: Duration::from_millis(2000),
            photo_delay: Duration::from_millis(2000),
            completion_delay: Duration::from_millis(3000),
        }
    }
}

impl InterviewConfig {
    /// Zero delays, for tests and scripted runs.
    pub fn immediate() -> Self {
        Self {
            prompt_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            photo_delay: Duration::ZERO,
            completion_delay: Duration::ZERO,
        }
    }
}

/// Assistant configuration.
#[derive(Debug, Clone, Default)]
pub struct AssistantConfig {
    /// Remote intent endpoint. `None` selects local keyword rules.
    pub azure: Option<AzureConfig>,
    pub listen: ListenConfig,
    pub speech: SpeechConfig,
    pub dispatch: DispatchConfig,
    pub interview: InterviewConfig,
    /// Skip the onboarding interview at startup.
    pub skip_onboarding: bool,
    /// Still image served by the file-backed camera.
    pub photo_path: Option<std::path::PathBuf>,
    /// Directory for rolling log files.
    pub log_dir: Option<std::path::PathBuf>,
}

impl AssistantConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let azure = match (
            get("VOICE_BANK_AZURE_ENDPOINT"),
            get("VOICE_BANK_AZURE_KEY"),
            get("VOICE_BANK_AZURE_DEPLOYMENT"),
        ) {
            (Some(endpoint), Some(api_key), Some(deployment)) => {
                if reqwest::Url::parse(&endpoint).is_err() {
                    return Err(ConfigError::InvalidValue {
                        key: "VOICE_BANK_AZURE_ENDPOINT".to_string(),
                        message: format!("not a valid URL: {endpoint}"),
                    });
                }
                let timeout_secs: u64 = parse_or(&get, "VOICE_BANK_REQUEST_TIMEOUT_SECS", 15)?;
                Some(AzureConfig {
                    endpoint,
                    api_key: SecretString::from(api_key),
                    deployment,
                    api_version: get("VOICE_BANK_AZURE_API_VERSION")
                        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                    request_timeout: Duration::from_secs(timeout_secs),
                })
            }
            (None, None, None) => None,
            (endpoint, key, deployment) => {
                tracing::warn!(
                    endpoint = endpoint.is_some(),
                    key = key.is_some(),
                    deployment = deployment.is_some(),
                    "Azure settings incomplete, using local intent rules"
                );
                None
            }
        };

        let defaults = ListenConfig::default();
        let listen = ListenConfig {
            max_restarts: parse_or(&get, "VOICE_BANK_LISTEN_MAX_RESTARTS", defaults.max_restarts)?,
            initial_backoff: Duration::from_millis(parse_or(
                &get,
                "VOICE_BANK_LISTEN_BACKOFF_MS",
                defaults.initial_backoff.as_millis() as u64,
            )?),
            max_backoff: Duration::from_millis(parse_or(
                &get,
                "VOICE_BANK_LISTEN_MAX_BACKOFF_MS",
                defaults.max_backoff.as_millis() as u64,
            )?),
        };

        let skip_onboarding = get("VOICE_BANK_SKIP_ONBOARDING")
            .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            azure,
            listen,
            skip_onboarding,
            photo_path: get("VOICE_BANK_PHOTO_PATH").map(std::path::PathBuf::from),
            log_dir: get("VOICE_BANK_LOG_DIR").map(std::path::PathBuf::from),
            ..Self::default()
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
