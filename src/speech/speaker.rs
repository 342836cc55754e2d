//! Exclusive spoken feedback.

use std::sync::Arc;

use tracing::warn;

use crate::config::SpeechConfig;
use crate::speech::{SpeechOutput, Utterance};

/// Wraps a [`SpeechOutput`] so every new utterance cancels the previous one.
#[derive(Clone)]
pub struct Speaker {
    output: Arc<dyn SpeechOutput>,
    config: SpeechConfig,
}

impl Speaker {
    pub fn new(output: Arc<dyn SpeechOutput>, config: SpeechConfig) -> Self {
        Self { output, config }
    }

    /// Speak `text`. Empty text is ignored; synthesis errors are logged.
    pub fn say(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.output.cancel();
        let utterance = Utterance {
            text: text.to_string(),
            language: self.config.language.clone(),
            rate: self.config.rate,
            pitch: self.config.pitch,
        };
        if let Err(e) = self.output.speak(&utterance) {
            warn!(error = %e, "Speech synthesis failed");
        }
    }

    pub fn cancel(&self) {
        self.output.cancel();
    }

    pub fn is_speaking(&self) -> bool {
        self.output.is_speaking()
    }
}

impl std::fmt::Debug for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Speaker")
            .field("language", &self.config.language)
            .finish()
    }
}
