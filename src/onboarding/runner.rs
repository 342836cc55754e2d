//! Drives an [`Interview`] over real speech and camera capabilities.

use std::sync::Arc;

use tracing::{info, warn};

use crate::camera::{Camera, CapturedImage};
use crate::config::InterviewConfig;
use crate::error::OnboardingError;
use crate::onboarding::extract::{FieldExtractor, KeywordExtractor};
use crate::onboarding::interview::Interview;
use crate::onboarding::model::OnboardingRecord;
use crate::onboarding::prompts;
use crate::onboarding::state::InterviewStep;
use crate::speech::{SpeechInput, Speaker, recognize_once};

/// Runs the spoken onboarding interview end to end.
pub struct InterviewRunner {
    input: Arc<dyn SpeechInput>,
    speaker: Speaker,
    camera: Arc<dyn Camera>,
    extractor: Arc<dyn FieldExtractor>,
    config: InterviewConfig,
}

impl InterviewRunner {
    pub fn new(
        input: Arc<dyn SpeechInput>,
        speaker: Speaker,
        camera: Arc<dyn Camera>,
        config: InterviewConfig,
    ) -> Self {
        Self {
            input,
            speaker,
            camera,
            extractor: Arc::new(KeywordExtractor),
            config,
        }
    }

    /// Swap the field extraction strategy.
    pub fn with_extractor(mut self, extractor: Arc<dyn FieldExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Whether an interview can start at all.
    pub fn is_available(&self) -> bool {
        self.input.is_available()
    }

    /// Run the interview and return the collected record.
    ///
    /// Fails with [`OnboardingError::InputUnavailable`] when there is no
    /// speech recognition; the caller should offer to skip.
    pub async fn run(&self) -> Result<OnboardingRecord, OnboardingError> {
        if !self.input.is_available() {
            warn!("Speech recognition unavailable, onboarding cannot start");
            self.speaker.say(prompts::RECOGNITION_UNSUPPORTED);
            return Err(OnboardingError::InputUnavailable);
        }

        let camera_ready = match self.camera.start_stream().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Camera unavailable, continuing without photo");
                false
            }
        };

        let outcome = self.interview(camera_ready).await;

        if camera_ready {
            if let Err(e) = self.camera.stop_stream().await {
                warn!(error = %e, "Failed to stop camera stream");
            }
        }
        outcome
    }

    async fn interview(&self, camera_ready: bool) -> Result<OnboardingRecord, OnboardingError> {
        let mut interview = Interview::new(self.extractor.clone());
        info!("Onboarding interview started");
        self.speaker.say(&interview.start()?);

        while interview.awaiting_answer() {
            tokio::time::sleep(self.config.prompt_delay).await;
            let answer = self.listen_for_answer().await?;
            let prompt = interview.answer(&answer)?;
            self.speaker.say(&prompt);
        }
        debug_assert_eq!(interview.step(), InterviewStep::Photo);

        tokio::time::sleep(self.config.photo_delay).await;
        self.speaker.say(prompts::PHOTO_TAKING);
        let image = if camera_ready { self.capture().await } else { None };
        self.speaker.say(prompts::PHOTO_DONE);

        let record = interview.finish(image)?;
        info!(
            session_id = %record.qr.session_id,
            has_photo = record.image.is_some(),
            "Onboarding interview complete"
        );

        tokio::time::sleep(self.config.completion_delay).await;
        Ok(record)
    }

    /// Listen until something is heard, re-prompting after silence.
    async fn listen_for_answer(&self) -> Result<String, OnboardingError> {
        loop {
            match recognize_once(self.input.as_ref()).await {
                Ok(Some(text)) => return Ok(text),
                Ok(None) => {
                    self.speaker.say(prompts::NO_SPEECH);
                    tokio::time::sleep(self.config.retry_delay).await;
                }
                Err(e) if e.is_permanent() => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "Recognition failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    async fn capture(&self) -> Option<CapturedImage> {
        match self.camera.capture_frame().await {
            Ok(image) => Some(image),
            Err(e) => {
                warn!(error = %e, "Photo capture failed");
                None
            }
        }
    }
}
