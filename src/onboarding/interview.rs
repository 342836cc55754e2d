//! The interview as pure state transitions.
//!
//! [`Interview`] knows nothing about timing or devices: it takes answers and
//! returns the next prompt. [`super::InterviewRunner`] drives it.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::camera::CapturedImage;
use crate::error::OnboardingError;
use crate::onboarding::extract::FieldExtractor;
use crate::onboarding::model::{Disability, OnboardingRecord};
use crate::onboarding::prompts;
use crate::onboarding::state::{Field, InterviewStep};

pub struct Interview {
    step: InterviewStep,
    values: HashMap<Field, String>,
    extractor: Arc<dyn FieldExtractor>,
}

impl Interview {
    pub fn new(extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            step: InterviewStep::default(),
            values: HashMap::new(),
            extractor,
        }
    }

    pub fn step(&self) -> InterviewStep {
        self.step
    }

    /// Current value for a field. Unconfirmed values are included.
    pub fn value(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Whether the interview is waiting for a spoken answer.
    pub fn awaiting_answer(&self) -> bool {
        self.step.field().is_some()
    }

    /// Begin the interview and return the greeting.
    pub fn start(&mut self) -> Result<String, OnboardingError> {
        self.transition(InterviewStep::FirstName)?;
        Ok(prompts::GREETING.to_string())
    }

    /// Feed an answer for the current step and return what to say next.
    pub fn answer(&mut self, text: &str) -> Result<String, OnboardingError> {
        if self.step.is_terminal() {
            return Err(OnboardingError::AlreadyComplete);
        }
        let Some(field) = self.step.field() else {
            return Err(OnboardingError::UnexpectedStep {
                expected: "an answer".to_string(),
                step: self.step.to_string(),
            });
        };

        if !self.step.is_confirmation() {
            let value = self.extractor.extract(field, text);
            debug!(%field, value = %value, "Extracted field value");
            self.transition(field.confirm_step())?;
            let prompt = prompts::confirm_prompt(field, &value);
            self.values.insert(field, value);
            return Ok(prompt);
        }

        if prompts::is_affirmative(text) {
            let next = self.step.next().ok_or_else(|| OnboardingError::InvalidTransition {
                from: self.step.to_string(),
                to: "next step".to_string(),
            })?;
            self.transition(next)?;
            debug!(%field, "Field confirmed");
            Ok(prompts::accepted_prompt(
                field,
                self.value(Field::FirstName).unwrap_or_default(),
                self.value(Field::LastName).unwrap_or_default(),
            ))
        } else {
            self.values.remove(&field);
            self.transition(field.ask_step())?;
            debug!(%field, "Field rejected");
            Ok(prompts::retry_prompt(field))
        }
    }

    /// Complete the interview with the captured photo, if any.
    pub fn finish(&mut self, image: Option<CapturedImage>) -> Result<OnboardingRecord, OnboardingError> {
        if self.step.is_terminal() {
            return Err(OnboardingError::AlreadyComplete);
        }
        if self.step != InterviewStep::Photo {
            return Err(OnboardingError::UnexpectedStep {
                expected: InterviewStep::Photo.to_string(),
                step: self.step.to_string(),
            });
        }
        self.transition(InterviewStep::Complete)?;

        let get = |field: Field| self.values.get(&field).cloned().unwrap_or_default();
        Ok(OnboardingRecord::new(
            get(Field::FirstName),
            get(Field::LastName),
            get(Field::Age),
            Disability::from_label(&get(Field::Disability)),
            image,
        ))
    }

    fn transition(&mut self, to: InterviewStep) -> Result<(), OnboardingError> {
        if !self.step.can_transition_to(to) {
            return Err(OnboardingError::InvalidTransition {
                from: self.step.to_string(),
                to: to.to_string(),
            });
        }
        self.step = to;
        Ok(())
    }
}
