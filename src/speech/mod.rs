//! Speech input/output boundary.
//!
//! Recognition and synthesis are external capabilities. Input is modeled as
//! a run that yields [`RecognitionEvent`]s until it ends; [`ContinuousListener`]
//! turns repeated runs into one stream of final transcripts. Output goes
//! through [`Speaker`], which never lets two utterances overlap.

pub mod console;
pub mod listener;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;
pub mod speaker;

pub use console::{ConsoleInput, ConsoleOutput};
pub use listener::{ContinuousListener, ListenSession};
#[cfg(any(test, feature = "testing"))]
pub use scripted::{RecordingOutput, ScriptedInput, SpokenEvent};
pub use speaker::Speaker;

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};

use crate::error::SpeechError;

/// One event from a recognition run.
#[derive(Debug)]
pub enum RecognitionEvent {
    /// A finalized transcript.
    Final(String),
    /// The recognizer heard nothing before timing out.
    NoSpeech,
    Error(SpeechError),
    /// The run stopped on its own.
    Ended,
}

pub type RecognitionStream = Pin<Box<dyn Stream<Item = RecognitionEvent> + Send>>;

/// Text to synthesize plus voice parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Speech recognition capability.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    fn name(&self) -> &str;

    /// Whether recognition exists in this environment at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Begin a recognition run. The stream ends when the run does.
    async fn start(&self) -> Result<RecognitionStream, SpeechError>;

    /// Stop the current run, if any.
    async fn stop(&self) -> Result<(), SpeechError> {
        Ok(())
    }
}

/// Speech synthesis capability.
pub trait SpeechOutput: Send + Sync {
    /// Queue `utterance` for playback.
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Stop any utterance currently playing.
    fn cancel(&self);

    fn is_speaking(&self) -> bool;
}

/// Run recognition once and return the first transcript.
///
/// `Ok(None)` means the run ended without speech. Transient errors are
/// reported the same way; permanent ones are returned.
pub async fn recognize_once(input: &dyn SpeechInput) -> Result<Option<String>, SpeechError> {
    let mut events = input.start().await?;
    let outcome = loop {
        match events.next().await {
            Some(RecognitionEvent::Final(text)) if !text.trim().is_empty() => {
                break Ok(Some(text.trim().to_string()));
            }
            Some(RecognitionEvent::Final(_)) => continue,
            Some(RecognitionEvent::Error(e)) if e.is_permanent() => break Err(e),
            Some(RecognitionEvent::Error(e)) => {
                tracing::debug!(error = %e, "Recognition error, treating as no speech");
                break Ok(None);
            }
            Some(RecognitionEvent::NoSpeech) | Some(RecognitionEvent::Ended) | None => {
                break Ok(None);
            }
        }
    };
    drop(events);
    if let Err(e) = input.stop().await {
        tracing::debug!(error = %e, "Stopping recognition failed");
    }
    outcome
}
