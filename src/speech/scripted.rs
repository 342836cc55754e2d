//! In-memory speech adapters for scripted sessions and tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use futures::stream;

use crate::error::SpeechError;
use crate::speech::{RecognitionEvent, RecognitionStream, SpeechInput, SpeechOutput, Utterance};

/// Speech input that replays queued recognition runs.
///
/// Each call to `start` consumes one run. Once the script is exhausted the
/// input reports [`SpeechError::InputClosed`].
pub struct ScriptedInput {
    runs: Mutex<VecDeque<Vec<RecognitionEvent>>>,
    available: bool,
    starts: AtomicUsize,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self {
            runs: Mutex::new(VecDeque::new()),
            available: true,
            starts: AtomicUsize::new(0),
        }
    }

    /// An input whose environment has no recognizer.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Queue a run that yields one final transcript.
    pub fn say(self, text: &str) -> Self {
        self.run(vec![RecognitionEvent::Final(text.to_string())])
    }

    /// Queue a run that hears nothing.
    pub fn silence(self) -> Self {
        self.run(vec![RecognitionEvent::NoSpeech])
    }

    /// Queue an arbitrary run.
    pub fn run(self, events: Vec<RecognitionEvent>) -> Self {
        if let Ok(mut runs) = self.runs.lock() {
            runs.push_back(events);
        }
        self
    }

    /// Number of runs started so far.
    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechInput for ScriptedInput {
    fn name(&self) -> &str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn start(&self) -> Result<RecognitionStream, SpeechError> {
        if !self.available {
            return Err(SpeechError::RecognitionUnavailable);
        }
        self.starts.fetch_add(1, Ordering::SeqCst);
        let next = self
            .runs
            .lock()
            .map_err(|_| SpeechError::Recognition("script lock poisoned".to_string()))?
            .pop_front();
        match next {
            Some(events) => Ok(Box::pin(stream::iter(events))),
            None => Err(SpeechError::InputClosed),
        }
    }
}

/// Something a [`RecordingOutput`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum SpokenEvent {
    Spoke(String),
    Cancelled,
}

/// Speech output that records what it was asked to do.
#[derive(Default)]
pub struct RecordingOutput {
    events: Mutex<Vec<SpokenEvent>>,
    last: Mutex<Option<Utterance>>,
}

impl RecordingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SpokenEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Texts spoken, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SpokenEvent::Spoke(text) => Some(text),
                SpokenEvent::Cancelled => None,
            })
            .collect()
    }

    pub fn last_utterance(&self) -> Option<Utterance> {
        self.last.lock().ok().and_then(|u| u.clone())
    }

    fn record(&self, event: SpokenEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SpeechOutput for RecordingOutput {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.record(SpokenEvent::Spoke(utterance.text.clone()));
        if let Ok(mut last) = self.last.lock() {
            *last = Some(utterance.clone());
        }
        Ok(())
    }

    fn cancel(&self) {
        self.record(SpokenEvent::Cancelled);
    }

    fn is_speaking(&self) -> bool {
        false
    }
}
