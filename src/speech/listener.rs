//! Continuous listening with a bounded restart policy.
//!
//! Recognizers stop on their own (silence, network hiccups, browser
//! limits). The listener restarts them with exponential backoff, gives up
//! after `max_restarts` consecutive restarts that produced no transcript,
//! and stops at once on a permanent error.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::config::ListenConfig;
use crate::error::SpeechError;
use crate::speech::{RecognitionEvent, SpeechInput};

/// Starts listen sessions over one speech input. At most one session is
/// active at a time.
pub struct ContinuousListener {
    input: Arc<dyn SpeechInput>,
    config: ListenConfig,
    active: Arc<AtomicBool>,
}

impl ContinuousListener {
    pub fn new(input: Arc<dyn SpeechInput>, config: ListenConfig) -> Self {
        Self {
            input,
            config,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Start listening. Fails if recognition is unavailable or a session is
    /// already running.
    pub fn listen(&self) -> Result<ListenSession, SpeechError> {
        if !self.input.is_available() {
            return Err(SpeechError::RecognitionUnavailable);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(SpeechError::AlreadyListening);
        }

        let (tx, rx) = mpsc::channel(16);
        let guard = ActiveGuard(self.active.clone());
        let input = self.input.clone();
        let config = self.config.clone();

        info!(input = input.name(), "Listening started");
        let task = tokio::spawn(async move {
            let _guard = guard;
            run(input.as_ref(), &config, &tx).await
        });

        Ok(ListenSession {
            transcripts: ReceiverStream::new(rx),
            task: Some(task),
            input: self.input.clone(),
        })
    }
}

/// Clears the active flag when the listen task ends or is aborted.
struct ActiveGuard(Arc<AtomicBool>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn run(
    input: &dyn SpeechInput,
    config: &ListenConfig,
    tx: &mpsc::Sender<String>,
) -> Result<(), SpeechError> {
    let mut restarts = 0u32;

    loop {
        match input.start().await {
            Ok(mut events) => {
                while let Some(event) = events.next().await {
                    match event {
                        RecognitionEvent::Final(text) => {
                            let text = text.trim();
                            if text.is_empty() {
                                continue;
                            }
                            restarts = 0;
                            if tx.send(text.to_string()).await.is_err() {
                                return Ok(());
                            }
                        }
                        RecognitionEvent::NoSpeech => debug!("No speech detected"),
                        RecognitionEvent::Error(e) if e.is_permanent() => {
                            warn!(error = %e, "Recognition stopped permanently");
                            return Err(e);
                        }
                        RecognitionEvent::Error(e) => warn!(error = %e, "Recognition error"),
                        RecognitionEvent::Ended => break,
                    }
                }
            }
            Err(e) if e.is_permanent() => {
                warn!(error = %e, "Recognition cannot start");
                return Err(e);
            }
            Err(e) => warn!(error = %e, "Recognition start failed"),
        }

        if tx.is_closed() {
            return Ok(());
        }

        restarts += 1;
        if restarts > config.max_restarts {
            warn!(restarts = config.max_restarts, "Giving up on recognition restarts");
            return Err(SpeechError::RestartLimit(config.max_restarts));
        }
        let delay = config.backoff_for(restarts);
        debug!(attempt = restarts, delay_ms = delay.as_millis() as u64, "Restarting recognition");
        tokio::time::sleep(delay).await;
    }
}

/// A running listen session: a stream of final transcripts.
///
/// The stream ends when listening stops for good. Dropping the session
/// stops listening.
pub struct ListenSession {
    transcripts: ReceiverStream<String>,
    task: Option<JoinHandle<Result<(), SpeechError>>>,
    input: Arc<dyn SpeechInput>,
}

impl ListenSession {
    /// Stop listening and wait for the session to wind down.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        if let Err(e) = self.input.stop().await {
            debug!(error = %e, "Stopping speech input failed");
        }
        info!("Listening stopped");
    }

    /// Wait for the session to end on its own and report why.
    pub async fn finish(mut self) -> Result<(), SpeechError> {
        match self.task.take() {
            Some(task) => match task.await {
                Ok(outcome) => outcome,
                Err(e) => Err(SpeechError::Recognition(format!("listen task failed: {e}"))),
            },
            None => Ok(()),
        }
    }
}

impl Stream for ListenSession {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        Pin::new(&mut self.transcripts).poll_next(cx)
    }
}

impl Drop for ListenSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
