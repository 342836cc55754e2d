//! Console speech adapters: typed lines stand in for final transcripts and
//! spoken feedback is printed.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc};

use crate::error::SpeechError;
use crate::speech::{RecognitionEvent, RecognitionStream, SpeechInput, SpeechOutput, Utterance};

/// Reads transcripts line by line.
///
/// A single reader task owns the underlying input; every recognition run
/// shares its queue, so lines typed between runs are not lost.
pub struct ConsoleInput {
    lines: Arc<Mutex<mpsc::UnboundedReceiver<String>>>,
}

impl ConsoleInput {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            continue;
                        }
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading console input: {}", e);
                        break;
                    }
                }
            }
        });

        Self {
            lines: Arc::new(Mutex::new(rx)),
        }
    }
}

#[async_trait]
impl SpeechInput for ConsoleInput {
    fn name(&self) -> &str {
        "console"
    }

    async fn start(&self) -> Result<RecognitionStream, SpeechError> {
        let lines = self.lines.clone();
        let stream = stream::unfold(Some(lines), |state| async move {
            let lines = state?;
            let next = lines.lock().await.recv().await;
            match next {
                Some(line) => Some((RecognitionEvent::Final(line), Some(lines))),
                None => Some((RecognitionEvent::Error(SpeechError::InputClosed), None)),
            }
        });
        Ok(Box::pin(stream))
    }
}

/// Prints spoken feedback to stdout.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechOutput for ConsoleOutput {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "🔊 {}", utterance.text).map_err(|e| SpeechError::Synthesis(e.to_string()))
    }

    fn cancel(&self) {}

    fn is_speaking(&self) -> bool {
        false
    }
}
