//! The assistant controller: listens, resolves, dispatches.
//!
//! Resolution of an utterance may take a network round trip. If a newer
//! transcript arrives first, the older resolution is dropped (cancelling its
//! request) and only the newest utterance is acted on.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::dashboard::{ActionDispatcher, Section, SessionView};
use crate::error::{OnboardingError, SpeechError};
use crate::intent::{IntentResolver, Resolution};
use crate::onboarding::{OnboardingRecord, QrPayload};
use crate::speech::ContinuousListener;

const REGISTRATION_COMPLETE: &str = "Kayıt tamamlandı. Dashboard'a yönlendiriliyorsunuz.";
const REGISTRATION_SKIPPED: &str = "Dashboard'a geçildi.";
const QR_REFRESHED: &str = "QR kodu yenilendi.";
const QR_NEEDS_REGISTRATION: &str = "QR kodu yenilemek için önce kayıt olmanız gerekiyor.";

type PendingResolution = Pin<Box<dyn Future<Output = Resolution> + Send>>;

pub struct Assistant {
    resolver: Arc<IntentResolver>,
    dispatcher: ActionDispatcher,
    listener: ContinuousListener,
    record: Option<OnboardingRecord>,
}

impl Assistant {
    pub fn new(
        resolver: IntentResolver,
        dispatcher: ActionDispatcher,
        listener: ContinuousListener,
    ) -> Self {
        Self {
            resolver: Arc::new(resolver),
            dispatcher,
            listener,
            record: None,
        }
    }

    pub fn view(&self) -> SessionView {
        self.dispatcher.view()
    }

    pub fn record(&self) -> Option<&OnboardingRecord> {
        self.record.as_ref()
    }

    pub fn is_listening(&self) -> bool {
        self.listener.is_active()
    }

    /// Larger controls for users who registered as needing them.
    pub fn needs_enlarged_controls(&self) -> bool {
        self.record
            .as_ref()
            .is_some_and(OnboardingRecord::needs_enlarged_controls)
    }

    pub fn registration_completed(&mut self, record: OnboardingRecord) {
        info!(session_id = %record.qr.session_id, "Registration stored");
        self.record = Some(record);
        self.dispatcher.announce(REGISTRATION_COMPLETE);
    }

    pub fn registration_skipped(&mut self) {
        info!("Registration skipped");
        self.dispatcher.announce(REGISTRATION_SKIPPED);
    }

    /// Store the interview outcome. A failed interview falls back to the
    /// skip path so the dashboard stays usable.
    pub fn finish_onboarding(&mut self, outcome: Result<OnboardingRecord, OnboardingError>) {
        match outcome {
            Ok(record) => self.registration_completed(record),
            Err(e) => {
                warn!(error = %e, "Onboarding did not complete");
                self.registration_skipped();
            }
        }
    }

    /// Reissue the QR payload. Requires a completed registration.
    pub fn refresh_qr(&mut self) -> Option<&QrPayload> {
        match self.record.as_mut() {
            Some(record) => {
                record.refresh_qr();
                self.dispatcher.announce(QR_REFRESHED);
                self.record.as_ref().map(|r| &r.qr)
            }
            None => {
                self.dispatcher.announce(QR_NEEDS_REGISTRATION);
                None
            }
        }
    }

    pub fn toggle_balance(&mut self, visible: Option<bool>) {
        self.dispatcher.toggle_balance_manually(visible);
    }

    pub fn set_active_section(&mut self, section: Section) {
        self.dispatcher.set_active_section(section);
    }

    pub fn search(&mut self, query: &str) {
        self.dispatcher.search(query);
    }

    pub fn stop_speaking(&self) {
        self.dispatcher.speaker().cancel();
    }

    /// Resolve and apply one transcript.
    pub async fn handle_transcript(&mut self, transcript: &str) {
        self.dispatcher.note_transcript(transcript);
        let resolution = self.resolver.resolve(transcript).await;
        self.dispatcher.handle_resolution(&resolution);
    }

    /// Listen until the input ends.
    pub async fn run<F>(&mut self, on_update: F) -> Result<(), SpeechError>
    where
        F: FnMut(&SessionView),
    {
        self.run_until(std::future::pending(), on_update).await
    }

    /// Listen until the input ends or `shutdown` resolves, calling
    /// `on_update` after every state change.
    pub async fn run_until<S, F>(&mut self, shutdown: S, mut on_update: F) -> Result<(), SpeechError>
    where
        S: Future<Output = ()>,
        F: FnMut(&SessionView),
    {
        let mut session = self.listener.listen()?;
        tokio::pin!(shutdown);
        let mut in_flight: Option<PendingResolution> = None;

        loop {
            // Branch order matters: a finished resolution is applied before
            // the next transcript can replace it.
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    self.stop_speaking();
                    session.stop().await;
                    return Ok(());
                }
                resolution = async {
                    match in_flight.as_mut() {
                        Some(pending) => pending.await,
                        None => std::future::pending().await,
                    }
                }, if in_flight.is_some() => {
                    in_flight = None;
                    self.dispatcher.handle_resolution(&resolution);
                    on_update(&self.view());
                }
                next = session.next() => match next {
                    Some(transcript) => {
                        if in_flight.is_some() {
                            debug!("Newer transcript arrived, dropping stale resolution");
                        }
                        self.dispatcher.note_transcript(&transcript);
                        on_update(&self.view());
                        let resolver = self.resolver.clone();
                        in_flight = Some(Box::pin(async move { resolver.resolve(&transcript).await }));
                    }
                    None => break,
                },
            }
        }

        if let Some(pending) = in_flight.take() {
            let resolution = pending.await;
            self.dispatcher.handle_resolution(&resolution);
            on_update(&self.view());
        }

        match session.finish().await {
            Ok(()) | Err(SpeechError::InputClosed) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Listening ended");
                Err(e)
            }
        }
    }
}
