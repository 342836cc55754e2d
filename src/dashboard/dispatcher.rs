//! Applies actions to the session state with spoken feedback.

use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::dashboard::section::Section;
use crate::dashboard::state::{SessionState, SessionView};
use crate::intent::{Action, FailureKind, Resolution};
use crate::speech::Speaker;

const SHOW_BALANCE_SPOKEN: &str = "Toplam bakiyen 80 bin yüz yirmi lira elli kuruş.";
const SHOW_BALANCE_SHOWN: &str = "Bakiyen gösteriliyor.";
const HIDE_BALANCE_SHOWN: &str = "Bakiyen gizlendi.";
const TOGGLE_BALANCE_SHOWN: &str = "Bakiyen ayarlandı.";
const CLARIFY: &str = "Bunu anlayamadım, tekrar eder misin?";
const UNKNOWN_ACTION: &str = "İşlem yapılamadı.";
const TRANSPORT_SPOKEN: &str = "Sunucuya bağlanırken hata oluştu.";

/// Owns the [`SessionState`] and is the only thing that changes it.
pub struct ActionDispatcher {
    state: SessionState,
    speaker: Speaker,
    config: DispatchConfig,
}

impl ActionDispatcher {
    pub fn new(speaker: Speaker, config: DispatchConfig) -> Self {
        Self {
            state: SessionState::default(),
            speaker,
            config,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> SessionView {
        self.state.view()
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    /// Apply an action. `None` does nothing.
    pub fn apply(&mut self, action: Option<&Action>) {
        if let Some(action) = action {
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: &Action) {
        debug!(kind = action.kind(), "Applying action");
        match action {
            Action::Navigate { menu, message } => {
                if let Some(section) = menu {
                    self.state.active_section = *section;
                }
                if let Some(message) = message {
                    self.announce(message);
                }
            }
            Action::ShowBalance { message } => {
                self.state.balance_visible = true;
                self.state.highlight_for(self.config.highlight_duration);
                self.speaker
                    .say(message.as_deref().unwrap_or(SHOW_BALANCE_SPOKEN));
                self.show(message.as_deref().unwrap_or(SHOW_BALANCE_SHOWN));
            }
            Action::HideBalance { message } => {
                self.state.balance_visible = false;
                self.show_with_optional_speech(message.as_deref(), HIDE_BALANCE_SHOWN);
            }
            Action::ToggleBalance { visible, message } => {
                if let Some(visible) = visible {
                    self.state.balance_visible = *visible;
                }
                self.show_with_optional_speech(message.as_deref(), TOGGLE_BALANCE_SHOWN);
            }
            Action::Speak { text, message } => {
                if let Some(text) = text.as_deref().or(message.as_deref()) {
                    self.announce(text);
                }
            }
            Action::NoOp { message } => {
                self.announce(message.as_deref().unwrap_or(CLARIFY));
            }
            Action::Composite { actions, message } => {
                for nested in actions {
                    self.apply_action(nested);
                }
                if let Some(message) = message {
                    self.announce(message);
                }
            }
            Action::Unknown { kind, message } => {
                warn!(kind = %kind, "Unknown action kind");
                match message {
                    Some(message) => self.announce(message),
                    None => self.show(UNKNOWN_ACTION),
                }
            }
        }
    }

    /// Apply a resolver outcome, surfacing the raw text when nothing parsed.
    pub fn handle_resolution(&mut self, resolution: &Resolution) {
        self.state.last_raw = Some(resolution.raw.clone());

        if let Some(action) = &resolution.parsed {
            self.apply_action(action);
            return;
        }

        if resolution.failure == Some(FailureKind::Transport) {
            self.show(&resolution.raw);
            self.speaker.say(TRANSPORT_SPOKEN);
            return;
        }

        let text = truncate_for_display(&resolution.raw, self.config.raw_display_limit);
        self.announce(&text);
    }

    /// Record that a transcript arrived and silence any feedback in progress.
    pub fn note_transcript(&mut self, transcript: &str) {
        self.show(&format!("Komut algılandı: {transcript}"));
        if self.speaker.is_speaking() {
            self.speaker.cancel();
        }
    }

    /// Dashboard eye button: set visibility, or flip it when `visible` is `None`.
    pub fn toggle_balance_manually(&mut self, visible: Option<bool>) {
        self.state.balance_visible = visible.unwrap_or(!self.state.balance_visible);
        self.state
            .highlight_for(self.config.manual_highlight_duration);
    }

    pub fn set_active_section(&mut self, section: Section) {
        self.state.active_section = section;
    }

    /// Echo a search query; an empty query clears the message.
    pub fn search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.state.response_message.clear();
        } else {
            self.show(&format!("Arama: {query}"));
        }
    }

    /// Show and speak `text`.
    pub fn announce(&mut self, text: &str) {
        self.show(text);
        self.speaker.say(text);
    }

    fn show(&mut self, text: &str) {
        self.state.response_message = text.to_string();
    }

    fn show_with_optional_speech(&mut self, message: Option<&str>, fallback: &str) {
        self.show(message.unwrap_or(fallback));
        if let Some(message) = message {
            self.speaker.say(message);
        }
    }
}

fn truncate_for_display(raw: &str, limit: usize) -> String {
    if raw.chars().count() > limit {
        let mut text: String = raw.chars().take(limit).collect();
        text.push_str("...");
        text
    } else {
        raw.to_string()
    }
}
