//! Session state owned by the dispatcher, and its read-only view.

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::dashboard::account::{Account, MASKED_BALANCE, format_try};
use crate::dashboard::section::Section;

/// Mutable dashboard state for one interactive session.
///
/// Only [`crate::dashboard::ActionDispatcher`] mutates it.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) active_section: Section,
    pub(crate) balance_visible: bool,
    /// The balance highlight is on until this instant.
    pub(crate) highlight_until: Option<Instant>,
    pub(crate) response_message: String,
    pub(crate) last_raw: Option<String>,
    pub(crate) account: Account,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            active_section: Section::Overview,
            balance_visible: true,
            highlight_until: None,
            response_message: String::new(),
            last_raw: None,
            account: Account::default(),
        }
    }
}

impl SessionState {
    pub fn active_section(&self) -> Section {
        self.active_section
    }

    pub fn balance_visible(&self) -> bool {
        self.balance_visible
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight_until
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn response_message(&self) -> &str {
        &self.response_message
    }

    pub fn last_raw(&self) -> Option<&str> {
        self.last_raw.as_deref()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub(crate) fn highlight_for(&mut self, duration: Duration) {
        self.highlight_until = Some(Instant::now() + duration);
    }

    /// The balance as it should be displayed right now.
    pub fn balance_display(&self) -> String {
        if self.balance_visible {
            format_try(self.account.balance)
        } else {
            MASKED_BALANCE.to_string()
        }
    }

    /// Snapshot for presentation layers.
    pub fn view(&self) -> SessionView {
        SessionView {
            active_section: self.active_section,
            balance_visible: self.balance_visible,
            balance_highlight: self.is_highlighted(),
            balance: self.balance_display(),
            weekly_change: format_try(self.account.weekly_change),
            holder: self.account.holder.clone(),
            customer_no: self.account.customer_no.clone(),
            response_message: self.response_message.clone(),
            last_raw: self.last_raw.clone(),
        }
    }
}

/// Immutable snapshot of [`SessionState`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub active_section: Section,
    pub balance_visible: bool,
    pub balance_highlight: bool,
    /// Formatted balance, or the mask when hidden.
    pub balance: String,
    pub weekly_change: String,
    pub holder: String,
    pub customer_no: String,
    pub response_message: String,
    pub last_raw: Option<String>,
}

impl std::fmt::Display for SessionView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let highlight = if self.balance_highlight { " ✨" } else { "" };
        writeln!(f, "[{}] {} ({})", self.active_section, self.holder, self.customer_no)?;
        writeln!(f, "  Bakiye: {}{highlight}", self.balance)?;
        if !self.response_message.is_empty() {
            writeln!(f, "  {}", self.response_message)?;
        }
        Ok(())
    }
}
