//! Keyword rules used when no remote endpoint is configured.
//!
//! Rules are checked in insertion order; the first whose pattern matches
//! anywhere in the utterance wins. Nothing matching yields a `none` action
//! asking the user to repeat.

use regex::Regex;
use tracing::{debug, warn};

use crate::dashboard::Section;
use crate::intent::action::Action;
use crate::intent::resolver::Resolution;

/// Spoken when the user says they cannot see their balance.
pub const BALANCE_HELP_TEXT: &str =
    "Bakiyen ekranda görünmüyor ise sayfayı yenileyebilir veya 'bakiyemi göster' diyebilirsin.";

const FALLBACK_RAW: &str = "Yerel: none";
const FALLBACK_MESSAGE: &str = "Üzgünüm, bunu anlayamadım. Tekrar eder misin?";

/// A keyword rule with its compiled pattern.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    /// Case-insensitive alternation of the keywords.
    pub regex: Regex,
    /// Diagnostic text reported as the resolution's `raw`.
    pub raw: String,
    pub action: Action,
}

/// Ordered keyword rules.
#[derive(Debug, Clone)]
pub struct LocalRules {
    rules: Vec<KeywordRule>,
}

impl LocalRules {
    /// The built-in Turkish rules, in priority order.
    pub fn default_rules() -> Self {
        let table: [(&[&str], &str, Action); 5] = [
            (
                &["bakiye", "ne kadar", "param"],
                "Yerel: show_balance",
                Action::ShowBalance {
                    message: Some("Toplam bakiyen ₺80.120,50".to_string()),
                },
            ),
            (
                &["gizle"],
                "Yerel: hide_balance",
                Action::HideBalance {
                    message: Some("Bakiyen gizlendi.".to_string()),
                },
            ),
            (
                &["kart"],
                "Yerel: navigate Kartlarım",
                Action::Navigate {
                    menu: Some(Section::Cards),
                    message: Some("Kartlarına geçiliyor.".to_string()),
                },
            ),
            (
                &["transfer"],
                "Yerel: navigate Transferler",
                Action::Navigate {
                    menu: Some(Section::Transfers),
                    message: Some("Transfer ekranı açıldı.".to_string()),
                },
            ),
            (
                &["göremiyorum", "goremiyorum", "görmüyorum"],
                "Yerel: help_view_balance",
                Action::Speak {
                    text: Some(BALANCE_HELP_TEXT.to_string()),
                    message: Some(BALANCE_HELP_TEXT.to_string()),
                },
            ),
        ];

        let mut engine = Self::empty();
        for (keywords, raw, action) in table {
            if let Err(e) = engine.add_rule(keywords, raw, action) {
                warn!(raw, error = %e, "Skipping built-in keyword rule");
            }
        }
        engine
    }

    /// A rule set with no rules; every utterance falls through.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule matching any of `keywords` as a literal substring.
    pub fn add_rule(
        &mut self,
        keywords: &[&str],
        raw: &str,
        action: Action,
    ) -> Result<(), regex::Error> {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let regex = Regex::new(&format!("(?i)(?:{alternation})"))?;
        self.rules.push(KeywordRule {
            regex,
            raw: raw.to_string(),
            action,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve an utterance. Always yields a parsed action.
    pub fn resolve(&self, utterance: &str) -> Resolution {
        if let Some(rule) = self.rules.iter().find(|r| r.regex.is_match(utterance)) {
            debug!(raw = %rule.raw, "Keyword rule matched");
            return Resolution::parsed(rule.raw.clone(), rule.action.clone());
        }

        debug!("No keyword rule matched");
        Resolution::parsed(
            FALLBACK_RAW,
            Action::NoOp {
                message: Some(FALLBACK_MESSAGE.to_string()),
            },
        )
    }
}

impl Default for LocalRules {
    fn default() -> Self {
        Self::default_rules()
    }
}
