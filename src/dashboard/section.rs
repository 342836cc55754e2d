//! Dashboard menu sections.

use serde::{Deserialize, Serialize};

/// A top-level dashboard section, identified on the wire by its Turkish label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "Genel Bakış")]
    Overview,
    #[serde(rename = "Transferler")]
    Transfers,
    #[serde(rename = "Hesaplarım")]
    Accounts,
    #[serde(rename = "Kartlarım")]
    Cards,
    #[serde(rename = "Krediler")]
    Loans,
    #[serde(rename = "Yatırımlar")]
    Investments,
    #[serde(rename = "Ödemeler")]
    Payments,
    #[serde(rename = "Ayarlar")]
    Settings,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Self::Overview,
        Self::Transfers,
        Self::Accounts,
        Self::Cards,
        Self::Loans,
        Self::Investments,
        Self::Payments,
        Self::Settings,
    ];

    /// Menu label as shown in the navigation and used by the action schema.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Genel Bakış",
            Self::Transfers => "Transferler",
            Self::Accounts => "Hesaplarım",
            Self::Cards => "Kartlarım",
            Self::Loans => "Krediler",
            Self::Investments => "Yatırımlar",
            Self::Payments => "Ödemeler",
            Self::Settings => "Ayarlar",
        }
    }

    /// Look up a section by its exact label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::Overview
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
