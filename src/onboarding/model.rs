//! Onboarding record and QR payload models.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::camera::CapturedImage;

/// Disability category reported by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disability {
    None,
    Visual,
    Hearing,
    Physical,
    Speech,
    /// Anything that did not match a known category, as spoken.
    Other(String),
}

impl Disability {
    pub const KNOWN: [Disability; 5] = [
        Self::None,
        Self::Visual,
        Self::Hearing,
        Self::Physical,
        Self::Speech,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::None => "Yok",
            Self::Visual => "Görme Engelli",
            Self::Hearing => "İşitme Engelli",
            Self::Physical => "Fiziksel Engelli",
            Self::Speech => "Konuşma Engelli",
            Self::Other(text) => text,
        }
    }

    /// Map a label back to a category; unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|d| d.label() == label)
            .unwrap_or_else(|| Self::Other(label.to_string()))
    }
}

impl std::fmt::Display for Disability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Disability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Disability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// Contents of the accessible-transaction QR code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub disability: Disability,
    pub session_id: Uuid,
    #[serde(with = "rfc3339")]
    pub issued_at: DateTime<Utc>,
}

mod rfc3339 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

impl QrPayload {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Everything collected by a finished interview.
#[derive(Debug, Clone)]
pub struct OnboardingRecord {
    pub first_name: String,
    pub last_name: String,
    /// Age as extracted; usually digits, but may be free text.
    pub age: String,
    pub disability: Disability,
    /// `None` when no camera was available.
    pub image: Option<CapturedImage>,
    pub qr: QrPayload,
}

impl OnboardingRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: impl Into<String>,
        disability: Disability,
        image: Option<CapturedImage>,
    ) -> Self {
        let first_name = first_name.into();
        let last_name = last_name.into();
        let age = age.into();
        let qr = QrPayload {
            first_name: first_name.clone(),
            last_name: last_name.clone(),
            age: age.clone(),
            disability: disability.clone(),
            session_id: Uuid::new_v4(),
            issued_at: Utc::now(),
        };
        Self {
            first_name,
            last_name,
            age,
            disability,
            image,
            qr,
        }
    }

    /// Reissue the QR payload with a fresh session id and timestamp.
    pub fn refresh_qr(&mut self) -> &QrPayload {
        self.qr.session_id = Uuid::new_v4();
        self.qr.issued_at = Utc::now();
        &self.qr
    }

    /// Leading integer of the age, if any.
    pub fn age_years(&self) -> Option<u32> {
        let digits: String = self
            .age
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    /// Users 65 and over, and users with a disability other than visual,
    /// get larger dashboard controls.
    pub fn needs_enlarged_controls(&self) -> bool {
        self.age_years().is_some_and(|age| age >= 65)
            || !matches!(self.disability, Disability::None | Disability::Visual)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// When the current QR payload was issued, formatted for display.
    pub fn issued_at_display(&self) -> String {
        self.qr.issued_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
