//! The action schema shared by the local rules and the remote model.
//!
//! On the wire an action is `{ "action": kind, "payload": object|null,
//! "message": string|null }`. Here every kind is its own variant with typed
//! payload fields, and [`Action::from_value`] rejects payloads of the wrong
//! shape instead of coercing them. Kinds outside the schema are kept as
//! [`Action::Unknown`] so the dispatcher can tell the user it could not act.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};

use crate::dashboard::Section;
use crate::error::ActionError;

/// Composite actions may nest at most this deep.
pub const MAX_COMPOSITE_DEPTH: usize = 8;

/// A structured UI action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Switch the active dashboard section.
    Navigate {
        menu: Option<Section>,
        message: Option<String>,
    },
    /// Reveal and highlight the balance.
    ShowBalance { message: Option<String> },
    HideBalance { message: Option<String> },
    /// Set balance visibility explicitly.
    ToggleBalance {
        visible: Option<bool>,
        message: Option<String>,
    },
    /// Spoken feedback only.
    Speak {
        text: Option<String>,
        message: Option<String>,
    },
    /// The model could not pick an action; `message` usually asks for clarification.
    NoOp { message: Option<String> },
    /// Apply `actions` in order, then say `message`.
    Composite {
        actions: Vec<Action>,
        message: Option<String>,
    },
    /// A kind outside the schema.
    Unknown {
        kind: String,
        message: Option<String>,
    },
}

impl Action {
    /// Wire name of this action's kind.
    pub fn kind(&self) -> &str {
        match self {
            Self::Navigate { .. } => "navigate",
            Self::ShowBalance { .. } => "show_balance",
            Self::HideBalance { .. } => "hide_balance",
            Self::ToggleBalance { .. } => "toggle_balance",
            Self::Speak { .. } => "speak",
            Self::NoOp { .. } => "none",
            Self::Composite { .. } => "composite",
            Self::Unknown { kind, .. } => kind,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Navigate { message, .. }
            | Self::ShowBalance { message }
            | Self::HideBalance { message }
            | Self::ToggleBalance { message, .. }
            | Self::Speak { message, .. }
            | Self::NoOp { message }
            | Self::Composite { message, .. }
            | Self::Unknown { message, .. } => message.as_deref(),
        }
    }

    /// Validate a JSON value against the action schema.
    pub fn from_value(value: &Value) -> Result<Self, ActionError> {
        Self::from_value_at(value, 0)
    }

    fn from_value_at(value: &Value, depth: usize) -> Result<Self, ActionError> {
        let obj = value.as_object().ok_or(ActionError::NotAnObject)?;
        let kind = obj
            .get("action")
            .and_then(Value::as_str)
            .ok_or(ActionError::MissingKind)?;

        let message = optional_string(obj, kind, "message")?;
        let payload = payload_of(obj, kind)?;

        let action = match kind {
            "navigate" => {
                let menu = match payload.and_then(|p| p.get("menu")) {
                    None | Some(Value::Null) => None,
                    Some(Value::String(label)) => Some(
                        Section::from_label(label)
                            .ok_or_else(|| ActionError::UnknownSection(label.clone()))?,
                    ),
                    Some(_) => return Err(wrong_type(kind, "payload.menu", "string")),
                };
                Self::Navigate { menu, message }
            }
            "show_balance" => Self::ShowBalance { message },
            "hide_balance" => Self::HideBalance { message },
            "toggle_balance" => {
                let visible = match payload.and_then(|p| p.get("visible")) {
                    None | Some(Value::Null) => None,
                    Some(Value::Bool(b)) => Some(*b),
                    Some(_) => return Err(wrong_type(kind, "payload.visible", "boolean")),
                };
                Self::ToggleBalance { visible, message }
            }
            "speak" => {
                let text = match payload {
                    Some(p) => optional_string(p, kind, "payload.text")?,
                    None => None,
                };
                Self::Speak { text, message }
            }
            "none" => Self::NoOp { message },
            "composite" => {
                if depth >= MAX_COMPOSITE_DEPTH {
                    return Err(ActionError::TooDeep {
                        max: MAX_COMPOSITE_DEPTH,
                    });
                }
                let items = match payload.and_then(|p| p.get("actions")) {
                    Some(Value::Array(items)) => items,
                    Some(_) => return Err(wrong_type(kind, "payload.actions", "array")),
                    None => {
                        return Err(ActionError::MissingField {
                            kind: kind.to_string(),
                            field: "payload.actions".to_string(),
                        });
                    }
                };
                let actions = items
                    .iter()
                    .map(|item| Self::from_value_at(item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::Composite { actions, message }
            }
            other => Self::Unknown {
                kind: other.to_string(),
                message,
            },
        };
        Ok(action)
    }

    /// Render back to the wire shape.
    pub fn to_value(&self) -> Value {
        let payload = match self {
            Self::Navigate { menu: Some(m), .. } => json!({ "menu": m.label() }),
            Self::ToggleBalance {
                visible: Some(v), ..
            } => json!({ "visible": v }),
            Self::Speak { text: Some(t), .. } => json!({ "text": t }),
            Self::Composite { actions, .. } => {
                json!({ "actions": actions.iter().map(Action::to_value).collect::<Vec<_>>() })
            }
            _ => Value::Null,
        };
        json!({
            "action": self.kind(),
            "payload": payload,
            "message": self.message(),
        })
    }
}

fn wrong_type(kind: &str, field: &str, expected: &str) -> ActionError {
    ActionError::WrongType {
        kind: kind.to_string(),
        field: field.to_string(),
        expected: expected.to_string(),
    }
}

fn optional_string(
    obj: &Map<String, Value>,
    kind: &str,
    field: &str,
) -> Result<Option<String>, ActionError> {
    let key = field.rsplit('.').next().unwrap_or(field);
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(wrong_type(kind, field, "string")),
    }
}

fn payload_of<'a>(
    obj: &'a Map<String, Value>,
    kind: &str,
) -> Result<Option<&'a Map<String, Value>>, ActionError> {
    match obj.get("payload") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(wrong_type(kind, "payload", "object or null")),
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Action::from_value(&value).map_err(serde::de::Error::custom)
    }
}
