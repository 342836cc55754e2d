//! Intent resolution: utterance in, validated [`Action`] out.

pub mod action;
pub mod extract;
pub mod local;
pub mod resolver;

pub use action::{Action, MAX_COMPOSITE_DEPTH};
pub use extract::{ReplyError, extract_json_object, parse_reply};
pub use local::LocalRules;
pub use resolver::{FailureKind, IntentResolver, Resolution};
