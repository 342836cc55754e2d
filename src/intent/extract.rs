//! Pull a JSON action out of model output that may be wrapped in prose.

use serde_json::Value;

use crate::error::ActionError;
use crate::intent::action::Action;

/// Why a model reply could not be turned into an [`Action`].
#[derive(Debug, thiserror::Error)]
pub enum ReplyError {
    #[error("Reply is not JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reply does not match the action schema: {0}")]
    Schema(#[from] ActionError),
}

/// Return the first balanced `{...}` substring of `content`.
///
/// Braces inside JSON string literals are ignored. If the first `{` never
/// balances, scanning resumes from the next one.
pub fn extract_json_object(content: &str) -> Option<&str> {
    let bytes = content.as_bytes();
    let mut start = 0;

    while let Some(offset) = content[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(bytes, open) {
            return Some(&content[open..=close]);
        }
        start = open + 1;
    }
    None
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse a model reply into a validated action.
///
/// Uses the first balanced object when there is one, otherwise the whole
/// content.
pub fn parse_reply(content: &str) -> Result<Action, ReplyError> {
    let candidate = extract_json_object(content).unwrap_or(content);
    let value: Value = serde_json::from_str(candidate.trim())?;
    Ok(Action::from_value(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_object_inside_prose() {
        let content = r#"Tabii! {"action":"show_balance","payload":null,"message":"Bakiye"} umarım yardımcı olur"#;
        assert_eq!(
            extract_json_object(content),
            Some(r#"{"action":"show_balance","payload":null,"message":"Bakiye"}"#)
        );
    }

    #[test]
    fn nested_objects_stay_together() {
        let content = r#"{"action":"navigate","payload":{"menu":"Kartlarım"}} ve {"x":1}"#;
        assert_eq!(
            extract_json_object(content),
            Some(r#"{"action":"navigate","payload":{"menu":"Kartlarım"}}"#)
        );
    }

    #[test]
    fn braces_in_strings_are_ignored() {
        let content = r#"{"action":"speak","payload":{"text":"a } b \" { c"}}"#;
        assert_eq!(extract_json_object(content), Some(content));
    }

    #[test]
    fn unbalanced_prefix_is_skipped() {
        let content = r#"{ bozuk {"action":"none"}"#;
        assert_eq!(extract_json_object(content), Some(r#"{"action":"none"}"#));
    }

    #[test]
    fn no_object_returns_none() {
        assert_eq!(extract_json_object("sadece yazı"), None);
        assert_eq!(extract_json_object("{ açık kaldı"), None);
    }

    #[test]
    fn parse_reply_validates() {
        let action = parse_reply(r#"Cevap: {"action":"hide_balance","payload":null,"message":null}"#)
            .unwrap();
        assert_eq!(action, Action::HideBalance { message: None });

        assert!(matches!(
            parse_reply(r#"{"action":"toggle_balance","payload":{"visible":"evet"}}"#),
            Err(ReplyError::Schema(_))
        ));
        assert!(matches!(parse_reply("anlamadım"), Err(ReplyError::Json(_))));
    }
}
