//! Input validation for mood submissions.
//!
//! The request body is inspected as loose JSON so that missing fields and
//! wrong types produce the same caller-facing messages as out-of-range values.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{PortraitError, PortraitResult};

pub const MAX_MOOD_CHARS: usize = 50;
pub const MIN_ENERGY: i64 = 1;
pub const MAX_ENERGY: i64 = 10;
pub const MAX_TAGS: usize = 10;
pub const MAX_TAG_CHARS: usize = 30;
pub const MAX_JOURNAL_CHARS: usize = 2000;

const INVALID_MOOD: &str = "Invalid mood input.";
const INVALID_ENERGY: &str = "Energy must be between 1 and 10.";
const JOURNAL_TOO_LONG: &str = "Journal entry too long (max 2000 chars).";
const INVALID_JOURNAL: &str = "Invalid journal entry.";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// A validated submission, ready for prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPortrait {
    pub mood: String,
    pub energy: u8,
    /// Display string of at most [`MAX_TAGS`] tags joined by `", "`. Empty when none.
    pub tags: String,
    /// Journal text with markup removed and whitespace trimmed. Empty when absent.
    pub journal: String,
}

/// Validate a raw request body and return its sanitized fields.
pub fn validate(body: &Value) -> PortraitResult<SanitizedPortrait> {
    let mood = body
        .get("mood")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty() && m.chars().count() <= MAX_MOOD_CHARS)
        .ok_or_else(|| invalid(INVALID_MOOD))?;

    let energy = body
        .get("energy")
        .and_then(parse_energy)
        .ok_or_else(|| invalid(INVALID_ENERGY))?;

    let journal = match body.get("journal") {
        None | Some(Value::Null) => "",
        Some(Value::String(text)) if text.chars().count() > MAX_JOURNAL_CHARS => {
            return Err(invalid(JOURNAL_TOO_LONG));
        }
        Some(Value::String(text)) => text.as_str(),
        Some(_) => return Err(invalid(INVALID_JOURNAL)),
    };

    Ok(SanitizedPortrait {
        mood: mood.to_string(),
        energy,
        tags: join_tags(body.get("tags")),
        journal: strip_markup(journal),
    })
}

/// Remove every `<...>` tag and trim the result.
pub fn strip_markup(text: &str) -> String {
    MARKUP_TAG.replace_all(text, "").trim().to_string()
}

fn parse_energy(value: &Value) -> Option<u8> {
    let n = value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })?;
    (MIN_ENERGY..=MAX_ENERGY)
        .contains(&n)
        .then(|| u8::try_from(n).ok())
        .flatten()
}

fn join_tags(tags: Option<&Value>) -> String {
    let Some(Value::Array(items)) = tags else {
        return String::new();
    };
    items
        .iter()
        .take(MAX_TAGS)
        .map(|tag| {
            let text = match tag {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            text.chars().take(MAX_TAG_CHARS).collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn invalid(message: &str) -> PortraitError {
    PortraitError::InvalidInput(message.to_string())
}
