//! Dotted field paths and the nested decode-cause shapes

use serde_json::Value;

use crate::fault::{DecodeCause, DecodeFailure};
use crate::response::ValidationSubError;

/// Sub-error message for a value with the wrong textual format
pub const INVALID_FORMAT: &str = "Invalid format";

/// Sub-error message for a value that could not be constructed
pub const INVALID_VALUE: &str = "Invalid value";

/// Marks a decoder message about a non-boolean literal in a boolean field
pub const BOOLEAN_ONLY_MARKER: &str = r#"only "true" or "false" recognized"#;

/// Text preceding the rejected literal in a boolean mismatch message
const REJECTED_VALUE_START: &str = "String ";

/// Text following the rejected literal in a boolean mismatch message
///
/// Matched at its first occurrence, so a literal that itself contains
/// `": only` is cut short there. Existing consumers see the same truncation.
const REJECTED_VALUE_END: &str = "\": only";

/// Join field references into a dotted path
///
/// Tokens keep their traversal order; no tokens yields the empty string.
pub fn resolve_path<I, S>(tokens: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for token in tokens {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(token.as_ref());
    }
    path
}

/// Turn a decode failure into a field-level sub-error
///
/// Recognized cause shapes, in order:
/// 1. invalid format: `"Invalid format"` with the raw input as rejected value
/// 2. a message containing [`BOOLEAN_ONLY_MARKER`]: `"<field> should be true or false"`
///    with the literal scraped out of the message
/// 3. value instantiation: `"Invalid value"` with the rejected value if recorded
///
/// Anything else yields `None`.
pub fn resolve_decode_failure(failure: &DecodeFailure) -> Option<ValidationSubError> {
    let field = resolve_path(&failure.path);

    if let DecodeCause::InvalidFormat { value } = &failure.cause {
        return Some(ValidationSubError::new(field, Some(stringify(value)), INVALID_FORMAT));
    }

    if let Some(message) = failure.cause.message()
        && message.contains(BOOLEAN_ONLY_MARKER)
    {
        let rejected = scrape_rejected_literal(message).map(|literal| Value::String(literal.to_owned()));
        let message = format!("{field} should be true or false");
        return Some(ValidationSubError::new(field, rejected, message));
    }

    if let DecodeCause::ValueInstantiation { rejected } = &failure.cause {
        return Some(ValidationSubError::new(field, rejected.as_ref().map(stringify), INVALID_VALUE));
    }

    None
}

/// Rejected values from the decoder are reported as text
fn stringify(value: &Value) -> Value {
    match value {
        Value::String(_) | Value::Null => value.clone(),
        other => Value::String(other.to_string()),
    }
}

/// Extract the literal between `String "` and `": only` in a decoder message
///
/// Kept byte-compatible with the wording existing consumers parse; returns
/// `None` when either marker is missing or out of order.
fn scrape_rejected_literal(message: &str) -> Option<&str> {
    let mut start = message.find(REJECTED_VALUE_START)? + REJECTED_VALUE_START.len();
    if message[start..].starts_with('"') {
        start += 1;
    }
    let end = message.find(REJECTED_VALUE_END)?;
    message.get(start..end)
}
