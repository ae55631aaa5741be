//! Canonicalisation of raw value fragments extracted from model output.

/// Strings the model uses to say "there is no value".
const NULL_TOKENS: [&str; 5] = ["[missing information]", "[missing]", "None", "undefined", "null"];

/// Strips any combination of single quotes, double quotes and whitespace from
/// both ends of `raw`. Inner quotes are left untouched.
pub fn clean_extracted_value(raw: &str) -> String {
    raw.trim_matches(|character: char| {
        character == '\'' || character == '"' || character.is_whitespace()
    })
    .to_string()
}

pub fn is_null_token(value: &str) -> bool {
    NULL_TOKENS.contains(&value)
}

/// Maps null tokens to `None`. No type coercion happens here: `"true"` and
/// `"42"` stay strings and typed slots interpret them downstream.
pub fn nullable_slot_value(value: String) -> Option<String> {
    if is_null_token(&value) {
        None
    } else {
        Some(value)
    }
}
