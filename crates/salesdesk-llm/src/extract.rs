//! Pull a JSON object out of free-form model output.

use serde::de::DeserializeOwned;

use crate::error::GenerationError;

/// Returns the slice from the first `{` to the last `}` inclusive.
///
/// Models often wrap JSON in prose or code fences; everything outside the
/// outermost braces is discarded.
///
/// # Errors
///
/// Returns [`GenerationError::MalformedResponse`] when either brace is
/// missing or the closing brace precedes the opening one.
pub fn extract_json_object(text: &str) -> Result<&str, GenerationError> {
    let start = text
        .find('{')
        .ok_or_else(|| GenerationError::MalformedResponse("missing opening brace".into()))?;
    let end = text
        .rfind('}')
        .ok_or_else(|| GenerationError::MalformedResponse("missing closing brace".into()))?;
    if end < start {
        return Err(GenerationError::MalformedResponse(
            "closing brace precedes opening brace".into(),
        ));
    }
    Ok(&text[start..=end])
}

/// Extract the embedded JSON object and deserialize it into `T`.
///
/// # Errors
///
/// Returns [`GenerationError::MalformedResponse`] when no object is found, or
/// [`GenerationError::Deserialize`] when it does not match `T`.
pub fn parse_embedded_json<T: DeserializeOwned>(
    text: &str,
    context: &str,
) -> Result<T, GenerationError> {
    let raw = extract_json_object(text)?;
    serde_json::from_str(raw).map_err(|e| GenerationError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}
