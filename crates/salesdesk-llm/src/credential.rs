//! Credential shape check performed before any remote attempt.

const KEY_PREFIX: &str = "sk-";

/// Returns `true` when `key` looks like a usable API key: present, `sk-`
/// prefixed, with a non-empty remainder and no whitespace.
///
/// Pure check only; it never contacts the service.
#[must_use]
pub fn credential_looks_valid(key: Option<&str>) -> bool {
    key.is_some_and(|k| {
        k.strip_prefix(KEY_PREFIX)
            .is_some_and(|rest| !rest.is_empty())
            && !k.chars().any(char::is_whitespace)
    })
}
