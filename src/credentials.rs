use crate::error::PitchError;

/// Google AI Studio keys: "AIza" prefix, 39 characters total.
const KEY_PREFIX: &str = "AIza";
const KEY_LEN: usize = 39;

/// Literal values that mean "nobody configured a real key". "undefined" and
/// "null" appear when a missing environment variable is stringified by the
/// hosting page; the rest are copy-paste leftovers from setup docs.
const PLACEHOLDER_KEYS: &[&str] = &[
    "undefined",
    "null",
    "YOUR_API_KEY",
    "your_api_key_here",
    "AIzaSyYOUR_API_KEY_HERE",
];

/// Syntactic credential check. No network I/O — the quota probe is separate.
pub fn validate_api_key(api_key: &str) -> Result<(), PitchError> {
    let key = api_key.trim();

    if key.is_empty() {
        return Err(PitchError::InvalidCredential(
            "no API key provided — set the API key in your environment configuration".to_string(),
        ));
    }

    if PLACEHOLDER_KEYS.contains(&key) {
        return Err(PitchError::InvalidCredential(format!(
            "API key is the placeholder value \"{key}\" — the environment configuration \
             was never filled in with a real key"
        )));
    }

    // Unresolved build-time template, e.g. "%VITE_API_KEY%" or "${API_KEY}"
    if (key.starts_with('%') && key.ends_with('%')) || key.contains("${") {
        return Err(PitchError::InvalidCredential(
            "API key looks like an unresolved template variable — the environment \
             configuration was not substituted at build time"
                .to_string(),
        ));
    }

    if !key.starts_with(KEY_PREFIX) || key.len() != KEY_LEN {
        tracing::warn!(key = %redact(key), "API key failed format check");
        return Err(PitchError::InvalidCredential(format!(
            "API key does not match the expected format ({KEY_PREFIX}…, {KEY_LEN} chars)"
        )));
    }

    Ok(())
}

/// Last four characters only, for log output.
pub fn redact(api_key: &str) -> String {
    let tail: String = api_key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("…{tail}")
}
