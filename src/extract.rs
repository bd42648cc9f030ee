use serde_json::Value;

use crate::error::PitchError;
use crate::pitch::{self, PitchData};

/// Max characters of offending text quoted in an UnparsableJson error.
const EXCERPT_LEN: usize = 120;

/// Pull the generated text out of the provider envelope:
/// `candidates[0].content.parts[*].text`, parts joined in order.
/// Every level is optional in practice, so each is checked, not assumed.
pub fn extract_text(envelope: &Value) -> Result<String, PitchError> {
    let parts = envelope["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            PitchError::MalformedResponse(
                "envelope has no candidates[0].content.parts array".to_string(),
            )
        })?;

    let mut collected: Vec<&str> = Vec::new();
    for part in parts {
        if let Some(text) = part["text"].as_str()
            && !text.is_empty()
        {
            collected.push(text);
        }
    }

    if collected.is_empty() {
        return Err(PitchError::MalformedResponse(
            "no non-empty text part in candidate content".to_string(),
        ));
    }

    Ok(collected.join("\n"))
}

/// Locate, repair if needed, and parse the JSON object embedded in model
/// output, then normalize it into a complete `PitchData`.
///
/// Models wrap JSON in prose and code fences, use single quotes, and leave
/// trailing commas; direct parse is tried first and a repair pass only runs
/// when it fails. Normalization itself never fails.
pub fn extract_and_parse_json(text: &str) -> Result<PitchData, PitchError> {
    let unfenced = strip_code_fences(text);
    let candidate = object_slice(unfenced).ok_or_else(|| PitchError::UnparsableJson {
        excerpt: excerpt(unfenced),
    })?;

    let parsed: Value = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(first_err) => {
            tracing::debug!(error = %first_err, "direct parse failed, attempting repair");
            let repaired = repair_json(candidate);
            serde_json::from_str(&repaired).map_err(|_| PitchError::UnparsableJson {
                excerpt: excerpt(candidate),
            })?
        }
    };

    Ok(pitch::normalize(&parsed))
}

/// Strip a ```json ... ``` or ``` ... ``` wrapper, tolerating prose around
/// the fence. Without a fence the text passes through trimmed.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let inner = &trimmed[open + 3..];
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    match inner.find("```") {
        Some(close) => inner[..close].trim(),
        None => inner.trim(),
    }
}

/// Slice from the first `{` to the last `}`, dropping commentary on either
/// side. Returns None when the text holds no object at all.
fn object_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Best-effort repair of near-JSON: raw newlines/tabs become spaces, runs
/// of spaces collapse, single quotes outside double-quoted strings become
/// double quotes, and trailing commas before `}` / `]` are dropped.
fn repair_json(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut last_was_space = false;
    for c in text.chars() {
        let c = if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c };
        if c == ' ' {
            if !last_was_space {
                collapsed.push(' ');
            }
            last_was_space = true;
        } else {
            collapsed.push(c);
            last_was_space = false;
        }
    }

    let mut requoted = String::with_capacity(collapsed.len());
    let mut in_string = false;
    let mut escaped = false;
    for c in collapsed.chars() {
        match c {
            '"' if !escaped => {
                in_string = !in_string;
                requoted.push(c);
            }
            '\'' if !in_string => requoted.push('"'),
            _ => requoted.push(c),
        }
        escaped = c == '\\' && !escaped;
    }

    let chars: Vec<char> = requoted.chars().collect();
    let mut out = String::with_capacity(requoted.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ',' {
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

fn excerpt(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let head: String = trimmed.chars().take(EXCERPT_LEN).collect();
        format!("{head}…")
    }
}
