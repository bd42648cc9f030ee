use pitchforge::error::PitchError;
use pitchforge::extract::{extract_and_parse_json, extract_text};
use pitchforge::pitch;

fn envelope_with_text(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    })
}

// ---------------------------------------------------------------------------
// Envelope text extraction
// ---------------------------------------------------------------------------

#[test]
fn extract_text_returns_part_text() {
    let env = envelope_with_text("hello world");
    assert_eq!(extract_text(&env).unwrap(), "hello world");
}

#[test]
fn extract_text_joins_multiple_parts() {
    let env = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": "first"}, {"text": "second"}]}}]
    });
    assert_eq!(extract_text(&env).unwrap(), "first\nsecond");
}

#[test]
fn extract_text_rejects_missing_candidates() {
    let env = serde_json::json!({"error": {"message": "oops"}});
    let err = extract_text(&env).unwrap_err();
    assert!(
        matches!(err, PitchError::MalformedResponse(_)),
        "expected MalformedResponse, got {err:?}"
    );
}

#[test]
fn extract_text_rejects_empty_parts() {
    let env = serde_json::json!({
        "candidates": [{"content": {"parts": []}}]
    });
    assert!(matches!(
        extract_text(&env).unwrap_err(),
        PitchError::MalformedResponse(_)
    ));
}

#[test]
fn extract_text_rejects_non_string_text() {
    let env = serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": 42}]}}]
    });
    assert!(matches!(
        extract_text(&env).unwrap_err(),
        PitchError::MalformedResponse(_)
    ));
}

// ---------------------------------------------------------------------------
// P2: code-fence stripping
// ---------------------------------------------------------------------------

#[test]
fn fenced_json_parses_same_as_bare() {
    let bare = r#"{"name":"Acme","tagline":"Do more"}"#;
    let fenced = format!("```json\n{bare}\n```");
    let plain_fenced = format!("```\n{bare}\n```");

    let from_bare = extract_and_parse_json(bare).unwrap();
    let from_fenced = extract_and_parse_json(&fenced).unwrap();
    let from_plain = extract_and_parse_json(&plain_fenced).unwrap();

    assert_eq!(from_bare, from_fenced);
    assert_eq!(from_bare, from_plain);
    assert_eq!(from_bare.name, "Acme");
}

#[test]
fn prose_around_fence_is_ignored() {
    let text = "Sure! Here is your pitch:\n```json\n{\"name\":\"Acme\"}\n```\nLet me know!";
    let data = extract_and_parse_json(text).unwrap();
    assert_eq!(data.name, "Acme");
}

#[test]
fn prose_around_bare_object_is_ignored() {
    let text = "Here you go: {\"name\":\"Acme\"} — hope that helps.";
    let data = extract_and_parse_json(text).unwrap();
    assert_eq!(data.name, "Acme");
}

// ---------------------------------------------------------------------------
// Repair pass
// ---------------------------------------------------------------------------

#[test]
fn repairs_single_quotes_and_trailing_commas() {
    let text = "{'name': 'Acme', 'tagline': 'Do more',}";
    let data = extract_and_parse_json(text).unwrap();
    assert_eq!(data.name, "Acme");
    assert_eq!(data.tagline, "Do more");
}

#[test]
fn repairs_embedded_raw_newlines() {
    let text = "{\"name\": \"Acme\", \"tagline\": \"Do\nmore\"}";
    let data = extract_and_parse_json(text).unwrap();
    assert_eq!(data.tagline, "Do more");
}

#[test]
fn unrepairable_text_reports_excerpt() {
    let err = extract_and_parse_json("I could not produce JSON for that idea.").unwrap_err();
    match err {
        PitchError::UnparsableJson { excerpt } => {
            assert!(excerpt.contains("could not produce"), "excerpt: {excerpt}");
        }
        other => panic!("expected UnparsableJson, got {other:?}"),
    }
}

#[test]
fn hopelessly_mangled_object_reports_excerpt() {
    let err = extract_and_parse_json("{{{{:::}").unwrap_err();
    assert!(matches!(err, PitchError::UnparsableJson { .. }));
}

// ---------------------------------------------------------------------------
// P1: normalization is total and idempotent
// ---------------------------------------------------------------------------

#[test]
fn empty_object_normalizes_to_complete_defaults() {
    let data = extract_and_parse_json("{}").unwrap();

    assert_eq!(data.name, "Untitled Startup");
    assert_eq!(data.industry, "Technology");
    assert_eq!(data.colors.primary, "#3B82F6");
    assert_eq!(data.landing_copy.call_to_action, "Get Started");
    assert!(!data.target_audience.segments.is_empty());
    assert!(!data.logo_ideas.is_empty());
}

#[test]
fn wrong_typed_fields_fall_back_to_defaults() {
    let text = r#"{"name": 7, "colors": {"primary": "blue"}, "logo_ideas": "a logo"}"#;
    let data = extract_and_parse_json(text).unwrap();

    assert_eq!(data.name, "Untitled Startup");
    assert_eq!(data.colors.primary, "#3B82F6");
    assert!(!data.logo_ideas.is_empty());
}

#[test]
fn target_audience_as_bare_string_becomes_description() {
    let text = r#"{"target_audience": "independent restaurant owners"}"#;
    let data = extract_and_parse_json(text).unwrap();
    assert_eq!(
        data.target_audience.description,
        "independent restaurant owners"
    );
    assert!(!data.target_audience.segments.is_empty());
}

#[test]
fn normalization_is_idempotent() {
    let once = extract_and_parse_json(r#"{"name":"Acme","industry":"Food"}"#).unwrap();
    let reserialized = serde_json::to_value(&once).unwrap();
    let twice = pitch::normalize(&reserialized);
    assert_eq!(once, twice);
}

#[test]
fn valid_hex_colors_pass_through() {
    let text = r##"{"colors": {"primary": "#0f0", "accent": "#A1B2C3"}}"##;
    let data = extract_and_parse_json(text).unwrap();
    assert_eq!(data.colors.primary, "#0f0");
    assert_eq!(data.colors.accent, "#A1B2C3");
    // missing members still defaulted
    assert_eq!(data.colors.neutral, "#6B7280");
}

// ---------------------------------------------------------------------------
// Scenario A: partial model output + defaults
// ---------------------------------------------------------------------------

#[test]
fn partial_model_output_merges_with_defaults() {
    let env = envelope_with_text(
        "```json\n{\"name\":\"GreenPlate\",\"tagline\":\"Track your footprint\"}\n```",
    );
    let text = extract_text(&env).unwrap();
    let data = extract_and_parse_json(&text).unwrap();

    assert_eq!(data.name, "GreenPlate");
    assert_eq!(data.tagline, "Track your footprint");
    assert_eq!(data.industry, "Technology");
    assert_eq!(data.colors.primary, "#3B82F6");
    assert!(!data.elevator_pitch.is_empty());
}
