use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The canonical pitch package handed to rendering, export and persistence
/// collaborators. Every field is guaranteed present after `normalize` —
/// downstream code never checks for missing values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchData {
    pub name: String,
    pub tagline: String,
    pub elevator_pitch: String,
    pub problem: String,
    pub solution: String,
    pub target_audience: TargetAudience,
    pub unique_value_proposition: String,
    pub landing_copy: LandingCopy,
    pub industry: String,
    pub colors: BrandColors,
    pub logo_ideas: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetAudience {
    pub description: String,
    pub segments: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingCopy {
    pub headline: String,
    pub subheadline: String,
    pub call_to_action: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub neutral: String,
}

mod defaults {
    pub const NAME: &str = "Untitled Startup";
    pub const TAGLINE: &str = "Turning ideas into reality";
    pub const ELEVATOR_PITCH: &str =
        "A new venture solving a real problem for a well-defined audience.";
    pub const PROBLEM: &str =
        "Every market has an underserved need waiting to be addressed.";
    pub const SOLUTION: &str =
        "A focused product that meets that need simply and well.";
    pub const AUDIENCE_DESCRIPTION: &str = "Early adopters looking for a better way";
    pub const SEGMENTS: &[&str] = &["Early adopters", "Small businesses", "Tech enthusiasts"];
    pub const UVP: &str = "A simpler way to get from idea to launch.";
    pub const HEADLINE: &str = "Welcome to the future";
    pub const SUBHEADLINE: &str = "Something great is on the way";
    pub const CALL_TO_ACTION: &str = "Get Started";
    pub const INDUSTRY: &str = "Technology";
    pub const PRIMARY: &str = "#3B82F6";
    pub const SECONDARY: &str = "#1E40AF";
    pub const ACCENT: &str = "#F59E0B";
    pub const NEUTRAL: &str = "#6B7280";
    pub const LOGO_IDEAS: &[&str] = &[
        "A clean wordmark in the primary color",
        "An abstract geometric monogram",
        "A minimal line icon paired with the name",
    ];
}

/// Fill every canonical field from a parsed (possibly partial, possibly
/// wrong-typed) object, substituting fixed defaults for anything absent,
/// empty or mistyped. Pure, total, idempotent: normalizing an already
/// normalized record changes nothing.
pub fn normalize(parsed: &Value) -> PitchData {
    // Models sometimes emit target_audience as a bare string.
    let audience = &parsed["target_audience"];
    let audience_description = audience
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| string_or(audience, "description", defaults::AUDIENCE_DESCRIPTION));

    let landing = &parsed["landing_copy"];
    let colors = &parsed["colors"];

    PitchData {
        name: string_or(parsed, "name", defaults::NAME),
        tagline: string_or(parsed, "tagline", defaults::TAGLINE),
        elevator_pitch: string_or(parsed, "elevator_pitch", defaults::ELEVATOR_PITCH),
        problem: string_or(parsed, "problem", defaults::PROBLEM),
        solution: string_or(parsed, "solution", defaults::SOLUTION),
        target_audience: TargetAudience {
            description: audience_description,
            segments: string_list_or(audience, "segments", defaults::SEGMENTS),
        },
        unique_value_proposition: string_or(
            parsed,
            "unique_value_proposition",
            defaults::UVP,
        ),
        landing_copy: LandingCopy {
            headline: string_or(landing, "headline", defaults::HEADLINE),
            subheadline: string_or(landing, "subheadline", defaults::SUBHEADLINE),
            call_to_action: string_or(landing, "call_to_action", defaults::CALL_TO_ACTION),
        },
        industry: string_or(parsed, "industry", defaults::INDUSTRY),
        colors: BrandColors {
            primary: color_or(colors, "primary", defaults::PRIMARY),
            secondary: color_or(colors, "secondary", defaults::SECONDARY),
            accent: color_or(colors, "accent", defaults::ACCENT),
            neutral: color_or(colors, "neutral", defaults::NEUTRAL),
        },
        logo_ideas: string_list_or(parsed, "logo_ideas", defaults::LOGO_IDEAS),
    }
}

/// Prompt asking the model for the canonical pitch JSON shape. Field names
/// here must stay in lockstep with `PitchData`.
pub fn build_pitch_prompt(idea: &str) -> String {
    format!(
        "You are a startup pitch strategist. Turn the following idea into a \
         complete pitch package.\n\n\
         Idea: {idea}\n\n\
         Respond with a single JSON object and nothing else, using exactly \
         these fields:\n\
         {{\n\
           \"name\": \"a short memorable startup name\",\n\
           \"tagline\": \"one punchy sentence\",\n\
           \"elevator_pitch\": \"2-3 sentences\",\n\
           \"problem\": \"the pain point being solved\",\n\
           \"solution\": \"how the product solves it\",\n\
           \"target_audience\": {{\"description\": \"who this is for\", \
         \"segments\": [\"segment\", \"segment\"]}},\n\
           \"unique_value_proposition\": \"why this beats alternatives\",\n\
           \"landing_copy\": {{\"headline\": \"hero headline\", \
         \"subheadline\": \"supporting line\", \"call_to_action\": \"button text\"}},\n\
           \"industry\": \"one-word industry label\",\n\
           \"colors\": {{\"primary\": \"#hex\", \"secondary\": \"#hex\", \
         \"accent\": \"#hex\", \"neutral\": \"#hex\"}},\n\
           \"logo_ideas\": [\"idea\", \"idea\", \"idea\"]\n\
         }}"
    )
}

fn string_or(v: &Value, key: &str, default: &str) -> String {
    v[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| default.to_string())
}

fn string_list_or(v: &Value, key: &str, default: &[&str]) -> Vec<String> {
    let items: Vec<String> = v[key]
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        items
    }
}

/// Like `string_or` but additionally requires a #rgb or #rrggbb hex value,
/// so a stray "blue" from the model can't leak into inline styles.
fn color_or(v: &Value, key: &str, default: &str) -> String {
    v[key]
        .as_str()
        .map(str::trim)
        .filter(|s| is_hex_color(s))
        .map(|s| s.to_string())
        .unwrap_or_else(|| default.to_string())
}

fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    (digits.len() == 3 || digits.len() == 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}
