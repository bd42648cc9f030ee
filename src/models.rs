use crate::error::PitchError;

/// Model id the UI sends when the user has no preference.
pub const AUTO_MODEL: &str = "auto";

/// High-cost model gated by the per-model cooldown in the governor.
pub const RESTRICTED_MODEL: &str = "gemini-2.5-pro";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// One selectable backend model. The registry is fixed for the process
/// lifetime; "auto" is always present and resolves to a concrete id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
}

const MODELS: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: AUTO_MODEL,
        display_name: "Auto (recommended)",
    },
    ModelDescriptor {
        id: "gemini-2.5-flash",
        display_name: "Gemini 2.5 Flash",
    },
    ModelDescriptor {
        id: "gemini-2.5-flash-lite",
        display_name: "Gemini 2.5 Flash Lite",
    },
    ModelDescriptor {
        id: RESTRICTED_MODEL,
        display_name: "Gemini 2.5 Pro",
    },
];

/// All selectable models, for UI pickers.
pub fn available_models() -> &'static [ModelDescriptor] {
    MODELS
}

/// Resolve a user-facing model id to the concrete backend id.
/// "auto" maps to a fixed default — stable, never randomized.
pub fn resolve(model_id: &str) -> Result<&'static str, PitchError> {
    if model_id == AUTO_MODEL {
        return Ok("gemini-2.5-flash");
    }
    MODELS
        .iter()
        .find(|m| m.id == model_id && m.id != AUTO_MODEL)
        .map(|m| m.id)
        .ok_or_else(|| PitchError::UnknownModel {
            model: model_id.to_string(),
        })
}

/// Generation endpoint for a concrete model. The credential travels as a
/// query parameter per the provider's convention.
pub fn endpoint_url(concrete_model: &str, api_key: &str) -> String {
    format!("{API_BASE}/{concrete_model}:generateContent?key={api_key}")
}

/// Storage key for a model's cooldown mark.
pub fn cooldown_key(concrete_model: &str) -> String {
    format!("model_cooldown:{concrete_model}")
}
