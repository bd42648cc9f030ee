use serde_json::Value;

use crate::credentials;
use crate::error::PitchError;
use crate::extract;
use crate::governor::{GovernorConfig, RateGovernor, UsageStore};
use crate::models;
use crate::pitch::{self, PitchData};
use crate::transport::{self, HttpTransport, NoResponse, RetryPolicy, Transport};

/// Orchestrates one generation call end to end: credential validation,
/// rate governing, paced dispatch with retries, extraction, normalization.
///
/// `&mut self` entry points serialize logical requests per client, which is
/// the usage model the governor assumes. The client holds no credential and
/// no result between calls.
pub struct PitchClient<S: UsageStore, T: Transport = HttpTransport> {
    transport: T,
    governor: RateGovernor<S>,
    policy: RetryPolicy,
}

impl<S: UsageStore> PitchClient<S, HttpTransport> {
    pub fn new(store: S) -> Self {
        Self::with_transport(store, HttpTransport::new())
    }
}

impl<S: UsageStore, T: Transport> PitchClient<S, T> {
    pub fn with_transport(store: S, transport: T) -> Self {
        Self {
            transport,
            governor: RateGovernor::new(store),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_config(store: S, transport: T, governor: GovernorConfig, policy: RetryPolicy) -> Self {
        Self {
            transport,
            governor: RateGovernor::with_config(store, governor),
            policy,
        }
    }

    /// Syntactic credential check, re-exported for UI gating.
    pub fn validate_api_key(api_key: &str) -> Result<(), PitchError> {
        credentials::validate_api_key(api_key)
    }

    /// One minimal generation call to detect quota exhaustion or a revoked
    /// key before the real request. Not retried, no governor slot consumed:
    /// this is a readiness probe, not a logical request.
    pub async fn check_api_quota(&self, api_key: &str) -> Result<(), PitchError> {
        credentials::validate_api_key(api_key)?;

        let concrete = models::resolve(models::AUTO_MODEL)?;
        let url = models::endpoint_url(concrete, api_key);
        let body = transport::build_generation_body("ping", false);

        match self.transport.execute(&url, &body).await {
            Ok(resp) if resp.status == 429 => Err(PitchError::QuotaExceeded(
                "the provider reported the quota is exhausted (HTTP 429)".to_string(),
            )),
            Ok(resp) if resp.status == 403 => Err(PitchError::InvalidCredential(
                "the provider rejected the API key (HTTP 403)".to_string(),
            )),
            // Any other status: the probe only answers "is the key usable";
            // transient provider trouble is the main flow's concern.
            Ok(_) => Ok(()),
            Err(NoResponse(message)) => Err(PitchError::NetworkFailure {
                attempts: 1,
                message,
            }),
        }
    }

    /// Raw-text surface: dispatch a prepared request body to a model and
    /// return the extracted generated text. Applies every governor check,
    /// and records the cooldown mark only after success.
    pub async fn make_request(
        &mut self,
        body: &Value,
        api_key: &str,
        model_id: &str,
        on_progress: impl FnMut(&str),
    ) -> Result<String, PitchError> {
        credentials::validate_api_key(api_key)?;
        let concrete = models::resolve(model_id)?;

        // Both limits must pass; the window is checked first, so a full
        // window is what gets reported when both would trip.
        self.governor.check_global_rate_limit()?;
        self.governor.check_model_cooldown(model_id)?;
        self.governor.pace().await;

        let url = models::endpoint_url(concrete, api_key);
        tracing::info!(model = concrete, "dispatching generation request");

        let text =
            transport::send_with_retry(&self.transport, &url, body, &self.policy, on_progress)
                .await?;

        self.governor.mark_model_used(concrete);
        tracing::info!(model = concrete, chars = text.len(), "generation succeeded");
        Ok(text)
    }

    /// Full pipeline: idea in, complete `PitchData` out.
    pub async fn generate(
        &mut self,
        idea: &str,
        model_id: &str,
        api_key: &str,
        on_progress: impl FnMut(&str),
    ) -> Result<PitchData, PitchError> {
        let prompt = pitch::build_pitch_prompt(idea);
        let body = transport::build_generation_body(&prompt, true);
        let text = self
            .make_request(&body, api_key, model_id, on_progress)
            .await?;
        extract::extract_and_parse_json(&text)
    }

    pub fn governor(&self) -> &RateGovernor<S> {
        &self.governor
    }

    /// Access the underlying transport (for testing).
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
