use std::time::Duration;

use rand::Rng;
use reqwest::Client;
use serde_json::Value;

use crate::error::PitchError;
use crate::extract;

/// A raw HTTP exchange with the provider. Splitting the wire call behind
/// this trait keeps the retry engine testable against scripted responses.
pub trait Transport {
    fn execute(
        &self,
        url: &str,
        body: &Value,
    ) -> impl Future<Output = Result<WireResponse, NoResponse>>;
}

/// Status + body of one provider response.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub body: String,
}

/// Transport-level failure: no HTTP response was received at all.
#[derive(Debug)]
pub struct NoResponse(pub String);

pub struct HttpTransport {
    client: Client,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(4)
            .build()
            .expect("failed to build HTTP client");

        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, url: &str, body: &Value) -> Result<WireResponse, NoResponse> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| NoResponse(e.to_string()))?;

        let status = response.status().as_u16();
        // A failed body read after a received status line is still a
        // classified response; classification falls back to the status.
        let body = response.text().await.unwrap_or_default();

        Ok(WireResponse { status, body })
    }
}

/// Outbound payload for the provider's generateContent endpoint.
pub fn build_generation_body(prompt: &str, json_response: bool) -> Value {
    let mut body = serde_json::json!({
        "contents": [{"parts": [{"text": prompt}]}],
    });
    if json_response {
        body["generationConfig"] = serde_json::json!({
            "responseMimeType": "application/json",
        });
    }
    body
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts = max_retries + 1.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub cap_delay: Duration,
    /// Upper bound of the uniform jitter added to every backoff delay.
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(1000),
            cap_delay: Duration::from_millis(30_000),
            jitter: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// `min(base × 2^attempt + uniform jitter, cap)`. The jitter keeps
    /// concurrent clients from retrying in lockstep.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms));
        (exp + jitter).min(self.cap_delay)
    }
}

enum Transient {
    Throttled,
    ServerError(String),
    Network(String),
}

/// One logical generation request: POST, classify, retry transient failures
/// with bounded exponential backoff, and return the extracted text on 2xx.
///
/// 403 and 400 are terminal on first sight. 429, 5xx and network failures
/// retry up to `policy.max_retries`; `on_progress` receives a human-readable
/// waiting message before every backoff sleep. An explicit loop keeps the
/// attempt bound obvious and the stack flat.
pub async fn send_with_retry<T: Transport>(
    transport: &T,
    url: &str,
    body: &Value,
    policy: &RetryPolicy,
    mut on_progress: impl FnMut(&str),
) -> Result<String, PitchError> {
    let mut attempt: u32 = 0;

    loop {
        let outcome = transport.execute(url, body).await;

        let transient = match outcome {
            Ok(resp) if (200..300).contains(&resp.status) => {
                let envelope: Value = serde_json::from_str(&resp.body).map_err(|e| {
                    PitchError::MalformedResponse(format!("response is not JSON: {e}"))
                })?;
                return extract::extract_text(&envelope);
            }
            Ok(resp) if resp.status == 403 => {
                return Err(PitchError::InvalidCredential(
                    "the provider rejected the API key (HTTP 403)".to_string(),
                ));
            }
            Ok(resp) if resp.status == 400 => {
                let detail = provider_error_message(&resp.body)
                    .unwrap_or_else(|| "HTTP 400".to_string());
                return Err(PitchError::BadRequest(detail));
            }
            Ok(resp) if resp.status == 429 => Transient::Throttled,
            Ok(resp) if resp.status >= 500 => {
                let detail = provider_error_message(&resp.body)
                    .unwrap_or_else(|| format!("HTTP {}", resp.status));
                Transient::ServerError(detail)
            }
            Ok(resp) => {
                // Remaining 4xx (404 bad model path, 413 oversized prompt):
                // the caller's request is at fault, retrying cannot help.
                let detail = provider_error_message(&resp.body)
                    .unwrap_or_else(|| format!("unexpected HTTP {}", resp.status));
                return Err(PitchError::BadRequest(detail));
            }
            Err(NoResponse(message)) => Transient::Network(message),
        };

        if attempt >= policy.max_retries {
            let attempts = attempt + 1;
            return Err(match transient {
                Transient::Throttled => PitchError::ExhaustedRetries { attempts },
                Transient::ServerError(message) => {
                    PitchError::ProviderUnavailable { attempts, message }
                }
                Transient::Network(message) => PitchError::NetworkFailure { attempts, message },
            });
        }

        let delay = policy.backoff_delay(attempt);
        let reason = match &transient {
            Transient::Throttled => "model busy",
            Transient::ServerError(_) => "provider error",
            Transient::Network(_) => "network hiccup",
        };
        let wait_secs = delay.as_secs_f64();
        on_progress(&format!(
            "{reason} — retrying in {wait_secs:.1}s (attempt {} of {})",
            attempt + 2,
            policy.max_retries + 1,
        ));
        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason,
            "transient failure, backing off"
        );

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Pull the provider's error detail out of `{"error": {"message": ...}}`.
fn provider_error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v["error"]["message"].as_str().map(|s| s.to_string())
}
