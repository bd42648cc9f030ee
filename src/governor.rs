use std::collections::{HashMap, VecDeque};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::Instant;

use crate::error::PitchError;
use crate::models::{AUTO_MODEL, RESTRICTED_MODEL, cooldown_key};

/// Durable key-value store for per-model cooldown marks. The production
/// binding is whatever persistence the host gives us; tests use
/// `MemoryStore`. Values are unix-millis decimal strings.
pub trait UsageStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-process store. Default backing when the host provides nothing
/// durable, and the fake for governor tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UsageStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

#[derive(Clone, Debug)]
pub struct GovernorConfig {
    /// Rolling window length for the global call cap.
    pub window: Duration,
    /// Max calls allowed inside one window.
    pub max_calls: usize,
    /// Reuse cooldown for the restricted model.
    pub model_cooldown: Duration,
    /// Minimum spacing between any two outbound dispatches.
    pub min_spacing: Duration,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_calls: 2,
            model_cooldown: Duration::from_secs(60),
            min_spacing: Duration::from_secs(1),
        }
    }
}

/// Client-side call budget, independent of server throttling. The window
/// check is synchronous (prune, check, record with no intervening await),
/// so overlapping logical requests that are properly awaited always observe
/// a consistent window.
pub struct RateGovernor<S: UsageStore> {
    config: GovernorConfig,
    window: VecDeque<Instant>,
    last_dispatch: Option<Instant>,
    store: S,
}

impl<S: UsageStore> RateGovernor<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, GovernorConfig::default())
    }

    pub fn with_config(store: S, config: GovernorConfig) -> Self {
        Self {
            config,
            window: VecDeque::new(),
            last_dispatch: None,
            store,
        }
    }

    /// Enforce the N-calls-per-window cap. On success the current timestamp
    /// is recorded; on failure nothing is recorded.
    pub fn check_global_rate_limit(&mut self) -> Result<(), PitchError> {
        let now = Instant::now();

        while let Some(&oldest) = self.window.front() {
            if now.duration_since(oldest) >= self.config.window {
                self.window.pop_front();
            } else {
                break;
            }
        }

        if self.window.len() >= self.config.max_calls {
            // Window is full; the oldest entry leaving it frees the next slot.
            let oldest = self.window[0];
            let remaining = self
                .config
                .window
                .saturating_sub(now.duration_since(oldest));
            let seconds_remaining = remaining.as_secs_f64().ceil() as u64;
            tracing::warn!(seconds_remaining, "global rate window full");
            return Err(PitchError::RateLimited { seconds_remaining });
        }

        self.window.push_back(now);
        Ok(())
    }

    /// Reject reuse of the restricted model inside its cooldown. "auto" is
    /// always exempt; non-restricted concrete models are never gated.
    pub fn check_model_cooldown(&self, model_id: &str) -> Result<(), PitchError> {
        if model_id == AUTO_MODEL || model_id != RESTRICTED_MODEL {
            return Ok(());
        }

        let Some(mark) = self.store.get(&cooldown_key(model_id)) else {
            return Ok(());
        };
        // Corrupted mark = treat as absent, not as an error.
        let Ok(mark_ms) = mark.parse::<u64>() else {
            tracing::warn!(model = model_id, "discarding unparsable cooldown mark");
            return Ok(());
        };

        let now_ms = unix_millis();
        let elapsed = Duration::from_millis(now_ms.saturating_sub(mark_ms));
        if elapsed < self.config.model_cooldown {
            let remaining = self.config.model_cooldown - elapsed;
            let seconds_remaining = remaining.as_secs_f64().ceil() as u64;
            return Err(PitchError::RateLimited { seconds_remaining });
        }

        Ok(())
    }

    /// Record a successful call against a concrete model. Never called on
    /// failure, so a failed attempt does not start the cooldown.
    pub fn mark_model_used(&mut self, concrete_model: &str) {
        self.store
            .set(&cooldown_key(concrete_model), &unix_millis().to_string());
    }

    /// Delay (never fail) so two dispatches are at least `min_spacing`
    /// apart. Applies to the first attempt of a logical request only;
    /// retries use the backoff schedule instead.
    pub async fn pace(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_dispatch {
            let since = now.duration_since(last);
            if since < self.config.min_spacing {
                tokio::time::sleep(self.config.min_spacing - since).await;
            }
        }
        self.last_dispatch = Some(Instant::now());
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
