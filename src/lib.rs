//! pitchforge — LLM request orchestration for a startup pitch generator.
//!
//! Turns a free-text idea into a normalized pitch package by driving an
//! unreliable, rate-limited text-generation API: credential validation,
//! client-side rate governing, bounded retries with backoff, and defensive
//! extraction of structured data from free-form model output. Rendering,
//! persistence and auth live with the caller.

pub mod client;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod governor;
pub mod models;
pub mod pitch;
pub mod transport;

pub use client::PitchClient;
pub use error::PitchError;
pub use pitch::PitchData;
