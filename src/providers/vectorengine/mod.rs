//! Vectorengine Provider
//!
//! OpenAI-compatible chat completion relay used for text generation.
//!
//! - `POST {base_url}/v1/chat/completions`
//! - `Authorization: Bearer <api_key>`

mod client;
mod types;

pub use client::VectorEngineClient;

/// Provider name used in configuration and results.
pub const PROVIDER_ID: &str = "vectorengine";

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
