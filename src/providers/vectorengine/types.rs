//! Vectorengine wire types
//!
//! OpenAI-compatible chat completion shapes, kept private to the client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body fields set by the client itself.
pub(super) const RESERVED_FIELDS: &[&str] = &["model", "messages", "temperature", "max_tokens", "top_p"];

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(flatten)]
    pub extra: Option<&'a HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
