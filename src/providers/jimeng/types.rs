//! Jimeng proxy wire types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(super) const RESERVED_FIELDS: &[&str] = &["model", "prompt", "negative_prompt", "size", "images"];

#[derive(Debug, Serialize)]
pub(super) struct ImageGenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<&'a str>,
    /// Reference images; only sent to the composition endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<&'a [String]>,
    #[serde(flatten)]
    pub extra: Option<&'a HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ImageData {
    #[serde(default)]
    pub url: Option<String>,
}
