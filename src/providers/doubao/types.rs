//! Doubao (Volcengine Ark) content generation task wire types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub(super) const RESERVED_FIELDS: &[&str] = &["model", "content"];

#[derive(Debug, Serialize)]
pub(super) struct CreateTaskRequest<'a> {
    pub model: &'a str,
    pub content: Vec<ContentPart>,
    #[serde(flatten)]
    pub extra: Option<&'a HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub(super) struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateTaskResponse {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TaskResponse {
    pub status: String,
    #[serde(default)]
    pub content: Option<TaskContent>,
    #[serde(default)]
    pub error: Option<TaskError>,
    #[serde(default)]
    pub duration: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TaskContent {
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct TaskError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
