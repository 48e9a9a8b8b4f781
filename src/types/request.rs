//! Generation Request Types
//!
//! Per-capability option bags and the immutable `GenerationRequest` that the
//! generation service dispatches. Provider-specific knobs that have no common
//! field go into `extra_params` and are interpreted only by the leaf client.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Capability;

/// Options for text generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextOptions {
    /// Model override; the provider's configured model is used otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Additional provider-specific parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<HashMap<String, serde_json::Value>>,
}

impl TextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_extra_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_params
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Options for image generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,

    /// Image size, e.g. "1024x1024"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    /// Reference image URLs; a non-empty list selects image-to-image where the
    /// provider supports it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reference_images: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<HashMap<String, serde_json::Value>>,
}

impl ImageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_reference_image(mut self, url: impl Into<String>) -> Self {
        self.reference_images.push(url.into());
        self
    }

    pub fn with_extra_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_params
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Options for video generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Video duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    /// Aspect ratio, e.g. "16:9"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,

    /// First-frame image URL for image-to-video generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_frame_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_params: Option<HashMap<String, serde_json::Value>>,
}

impl VideoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(aspect_ratio.into());
        self
    }

    pub fn with_first_frame_image(mut self, url: impl Into<String>) -> Self {
        self.first_frame_image = Some(url.into());
        self
    }

    pub fn with_extra_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra_params
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}

/// Capability-specific payload of a `GenerationRequest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "capability", rename_all = "lowercase")]
pub enum GenerationPayload {
    Text {
        #[serde(default)]
        system_prompt: String,
        #[serde(default)]
        options: TextOptions,
    },
    Image {
        #[serde(default)]
        options: ImageOptions,
    },
    Video {
        #[serde(default)]
        options: VideoOptions,
    },
}

/// A generation request. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider: Option<String>,
    #[serde(flatten)]
    payload: GenerationPayload,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>, system_prompt: impl Into<String>, options: TextOptions) -> Self {
        Self {
            prompt: prompt.into(),
            provider: None,
            payload: GenerationPayload::Text {
                system_prompt: system_prompt.into(),
                options,
            },
        }
    }

    pub fn image(prompt: impl Into<String>, options: ImageOptions) -> Self {
        Self {
            prompt: prompt.into(),
            provider: None,
            payload: GenerationPayload::Image { options },
        }
    }

    pub fn video(prompt: impl Into<String>, options: VideoOptions) -> Self {
        Self {
            prompt: prompt.into(),
            provider: None,
            payload: GenerationPayload::Video { options },
        }
    }

    /// Route the request to an explicit provider instead of the configured default.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn capability(&self) -> Capability {
        match self.payload {
            GenerationPayload::Text { .. } => Capability::Text,
            GenerationPayload::Image { .. } => Capability::Image,
            GenerationPayload::Video { .. } => Capability::Video,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn payload(&self) -> &GenerationPayload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_reports_capability_and_provider() {
        let req = GenerationRequest::video("a cat surfing", VideoOptions::new().with_duration(5))
            .with_provider("doubao");

        assert_eq!(req.capability(), Capability::Video);
        assert_eq!(req.provider(), Some("doubao"));
        assert_eq!(req.prompt(), "a cat surfing");
        match req.payload() {
            GenerationPayload::Video { options } => assert_eq!(options.duration, Some(5)),
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn request_deserializes_from_tagged_json() {
        let req: GenerationRequest = serde_json::from_value(serde_json::json!({
            "capability": "image",
            "prompt": "a lighthouse",
            "options": { "size": "1024x768", "negative_prompt": "blurry" }
        }))
        .expect("request should decode");

        assert_eq!(req.capability(), Capability::Image);
        assert_eq!(req.provider(), None);
        match req.payload() {
            GenerationPayload::Image { options } => {
                assert_eq!(options.size.as_deref(), Some("1024x768"));
                assert_eq!(options.negative_prompt.as_deref(), Some("blurry"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn extra_params_accumulate() {
        let opts = ImageOptions::new()
            .with_extra_param("seed", serde_json::json!(7))
            .with_extra_param("style", serde_json::json!("ink"));
        let extra = opts.extra_params.expect("extra params");
        assert_eq!(extra.len(), 2);
        assert_eq!(extra["seed"], serde_json::json!(7));
    }
}
