//! Capability kinds and per-provider capability flags.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::GenerationError;

/// One of the three generation capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Text,
    Image,
    Video,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Text, Capability::Image, Capability::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Text => "text",
            Capability::Image => "image",
            Capability::Video => "video",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Capability::Text),
            "image" => Ok(Capability::Image),
            "video" => Ok(Capability::Video),
            other => Err(GenerationError::InvalidParameter(format!(
                "unknown capability '{other}' (expected text, image or video)"
            ))),
        }
    }
}

/// Capabilities a provider can serve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub text: bool,
    pub image: bool,
    pub video: bool,
}

impl ProviderCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self) -> Self {
        self.text = true;
        self
    }

    pub fn with_image(mut self) -> Self {
        self.image = true;
        self
    }

    pub fn with_video(mut self) -> Self {
        self.video = true;
        self
    }

    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Text => self.text,
            Capability::Image => self.image,
            Capability::Video => self.video,
        }
    }
}
