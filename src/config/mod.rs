//! Provider Configuration
//!
//! Static configuration loaded once at startup and read-only afterwards. The
//! layout follows the `ai:` section of the application config file:
//!
//! ```yaml
//! ai:
//!   default_text_provider: vectorengine
//!   default_image_provider: jimeng
//!   default_video_provider: doubao
//!   vectorengine:
//!     enabled: true
//!     base_url: https://api.vectorengine.ai
//!     api_key: sk-...
//!     timeout: 60000
//!     connect_timeout: 10000
//!     read_timeout: 60000
//!   text:
//!     model: gemini-3-pro-preview
//!   image:
//!     jimeng_proxy:
//!       enabled: true
//!       base_url: http://127.0.0.1:5100
//!       sessionid: ...
//!   video:
//!     poll_interval: 5000
//!     max_poll_count: 120
//!   doubao:
//!     enabled: true
//!     base_url: https://ark.cn-beijing.volces.com
//!     api_key: ...
//!     model: doubao-seedance-1-0-pro-250528
//! ```
//!
//! All timeouts and intervals are in milliseconds.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::GenerationError;
use crate::types::Capability;

/// Environment variable overriding the vectorengine API key.
pub const ENV_API_KEY: &str = "AI_API_KEY";
/// Environment variable overriding the jimeng proxy session id.
pub const ENV_JIMENG_SESSIONID: &str = "JIMENG_SESSIONID";
/// Environment variable overriding the doubao API key.
pub const ENV_DOUBAO_API_KEY: &str = "DOUBAO_API_KEY";
pub const ENV_DEFAULT_TEXT_PROVIDER: &str = "AI_DEFAULT_TEXT_PROVIDER";
pub const ENV_DEFAULT_IMAGE_PROVIDER: &str = "AI_DEFAULT_IMAGE_PROVIDER";
pub const ENV_DEFAULT_VIDEO_PROVIDER: &str = "AI_DEFAULT_VIDEO_PROVIDER";

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from))
}

/// Root of the AI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub default_text_provider: Option<String>,
    pub default_image_provider: Option<String>,
    pub default_video_provider: Option<String>,
    pub vectorengine: VectorEngineConfig,
    pub text: TextConfig,
    pub image: ImageConfig,
    pub video: VideoConfig,
    pub doubao: DoubaoConfig,
}

/// Vectorengine relay (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorEngineConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    pub timeout: u64,
    pub connect_timeout: u64,
    pub read_timeout: u64,
}

impl Default for VectorEngineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            api_key: None,
            timeout: 60_000,
            connect_timeout: 10_000,
            read_timeout: 60_000,
        }
    }
}

/// Text generation defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub model: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            model: "gemini-3-pro-preview".to_string(),
            max_tokens: None,
            temperature: None,
            top_p: None,
        }
    }
}

/// Image generation settings.
///
/// `default_model`, `default_aspect_ratio` and `default_count` belong to the
/// application's shared `ai.image` layout and are kept so that section
/// deserializes intact. The built-in Jimeng client does not read them: it uses
/// `jimeng_proxy.model` and the per-request `ImageOptions::size`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub default_model: String,
    pub default_aspect_ratio: String,
    pub default_count: u32,
    pub jimeng_proxy: JimengProxyConfig,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            default_model: "gemini-3-pro-image-preview".to_string(),
            default_aspect_ratio: "21:9".to_string(),
            default_count: 1,
            jimeng_proxy: JimengProxyConfig::default(),
        }
    }
}

/// Jimeng reverse proxy (session-cookie authenticated image generation).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JimengProxyConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub sessionid: Option<SecretString>,
    pub text_to_image_endpoint: String,
    pub image_to_image_endpoint: String,
    pub connect_timeout: u64,
    pub read_timeout: u64,
    pub model: String,
}

impl Default for JimengProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            sessionid: None,
            text_to_image_endpoint: "/v1/images/generations".to_string(),
            image_to_image_endpoint: "/v1/images/compositions".to_string(),
            connect_timeout: 30_000,
            read_timeout: 60_000,
            model: "jimeng-4.5".to_string(),
        }
    }
}

/// Video generation defaults and polling budget.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Model used by video providers that leave their own model blank
    pub model: String,
    pub default_aspect_ratio: String,
    /// Seconds
    pub default_duration: u32,
    /// Seconds
    pub max_duration: u32,
    pub poll_interval: u64,
    pub max_poll_count: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            default_aspect_ratio: "16:9".to_string(),
            default_duration: 5,
            max_duration: 15,
            poll_interval: 5_000,
            max_poll_count: 120,
        }
    }
}

/// Doubao (Volcengine Ark) asynchronous video generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DoubaoConfig {
    pub enabled: bool,
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: Option<SecretString>,
    /// Falls back to `video.model` when empty
    pub model: String,
    pub endpoint: String,
    /// Task query path; `{task_id}` is substituted, otherwise the id is appended
    pub query_endpoint: String,
    pub timeout: u64,
    pub connect_timeout: u64,
    pub read_timeout: u64,
}

impl Default for DoubaoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            api_key: None,
            model: String::new(),
            endpoint: "/api/v3/contents/generations/tasks".to_string(),
            query_endpoint: "/api/v3/contents/generations/tasks".to_string(),
            timeout: 60_000,
            connect_timeout: 10_000,
            read_timeout: 60_000,
        }
    }
}

/// Application config file; only the `ai` section is read.
#[derive(Deserialize)]
struct ConfigFile {
    ai: AiConfig,
}

impl AiConfig {
    /// Parse YAML holding either a full application config with an `ai:` key
    /// or a bare `ai` section.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GenerationError> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)
            .map_err(|e| GenerationError::ConfigurationError(format!("failed to parse config: {e}")))?;

        let has_ai_section = value
            .as_mapping()
            .is_some_and(|m| m.contains_key(serde_yaml::Value::from("ai")));

        let config = if has_ai_section {
            serde_yaml::from_value::<ConfigFile>(value).map(|file| file.ai)
        } else if value.is_null() {
            Ok(AiConfig::default())
        } else {
            serde_yaml::from_value::<AiConfig>(value)
        }
        .map_err(|e| GenerationError::ConfigurationError(format!("failed to unmarshal config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GenerationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GenerationError::ConfigurationError(format!(
                "failed to read config {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (used by tests).
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.vectorengine.api_key = Some(SecretString::from(key));
        }
        if let Some(session) = non_empty(ENV_JIMENG_SESSIONID) {
            self.image.jimeng_proxy.sessionid = Some(SecretString::from(session));
        }
        if let Some(key) = non_empty(ENV_DOUBAO_API_KEY) {
            self.doubao.api_key = Some(SecretString::from(key));
        }
        if let Some(name) = non_empty(ENV_DEFAULT_TEXT_PROVIDER) {
            self.default_text_provider = Some(name);
        }
        if let Some(name) = non_empty(ENV_DEFAULT_IMAGE_PROVIDER) {
            self.default_image_provider = Some(name);
        }
        if let Some(name) = non_empty(ENV_DEFAULT_VIDEO_PROVIDER) {
            self.default_video_provider = Some(name);
        }
    }

    /// Configured default provider for a capability; blank names count as unset.
    pub fn default_provider(&self, capability: Capability) -> Option<&str> {
        let name = match capability {
            Capability::Text => self.default_text_provider.as_deref(),
            Capability::Image => self.default_image_provider.as_deref(),
            Capability::Video => self.default_video_provider.as_deref(),
        };
        name.map(str::trim).filter(|n| !n.is_empty())
    }

    /// Check values that are independent of any particular provider.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.video.poll_interval == 0 {
            return Err(GenerationError::ConfigurationError(
                "video.poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.video.max_poll_count == 0 {
            return Err(GenerationError::ConfigurationError(
                "video.max_poll_count must be greater than zero".to_string(),
            ));
        }
        if self.video.default_duration > self.video.max_duration {
            return Err(GenerationError::ConfigurationError(format!(
                "video.default_duration ({}) exceeds video.max_duration ({})",
                self.video.default_duration, self.video.max_duration
            )));
        }
        Ok(())
    }
}
