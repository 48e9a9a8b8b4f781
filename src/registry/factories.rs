//! Built-in provider factories

use std::borrow::Cow;
use std::sync::Arc;

use crate::config::{DoubaoConfig, JimengProxyConfig, TextConfig, VectorEngineConfig, VideoConfig};
use crate::error::GenerationError;
use crate::providers::{DoubaoClient, JimengClient, VectorEngineClient, doubao, jimeng, vectorengine};
use crate::registry::factory::ProviderFactory;
use crate::traits::{
    ImageGenerationCapability, TextGenerationCapability, VideoGenerationCapability,
};
use crate::types::ProviderCapabilities;

/// Vectorengine text provider factory
#[derive(Debug, Clone)]
pub struct VectorEngineProviderFactory {
    config: VectorEngineConfig,
    text: TextConfig,
}

impl VectorEngineProviderFactory {
    pub fn new(config: VectorEngineConfig, text: TextConfig) -> Self {
        Self { config, text }
    }
}

impl ProviderFactory for VectorEngineProviderFactory {
    fn provider_id(&self) -> Cow<'static, str> {
        Cow::Borrowed(vectorengine::PROVIDER_ID)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_text()
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn validate(&self) -> Result<(), GenerationError> {
        VectorEngineClient::validate_config(&self.config, &self.text).map(|_| ())
    }

    fn text_client(&self) -> Result<Arc<dyn TextGenerationCapability>, GenerationError> {
        let client = VectorEngineClient::from_config(&self.config, &self.text)?;
        Ok(Arc::new(client))
    }
}

/// Jimeng proxy image provider factory
#[derive(Debug, Clone)]
pub struct JimengProviderFactory {
    config: JimengProxyConfig,
}

impl JimengProviderFactory {
    pub fn new(config: JimengProxyConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for JimengProviderFactory {
    fn provider_id(&self) -> Cow<'static, str> {
        Cow::Borrowed(jimeng::PROVIDER_ID)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_image()
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn validate(&self) -> Result<(), GenerationError> {
        JimengClient::validate_config(&self.config).map(|_| ())
    }

    fn image_client(&self) -> Result<Arc<dyn ImageGenerationCapability>, GenerationError> {
        let client = JimengClient::from_config(&self.config)?;
        Ok(Arc::new(client))
    }
}

/// Doubao video provider factory
#[derive(Debug, Clone)]
pub struct DoubaoProviderFactory {
    config: DoubaoConfig,
    video: VideoConfig,
}

impl DoubaoProviderFactory {
    pub fn new(config: DoubaoConfig, video: VideoConfig) -> Self {
        Self { config, video }
    }
}

impl ProviderFactory for DoubaoProviderFactory {
    fn provider_id(&self) -> Cow<'static, str> {
        Cow::Borrowed(doubao::PROVIDER_ID)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_video()
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn validate(&self) -> Result<(), GenerationError> {
        DoubaoClient::validate_config(&self.config, &self.video).map(|_| ())
    }

    fn video_client(&self) -> Result<Arc<dyn VideoGenerationCapability>, GenerationError> {
        let client = DoubaoClient::from_config(&self.config, &self.video)?;
        Ok(Arc::new(client))
    }
}
