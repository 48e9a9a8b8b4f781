//! Provider factory trait
//!
//! Each provider implements `ProviderFactory` to build capability clients.
//! The registry stores factories rather than hardcoded construction logic, so
//! new providers can be registered programmatically.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::GenerationError;
use crate::traits::{
    ImageGenerationCapability, TextGenerationCapability, VideoGenerationCapability,
};
use crate::types::ProviderCapabilities;

/// Builds the clients of one provider.
pub trait ProviderFactory: Send + Sync {
    /// Provider name used for selection and caching
    fn provider_id(&self) -> Cow<'static, str>;

    /// Capabilities this provider can serve.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Disabled providers stay registered but are never selected.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Check configuration without touching the network. Called once at
    /// registry build time for every enabled provider.
    fn validate(&self) -> Result<(), GenerationError> {
        Ok(())
    }

    fn text_client(&self) -> Result<Arc<dyn TextGenerationCapability>, GenerationError> {
        Err(GenerationError::UnsupportedOperation(format!(
            "{} does not support text generation",
            self.provider_id()
        )))
    }

    fn image_client(&self) -> Result<Arc<dyn ImageGenerationCapability>, GenerationError> {
        Err(GenerationError::UnsupportedOperation(format!(
            "{} does not support image generation",
            self.provider_id()
        )))
    }

    fn video_client(&self) -> Result<Arc<dyn VideoGenerationCapability>, GenerationError> {
        Err(GenerationError::UnsupportedOperation(format!(
            "{} does not support video generation",
            self.provider_id()
        )))
    }
}
