//! Image Generation Capability

use crate::error::GenerationError;
use crate::types::{GenerationResult, ImageOptions, ImageResult};
use async_trait::async_trait;

/// Image generation.
///
/// Providers may answer immediately (`ImageResult::completed == true`) or hand
/// back a pending result whose `task_id` must be passed to `get_task_status`.
/// Both shapes are valid; callers check `completed`.
#[async_trait]
pub trait ImageGenerationCapability: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Submit an image generation request.
    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<ImageResult, GenerationError>;

    /// Query the state of a previously submitted image job.
    ///
    /// Idempotent and side-effect free.
    async fn get_task_status(&self, task_id: &str) -> Result<GenerationResult, GenerationError>;
}
