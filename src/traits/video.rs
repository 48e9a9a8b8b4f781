//! Video Generation Capability
//!
//! Video generation is always an asynchronous task-based operation:
//! 1. Submit a video generation task (`generate_video`)
//! 2. Poll the task status until completion (`get_task_status`, usually
//!    driven by `poller::TaskPoller`)

use crate::error::GenerationError;
use crate::types::{GenerationResult, TaskHandle, VideoOptions};
use async_trait::async_trait;

#[async_trait]
pub trait VideoGenerationCapability: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Submit a video generation task.
    ///
    /// Returns a handle carrying the provider-assigned task id. The submission
    /// itself is never retried.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let options = VideoOptions::new().with_duration(5).with_aspect_ratio("16:9");
    /// let handle = client.generate_video("A paper boat drifting at dusk", &options).await?;
    /// println!("Task ID: {}", handle.task_id);
    /// ```
    async fn generate_video(
        &self,
        prompt: &str,
        options: &VideoOptions,
    ) -> Result<TaskHandle, GenerationError>;

    /// Query the status of a video generation task.
    ///
    /// Idempotent and side-effect free: two calls with no change at the
    /// provider return the same normalized result.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let status = client.get_task_status("cgt-2024").await?;
    /// match status.status {
    ///     TaskStatus::Success => println!("Video ready: {:?}", status.video_url()),
    ///     TaskStatus::Pending => println!("Still processing..."),
    ///     TaskStatus::Failed => println!("Task failed: {:?}", status.error),
    /// }
    /// ```
    async fn get_task_status(&self, task_id: &str) -> Result<GenerationResult, GenerationError>;
}
