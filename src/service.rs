//! Generation Service
//!
//! Caller-facing facade: resolves the provider through the registry, calls
//! the capability client and, for video, drives the task poller.
//!
//! ```rust,ignore
//! use genbridge::prelude::*;
//!
//! let service = GenerationService::from_config(&AiConfig::load("configs/config.yaml")?)?;
//! let script = service
//!     .generate_text("Outline episode one", "You are a screenwriter", &TextOptions::new(), None)
//!     .await?;
//! let video = service
//!     .generate_video("A paper boat at dusk", &VideoOptions::new(), None, &CancelHandle::new())
//!     .await?;
//! ```

use std::sync::Arc;

use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::config::AiConfig;
use crate::error::GenerationError;
use crate::poller::{PollSettings, TaskPoller};
use crate::registry::ProviderRegistry;
use crate::types::{
    Capability, GenerationPayload, GenerationRequest, GenerationResult, ImageOptions, ImageResult,
    TaskHandle, TextOptions, VideoOptions,
};
use crate::utils::CancelHandle;

/// Entry point for text, image and video generation.
#[derive(Debug, Clone)]
pub struct GenerationService {
    registry: Arc<ProviderRegistry>,
    poller: TaskPoller,
}

impl GenerationService {
    pub fn new(registry: ProviderRegistry, poller: TaskPoller) -> Self {
        Self {
            registry: Arc::new(registry),
            poller,
        }
    }

    /// Build the registry and poll settings from configuration.
    pub fn from_config(config: &AiConfig) -> Result<Self, GenerationError> {
        let registry = ProviderRegistry::from_config(config)?;
        let settings = PollSettings::try_from(&config.video)?;
        Ok(Self::new(registry, TaskPoller::new(settings)))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn poller(&self) -> &TaskPoller {
        &self.poller
    }

    /// Generate text with the explicit or default text provider.
    pub async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: &str,
        options: &TextOptions,
        provider: Option<&str>,
    ) -> Result<String, GenerationError> {
        async {
            let client = self.registry.text(provider)?;
            client.generate_text(prompt, system_prompt, options).await
        }
        .instrument(request_span(Capability::Text))
        .await
    }

    /// Generate an image. The result may be immediate or pending; see
    /// `ImageResult::completed`.
    pub async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
        provider: Option<&str>,
    ) -> Result<ImageResult, GenerationError> {
        async {
            let client = self.registry.image(provider)?;
            client.generate_image(prompt, options).await
        }
        .instrument(request_span(Capability::Image))
        .await
    }

    /// Submit a video task without waiting for it.
    pub async fn submit_video(
        &self,
        prompt: &str,
        options: &VideoOptions,
        provider: Option<&str>,
    ) -> Result<TaskHandle, GenerationError> {
        async {
            let client = self.registry.video(provider)?;
            client.generate_video(prompt, options).await
        }
        .instrument(request_span(Capability::Video))
        .await
    }

    /// Submit a video task and poll it to a terminal state.
    pub async fn generate_video(
        &self,
        prompt: &str,
        options: &VideoOptions,
        provider: Option<&str>,
        cancel: &CancelHandle,
    ) -> Result<GenerationResult, GenerationError> {
        async {
            let client = self.registry.video(provider)?;
            let handle = client.generate_video(prompt, options).await?;
            info!(provider = %handle.provider, task_id = %handle.task_id, "Video task submitted");
            self.poller.poll(client.as_ref(), handle, cancel).await
        }
        .instrument(request_span(Capability::Video))
        .await
    }

    /// Poll a previously submitted video task, e.g. after a `PollTimeout`.
    pub async fn resume_video(
        &self,
        handle: TaskHandle,
        cancel: &CancelHandle,
    ) -> Result<GenerationResult, GenerationError> {
        async {
            let client = self.registry.video(Some(&handle.provider))?;
            self.poller.poll(client.as_ref(), handle, cancel).await
        }
        .instrument(request_span(Capability::Video))
        .await
    }

    /// Query a task once.
    pub async fn get_task_status(
        &self,
        capability: Capability,
        provider: Option<&str>,
        task_id: &str,
    ) -> Result<GenerationResult, GenerationError> {
        async {
            match capability {
                Capability::Image => self.registry.image(provider)?.get_task_status(task_id).await,
                Capability::Video => self.registry.video(provider)?.get_task_status(task_id).await,
                Capability::Text => Err(GenerationError::UnsupportedOperation(
                    "text generation has no asynchronous tasks".to_string(),
                )),
            }
        }
        .instrument(request_span(capability))
        .await
    }

    /// Dispatch a request by capability.
    ///
    /// Video requests are polled to completion; image requests return as the
    /// provider answered (possibly pending).
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        cancel: &CancelHandle,
    ) -> Result<GenerationResult, GenerationError> {
        let provider = request.provider();
        match request.payload() {
            GenerationPayload::Text {
                system_prompt,
                options,
            } => {
                async {
                    let client = self.registry.text(provider)?;
                    let content = client
                        .generate_text(request.prompt(), system_prompt, options)
                        .await?;
                    Ok::<_, GenerationError>(GenerationResult::text(client.provider_name(), content))
                }
                .instrument(request_span(Capability::Text))
                .await
            }
            GenerationPayload::Image { options } => self
                .generate_image(request.prompt(), options, provider)
                .await
                .map(ImageResult::into_generation_result),
            GenerationPayload::Video { options } => {
                self.generate_video(request.prompt(), options, provider, cancel)
                    .await
            }
        }
    }

    /// Check credentials and reachability of a text provider.
    pub async fn test_connection(&self, provider: Option<&str>) -> Result<(), GenerationError> {
        async {
            let client = self.registry.text(provider)?;
            client.test_connection().await?;
            info!(provider = client.provider_name(), "Connection test succeeded");
            Ok::<(), GenerationError>(())
        }
        .instrument(request_span(Capability::Text))
        .await
    }
}

fn request_span(capability: Capability) -> tracing::Span {
    info_span!(
        "generation",
        request_id = %Uuid::new_v4(),
        capability = capability.as_str()
    )
}
