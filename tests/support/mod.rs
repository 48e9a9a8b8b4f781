//! Shared test doubles.
#![allow(dead_code)]

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use genbridge::error::GenerationError;
use genbridge::registry::ProviderFactory;
use genbridge::traits::VideoGenerationCapability;
use genbridge::types::{
    GenerationOutput, GenerationResult, ProviderCapabilities, TaskHandle, VideoOptions,
};

pub const FAKE_PROVIDER: &str = "fake-video";
pub const FAKE_TASK_ID: &str = "task-42";

pub type Scripted = Result<GenerationResult, GenerationError>;

/// In-memory video provider answering status queries from a script. Once the
/// script runs out every query reports the task as pending.
#[derive(Default)]
pub struct FakeVideoProvider {
    script: Mutex<VecDeque<Scripted>>,
    queries: AtomicU32,
    submissions: AtomicU32,
    query_delay: Option<Duration>,
}

impl FakeVideoProvider {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    /// Make every status query take `delay` (tokio time).
    pub fn with_query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = Some(delay);
        self
    }

    pub fn queries(&self) -> u32 {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoGenerationCapability for FakeVideoProvider {
    fn provider_name(&self) -> &str {
        FAKE_PROVIDER
    }

    async fn generate_video(
        &self,
        _prompt: &str,
        _options: &VideoOptions,
    ) -> Result<TaskHandle, GenerationError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(TaskHandle::new(FAKE_PROVIDER, FAKE_TASK_ID))
    }

    async fn get_task_status(&self, task_id: &str) -> Result<GenerationResult, GenerationError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.query_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(pending_for(task_id)))
    }
}

/// Factory handing out one shared `FakeVideoProvider`.
pub struct FakeVideoFactory {
    client: Arc<FakeVideoProvider>,
    builds: AtomicU32,
    enabled: bool,
}

impl FakeVideoFactory {
    pub fn new(client: Arc<FakeVideoProvider>) -> Self {
        Self {
            client,
            builds: AtomicU32::new(0),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn builds(&self) -> u32 {
        self.builds.load(Ordering::SeqCst)
    }
}

impl ProviderFactory for FakeVideoFactory {
    fn provider_id(&self) -> Cow<'static, str> {
        Cow::Borrowed(FAKE_PROVIDER)
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::new().with_video()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn video_client(&self) -> Result<Arc<dyn VideoGenerationCapability>, GenerationError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let client: Arc<dyn VideoGenerationCapability> = self.client.clone();
        Ok(client)
    }
}

pub fn pending() -> Scripted {
    Ok(pending_for(FAKE_TASK_ID))
}

fn pending_for(task_id: &str) -> GenerationResult {
    GenerationResult::pending(FAKE_PROVIDER, task_id)
}

pub fn succeeded() -> Scripted {
    Ok(GenerationResult::succeeded(
        FAKE_PROVIDER,
        FAKE_TASK_ID,
        Some(GenerationOutput::Video {
            url: "https://cdn.example.com/episode-1.mp4".to_string(),
            duration: Some(5),
        }),
    ))
}

pub fn succeeded_without_output() -> Scripted {
    Ok(GenerationResult::succeeded(FAKE_PROVIDER, FAKE_TASK_ID, None))
}

pub fn failed(detail: &str) -> Scripted {
    Ok(GenerationResult::failed(FAKE_PROVIDER, FAKE_TASK_ID, detail))
}

pub fn transient_error() -> Scripted {
    Err(GenerationError::TransportError {
        provider: FAKE_PROVIDER.to_string(),
        message: "connection reset by peer".to_string(),
        timeout: false,
    })
}

pub fn handle() -> TaskHandle {
    TaskHandle::new(FAKE_PROVIDER, FAKE_TASK_ID)
}
