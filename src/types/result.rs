//! Generation Result Types
//!
//! Normalized outputs shared by every provider: `GenerationResult` for status
//! queries and completed jobs, `ImageResult` for image submissions, and
//! `TaskHandle` for in-flight asynchronous jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Success,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Normalized generated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationOutput {
    Text {
        content: String,
    },
    Image {
        url: String,
        width: u32,
        height: u32,
    },
    Video {
        url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration: Option<u32>,
    },
}

impl GenerationOutput {
    /// Whether the output carries something a caller can use.
    pub fn is_usable(&self) -> bool {
        match self {
            GenerationOutput::Text { content } => !content.trim().is_empty(),
            GenerationOutput::Image { url, .. } | GenerationOutput::Video { url, .. } => {
                !url.trim().is_empty()
            }
        }
    }
}

/// Result of a generation call or a task status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub status: TaskStatus,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<GenerationOutput>,
    /// Provider failure detail when `status` is `Failed`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn text(provider: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            task_id: None,
            status: TaskStatus::Success,
            completed: true,
            output: Some(GenerationOutput::Text {
                content: content.into(),
            }),
            error: None,
        }
    }

    pub fn pending(provider: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            task_id: Some(task_id.into()),
            status: TaskStatus::Pending,
            completed: false,
            output: None,
            error: None,
        }
    }

    pub fn succeeded(
        provider: impl Into<String>,
        task_id: impl Into<String>,
        output: Option<GenerationOutput>,
    ) -> Self {
        Self {
            provider: provider.into(),
            task_id: Some(task_id.into()),
            status: TaskStatus::Success,
            completed: true,
            output,
            error: None,
        }
    }

    pub fn failed(
        provider: impl Into<String>,
        task_id: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            task_id: Some(task_id.into()),
            status: TaskStatus::Failed,
            completed: true,
            output: None,
            error: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }

    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    pub fn has_usable_output(&self) -> bool {
        self.output.as_ref().is_some_and(GenerationOutput::is_usable)
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.output {
            Some(GenerationOutput::Text { content }) => Some(content),
            _ => None,
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        match &self.output {
            Some(GenerationOutput::Video { url, .. }) => Some(url),
            _ => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match &self.output {
            Some(GenerationOutput::Image { url, .. }) => Some(url),
            _ => None,
        }
    }
}

/// Result of an image submission.
///
/// Either immediately available (`completed = true`, `image_url` set) or
/// pending (`completed = false`, `task_id` set for `get_task_status`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// All returned image URLs, primary first
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub status: TaskStatus,
    pub completed: bool,
}

impl ImageResult {
    pub fn completed(provider: impl Into<String>, image_urls: Vec<String>, width: u32, height: u32) -> Self {
        Self {
            provider: provider.into(),
            task_id: None,
            image_url: image_urls.first().cloned(),
            image_urls,
            width,
            height,
            status: TaskStatus::Success,
            completed: true,
        }
    }

    pub fn pending(provider: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            task_id: Some(task_id.into()),
            image_url: None,
            image_urls: Vec::new(),
            width: 0,
            height: 0,
            status: TaskStatus::Pending,
            completed: false,
        }
    }

    pub fn into_generation_result(self) -> GenerationResult {
        let output = self.image_url.map(|url| GenerationOutput::Image {
            url,
            width: self.width,
            height: self.height,
        });
        GenerationResult {
            provider: self.provider,
            task_id: self.task_id,
            status: self.status,
            completed: self.completed,
            output,
            error: None,
        }
    }
}

/// Identifies an in-flight asynchronous job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskHandle {
    /// Provider name the job was submitted to
    pub provider: String,
    /// Provider-assigned task id
    pub task_id: String,
    pub submitted_at: DateTime<Utc>,
}

impl TaskHandle {
    pub fn new(provider: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            task_id: task_id.into(),
            submitted_at: Utc::now(),
        }
    }
}
