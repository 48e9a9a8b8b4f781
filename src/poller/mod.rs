//! Async Task Poller
//!
//! Drives a `TaskTracker` against a provider's status endpoint: the first
//! query is issued immediately, subsequent ones after `interval`, up to
//! `max_poll_count` queries in total. No wait follows the final query.
//!
//! The inter-attempt wait and the in-flight query both race the caller's
//! `CancelHandle` and an optional deadline.

pub mod tracker;

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::VideoConfig;
use crate::error::{CancelReason, GenerationError};
use crate::traits::VideoGenerationCapability;
use crate::types::{GenerationResult, TaskHandle};
use crate::utils::CancelHandle;

pub use tracker::{PollState, PollStep, TaskTracker};

/// Poll interval and query budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_poll_count: u32,
}

impl PollSettings {
    pub fn new(interval: Duration, max_poll_count: u32) -> Result<Self, GenerationError> {
        if interval.is_zero() {
            return Err(GenerationError::ConfigurationError(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if max_poll_count == 0 {
            return Err(GenerationError::ConfigurationError(
                "max poll count must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            interval,
            max_poll_count,
        })
    }

    /// Longest time spent waiting between queries before a timeout.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_poll_count.saturating_sub(1)
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5_000),
            max_poll_count: 120,
        }
    }
}

impl TryFrom<&VideoConfig> for PollSettings {
    type Error = GenerationError;

    fn try_from(config: &VideoConfig) -> Result<Self, Self::Error> {
        Self::new(
            Duration::from_millis(config.poll_interval),
            config.max_poll_count,
        )
    }
}

/// Polls asynchronous tasks to a terminal state.
#[derive(Debug, Clone, Default)]
pub struct TaskPoller {
    settings: PollSettings,
}

impl TaskPoller {
    pub fn new(settings: PollSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Poll until the task succeeds, fails, exhausts the budget or is
    /// cancelled through `cancel`.
    ///
    /// # Errors
    ///
    /// - `ProviderTaskFailed` when the provider reports a failed task
    /// - `EmptyResult` when the task succeeded without output
    /// - `PollTimeout` when `max_poll_count` queries found it still pending
    /// - `Cancelled` when `cancel` fired
    /// - any non-transient query error, unchanged
    pub async fn poll(
        &self,
        client: &dyn VideoGenerationCapability,
        handle: TaskHandle,
        cancel: &CancelHandle,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(client, handle, cancel, None).await
    }

    /// Like `poll`, but also gives up with `Cancelled { reason:
    /// DeadlineExceeded }` once `deadline` passes.
    pub async fn poll_with_deadline(
        &self,
        client: &dyn VideoGenerationCapability,
        handle: TaskHandle,
        cancel: &CancelHandle,
        deadline: Instant,
    ) -> Result<GenerationResult, GenerationError> {
        self.run(client, handle, cancel, Some(deadline)).await
    }

    async fn run(
        &self,
        client: &dyn VideoGenerationCapability,
        handle: TaskHandle,
        cancel: &CancelHandle,
        deadline: Option<Instant>,
    ) -> Result<GenerationResult, GenerationError> {
        let started = Instant::now();
        let task_id = handle.task_id.clone();
        let mut tracker = TaskTracker::new(handle, self.settings.max_poll_count);

        let deadline_reached = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline_reached);

        info!(
            provider = %tracker.handle().provider,
            task_id = %task_id,
            interval_ms = self.settings.interval.as_millis() as u64,
            max_poll_count = self.settings.max_poll_count,
            "Polling task"
        );

        loop {
            if cancel.is_cancelled() {
                return Err(stop(&mut tracker, CancelReason::Requested, started));
            }

            let attempt = tracker.begin_attempt()?;
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(stop(&mut tracker, CancelReason::Requested, started));
                }
                _ = &mut deadline_reached => {
                    return Err(stop(&mut tracker, CancelReason::DeadlineExceeded, started));
                }
                outcome = client.get_task_status(&task_id) => outcome,
            };

            let step = match outcome {
                Ok(result) => {
                    debug!(
                        task_id = %task_id,
                        attempt,
                        status = %result.status,
                        "Task status"
                    );
                    tracker.observe(result)
                }
                Err(error) => {
                    if error.is_transient() {
                        warn!(
                            task_id = %task_id,
                            attempt,
                            error = %error,
                            "Transient status query failure"
                        );
                    }
                    tracker.observe_error(error)
                }
            };

            if let PollStep::Finished(outcome) = step {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                match &outcome {
                    Ok(_) => info!(
                        task_id = %task_id,
                        attempts = tracker.attempts(),
                        elapsed_ms,
                        "Task succeeded"
                    ),
                    Err(error) => warn!(
                        task_id = %task_id,
                        attempts = tracker.attempts(),
                        elapsed_ms,
                        state = %tracker.state(),
                        error = %error,
                        "Task did not succeed"
                    ),
                }
                return outcome;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(stop(&mut tracker, CancelReason::Requested, started));
                }
                _ = &mut deadline_reached => {
                    return Err(stop(&mut tracker, CancelReason::DeadlineExceeded, started));
                }
                _ = tokio::time::sleep(self.settings.interval) => {}
            }
        }
    }
}

fn stop(tracker: &mut TaskTracker, reason: CancelReason, started: Instant) -> GenerationError {
    info!(
        task_id = %tracker.task_id(),
        attempts = tracker.attempts(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        reason = %reason,
        "Polling stopped"
    );
    tracker.cancel(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GenerationOutput, VideoOptions};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tracing_test::traced_test;

    struct ScriptedVideo {
        script: Mutex<VecDeque<Result<GenerationResult, GenerationError>>>,
        queries: AtomicU32,
    }

    impl ScriptedVideo {
        fn new(script: Vec<Result<GenerationResult, GenerationError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                queries: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl VideoGenerationCapability for ScriptedVideo {
        fn provider_name(&self) -> &str {
            "scripted"
        }

        async fn generate_video(
            &self,
            _prompt: &str,
            _options: &VideoOptions,
        ) -> Result<TaskHandle, GenerationError> {
            Ok(TaskHandle::new("scripted", "task-1"))
        }

        async fn get_task_status(&self, task_id: &str) -> Result<GenerationResult, GenerationError> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(GenerationResult::pending("scripted", task_id)))
        }
    }

    fn done() -> Result<GenerationResult, GenerationError> {
        Ok(GenerationResult::succeeded(
            "scripted",
            "task-1",
            Some(GenerationOutput::Video {
                url: "https://cdn.example.com/v.mp4".to_string(),
                duration: None,
            }),
        ))
    }

    #[test]
    fn settings_reject_zero_values() {
        assert!(PollSettings::new(Duration::ZERO, 3).is_err());
        assert!(PollSettings::new(Duration::from_secs(1), 0).is_err());

        let settings = PollSettings::try_from(&VideoConfig::default()).unwrap();
        assert_eq!(settings, PollSettings::default());
        assert_eq!(settings.budget(), Duration::from_millis(5_000 * 119));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn logs_attempts_and_outcome() {
        let client = ScriptedVideo::new(vec![
            Err(GenerationError::provider_error("scripted", 502, "bad gateway")),
            done(),
        ]);
        let poller = TaskPoller::new(PollSettings::new(Duration::from_secs(1), 3).unwrap());

        let result = poller
            .poll(&client, TaskHandle::new("scripted", "task-1"), &CancelHandle::new())
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(client.queries.load(Ordering::SeqCst), 2);
        assert!(logs_contain("Transient status query failure"));
        assert!(logs_contain("Task succeeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn pre_cancelled_handle_issues_no_query() {
        let client = ScriptedVideo::new(vec![done()]);
        let cancel = CancelHandle::new();
        cancel.cancel();

        let err = TaskPoller::default()
            .poll(&client, TaskHandle::new("scripted", "task-1"), &cancel)
            .await
            .err();

        assert!(matches!(
            err,
            Some(GenerationError::Cancelled { reason: CancelReason::Requested, .. })
        ));
        assert_eq!(client.queries.load(Ordering::SeqCst), 0);
    }
}
