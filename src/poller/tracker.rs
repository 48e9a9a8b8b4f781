//! Task state machine
//!
//! `Submitted -> Polling -> {Succeeded | Failed | TimedOut | Cancelled}`
//!
//! The tracker is pure: it never sleeps or performs I/O, it only decides what
//! a status query outcome means for the task. `TaskPoller` drives it.

use crate::error::{CancelReason, GenerationError};
use crate::types::{GenerationResult, TaskHandle, TaskStatus};

/// Lifecycle state of a tracked task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Submitted,
    Polling,
    Succeeded,
    Failed,
    TimedOut,
    Cancelled,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PollState::Succeeded | PollState::Failed | PollState::TimedOut | PollState::Cancelled
        )
    }
}

impl std::fmt::Display for PollState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PollState::Submitted => "submitted",
            PollState::Polling => "polling",
            PollState::Succeeded => "succeeded",
            PollState::Failed => "failed",
            PollState::TimedOut => "timed_out",
            PollState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// What the poller should do after an observation.
#[derive(Debug)]
pub enum PollStep {
    /// Wait one interval and query again.
    Pending,
    /// The task reached a terminal state.
    Finished(Result<GenerationResult, GenerationError>),
}

impl PollStep {
    pub fn is_finished(&self) -> bool {
        matches!(self, PollStep::Finished(_))
    }
}

/// Tracks one task handle from submission to its single terminal state.
#[derive(Debug)]
pub struct TaskTracker {
    handle: TaskHandle,
    max_poll_count: u32,
    attempts: u32,
    state: PollState,
    last_error: Option<String>,
}

impl TaskTracker {
    pub fn new(handle: TaskHandle, max_poll_count: u32) -> Self {
        Self {
            handle,
            max_poll_count,
            attempts: 0,
            state: PollState::Submitted,
            last_error: None,
        }
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    pub fn task_id(&self) -> &str {
        &self.handle.task_id
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Status queries started so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_poll_count(&self) -> u32 {
        self.max_poll_count
    }

    /// Message of the most recent transient query failure, cleared by any
    /// successful query.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Whether another status query fits in the budget.
    pub fn can_attempt(&self) -> bool {
        !self.is_terminal() && self.attempts < self.max_poll_count
    }

    /// Count a new status query. Must precede every query.
    pub fn begin_attempt(&mut self) -> Result<u32, GenerationError> {
        if self.is_terminal() {
            return Err(self.already_resolved());
        }
        if self.attempts >= self.max_poll_count {
            return Err(GenerationError::InternalError(format!(
                "task {} exceeded its budget of {} status queries",
                self.handle.task_id, self.max_poll_count
            )));
        }
        self.attempts += 1;
        self.state = PollState::Polling;
        Ok(self.attempts)
    }

    /// Apply a normalized status query result.
    pub fn observe(&mut self, result: GenerationResult) -> PollStep {
        if let Some(err) = self.guard_polling() {
            return PollStep::Finished(Err(err));
        }
        self.last_error = None;

        match result.status {
            TaskStatus::Success if result.has_usable_output() => {
                self.state = PollState::Succeeded;
                PollStep::Finished(Ok(result))
            }
            TaskStatus::Success => {
                self.state = PollState::Failed;
                PollStep::Finished(Err(GenerationError::empty_result(
                    self.handle.provider.clone(),
                    format!("task {} succeeded without output", self.handle.task_id),
                )))
            }
            TaskStatus::Failed => {
                self.state = PollState::Failed;
                PollStep::Finished(Err(GenerationError::ProviderTaskFailed {
                    provider: self.handle.provider.clone(),
                    task_id: self.handle.task_id.clone(),
                    detail: result
                        .error
                        .unwrap_or_else(|| "no failure detail reported".to_string()),
                }))
            }
            TaskStatus::Pending => self.pending_or_timeout(),
        }
    }

    /// Apply a failed status query.
    ///
    /// Transient failures count against the budget and polling continues;
    /// anything else ends the task as failed.
    pub fn observe_error(&mut self, error: GenerationError) -> PollStep {
        if let Some(err) = self.guard_polling() {
            return PollStep::Finished(Err(err));
        }
        if !error.is_transient() {
            self.state = PollState::Failed;
            return PollStep::Finished(Err(error));
        }
        self.last_error = Some(error.to_string());
        self.pending_or_timeout()
    }

    /// Stop tracking on caller request.
    pub fn cancel(&mut self, reason: CancelReason) -> GenerationError {
        if self.is_terminal() {
            return self.already_resolved();
        }
        self.state = PollState::Cancelled;
        GenerationError::Cancelled {
            task_id: self.handle.task_id.clone(),
            reason,
        }
    }

    fn pending_or_timeout(&mut self) -> PollStep {
        if self.attempts < self.max_poll_count {
            return PollStep::Pending;
        }
        self.state = PollState::TimedOut;
        PollStep::Finished(Err(GenerationError::PollTimeout {
            provider: self.handle.provider.clone(),
            task_id: self.handle.task_id.clone(),
            attempts: self.attempts,
            last_error: self.last_error.clone(),
        }))
    }

    fn guard_polling(&self) -> Option<GenerationError> {
        match self.state {
            PollState::Polling => None,
            PollState::Submitted => Some(GenerationError::InternalError(format!(
                "task {} observed before any status query",
                self.handle.task_id
            ))),
            _ => Some(self.already_resolved()),
        }
    }

    fn already_resolved(&self) -> GenerationError {
        GenerationError::InternalError(format!(
            "task {} already resolved as {}",
            self.handle.task_id, self.state
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenerationOutput;

    fn tracker(max: u32) -> TaskTracker {
        TaskTracker::new(TaskHandle::new("doubao", "cgt-1"), max)
    }

    fn video_done() -> GenerationResult {
        GenerationResult::succeeded(
            "doubao",
            "cgt-1",
            Some(GenerationOutput::Video {
                url: "https://cdn.example.com/v.mp4".to_string(),
                duration: Some(5),
            }),
        )
    }

    fn transient() -> GenerationError {
        GenerationError::provider_error("doubao", 503, "busy")
    }

    #[test]
    fn success_with_output_is_terminal() {
        let mut t = tracker(3);
        assert_eq!(t.state(), PollState::Submitted);
        assert_eq!(t.begin_attempt().unwrap(), 1);
        assert_eq!(t.state(), PollState::Polling);

        let step = t.observe(video_done());
        assert!(matches!(step, PollStep::Finished(Ok(_))));
        assert_eq!(t.state(), PollState::Succeeded);
        assert!(t.begin_attempt().is_err());
    }

    #[test]
    fn success_without_output_fails_with_empty_result() {
        let mut t = tracker(3);
        t.begin_attempt().unwrap();
        let step = t.observe(GenerationResult::succeeded("doubao", "cgt-1", None));
        assert!(matches!(
            step,
            PollStep::Finished(Err(GenerationError::EmptyResult { .. }))
        ));
        assert_eq!(t.state(), PollState::Failed);
    }

    #[test]
    fn provider_failure_carries_detail() {
        let mut t = tracker(3);
        t.begin_attempt().unwrap();
        match t.observe(GenerationResult::failed("doubao", "cgt-1", "content rejected")) {
            PollStep::Finished(Err(GenerationError::ProviderTaskFailed { task_id, detail, .. })) => {
                assert_eq!(task_id, "cgt-1");
                assert_eq!(detail, "content rejected");
            }
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn pending_until_budget_then_timeout() {
        let mut t = tracker(2);
        t.begin_attempt().unwrap();
        assert!(matches!(
            t.observe(GenerationResult::pending("doubao", "cgt-1")),
            PollStep::Pending
        ));
        assert!(t.can_attempt());

        t.begin_attempt().unwrap();
        match t.observe(GenerationResult::pending("doubao", "cgt-1")) {
            PollStep::Finished(Err(GenerationError::PollTimeout { attempts, last_error, .. })) => {
                assert_eq!(attempts, 2);
                assert!(last_error.is_none());
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert_eq!(t.state(), PollState::TimedOut);
        assert!(!t.can_attempt());
    }

    #[test]
    fn transient_errors_count_and_are_reported_on_timeout() {
        let mut t = tracker(2);
        t.begin_attempt().unwrap();
        assert!(matches!(t.observe_error(transient()), PollStep::Pending));
        assert!(t.last_error().is_some());

        t.begin_attempt().unwrap();
        match t.observe_error(transient()) {
            PollStep::Finished(Err(GenerationError::PollTimeout { last_error, .. })) => {
                assert!(last_error.is_some_and(|e| e.contains("503")));
            }
            other => panic!("unexpected step: {other:?}"),
        }
    }

    #[test]
    fn successful_query_clears_last_error() {
        let mut t = tracker(3);
        t.begin_attempt().unwrap();
        t.observe_error(transient());
        t.begin_attempt().unwrap();
        t.observe(GenerationResult::pending("doubao", "cgt-1"));
        assert!(t.last_error().is_none());
    }

    #[test]
    fn non_transient_error_fails_immediately() {
        let mut t = tracker(5);
        t.begin_attempt().unwrap();
        let step = t.observe_error(GenerationError::provider_error("doubao", 404, "not found"));
        assert!(matches!(
            step,
            PollStep::Finished(Err(GenerationError::ProviderError { status: 404, .. }))
        ));
        assert_eq!(t.state(), PollState::Failed);
    }

    #[test]
    fn cancel_is_terminal_and_single_shot() {
        let mut t = tracker(3);
        t.begin_attempt().unwrap();
        let err = t.cancel(CancelReason::Requested);
        assert!(err.is_cancelled());
        assert_eq!(t.state(), PollState::Cancelled);

        assert!(matches!(t.cancel(CancelReason::Requested), GenerationError::InternalError(_)));
        assert!(matches!(
            t.observe(video_done()),
            PollStep::Finished(Err(GenerationError::InternalError(_)))
        ));
    }

    #[test]
    fn observation_requires_an_attempt() {
        let mut t = tracker(3);
        assert!(t.observe(video_done()).is_finished());
        assert_eq!(t.state(), PollState::Submitted);
    }
}
