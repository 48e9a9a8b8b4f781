//! Doubao Provider
//!
//! Asynchronous video generation through Volcengine Ark content generation
//! tasks. Submission returns a task id; the task is then queried until it
//! reaches `succeeded`, `failed` or `cancelled`.

mod client;
mod types;

pub use client::{DoubaoClient, VideoDefaults};

/// Provider name used in configuration and results.
pub const PROVIDER_ID: &str = "doubao";
