//! Core types shared by capabilities, providers and the poller.

pub mod capability;
pub mod request;
pub mod result;

pub use capability::{Capability, ProviderCapabilities};
pub use request::{GenerationPayload, GenerationRequest, ImageOptions, TextOptions, VideoOptions};
pub use result::{GenerationOutput, GenerationResult, ImageResult, TaskHandle, TaskStatus};
