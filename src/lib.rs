//! # genbridge
//!
//! Unified text, image and video generation across heterogeneous third-party
//! AI providers.
//!
//! - capability traits that every provider client implements
//! - a registry that picks and caches the provider for each request
//! - a poller that drives asynchronous video tasks to a terminal state
//!
//! ```rust,ignore
//! use genbridge::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), GenerationError> {
//!     let _guard = genbridge::telemetry::init_from_env()?;
//!
//!     let mut config = AiConfig::load("configs/config.yaml")?;
//!     config.apply_env_overrides();
//!     let service = GenerationService::from_config(&config)?;
//!
//!     let image = service
//!         .generate_image("A lighthouse in fog", &ImageOptions::new().with_size("1280x720"), None)
//!         .await?;
//!     println!("{:?}", image.image_url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod poller;
pub mod providers;
pub mod registry;
pub mod service;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod utils;

pub use config::AiConfig;
pub use error::{CancelReason, GenerationError, Result};
pub use poller::{PollSettings, PollState, TaskPoller, TaskTracker};
pub use registry::{ProviderFactory, ProviderRegistry};
pub use service::GenerationService;
pub use utils::CancelHandle;

/// Commonly used types and traits.
pub mod prelude {
    pub use crate::config::AiConfig;
    pub use crate::error::{CancelReason, GenerationError};
    pub use crate::poller::{PollSettings, TaskPoller};
    pub use crate::registry::{ProviderFactory, ProviderRegistry};
    pub use crate::service::GenerationService;
    pub use crate::traits::{
        ImageGenerationCapability, TextGenerationCapability, VideoGenerationCapability,
    };
    pub use crate::types::{
        Capability, GenerationOutput, GenerationRequest, GenerationResult, ImageOptions,
        ImageResult, TaskHandle, TaskStatus, TextOptions, VideoOptions,
    };
    pub use crate::utils::CancelHandle;
}
