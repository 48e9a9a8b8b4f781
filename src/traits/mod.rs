//! Capability traits
//!
//! The vendor-agnostic contract every provider client implements. Callers
//! depend only on these traits and never branch on vendor identity.

pub mod image;
pub mod text;
pub mod video;

pub use image::ImageGenerationCapability;
pub use text::TextGenerationCapability;
pub use video::VideoGenerationCapability;
