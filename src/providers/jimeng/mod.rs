//! Jimeng Provider
//!
//! Image generation through a session-cookie authenticated jimeng proxy.
//!
//! - text to image: `POST {base_url}/v1/images/generations`
//! - image to image: `POST {base_url}/v1/images/compositions`
//! - `Cookie: sessionid=<sessionid>`

mod client;
mod types;

pub use client::JimengClient;

/// Provider name used in configuration and results.
pub const PROVIDER_ID: &str = "jimeng";

const DEFAULT_DIMENSION: u32 = 1024;
