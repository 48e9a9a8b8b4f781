//! Utility modules
//!
//! Cancellation handles and shared HTTP plumbing for the provider clients.

pub mod cancel;
pub mod http;

pub use cancel::{CancelHandle, new_cancel_handle};
pub use http::{HttpConfig, build_http_client_from_config, join_url};
