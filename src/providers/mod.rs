//! Provider Implementations
//!
//! Leaf clients, one per vendor. Each turns a capability call into exactly one
//! HTTP request and decodes the vendor response into the normalized types.

pub mod doubao;
pub mod jimeng;
pub mod vectorengine;

pub use doubao::DoubaoClient;
pub use jimeng::JimengClient;
pub use vectorengine::VectorEngineClient;

/// User agent sent by the built-in clients.
pub(crate) const USER_AGENT: &str = concat!("genbridge/", env!("CARGO_PKG_VERSION"));
