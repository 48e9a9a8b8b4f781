//! Text Generation Capability

use crate::error::GenerationError;
use crate::types::TextOptions;
use async_trait::async_trait;

/// Prompt used by `test_connection`.
pub const CONNECTION_TEST_PROMPT: &str = "Hello";
/// System prompt used by `test_connection`.
pub const CONNECTION_TEST_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Synchronous text generation.
///
/// A single call issues exactly one HTTP request; failures are reported
/// immediately and never retried.
#[async_trait]
pub trait TextGenerationCapability: Send + Sync {
    /// Name of the provider backing this client
    fn provider_name(&self) -> &str;

    /// Generate text for `prompt` under `system_prompt`.
    ///
    /// # Errors
    ///
    /// - `TransportError` on connection failure or per-call timeout
    /// - `ProviderError` on a non-2xx response, with status and raw body
    /// - `DecodeError` when the body does not have the expected shape
    /// - `EmptyResult` when the response holds no choices
    async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: &str,
        options: &TextOptions,
    ) -> Result<String, GenerationError>;

    /// Check credentials and reachability with a minimal prompt.
    async fn test_connection(&self) -> Result<(), GenerationError> {
        self.generate_text(
            CONNECTION_TEST_PROMPT,
            CONNECTION_TEST_SYSTEM_PROMPT,
            &TextOptions::default(),
        )
        .await
        .map(|_| ())
    }
}
