//! Vectorengine Client Implementation

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::config::{TextConfig, VectorEngineConfig};
use crate::error::GenerationError;
use crate::traits::TextGenerationCapability;
use crate::types::TextOptions;
use crate::utils::http::{self, HttpConfig, build_http_client_from_config, join_url};

use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, RESERVED_FIELDS};
use super::{CHAT_COMPLETIONS_PATH, PROVIDER_ID};

/// Text generation through the vectorengine relay.
#[derive(Clone)]
pub struct VectorEngineClient {
    base_url: String,
    api_key: SecretString,
    text: TextConfig,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for VectorEngineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorEngineClient")
            .field("provider_id", &PROVIDER_ID)
            .field("base_url", &self.base_url)
            .field("model", &self.text.model)
            .finish()
    }
}

impl VectorEngineClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        text: TextConfig,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            text,
            http_client,
        }
    }

    /// Build a client from configuration, rejecting incomplete settings.
    pub fn from_config(
        config: &VectorEngineConfig,
        text: &TextConfig,
    ) -> Result<Self, GenerationError> {
        let api_key = Self::validate_config(config, text)?;
        let mut http_config =
            HttpConfig::from_millis(config.timeout, config.connect_timeout, config.read_timeout);
        http_config.user_agent = Some(crate::providers::USER_AGENT.to_string());
        let http_client = build_http_client_from_config(&http_config)?;

        Ok(Self::new(
            config.base_url.trim(),
            api_key,
            text.clone(),
            http_client,
        ))
    }

    /// Check the settings needed to talk to vectorengine and return the key.
    pub fn validate_config(
        config: &VectorEngineConfig,
        text: &TextConfig,
    ) -> Result<SecretString, GenerationError> {
        if config.base_url.trim().is_empty() {
            return Err(GenerationError::ConfigurationError(
                "vectorengine: base_url is required".to_string(),
            ));
        }
        if text.model.trim().is_empty() {
            return Err(GenerationError::ConfigurationError(
                "vectorengine: text.model is required".to_string(),
            ));
        }
        config.api_key.clone().ok_or_else(|| {
            GenerationError::ConfigurationError("vectorengine: api_key is required".to_string())
        })
    }

    fn resolve_model<'a>(&'a self, options: &'a TextOptions) -> &'a str {
        options
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.text.model)
    }

    fn build_request<'a>(
        &'a self,
        prompt: &'a str,
        system_prompt: &'a str,
        options: &'a TextOptions,
    ) -> Result<ChatCompletionRequest<'a>, GenerationError> {
        let extra =
            http::extra_body_params(PROVIDER_ID, options.extra_params.as_ref(), RESERVED_FIELDS)?;
        Ok(ChatCompletionRequest {
            model: self.resolve_model(options),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: options.temperature.or(self.text.temperature),
            max_tokens: options.max_tokens.or(self.text.max_tokens),
            top_p: options.top_p.or(self.text.top_p),
            extra,
        })
    }
}

#[async_trait]
impl TextGenerationCapability for VectorEngineClient {
    fn provider_name(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: &str,
        options: &TextOptions,
    ) -> Result<String, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidParameter(
                "prompt must not be empty".to_string(),
            ));
        }

        let request = self.build_request(prompt, system_prompt, options)?;
        let url = join_url(&self.base_url, CHAT_COMPLETIONS_PATH);
        info!(
            provider = PROVIDER_ID,
            model = request.model,
            prompt_length = prompt.len(),
            "Sending text generation request"
        );

        let builder = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request);
        let body = http::execute(PROVIDER_ID, builder).await?;

        let response: ChatCompletionResponse = http::decode_json(PROVIDER_ID, &body)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::empty_result(PROVIDER_ID, "no choices in response"))?;
        let content = choice.message.content.ok_or_else(|| {
            GenerationError::empty_result(PROVIDER_ID, "first choice carries no content")
        })?;

        debug!(
            provider = PROVIDER_ID,
            content_length = content.len(),
            "Text generation completed"
        );
        Ok(content)
    }
}
