//! Jimeng Client Implementation

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::config::JimengProxyConfig;
use crate::error::GenerationError;
use crate::traits::ImageGenerationCapability;
use crate::types::{GenerationResult, ImageOptions, ImageResult};
use crate::utils::http::{self, HttpConfig, build_http_client_from_config, join_url};

use super::types::{ImageGenerationRequest, ImageGenerationResponse, RESERVED_FIELDS};
use super::{DEFAULT_DIMENSION, PROVIDER_ID};

/// Image generation through the jimeng reverse proxy.
///
/// The proxy answers synchronously; every successful call yields a completed
/// `ImageResult`.
#[derive(Clone)]
pub struct JimengClient {
    base_url: String,
    session_id: SecretString,
    model: String,
    text_to_image_endpoint: String,
    image_to_image_endpoint: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for JimengClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JimengClient")
            .field("provider_id", &PROVIDER_ID)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl JimengClient {
    /// Create a client with the default endpoints.
    pub fn new(
        base_url: impl Into<String>,
        session_id: SecretString,
        model: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        let defaults = JimengProxyConfig::default();
        Self {
            base_url: base_url.into(),
            session_id,
            model: model.into(),
            text_to_image_endpoint: defaults.text_to_image_endpoint,
            image_to_image_endpoint: defaults.image_to_image_endpoint,
            http_client,
        }
    }

    pub fn with_endpoints(
        mut self,
        text_to_image: impl Into<String>,
        image_to_image: impl Into<String>,
    ) -> Self {
        self.text_to_image_endpoint = text_to_image.into();
        self.image_to_image_endpoint = image_to_image.into();
        self
    }

    /// Build a client from configuration, rejecting incomplete settings.
    pub fn from_config(config: &JimengProxyConfig) -> Result<Self, GenerationError> {
        let session_id = Self::validate_config(config)?;
        let mut http_config = HttpConfig::from_millis(0, config.connect_timeout, config.read_timeout);
        http_config.user_agent = Some(crate::providers::USER_AGENT.to_string());
        let http_client = build_http_client_from_config(&http_config)?;

        Ok(
            Self::new(config.base_url.trim(), session_id, config.model.trim(), http_client)
                .with_endpoints(
                    config.text_to_image_endpoint.trim(),
                    config.image_to_image_endpoint.trim(),
                ),
        )
    }

    /// Check the settings needed to talk to the proxy and return the session id.
    pub fn validate_config(config: &JimengProxyConfig) -> Result<SecretString, GenerationError> {
        let required = [
            ("base_url", &config.base_url),
            ("model", &config.model),
            ("text_to_image_endpoint", &config.text_to_image_endpoint),
            ("image_to_image_endpoint", &config.image_to_image_endpoint),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(GenerationError::ConfigurationError(format!(
                    "jimeng: {field} is required"
                )));
            }
        }
        config.sessionid.clone().ok_or_else(|| {
            GenerationError::ConfigurationError("jimeng: sessionid is required".to_string())
        })
    }

    fn build_request<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a ImageOptions,
    ) -> Result<ImageGenerationRequest<'a>, GenerationError> {
        let non_blank = |value: &'a Option<String>| value.as_deref().filter(|v| !v.trim().is_empty());
        let extra =
            http::extra_body_params(PROVIDER_ID, options.extra_params.as_ref(), RESERVED_FIELDS)?;
        Ok(ImageGenerationRequest {
            model: non_blank(&options.model).unwrap_or(&self.model),
            prompt,
            negative_prompt: non_blank(&options.negative_prompt),
            size: non_blank(&options.size),
            images: (!options.reference_images.is_empty())
                .then_some(options.reference_images.as_slice()),
            extra,
        })
    }

    fn endpoint_for(&self, options: &ImageOptions) -> &str {
        if options.reference_images.is_empty() {
            &self.text_to_image_endpoint
        } else {
            &self.image_to_image_endpoint
        }
    }
}

/// Parse `WIDTHxHEIGHT` (also `*` or `X` as separator); anything else falls
/// back to the proxy's native 1024x1024.
pub(super) fn parse_dimensions(size: Option<&str>) -> (u32, u32) {
    size.and_then(|s| {
        let (w, h) = s.trim().split_once(['x', 'X', '*'])?;
        let w = w.trim().parse::<u32>().ok().filter(|v| *v > 0)?;
        let h = h.trim().parse::<u32>().ok().filter(|v| *v > 0)?;
        Some((w, h))
    })
    .unwrap_or((DEFAULT_DIMENSION, DEFAULT_DIMENSION))
}

#[async_trait]
impl ImageGenerationCapability for JimengClient {
    fn provider_name(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate_image(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> Result<ImageResult, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidParameter(
                "prompt must not be empty".to_string(),
            ));
        }

        let request = self.build_request(prompt, options)?;
        let url = join_url(&self.base_url, self.endpoint_for(options));
        info!(
            provider = PROVIDER_ID,
            model = request.model,
            reference_images = options.reference_images.len(),
            "Sending image generation request"
        );

        let builder = self
            .http_client
            .post(&url)
            .header(
                reqwest::header::COOKIE,
                format!("sessionid={}", self.session_id.expose_secret()),
            )
            .json(&request);
        let body = http::execute(PROVIDER_ID, builder).await?;

        let response: ImageGenerationResponse = http::decode_json(PROVIDER_ID, &body)?;
        let urls: Vec<String> = response
            .data
            .into_iter()
            .filter_map(|item| item.url)
            .filter(|url| !url.trim().is_empty())
            .collect();
        if urls.is_empty() {
            return Err(GenerationError::empty_result(
                PROVIDER_ID,
                "no image in response",
            ));
        }

        let (width, height) = parse_dimensions(request.size);
        debug!(
            provider = PROVIDER_ID,
            image_count = urls.len(),
            width,
            height,
            "Image generation completed"
        );
        Ok(ImageResult::completed(PROVIDER_ID, urls, width, height))
    }

    async fn get_task_status(&self, task_id: &str) -> Result<GenerationResult, GenerationError> {
        if task_id.trim().is_empty() {
            return Err(GenerationError::InvalidParameter(
                "task_id must not be empty".to_string(),
            ));
        }
        // The proxy has no task API; anything it accepted is already done.
        Ok(GenerationResult::succeeded(PROVIDER_ID, task_id, None))
    }
}
