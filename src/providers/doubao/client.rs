//! Doubao Client Implementation

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::config::{DoubaoConfig, VideoConfig};
use crate::error::GenerationError;
use crate::traits::VideoGenerationCapability;
use crate::types::{GenerationOutput, GenerationResult, TaskHandle, VideoOptions};
use crate::utils::http::{self, HttpConfig, build_http_client_from_config, join_url};

use super::PROVIDER_ID;
use super::types::{
    ContentPart, CreateTaskRequest, CreateTaskResponse, ImageUrl, RESERVED_FIELDS, TaskError,
    TaskResponse,
};

const TASK_ID_PLACEHOLDER: &str = "{task_id}";

/// Video generation defaults applied when the caller leaves options unset.
#[derive(Debug, Clone)]
pub struct VideoDefaults {
    pub aspect_ratio: String,
    pub duration: u32,
    pub max_duration: u32,
}

impl From<&VideoConfig> for VideoDefaults {
    fn from(config: &VideoConfig) -> Self {
        Self {
            aspect_ratio: config.default_aspect_ratio.clone(),
            duration: config.default_duration,
            max_duration: config.max_duration,
        }
    }
}

impl Default for VideoDefaults {
    fn default() -> Self {
        Self::from(&VideoConfig::default())
    }
}

/// Asynchronous video generation through Doubao content generation tasks.
#[derive(Clone)]
pub struct DoubaoClient {
    base_url: String,
    api_key: SecretString,
    model: String,
    endpoint: String,
    query_endpoint: String,
    defaults: VideoDefaults,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for DoubaoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoubaoClient")
            .field("provider_id", &PROVIDER_ID)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl DoubaoClient {
    /// Create a client with the default task endpoints and video defaults.
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
        http_client: reqwest::Client,
    ) -> Self {
        let config = DoubaoConfig::default();
        Self {
            base_url: base_url.into(),
            api_key,
            model: model.into(),
            endpoint: config.endpoint,
            query_endpoint: config.query_endpoint,
            defaults: VideoDefaults::default(),
            http_client,
        }
    }

    pub fn with_endpoints(mut self, endpoint: impl Into<String>, query_endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self.query_endpoint = query_endpoint.into();
        self
    }

    pub fn with_defaults(mut self, defaults: VideoDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Build a client from configuration, rejecting incomplete settings.
    pub fn from_config(config: &DoubaoConfig, video: &VideoConfig) -> Result<Self, GenerationError> {
        let api_key = Self::validate_config(config, video)?;
        let mut http_config =
            HttpConfig::from_millis(config.timeout, config.connect_timeout, config.read_timeout);
        http_config.user_agent = Some(crate::providers::USER_AGENT.to_string());
        let http_client = build_http_client_from_config(&http_config)?;

        Ok(Self::new(
            config.base_url.trim(),
            api_key,
            Self::configured_model(config, video),
            http_client,
        )
        .with_endpoints(config.endpoint.trim(), config.query_endpoint.trim())
        .with_defaults(VideoDefaults::from(video)))
    }

    /// Check the settings needed to talk to Doubao and return the key.
    pub fn validate_config(
        config: &DoubaoConfig,
        video: &VideoConfig,
    ) -> Result<SecretString, GenerationError> {
        let required = [
            ("base_url", config.base_url.as_str()),
            ("endpoint", config.endpoint.as_str()),
            ("query_endpoint", config.query_endpoint.as_str()),
            ("model", Self::configured_model(config, video)),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(GenerationError::ConfigurationError(format!(
                    "doubao: {field} is required"
                )));
            }
        }
        config.api_key.clone().ok_or_else(|| {
            GenerationError::ConfigurationError("doubao: api_key is required".to_string())
        })
    }

    fn configured_model<'a>(config: &'a DoubaoConfig, video: &'a VideoConfig) -> &'a str {
        let model = config.model.trim();
        if model.is_empty() { video.model.trim() } else { model }
    }

    fn build_request<'a>(
        &'a self,
        prompt: &str,
        options: &'a VideoOptions,
    ) -> Result<CreateTaskRequest<'a>, GenerationError> {
        let duration = options.duration.unwrap_or(self.defaults.duration);
        if duration == 0 {
            return Err(GenerationError::InvalidParameter(
                "duration must be at least 1 second".to_string(),
            ));
        }
        if duration > self.defaults.max_duration {
            return Err(GenerationError::InvalidParameter(format!(
                "duration {duration}s exceeds the maximum of {}s",
                self.defaults.max_duration
            )));
        }
        let ratio = options
            .aspect_ratio
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(&self.defaults.aspect_ratio);

        let mut content = vec![ContentPart::Text {
            text: format!("{} --ratio {ratio} --dur {duration}", prompt.trim()),
        }];
        if let Some(url) = options
            .first_frame_image
            .as_deref()
            .filter(|u| !u.trim().is_empty())
        {
            content.push(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: url.to_string(),
                },
            });
        }

        Ok(CreateTaskRequest {
            model: options
                .model
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(&self.model),
            content,
            extra: http::extra_body_params(PROVIDER_ID, options.extra_params.as_ref(), RESERVED_FIELDS)?,
        })
    }

    fn task_url(&self, task_id: &str) -> String {
        let encoded = urlencoding::encode(task_id);
        if self.query_endpoint.contains(TASK_ID_PLACEHOLDER) {
            join_url(
                &self.base_url,
                &self.query_endpoint.replace(TASK_ID_PLACEHOLDER, &encoded),
            )
        } else {
            format!("{}/{encoded}", join_url(&self.base_url, &self.query_endpoint))
        }
    }
}

/// Normalize a task query response.
pub(super) fn normalize_task(task_id: &str, task: TaskResponse) -> Result<GenerationResult, GenerationError> {
    match task.status.as_str() {
        "queued" | "running" => Ok(GenerationResult::pending(PROVIDER_ID, task_id)),
        "succeeded" => {
            let output = task
                .content
                .and_then(|c| c.video_url)
                .filter(|url| !url.trim().is_empty())
                .map(|url| GenerationOutput::Video {
                    url,
                    duration: task.duration,
                });
            Ok(GenerationResult::succeeded(PROVIDER_ID, task_id, output))
        }
        "failed" => Ok(GenerationResult::failed(
            PROVIDER_ID,
            task_id,
            failure_detail(task.error),
        )),
        "cancelled" => Ok(GenerationResult::failed(
            PROVIDER_ID,
            task_id,
            "task cancelled by provider",
        )),
        other => Err(GenerationError::decode(
            PROVIDER_ID,
            format!("unknown task status '{other}'"),
        )),
    }
}

fn failure_detail(error: Option<TaskError>) -> String {
    match error {
        Some(TaskError {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {message}"),
        Some(TaskError {
            message: Some(message),
            ..
        }) => message,
        Some(TaskError { code: Some(code), .. }) => code,
        _ => "task failed without error detail".to_string(),
    }
}

#[async_trait]
impl VideoGenerationCapability for DoubaoClient {
    fn provider_name(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate_video(
        &self,
        prompt: &str,
        options: &VideoOptions,
    ) -> Result<TaskHandle, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidParameter(
                "prompt must not be empty".to_string(),
            ));
        }

        let request = self.build_request(prompt, options)?;
        let url = join_url(&self.base_url, &self.endpoint);
        info!(
            provider = PROVIDER_ID,
            model = request.model,
            has_first_frame = options.first_frame_image.is_some(),
            "Submitting video generation task"
        );

        let builder = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request);
        let body = http::execute(PROVIDER_ID, builder).await?;

        let response: CreateTaskResponse = http::decode_json(PROVIDER_ID, &body)?;
        let task_id = response
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| GenerationError::empty_result(PROVIDER_ID, "no task id in response"))?;

        info!(provider = PROVIDER_ID, task_id = %task_id, "Video generation task submitted");
        Ok(TaskHandle::new(PROVIDER_ID, task_id))
    }

    async fn get_task_status(&self, task_id: &str) -> Result<GenerationResult, GenerationError> {
        if task_id.trim().is_empty() {
            return Err(GenerationError::InvalidParameter(
                "task_id must not be empty".to_string(),
            ));
        }

        let builder = self
            .http_client
            .get(self.task_url(task_id))
            .bearer_auth(self.api_key.expose_secret());
        let body = http::execute(PROVIDER_ID, builder).await?;

        let task: TaskResponse = http::decode_json(PROVIDER_ID, &body)?;
        let result = normalize_task(task_id, task)?;
        if result.is_failed() {
            warn!(
                provider = PROVIDER_ID,
                task_id = %task_id,
                error = result.error.as_deref().unwrap_or_default(),
                "Video task failed at provider"
            );
        } else {
            debug!(
                provider = PROVIDER_ID,
                task_id = %task_id,
                status = %result.status,
                "Video task status"
            );
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskStatus;
    use serde_json::json;

    fn client() -> DoubaoClient {
        DoubaoClient::new(
            "https://ark.example.com",
            SecretString::from("ark-key".to_string()),
            "doubao-seedance-1-0-pro",
            reqwest::Client::new(),
        )
    }

    fn task(value: serde_json::Value) -> TaskResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_encodes_ratio_and_duration_into_prompt() {
        let client = client();
        let options = VideoOptions::new().with_duration(10).with_aspect_ratio("9:16");
        let value = serde_json::to_value(client.build_request("A boat at dusk", &options).unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "model": "doubao-seedance-1-0-pro",
                "content": [{"type": "text", "text": "A boat at dusk --ratio 9:16 --dur 10"}]
            })
        );
    }

    #[test]
    fn defaults_fill_missing_options_and_first_frame_is_attached() {
        let client = client();
        let options = VideoOptions::new().with_first_frame_image("https://cdn.example.com/f.png");
        let value = serde_json::to_value(client.build_request("Waves", &options).unwrap()).unwrap();

        assert_eq!(value["content"][0]["text"], "Waves --ratio 16:9 --dur 5");
        assert_eq!(
            value["content"][1],
            json!({"type": "image_url", "image_url": {"url": "https://cdn.example.com/f.png"}})
        );
    }

    #[test]
    fn duration_above_maximum_is_rejected() {
        let client = client();
        let options = VideoOptions::new().with_duration(16);
        assert!(matches!(
            client.build_request("p", &options),
            Err(GenerationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn task_url_appends_or_substitutes_task_id() {
        let default_client = client();
        assert_eq!(
            default_client.task_url("cgt-1"),
            "https://ark.example.com/api/v3/contents/generations/tasks/cgt-1"
        );

        let templated = client().with_endpoints("/tasks", "/tasks/{task_id}/status");
        assert_eq!(
            templated.task_url("a b"),
            "https://ark.example.com/tasks/a%20b/status"
        );
    }

    #[test]
    fn normalize_maps_every_provider_status() {
        let pending = normalize_task("t", task(json!({"id": "t", "status": "queued"}))).unwrap();
        assert_eq!(pending.status, TaskStatus::Pending);
        assert!(!pending.completed);

        let running = normalize_task("t", task(json!({"id": "t", "status": "running"}))).unwrap();
        assert!(running.is_pending());

        let done = normalize_task(
            "t",
            task(json!({
                "id": "t",
                "status": "succeeded",
                "content": {"video_url": "https://cdn.example.com/v.mp4"},
                "duration": 5
            })),
        )
        .unwrap();
        assert!(done.is_success());
        assert_eq!(done.video_url(), Some("https://cdn.example.com/v.mp4"));
        assert_eq!(
            done.output,
            Some(GenerationOutput::Video {
                url: "https://cdn.example.com/v.mp4".to_string(),
                duration: Some(5)
            })
        );

        let failed = normalize_task(
            "t",
            task(json!({
                "id": "t",
                "status": "failed",
                "error": {"code": "InputTextSensitiveContentDetected", "message": "rejected"}
            })),
        )
        .unwrap();
        assert!(failed.is_failed());
        assert_eq!(
            failed.error.as_deref(),
            Some("InputTextSensitiveContentDetected: rejected")
        );

        let cancelled = normalize_task("t", task(json!({"id": "t", "status": "cancelled"}))).unwrap();
        assert!(cancelled.is_failed());
    }

    #[test]
    fn succeeded_without_url_has_no_output() {
        let done = normalize_task("t", task(json!({"id": "t", "status": "succeeded"}))).unwrap();
        assert!(done.is_success());
        assert!(!done.has_usable_output());
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let err = normalize_task("t", task(json!({"status": "exploded"}))).err();
        assert!(matches!(err, Some(GenerationError::DecodeError { .. })));
    }

    fn enabled_config() -> DoubaoConfig {
        DoubaoConfig {
            enabled: true,
            base_url: "https://ark.example.com".to_string(),
            api_key: Some(SecretString::from("ark-key".to_string())),
            ..DoubaoConfig::default()
        }
    }

    #[test]
    fn missing_model_is_a_configuration_error() {
        let err = DoubaoClient::validate_config(&enabled_config(), &VideoConfig::default()).err();
        assert!(matches!(
            err,
            Some(GenerationError::ConfigurationError(ref msg)) if msg.contains("model")
        ));
    }

    #[test]
    fn explicit_video_model_fills_blank_provider_model() {
        let video = VideoConfig {
            model: "doubao-seedance-1-0-lite-t2v".to_string(),
            ..VideoConfig::default()
        };
        assert!(DoubaoClient::validate_config(&enabled_config(), &video).is_ok());
        assert_eq!(
            DoubaoClient::configured_model(&enabled_config(), &video),
            "doubao-seedance-1-0-lite-t2v"
        );
    }
}
