//! HTTP client utilities
//!
//! Shared client construction and response handling for the leaf provider
//! clients. Every call is a single attempt: helpers here only classify
//! failures into the crate's error taxonomy.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::GenerationError;

/// Per-client HTTP settings.
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Total request timeout
    pub timeout: Option<Duration>,
    /// Connection timeout
    pub connect_timeout: Option<Duration>,
    /// Read timeout between body chunks
    pub read_timeout: Option<Duration>,
    /// User agent
    pub user_agent: Option<String>,
    /// Default headers sent with every request
    pub headers: HashMap<String, String>,
}

impl HttpConfig {
    /// Build from millisecond values as they appear in configuration; zero
    /// means "no limit".
    pub fn from_millis(timeout: u64, connect_timeout: u64, read_timeout: u64) -> Self {
        let non_zero = |ms: u64| (ms > 0).then(|| Duration::from_millis(ms));
        Self {
            timeout: non_zero(timeout),
            connect_timeout: non_zero(connect_timeout),
            read_timeout: non_zero(read_timeout),
            ..Default::default()
        }
    }
}

/// Build an HTTP client from `HttpConfig`.
pub fn build_http_client_from_config(config: &HttpConfig) -> Result<reqwest::Client, GenerationError> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = config.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(read_timeout) = config.read_timeout {
        builder = builder.read_timeout(read_timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent);
    }

    if !config.headers.is_empty() {
        let mut headers = reqwest::header::HeaderMap::new();
        for (k, v) in &config.headers {
            let name = reqwest::header::HeaderName::from_bytes(k.as_bytes()).map_err(|e| {
                GenerationError::ConfigurationError(format!("Invalid header name '{k}': {e}"))
            })?;
            let value = reqwest::header::HeaderValue::from_str(v).map_err(|e| {
                GenerationError::ConfigurationError(format!("Invalid header value for '{k}': {e}"))
            })?;
            headers.insert(name, value);
        }
        builder = builder.default_headers(headers);
    }

    builder
        .build()
        .map_err(|e| GenerationError::ConfigurationError(format!("Failed to create HTTP client: {e}")))
}

/// Join a base URL and an endpoint path with exactly one slash between them.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Send a prepared request and return the body of a 2xx response.
///
/// - connection failures and timeouts become `TransportError`
/// - non-2xx responses become `ProviderError` with the raw body
pub async fn execute(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, GenerationError> {
    let started = Instant::now();
    let response = request
        .send()
        .await
        .map_err(|e| GenerationError::transport(provider, &e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GenerationError::transport(provider, &e))?;
    let duration_ms = started.elapsed().as_millis();

    if !status.is_success() {
        error!(
            provider = %provider,
            status_code = status.as_u16(),
            duration_ms = duration_ms,
            "Request failed"
        );
        return Err(GenerationError::provider_error(provider, status.as_u16(), body));
    }

    debug!(
        provider = %provider,
        status_code = status.as_u16(),
        duration_ms = duration_ms,
        response_length = body.len(),
        "Request completed"
    );
    Ok(body)
}

/// Decode a JSON body into a vendor response type.
pub fn decode_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, GenerationError> {
    serde_json::from_str(body)
        .map_err(|e| GenerationError::decode(provider, format!("unmarshal response: {e}")))
}

/// Caller-supplied body fields, rejecting keys the client already sets.
pub fn extra_body_params<'a>(
    provider: &str,
    extra: Option<&'a HashMap<String, serde_json::Value>>,
    reserved: &[&str],
) -> Result<Option<&'a HashMap<String, serde_json::Value>>, GenerationError> {
    let Some(extra) = extra.filter(|extra| !extra.is_empty()) else {
        return Ok(None);
    };
    let mut clashes: Vec<&str> = extra
        .keys()
        .map(String::as_str)
        .filter(|key| reserved.contains(key))
        .collect();
    if !clashes.is_empty() {
        clashes.sort_unstable();
        return Err(GenerationError::InvalidParameter(format!(
            "{provider}: extra params may not override {}",
            clashes.join(", ")
        )));
    }
    Ok(Some(extra))
}
