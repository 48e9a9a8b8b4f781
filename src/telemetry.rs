//! Telemetry and tracing utilities
//!
//! Subscriber setup for applications embedding the crate. Library code only
//! emits `tracing` events; nothing is printed unless a subscriber is installed.
//!
//! ## Example
//!
//! ```rust,ignore
//! use genbridge::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .log_file("logs/genbridge.log".into())
//!     .build();
//! // Keep the guard alive for as long as file logging is needed.
//! let _guard = init_subscriber(config)?;
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

use crate::error::GenerationError;

pub const ENV_LOG_LEVEL: &str = "GENBRIDGE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "GENBRIDGE_LOG_FORMAT";
pub const ENV_LOG_FILE: &str = "GENBRIDGE_LOG_FILE";

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// One JSON object per event, with span context
    Json,
    /// JSON with event fields flattened to the top level
    JsonCompact,
}

impl FromStr for OutputFormat {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "json-compact" | "json_compact" => Ok(OutputFormat::JsonCompact),
            other => Err(GenerationError::ConfigurationError(format!(
                "Invalid log format: {other}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Also write to stdout when a log file is set
    pub enable_console: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            enable_console: true,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    /// JSON to a file only, warnings and above.
    pub fn production(log_file: PathBuf) -> Self {
        Self {
            log_level: tracing::Level::WARN,
            output_format: OutputFormat::Json,
            enable_console: false,
            log_file: Some(log_file),
        }
    }

    fn filter_directive(&self) -> String {
        let level = self.log_level.as_str().to_ascii_lowercase();
        format!("genbridge={level}")
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    enable_console: Option<bool>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self, GenerationError> {
        let level = tracing::Level::from_str(level.trim()).map_err(|_| {
            GenerationError::ConfigurationError(format!(
                "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
            ))
        })?;
        self.log_level = Some(level);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn enable_console(mut self, enable: bool) -> Self {
        self.enable_console = Some(enable);
        self
    }

    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            enable_console: self.enable_console.unwrap_or(true),
            log_file: self.log_file,
        }
    }
}

fn file_writer(path: &Path) -> Result<(BoxMakeWriter, WorkerGuard), GenerationError> {
    let file_name = path.file_name().ok_or_else(|| {
        GenerationError::ConfigurationError(format!("Invalid log file path: {}", path.display()))
    })?;
    let directory = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    Ok((BoxMakeWriter::new(writer), guard))
}

/// Initialize tracing subscriber with the given configuration
///
/// Returns the non-blocking writer guard when a log file is configured; it
/// must be kept alive for the duration of the program. An already installed
/// global subscriber is left in place.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, GenerationError> {
    let filter = EnvFilter::new(config.filter_directive());

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let (file, guard) = file_writer(path)?;
            let writer = if config.enable_console {
                BoxMakeWriter::new(file.and(std::io::stdout))
            } else {
                file
            };
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(config.log_file.is_none())
        .with_writer(writer);

    let init_result = match config.output_format {
        OutputFormat::Json => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => builder.json().flatten_event(true).try_init(),
        OutputFormat::Text => builder.try_init(),
    };

    match init_result {
        Ok(()) => Ok(guard),
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("global default trace dispatcher has already been set") {
                Ok(None)
            } else {
                Err(GenerationError::ConfigurationError(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        }
    }
}

/// Build a subscriber configuration from a variable lookup.
///
/// - `GENBRIDGE_LOG_LEVEL`: trace, debug, info, warn, error
/// - `GENBRIDGE_LOG_FORMAT`: text, json, json-compact
/// - `GENBRIDGE_LOG_FILE`: log file path
pub fn config_from_lookup<F>(lookup: F) -> Result<SubscriberConfig, GenerationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = SubscriberConfig::builder();
    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        builder = builder.log_level_str(&level)?;
    }
    if let Some(format) = lookup(ENV_LOG_FORMAT) {
        builder = builder.output_format(format.parse()?);
    }
    if let Some(file) = lookup(ENV_LOG_FILE).filter(|f| !f.trim().is_empty()) {
        builder = builder.log_file(PathBuf::from(file));
    }
    Ok(builder.build())
}

/// Initialize tracing subscriber from environment variables
pub fn init_from_env() -> Result<Option<WorkerGuard>, GenerationError> {
    init_subscriber(config_from_lookup(|key| std::env::var(key).ok())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn builder_defaults() {
        let config = SubscriberConfig::builder().build();
        assert_eq!(config.log_level, tracing::Level::INFO);
        assert_eq!(config.output_format, OutputFormat::Text);
        assert!(config.enable_console);
        assert_eq!(config.filter_directive(), "genbridge=info");
    }

    #[test]
    fn invalid_level_is_rejected() {
        assert!(SubscriberConfig::builder().log_level_str("loud").is_err());
        let config = SubscriberConfig::builder()
            .log_level_str("DEBUG")
            .unwrap()
            .build();
        assert_eq!(config.filter_directive(), "genbridge=debug");
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().ok(), Some(OutputFormat::Json));
        assert_eq!(
            "json-compact".parse::<OutputFormat>().ok(),
            Some(OutputFormat::JsonCompact)
        );
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn config_from_lookup_reads_all_variables() {
        let env = HashMap::from([
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_FORMAT, "json"),
            (ENV_LOG_FILE, "logs/genbridge.log"),
        ]);
        let config = config_from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.log_level, tracing::Level::WARN);
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.log_file, Some(PathBuf::from("logs/genbridge.log")));
    }

    #[test]
    fn file_writer_rejects_directory_only_path() {
        assert!(file_writer(Path::new("/")).is_err());
    }
}
