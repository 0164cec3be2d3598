use std::fmt;
use thiserror::Error;

use crate::redaction::redact_error_message;
use crate::types::{ErrorKind, Service, Stage};

/// Upstream bodies longer than this are cut in `Display` output.
const MAX_DISPLAYED_BODY_CHARS: usize = 200;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `HeadsongError` is the top-level error returned by headsong library
/// operations that are not pipeline stage results:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes via [`to_exit_code()`](Self::to_exit_code)
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration file or CLI argument errors |
/// | 3 | Service not configured (credential missing) |
/// | 4 | Invalid input (selection, lyrics) |
/// | 5 | Upstream or transport failure |
/// | 6 | Malformed upstream response |
/// | 1 | Other errors |
#[derive(Error, Debug)]
pub enum HeadsongError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    InvalidInput,
    UpstreamService,
    Concurrency,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::InvalidInput => write!(f, "Invalid Input"),
            Self::UpstreamService => write!(f, "Upstream Service"),
            Self::Concurrency => write!(f, "Concurrency"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files must be valid TOML with optional [news], [lyrics], [song] and [http] sections."
                    .to_string(),
            ),
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { .. } => Some(
                "headsong searches for .headsong/config.toml starting from the current directory upward."
                    .to_string(),
            ),
            Self::DiscoveryFailed { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Remove unknown keys; the file is parsed strictly".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "max_headlines" => vec!["Use an integer between 1 and 100".to_string()],
                "timeout_secs" | "connect_timeout_secs" => {
                    vec!["Use a positive number of seconds".to_string()]
                }
                "region" => vec!["Use a two-letter country code such as 'us' or 'gb'".to_string()],
                _ => vec![
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::NotFound { .. } => vec![
                "Create .headsong/config.toml in your project root".to_string(),
                "Omit --config to run with built-in defaults".to_string(),
            ],
            Self::DiscoveryFailed { .. } => vec![
                "Check file permissions in the current directory and parent directories"
                    .to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Failure of a single adapter call.
///
/// `ConfigurationMissing` is produced before any network traffic; the other
/// variants describe what happened on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Required credential absent
    #[error("{service} is not configured: environment variable {env_var} is not set")]
    ConfigurationMissing { service: Service, env_var: String },

    /// Network or connectivity failure
    #[error("{service} request failed: {message}")]
    Transport { service: Service, message: String },

    /// Upstream reached, non-success status (status passed through unchanged)
    #[error("{service} returned HTTP {status}: {}", truncate_body(.body))]
    Upstream {
        service: Service,
        status: u16,
        body: String,
    },

    /// Upstream reached, success status, required field absent
    #[error("{service} returned a malformed response: {detail}")]
    MalformedResponse { service: Service, detail: String },
}

impl AdapterError {
    /// Service that produced the error
    #[must_use]
    pub fn service(&self) -> Service {
        match self {
            Self::ConfigurationMissing { service, .. }
            | Self::Transport { service, .. }
            | Self::Upstream { service, .. }
            | Self::MalformedResponse { service, .. } => *service,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigurationMissing { .. } => ErrorKind::ConfigurationMissing,
            Self::Transport { .. } => ErrorKind::TransportError,
            Self::Upstream { .. } => ErrorKind::UpstreamError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_DISPLAYED_BODY_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_DISPLAYED_BODY_CHARS).collect();
    format!("{cut}…")
}

impl UserFriendlyError for AdapterError {
    fn user_message(&self) -> String {
        match self {
            Self::ConfigurationMissing { service, .. } => {
                format!("{service} service not configured")
            }
            Self::Transport { service, message } => {
                format!("{service} request failed: could not reach the service ({message})")
            }
            Self::Upstream {
                service,
                status,
                body,
            } => format!(
                "{service} request failed with HTTP {status}: {}",
                truncate_body(body)
            ),
            Self::MalformedResponse { service, detail } => {
                format!("{service} returned a malformed response: {detail}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ConfigurationMissing { env_var, .. } => Some(format!(
                "Credentials are read once at startup; {env_var} was not set."
            )),
            Self::Transport { .. } => Some(
                "The request never received an HTTP response.".to_string(),
            ),
            Self::Upstream { status, .. } => match *status {
                401 | 403 => Some("The service rejected the credential.".to_string()),
                429 => Some("The service is rate limiting requests.".to_string()),
                s if s >= 500 => Some("The service reported an internal failure.".to_string()),
                _ => None,
            },
            Self::MalformedResponse { .. } => Some(
                "The service answered successfully but without the expected fields.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigurationMissing { service, env_var } => vec![
                format!("Export {env_var} before running headsong"),
                format!(
                    "Or point [{}] api_key_env at another variable in .headsong/config.toml",
                    service.as_str()
                ),
                "Run 'headsong doctor' to check every credential".to_string(),
            ],
            Self::Transport { .. } => vec![
                "Check network connectivity".to_string(),
                "Increase [http] timeout_secs if the service is slow".to_string(),
            ],
            Self::Upstream { status, .. } => match *status {
                401 | 403 => vec!["Verify the API key is valid and active".to_string()],
                429 => vec!["Wait before trying again".to_string()],
                _ => vec!["Try again later; nothing is retried automatically".to_string()],
            },
            Self::MalformedResponse { service, .. } => vec![
                format!("Check whether the {service} API changed its response format"),
                "Run with --verbose to log the raw response shape".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationMissing { .. } => ErrorCategory::Configuration,
            _ => ErrorCategory::UpstreamService,
        }
    }
}

/// Caller contract violations, rejected before any network call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("no headlines selected")]
    EmptySelection,

    #[error("no lyrics to turn into a song")]
    NoLyrics,

    #[error("headline index {index} is out of range for {len} headline(s)")]
    InvalidIndex { index: usize, len: usize },
}

/// Result of a pipeline operation that did not complete
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    #[error("Operation in progress: pipeline is {stage}")]
    OperationInProgress { stage: Stage },

    #[error("Headline fetch failed: {0}")]
    HeadlinesFetchFailed(#[source] AdapterError),

    #[error("Lyrics generation failed: {0}")]
    LyricsGenerationFailed(#[source] AdapterError),

    #[error("Song generation failed: {0}")]
    SongGenerationFailed(#[source] AdapterError),
}

impl PipelineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::OperationInProgress { .. } => ErrorKind::OperationInProgress,
            Self::HeadlinesFetchFailed(e)
            | Self::LyricsGenerationFailed(e)
            | Self::SongGenerationFailed(e) => e.kind(),
        }
    }

    /// Underlying adapter failure, if the stage reached an adapter
    #[must_use]
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            Self::HeadlinesFetchFailed(e)
            | Self::LyricsGenerationFailed(e)
            | Self::SongGenerationFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Whether the error was raised locally, leaving the stage untouched
    #[must_use]
    pub fn is_rejected_locally(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::OperationInProgress { .. }
        )
    }
}

impl UserFriendlyError for PipelineError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(InvalidInput::EmptySelection) => {
                "Select at least one headline".to_string()
            }
            Self::InvalidInput(InvalidInput::NoLyrics) => "Generate lyrics first".to_string(),
            Self::InvalidInput(e @ InvalidInput::InvalidIndex { .. }) => {
                format!("Invalid selection: {e}")
            }
            Self::OperationInProgress { stage } => {
                format!("Another operation is still running ({stage})")
            }
            Self::HeadlinesFetchFailed(e) => {
                format!("Could not fetch headlines: {}", e.user_message())
            }
            Self::LyricsGenerationFailed(e) => {
                format!("Could not generate lyrics: {}", e.user_message())
            }
            Self::SongGenerationFailed(e) => {
                format!("Could not generate song: {}", e.user_message())
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidInput(_) => Some("No request was sent.".to_string()),
            Self::OperationInProgress { .. } => Some(
                "Stage calls are exclusive; wait for the current one to finish.".to_string(),
            ),
            Self::HeadlinesFetchFailed(e)
            | Self::LyricsGenerationFailed(e)
            | Self::SongGenerationFailed(e) => e.context(),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput(InvalidInput::EmptySelection) => {
                vec!["Pass --select with one or more headline indices, e.g. --select 0,2".to_string()]
            }
            Self::InvalidInput(InvalidInput::NoLyrics) => {
                vec!["Run the lyrics stage before the song stage".to_string()]
            }
            Self::InvalidInput(InvalidInput::InvalidIndex { len, .. }) => {
                vec![format!("Use indices between 0 and {}", len.saturating_sub(1))]
            }
            Self::OperationInProgress { .. } => Vec::new(),
            Self::HeadlinesFetchFailed(e)
            | Self::LyricsGenerationFailed(e)
            | Self::SongGenerationFailed(e) => e.suggestions(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput(_) => ErrorCategory::InvalidInput,
            Self::OperationInProgress { .. } => ErrorCategory::Concurrency,
            Self::HeadlinesFetchFailed(e)
            | Self::LyricsGenerationFailed(e)
            | Self::SongGenerationFailed(e) => e.category(),
        }
    }
}

impl UserFriendlyError for HeadsongError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Pipeline(e) => e.user_message(),
            Self::Io(e) => format!("File system error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Pipeline(e) => e.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Pipeline(e) => e.suggestions(),
            Self::Io(_) => vec!["Check file permissions".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Pipeline(e) => e.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl HeadsongError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// The output is redacted before it is returned.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        redact_error_message(&output)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Pipeline(e) => e.kind(),
            Self::Config(_) | Self::Io(_) => ErrorKind::Unknown,
        }
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Pipeline(e) => ExitCode::for_kind(e.kind()),
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_lyrics_key() -> AdapterError {
        AdapterError::ConfigurationMissing {
            service: Service::Lyrics,
            env_var: "ANTHROPIC_API_KEY".to_string(),
        }
    }

    #[test]
    fn test_adapter_error_kinds() {
        assert_eq!(missing_lyrics_key().kind(), ErrorKind::ConfigurationMissing);
        assert_eq!(
            AdapterError::Transport {
                service: Service::News,
                message: "connection refused".to_string(),
            }
            .kind(),
            ErrorKind::TransportError
        );
        assert_eq!(
            AdapterError::Upstream {
                service: Service::Song,
                status: 402,
                body: "{}".to_string(),
            }
            .kind(),
            ErrorKind::UpstreamError
        );
    }

    #[test]
    fn test_pipeline_error_kind_follows_adapter() {
        let err = PipelineError::LyricsGenerationFailed(AdapterError::MalformedResponse {
            service: Service::Lyrics,
            detail: "content[0].text missing".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.adapter_error().is_some());
        assert!(!err.is_rejected_locally());

        let err = PipelineError::from(InvalidInput::EmptySelection);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.is_rejected_locally());
    }

    #[test]
    fn test_user_messages_distinguish_remediation() {
        let not_configured = PipelineError::LyricsGenerationFailed(missing_lyrics_key());
        let failed = PipelineError::LyricsGenerationFailed(AdapterError::Upstream {
            service: Service::Lyrics,
            status: 500,
            body: "overloaded".to_string(),
        });
        let malformed = PipelineError::LyricsGenerationFailed(AdapterError::MalformedResponse {
            service: Service::Lyrics,
            detail: "empty content".to_string(),
        });

        assert!(not_configured.user_message().contains("not configured"));
        assert!(failed.user_message().contains("request failed"));
        assert!(malformed.user_message().contains("malformed response"));
    }

    #[test]
    fn test_upstream_display_truncates_body() {
        let err = AdapterError::Upstream {
            service: Service::News,
            status: 500,
            body: "x".repeat(1000),
        };
        let shown = err.to_string();
        assert!(shown.starts_with("NewsAPI returned HTTP 500: "));
        assert!(shown.chars().count() < 300);
    }

    #[test]
    fn test_display_for_user_includes_suggestions() {
        let err = HeadsongError::Pipeline(PipelineError::LyricsGenerationFailed(
            missing_lyrics_key(),
        ));
        let shown = err.display_for_user();
        assert!(shown.starts_with("Error: Could not generate lyrics: Anthropic service not configured"));
        assert!(shown.contains("Suggestions:"));
        assert!(shown.contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn test_config_error_category() {
        let err = ConfigError::InvalidValue {
            key: "max_headlines".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.suggestions(), vec!["Use an integer between 1 and 100"]);
    }
}
