//! Exit code constants and error kind mapping for headsong.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration file |
//! | 3 | `NOT_CONFIGURED` | A required service credential is missing |
//! | 4 | `INVALID_INPUT` | Empty selection, missing lyrics, bad index |
//! | 5 | `UPSTREAM_FAILURE` | Upstream returned an error or could not be reached |
//! | 6 | `MALFORMED_RESPONSE` | Upstream answered without the expected fields |

use crate::types::ErrorKind;

/// Exit codes matching the documented exit code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration file
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// A service needed by the requested stage has no credential
    pub const NOT_CONFIGURED: ExitCode = ExitCode(3);

    /// Caller contract violation, nothing was sent
    pub const INVALID_INPUT: ExitCode = ExitCode(4);

    /// Upstream non-success status or transport failure
    pub const UPSTREAM_FAILURE: ExitCode = ExitCode(5);

    /// Upstream success without the expected fields
    pub const MALFORMED_RESPONSE: ExitCode = ExitCode(6);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Exit code for a pipeline error kind
    #[must_use]
    pub const fn for_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::ConfigurationMissing => Self::NOT_CONFIGURED,
            ErrorKind::InvalidInput => Self::INVALID_INPUT,
            ErrorKind::TransportError | ErrorKind::UpstreamError => Self::UPSTREAM_FAILURE,
            ErrorKind::MalformedResponse => Self::MALFORMED_RESPONSE,
            // Reentrancy cannot happen from the sequential CLI
            ErrorKind::OperationInProgress | ErrorKind::Unknown => Self::INTERNAL,
            ErrorKind::PartialResponse => Self::SUCCESS,
        }
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdapterError, ConfigError, HeadsongError, InvalidInput, PipelineError};
    use crate::types::Service;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::NOT_CONFIGURED.as_i32(), 3);
        assert_eq!(ExitCode::INVALID_INPUT.as_i32(), 4);
        assert_eq!(ExitCode::UPSTREAM_FAILURE.as_i32(), 5);
        assert_eq!(ExitCode::MALFORMED_RESPONSE.as_i32(), 6);
        assert_eq!(ExitCode::from_i32(5), ExitCode::UPSTREAM_FAILURE);
    }

    #[test]
    fn test_config_error_mapping() {
        let err = HeadsongError::Config(ConfigError::InvalidFile("bad toml".to_string()));
        assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
    }

    #[test]
    fn test_pipeline_error_mapping() {
        let cases = [
            (
                PipelineError::from(InvalidInput::NoLyrics),
                ExitCode::INVALID_INPUT,
            ),
            (
                PipelineError::SongGenerationFailed(AdapterError::ConfigurationMissing {
                    service: Service::Song,
                    env_var: "SUNO_API_KEY".to_string(),
                }),
                ExitCode::NOT_CONFIGURED,
            ),
            (
                PipelineError::HeadlinesFetchFailed(AdapterError::Transport {
                    service: Service::News,
                    message: "dns".to_string(),
                }),
                ExitCode::UPSTREAM_FAILURE,
            ),
            (
                PipelineError::LyricsGenerationFailed(AdapterError::MalformedResponse {
                    service: Service::Lyrics,
                    detail: "no text".to_string(),
                }),
                ExitCode::MALFORMED_RESPONSE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(HeadsongError::Pipeline(err).to_exit_code(), expected);
        }
    }
}
