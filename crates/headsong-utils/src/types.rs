//! Shared types used across the headsong crates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// External service an adapter talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Headline provider (NewsAPI)
    News,
    /// Text generator (Anthropic Messages API)
    Lyrics,
    /// Audio generator (SunoAPI.org)
    Song,
}

impl Service {
    /// All services in pipeline order
    pub const ALL: [Service; 3] = [Service::News, Service::Lyrics, Service::Song];

    /// Stable identifier used in config sections and log fields
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Service::News => "news",
            Service::Lyrics => "lyrics",
            Service::Song => "song",
        }
    }

    /// Human-readable name of the upstream behind this service
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Service::News => "NewsAPI",
            Service::Lyrics => "Anthropic",
            Service::Song => "Suno",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Pipeline stage held by the orchestrator.
///
/// `FetchingHeadlines`, `GeneratingLyrics` and `GeneratingSong` are in-flight
/// stages; at most one of them is active per pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    FetchingHeadlines,
    HeadlinesReady,
    GeneratingLyrics,
    LyricsReady,
    GeneratingSong,
    SongReady,
    Error,
}

impl Stage {
    /// Whether a stage call is outstanding while in this stage
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            Stage::FetchingHeadlines | Stage::GeneratingLyrics | Stage::GeneratingSong
        )
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::FetchingHeadlines => "fetching_headlines",
            Stage::HeadlinesReady => "headlines_ready",
            Stage::GeneratingLyrics => "generating_lyrics",
            Stage::LyricsReady => "lyrics_ready",
            Stage::GeneratingSong => "generating_song",
            Stage::SongReady => "song_ready",
            Stage::Error => "error",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error taxonomy shared by the adapters, the orchestrator and the CLI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required credential absent
    ConfigurationMissing,
    /// Caller contract violation; no network call made
    InvalidInput,
    /// Network failure reaching an upstream
    TransportError,
    /// Upstream reached, non-success status
    UpstreamError,
    /// Upstream reached, success status, expected field absent
    MalformedResponse,
    /// Reentrancy guard
    OperationInProgress,
    /// Song stage produced neither URL nor pending marker (informational)
    PartialResponse,
    /// Anything outside the pipeline (config files, IO)
    Unknown,
}

/// Output of `headsong doctor`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorOutput {
    /// Schema version for this doctor format
    pub schema_version: String,
    /// RFC3339 UTC timestamp when the doctor output was emitted
    pub emitted_at: DateTime<Utc>,
    /// Overall health status (true if no check failed)
    pub ok: bool,
    /// Health checks performed (sorted by name before emission)
    pub checks: Vec<DoctorCheck>,
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorCheck {
    pub name: String,
    pub status: CheckStatus,
    pub details: String,
}

/// Status of a health check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_stages() {
        let in_flight: Vec<Stage> = [
            Stage::Idle,
            Stage::FetchingHeadlines,
            Stage::HeadlinesReady,
            Stage::GeneratingLyrics,
            Stage::LyricsReady,
            Stage::GeneratingSong,
            Stage::SongReady,
            Stage::Error,
        ]
        .into_iter()
        .filter(|s| s.is_in_flight())
        .collect();

        assert_eq!(
            in_flight,
            vec![
                Stage::FetchingHeadlines,
                Stage::GeneratingLyrics,
                Stage::GeneratingSong
            ]
        );
    }

    #[test]
    fn test_stage_serialization_matches_as_str() {
        for stage in [Stage::Idle, Stage::LyricsReady, Stage::GeneratingSong] {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.as_str()));
        }
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::ConfigurationMissing).unwrap();
        assert_eq!(json, r#""configuration_missing""#);

        let json = serde_json::to_string(&ErrorKind::PartialResponse).unwrap();
        assert_eq!(json, r#""partial_response""#);
    }

    #[test]
    fn test_service_display() {
        assert_eq!(Service::News.to_string(), "NewsAPI");
        assert_eq!(Service::Lyrics.as_str(), "lyrics");
        assert_eq!(Service::ALL.len(), 3);
    }
}
