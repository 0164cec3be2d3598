//! Workflow state held by the orchestrator

use std::collections::BTreeSet;

use headsong_utils::error::{InvalidInput, PipelineError, UserFriendlyError};
use headsong_utils::types::{ErrorKind, Stage};
use serde::Serialize;
use serde_json::Value;

/// Characters of a raw payload shown in a status line
const STATUS_PAYLOAD_PREVIEW: usize = 100;

/// Durable output of the song stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SongArtifact {
    /// Playable audio URL
    Url(String),
    /// Job accepted upstream, not finished; opaque payload with a task id
    Pending(Value),
}

/// Result of a `generate_song` call that reached the audio service.
#[derive(Debug, Clone, PartialEq)]
pub enum SongOutcome {
    Ready(String),
    Pending(Value),
    /// Success status with neither URL nor task id. Informational only:
    /// no artifact is stored.
    Partial { raw: Value },
}

impl SongOutcome {
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Partial { .. } => Some(ErrorKind::PartialResponse),
            _ => None,
        }
    }
}

/// Everything the pipeline knows about the current session.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub(crate) headlines: Vec<String>,
    pub(crate) selection: BTreeSet<usize>,
    pub(crate) lyrics: Option<String>,
    pub(crate) song: Option<SongArtifact>,
    pub(crate) stage: Stage,
    /// Stage to return to when leaving `Error`
    pub(crate) resume_stage: Stage,
    pub(crate) last_error: Option<PipelineError>,
    pub(crate) partial_response: Option<Value>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            headlines: Vec::new(),
            selection: BTreeSet::new(),
            lyrics: None,
            song: None,
            stage: Stage::Idle,
            resume_stage: Stage::Idle,
            last_error: None,
            partial_response: None,
        }
    }
}

impl PipelineState {
    #[must_use]
    pub fn headlines(&self) -> &[String] {
        &self.headlines
    }

    #[must_use]
    pub fn selection(&self) -> &BTreeSet<usize> {
        &self.selection
    }

    #[must_use]
    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    #[must_use]
    pub fn song(&self) -> Option<&SongArtifact> {
        self.song.as_ref()
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&PipelineError> {
        self.last_error.as_ref()
    }

    /// Stage the pipeline settles on: the pre-failure stage while in `Error`.
    #[must_use]
    pub fn settled_stage(&self) -> Stage {
        if self.stage == Stage::Error {
            self.resume_stage
        } else {
            self.stage
        }
    }

    pub(crate) fn toggle(&mut self, index: usize) -> Result<bool, InvalidInput> {
        if index >= self.headlines.len() {
            return Err(InvalidInput::InvalidIndex {
                index,
                len: self.headlines.len(),
            });
        }
        if self.selection.remove(&index) {
            Ok(false)
        } else {
            self.selection.insert(index);
            Ok(true)
        }
    }

    /// Selected headlines in index order
    pub(crate) fn selected_headlines(&self) -> Vec<&str> {
        self.selection
            .iter()
            .filter_map(|&i| self.headlines.get(i).map(String::as_str))
            .collect()
    }

    #[must_use]
    pub fn status_line(&self) -> String {
        match self.stage {
            Stage::Idle => "Ready to fetch headlines".to_string(),
            Stage::FetchingHeadlines => "Fetching latest headlines...".to_string(),
            Stage::HeadlinesReady if self.headlines.is_empty() => "No headlines found".to_string(),
            Stage::HeadlinesReady => format!("Downloaded {} headlines", self.headlines.len()),
            Stage::GeneratingLyrics => "Generating lyrics from selected headlines...".to_string(),
            Stage::LyricsReady => match &self.partial_response {
                Some(raw) => format!(
                    "Song service response not recognized. Response: {}",
                    preview(raw)
                ),
                None => "Lyrics generated successfully".to_string(),
            },
            Stage::GeneratingSong => "Sending lyrics to the song service...".to_string(),
            Stage::SongReady => match &self.song {
                Some(SongArtifact::Pending(payload)) => format!(
                    "Song generation in progress. Response: {}",
                    preview(payload)
                ),
                _ => "Song generated successfully!".to_string(),
            },
            Stage::Error => match &self.last_error {
                Some(err) => format!("Error: {}", err.user_message()),
                None => "Error".to_string(),
            },
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        PipelineSnapshot {
            stage: self.stage,
            settled_stage: self.settled_stage(),
            headlines: self
                .headlines
                .iter()
                .enumerate()
                .map(|(index, title)| HeadlineView {
                    index,
                    title: title.clone(),
                    selected: self.selection.contains(&index),
                })
                .collect(),
            selection: self.selection.iter().copied().collect(),
            lyrics: self.lyrics.clone(),
            song: self.song.clone(),
            partial_response: self.partial_response.clone(),
            last_error: self.last_error.as_ref().map(|e| ErrorView {
                kind: e.kind(),
                message: e.user_message(),
            }),
            status: self.status_line(),
        }
    }
}

fn preview(payload: &Value) -> String {
    payload
        .to_string()
        .chars()
        .take(STATUS_PAYLOAD_PREVIEW)
        .collect()
}

/// Read-only view of the pipeline for display and `--json` output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSnapshot {
    pub stage: Stage,
    pub settled_stage: Stage,
    pub headlines: Vec<HeadlineView>,
    pub selection: Vec<usize>,
    pub lyrics: Option<String>,
    pub song: Option<SongArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_response: Option<Value>,
    pub last_error: Option<ErrorView>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlineView {
    pub index: usize,
    pub title: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
}
