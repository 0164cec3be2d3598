//! Adapter traits and their request/response types

use async_trait::async_trait;
use headsong_utils::error::AdapterError;
use serde_json::Value;

/// Parameters for a headline fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineRequest {
    /// Upper bound on the number of headlines returned
    pub max_count: u32,
    /// Two-letter country code
    pub region: String,
}

/// Parameters for a text generation call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub prompt: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioRequest {
    pub lyrics: String,
}

/// What the audio service answered on a successful status.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioResponse {
    /// A playable URL came back immediately
    Ready { url: String },
    /// The job was accepted asynchronously; payload carries the task id
    Pending { payload: Value },
    /// Success status, but neither a URL nor a task id could be found
    Unrecognized { payload: Value },
}

/// Source of top news headlines.
#[async_trait]
pub trait HeadlineProvider: Send + Sync {
    /// Fetch up to `request.max_count` headline titles, in upstream order.
    async fn fetch_headlines(&self, request: HeadlineRequest) -> Result<Vec<String>, AdapterError>;
}

/// Text generation from a single user prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, request: TextRequest) -> Result<String, AdapterError>;
}

/// Song generation from lyrics.
#[async_trait]
pub trait AudioGenerator: Send + Sync {
    async fn generate_audio(&self, request: AudioRequest) -> Result<AudioResponse, AdapterError>;
}
