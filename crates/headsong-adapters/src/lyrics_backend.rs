//! Anthropic Messages API backend used for lyric generation

use async_trait::async_trait;
use headsong_config::{Config, Credential};
use headsong_utils::error::AdapterError;
use headsong_utils::types::Service;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http_client::{HttpClient, parse_json, require_key};
use crate::types::{TextGenerator, TextRequest};

const SERVICE: Service = Service::Lyrics;

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicLyricsBackend {
    client: HttpClient,
    base_url: String,
    credential: Credential,
    model: String,
}

impl AnthropicLyricsBackend {
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        credential: Credential,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credential,
            model: model.into(),
        }
    }

    pub fn new_from_config(client: HttpClient, config: &Config) -> Self {
        Self::new(
            client,
            config.lyrics.base_url.clone(),
            config.lyrics.credential.clone(),
            config.lyrics.model.clone(),
        )
    }

    fn request_body(&self, request: TextRequest) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            max_tokens: request.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: request.prompt,
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicLyricsBackend {
    async fn generate_text(&self, request: TextRequest) -> Result<String, AdapterError> {
        let key = require_key(SERVICE, &self.credential)?;
        let body = self.request_body(request);

        debug!(
            service = SERVICE.as_str(),
            model = %body.model,
            max_tokens = body.max_tokens,
            "Requesting lyrics"
        );

        let http_request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let raw = self
            .client
            .send(SERVICE, "POST", &self.base_url, http_request)
            .await?;
        let response: MessagesResponse = parse_json(SERVICE, &raw)?;

        if let Some(usage) = &response.usage {
            debug!(
                service = SERVICE.as_str(),
                tokens_input = ?usage.input_tokens,
                tokens_output = ?usage.output_tokens,
                "Lyrics generation completed"
            );
        }

        first_text(response)
    }
}

/// Text of the first content block.
fn first_text(response: MessagesResponse) -> Result<String, AdapterError> {
    let first = response
        .content
        .into_iter()
        .next()
        .ok_or_else(|| AdapterError::MalformedResponse {
            service: SERVICE,
            detail: "response contained no content blocks".to_string(),
        })?;

    first.text.ok_or_else(|| AdapterError::MalformedResponse {
        service: SERVICE,
        detail: "first content block has no text".to_string(),
    })
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

/// Token counts are only logged, so either may be absent.
#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
}
