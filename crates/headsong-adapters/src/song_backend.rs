//! SunoAPI song generation backend
//!
//! The service answers in one of two shapes: a playable URL right away, or
//! an accepted task id to poll later. Anything else on a success status is
//! reported as unrecognized with the payload kept for diagnosis.

use async_trait::async_trait;
use headsong_config::{Config, Credential};
use headsong_utils::error::AdapterError;
use headsong_utils::types::Service;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::http_client::{HttpClient, parse_json, require_key};
use crate::types::{AudioGenerator, AudioRequest, AudioResponse};

const SERVICE: Service = Service::Song;

#[derive(Debug, Clone)]
pub struct SunoBackend {
    client: HttpClient,
    base_url: String,
    credential: Credential,
    title: String,
    tags: String,
    model: String,
}

impl SunoBackend {
    pub fn new_from_config(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.song.base_url.clone(),
            credential: config.song.credential.clone(),
            title: config.song.title.clone(),
            tags: config.song.tags.clone(),
            model: config.song.model.clone(),
        }
    }

    fn request_body(&self, request: AudioRequest) -> GenerateRequest<'_> {
        GenerateRequest {
            custom_mode: true,
            prompt: request.lyrics,
            title: &self.title,
            tags: &self.tags,
            make_instrumental: false,
            model: &self.model,
        }
    }
}

#[async_trait]
impl AudioGenerator for SunoBackend {
    async fn generate_audio(&self, request: AudioRequest) -> Result<AudioResponse, AdapterError> {
        let key = require_key(SERVICE, &self.credential)?;
        let body = self.request_body(request);

        let http_request = self
            .client
            .post(&self.base_url)
            .bearer_auth(key.expose())
            .header("content-type", "application/json")
            .json(&body);

        let raw = self
            .client
            .send(SERVICE, "POST", &self.base_url, http_request)
            .await?;
        let payload: Value = parse_json(SERVICE, &raw)?;
        let response = classify_song_response(payload);

        debug!(
            service = SERVICE.as_str(),
            outcome = match &response {
                AudioResponse::Ready { .. } => "ready",
                AudioResponse::Pending { .. } => "pending",
                AudioResponse::Unrecognized { .. } => "unrecognized",
            },
            "Classified song response"
        );

        Ok(response)
    }
}

/// Classify a success payload.
///
/// A top-level `audio_url` or `url` string means the song is ready
/// (`audio_url` wins when both are present). Otherwise a task id under
/// `data.taskId` or top-level `taskId` means the job is pending.
#[must_use]
pub fn classify_song_response(payload: Value) -> AudioResponse {
    let url = ["audio_url", "url"]
        .iter()
        .find_map(|field| non_empty_str(payload.get(field)));
    if let Some(url) = url {
        return AudioResponse::Ready {
            url: url.to_string(),
        };
    }

    let task_id = payload
        .get("data")
        .and_then(|data| data.get("taskId"))
        .or_else(|| payload.get("taskId"));
    if task_id.is_some_and(|id| !id.is_null()) {
        return AudioResponse::Pending { payload };
    }

    AudioResponse::Unrecognized { payload }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    custom_mode: bool,
    prompt: String,
    title: &'a str,
    tags: &'a str,
    make_instrumental: bool,
    model: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use headsong_config::{ApiKey, HttpConfig};
    use serde_json::json;

    fn backend(credential: Credential) -> SunoBackend {
        let config = Config::builder()
            .credential(Service::Song, credential)
            .base_url(Service::Song, "http://127.0.0.1:1/api/v1/generate")
            .build()
            .unwrap();
        SunoBackend::new_from_config(HttpClient::new(&HttpConfig::default()).unwrap(), &config)
    }

    #[test]
    fn test_request_body_shape() {
        let backend = backend(Credential::Present {
            env_var: "SUNO_API_KEY".to_string(),
            key: ApiKey::new("k"),
        });
        let body = backend.request_body(AudioRequest {
            lyrics: "la la la".to_string(),
        });

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "custom_mode": true,
                "prompt": "la la la",
                "title": "Matrix Music Generation",
                "tags": "pop, electronic",
                "make_instrumental": false,
                "model": "V3_5"
            })
        );
    }

    #[test]
    fn test_audio_url_is_ready() {
        let response = classify_song_response(json!({"audio_url": "https://cdn/x.mp3"}));
        assert_eq!(
            response,
            AudioResponse::Ready {
                url: "https://cdn/x.mp3".to_string()
            }
        );
    }

    #[test]
    fn test_audio_url_wins_over_url() {
        let response =
            classify_song_response(json!({"url": "https://cdn/b.mp3", "audio_url": "https://cdn/a.mp3"}));
        assert_eq!(
            response,
            AudioResponse::Ready {
                url: "https://cdn/a.mp3".to_string()
            }
        );
    }

    #[test]
    fn test_url_alone_is_ready() {
        let response = classify_song_response(json!({"url": "https://cdn/b.mp3"}));
        assert!(matches!(response, AudioResponse::Ready { url } if url == "https://cdn/b.mp3"));
    }

    #[test]
    fn test_nested_task_id_is_pending() {
        let payload = json!({"code": 200, "msg": "success", "data": {"taskId": "abc"}});
        assert_eq!(
            classify_song_response(payload.clone()),
            AudioResponse::Pending { payload }
        );
    }

    #[test]
    fn test_top_level_task_id_is_pending() {
        let payload = json!({"taskId": "abc"});
        assert!(matches!(
            classify_song_response(payload),
            AudioResponse::Pending { .. }
        ));
    }

    #[test]
    fn test_unknown_shape_is_unrecognized() {
        let payload = json!({"status": "processing", "id": "123"});
        assert_eq!(
            classify_song_response(payload.clone()),
            AudioResponse::Unrecognized { payload }
        );
    }

    #[test]
    fn test_non_json_success_body_is_malformed() {
        let err = parse_json::<Value>(SERVICE, "not json").unwrap_err();
        assert!(matches!(
            err,
            AdapterError::MalformedResponse {
                service: Service::Song,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_network() {
        let backend = backend(Credential::Missing {
            env_var: "SUNO_API_KEY".to_string(),
        });
        let err = backend
            .generate_audio(AudioRequest {
                lyrics: "x".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AdapterError::ConfigurationMissing {
                service: Service::Song,
                env_var: "SUNO_API_KEY".to_string(),
            }
        );
    }
}
