//! NewsAPI top-headlines backend

use async_trait::async_trait;
use headsong_config::{Config, Credential};
use headsong_utils::error::AdapterError;
use headsong_utils::types::Service;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::http_client::{HttpClient, parse_json, require_key};
use crate::types::{HeadlineProvider, HeadlineRequest};

const SERVICE: Service = Service::News;

/// Adapter for `GET /v2/top-headlines`.
///
/// The key travels in the `X-Api-Key` header so it never shows up in a URL
/// that might be logged.
#[derive(Debug, Clone)]
pub struct NewsApiBackend {
    client: HttpClient,
    base_url: String,
    credential: Credential,
}

impl NewsApiBackend {
    pub fn new(client: HttpClient, base_url: impl Into<String>, credential: Credential) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credential,
        }
    }

    pub fn new_from_config(client: HttpClient, config: &Config) -> Self {
        Self::new(
            client,
            config.news.base_url.clone(),
            config.news.credential.clone(),
        )
    }

    fn request_url(&self, request: &HeadlineRequest) -> Result<Url, AdapterError> {
        let page_size = request.max_count.to_string();
        Url::parse_with_params(
            &self.base_url,
            [
                ("country", request.region.as_str()),
                ("pageSize", page_size.as_str()),
            ],
        )
        .map_err(|e| AdapterError::Transport {
            service: SERVICE,
            message: format!("invalid endpoint URL '{}': {e}", self.base_url),
        })
    }
}

#[async_trait]
impl HeadlineProvider for NewsApiBackend {
    async fn fetch_headlines(&self, request: HeadlineRequest) -> Result<Vec<String>, AdapterError> {
        let key = require_key(SERVICE, &self.credential)?;
        let url = self.request_url(&request)?;
        let url_text = url.to_string();

        let http_request = self
            .client
            .get(url)
            .header("X-Api-Key", key.expose())
            .header("accept", "application/json");

        let body = self
            .client
            .send(SERVICE, "GET", &url_text, http_request)
            .await?;
        let response: TopHeadlinesResponse = parse_json(SERVICE, &body)?;

        debug!(
            service = SERVICE.as_str(),
            total_results = ?response.total_results,
            returned = response.articles.len(),
            "Parsed headline response"
        );

        Ok(extract_titles(response, request.max_count))
    }
}

/// Keep titled articles in upstream order, capped at `max_count`.
fn extract_titles(response: TopHeadlinesResponse, max_count: u32) -> Vec<String> {
    response
        .articles
        .into_iter()
        .filter_map(|article| article.title)
        .take(max_count as usize)
        .collect()
}

#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    articles: Vec<Article>,
    #[serde(rename = "totalResults")]
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}
