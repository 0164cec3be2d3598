//! Upstream service adapters for headsong
//!
//! Three narrow adapters sit behind async traits so the pipeline never
//! touches HTTP directly:
//!
//! - [`HeadlineProvider`] fetches top headlines (NewsAPI)
//! - [`TextGenerator`] turns a prompt into text (Anthropic Messages API)
//! - [`AudioGenerator`] submits lyrics for song generation (SunoAPI)
//!
//! Every adapter checks its credential before building a request, so a
//! missing key fails with [`AdapterError::ConfigurationMissing`] without any
//! network traffic.

mod http_client;
mod lyrics_backend;
mod news_backend;
mod song_backend;
#[cfg(test)]
mod test_support;
mod types;

use std::sync::Arc;

use headsong_config::Config;
use headsong_utils::error::ConfigError;

pub use headsong_utils::error::AdapterError;
pub use http_client::HttpClient;
pub use lyrics_backend::AnthropicLyricsBackend;
pub use news_backend::NewsApiBackend;
pub use song_backend::{SunoBackend, classify_song_response};
pub use types::{
    AudioGenerator, AudioRequest, AudioResponse, HeadlineProvider, HeadlineRequest, TextGenerator,
    TextRequest,
};

/// The three production adapters, sharing one HTTP client.
#[derive(Clone)]
pub struct Adapters {
    pub headlines: Arc<dyn HeadlineProvider>,
    pub lyrics: Arc<dyn TextGenerator>,
    pub song: Arc<dyn AudioGenerator>,
}

impl std::fmt::Debug for Adapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapters").finish_non_exhaustive()
    }
}

impl Adapters {
    /// Build all adapters from configuration.
    ///
    /// Missing credentials are not an error here; they surface per call.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let client = HttpClient::new(&config.http)?;
        Ok(Self {
            headlines: Arc::new(NewsApiBackend::new_from_config(client.clone(), config)),
            lyrics: Arc::new(AnthropicLyricsBackend::new_from_config(
                client.clone(),
                config,
            )),
            song: Arc::new(SunoBackend::new_from_config(client, config)),
        })
    }
}
