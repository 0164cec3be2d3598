use std::time::Duration;

use headsong_utils::error::ConfigError;
use headsong_utils::types::Service;

use super::{
    ApiKey, Config, Credential, HttpConfig, LyricsConfig, NewsConfig, SongConfig,
    DEFAULT_LYRICS_KEY_ENV, DEFAULT_LYRICS_MAX_TOKENS, DEFAULT_LYRICS_MODEL, DEFAULT_LYRICS_URL,
    DEFAULT_MAX_HEADLINES, DEFAULT_NEWS_KEY_ENV, DEFAULT_NEWS_URL, DEFAULT_REGION,
    DEFAULT_SONG_KEY_ENV, DEFAULT_SONG_MODEL, DEFAULT_SONG_TAGS, DEFAULT_SONG_TITLE,
    DEFAULT_SONG_URL,
};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// The builder never reads the environment or the filesystem: every
    /// credential starts as `Missing` until set explicitly.
    ///
    /// # Example
    ///
    /// ```rust
    /// use headsong_config::Config;
    /// use headsong_utils::types::Service;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .api_key(Service::News, "news-key")
    ///     .region("gb")
    ///     .max_headlines(5)
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .expect("valid config");
    ///
    /// assert!(config.news.credential.is_present());
    /// assert!(!config.lyrics.credential.is_present());
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration of headsong.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    news: NewsConfig,
    lyrics: LyricsConfig,
    song: SongConfig,
    http: HttpConfig,
    verbose: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            news: NewsConfig {
                credential: Credential::Missing {
                    env_var: DEFAULT_NEWS_KEY_ENV.to_string(),
                },
                base_url: DEFAULT_NEWS_URL.to_string(),
                region: DEFAULT_REGION.to_string(),
                max_headlines: DEFAULT_MAX_HEADLINES,
            },
            lyrics: LyricsConfig {
                credential: Credential::Missing {
                    env_var: DEFAULT_LYRICS_KEY_ENV.to_string(),
                },
                base_url: DEFAULT_LYRICS_URL.to_string(),
                model: DEFAULT_LYRICS_MODEL.to_string(),
                max_tokens: DEFAULT_LYRICS_MAX_TOKENS,
            },
            song: SongConfig {
                credential: Credential::Missing {
                    env_var: DEFAULT_SONG_KEY_ENV.to_string(),
                },
                base_url: DEFAULT_SONG_URL.to_string(),
                title: DEFAULT_SONG_TITLE.to_string(),
                tags: DEFAULT_SONG_TAGS.to_string(),
                model: DEFAULT_SONG_MODEL.to_string(),
            },
            http: HttpConfig::default(),
            verbose: false,
        }
    }

    fn credential_mut(&mut self, service: Service) -> &mut Credential {
        match service {
            Service::News => &mut self.news.credential,
            Service::Lyrics => &mut self.lyrics.credential,
            Service::Song => &mut self.song.credential,
        }
    }

    /// Mark a service's credential as present
    #[must_use]
    pub fn api_key(mut self, service: Service, key: impl Into<String>) -> Self {
        let slot = self.credential_mut(service);
        let env_var = slot.env_var().to_string();
        *slot = Credential::Present {
            env_var,
            key: ApiKey::new(key),
        };
        self
    }

    /// Replace a service's credential outright
    #[must_use]
    pub fn credential(mut self, service: Service, credential: Credential) -> Self {
        *self.credential_mut(service) = credential;
        self
    }

    /// Point a service at another endpoint (tests, proxies)
    #[must_use]
    pub fn base_url(mut self, service: Service, url: impl Into<String>) -> Self {
        let url = url.into();
        match service {
            Service::News => self.news.base_url = url,
            Service::Lyrics => self.lyrics.base_url = url,
            Service::Song => self.song.base_url = url,
        }
        self
    }

    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.news.region = region.into();
        self
    }

    #[must_use]
    pub fn max_headlines(mut self, max: u32) -> Self {
        self.news.max_headlines = max;
        self
    }

    #[must_use]
    pub fn lyrics_model(mut self, model: impl Into<String>) -> Self {
        self.lyrics.model = model.into();
        self
    }

    #[must_use]
    pub fn lyrics_max_tokens(mut self, max_tokens: u32) -> Self {
        self.lyrics.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn song_tags(mut self, tags: impl Into<String>) -> Self {
        self.song.tags = tags.into();
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config, ConfigError> {
        let config = Config {
            news: self.news,
            lyrics: self.lyrics,
            song: self.song,
            http: self.http,
            verbose: self.verbose,
            source_path: None,
        };
        config.validate()?;
        Ok(config)
    }
}
