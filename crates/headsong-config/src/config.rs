use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use headsong_utils::error::ConfigError;
use headsong_utils::types::Service;

mod builder;

pub use builder::ConfigBuilder;

/// Directory searched for upward from the working directory
pub const CONFIG_DIR_NAME: &str = ".headsong";
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Overrides the directory config discovery starts from
pub const HOME_ENV_VAR: &str = "HEADSONG_HOME";

pub(crate) const DEFAULT_NEWS_URL: &str = "https://newsapi.org/v2/top-headlines";
pub(crate) const DEFAULT_LYRICS_URL: &str = "https://api.anthropic.com/v1/messages";
pub(crate) const DEFAULT_SONG_URL: &str = "https://api.sunoapi.org/api/v1/generate";

pub(crate) const DEFAULT_NEWS_KEY_ENV: &str = "NEWS_API_KEY";
pub(crate) const DEFAULT_LYRICS_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub(crate) const DEFAULT_SONG_KEY_ENV: &str = "SUNO_API_KEY";

pub(crate) const DEFAULT_REGION: &str = "us";
pub(crate) const DEFAULT_MAX_HEADLINES: u32 = 10;
/// NewsAPI rejects larger page sizes
pub(crate) const MAX_HEADLINES_LIMIT: u32 = 100;
pub(crate) const DEFAULT_LYRICS_MODEL: &str = "claude-sonnet-4-20250514";
pub(crate) const DEFAULT_LYRICS_MAX_TOKENS: u32 = 1024;
pub(crate) const DEFAULT_SONG_TITLE: &str = "Matrix Music Generation";
pub(crate) const DEFAULT_SONG_TAGS: &str = "pop, electronic";
pub(crate) const DEFAULT_SONG_MODEL: &str = "V3_5";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// An API key read from the environment.
///
/// `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw key, for request headers only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

/// Credential for one service, resolved once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Present { env_var: String, key: ApiKey },
    Missing { env_var: String },
}

impl Credential {
    /// Resolve a credential through `lookup`. Blank values count as missing.
    pub fn resolve(env_var: &str, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        match lookup(env_var) {
            Some(value) if !value.trim().is_empty() => Credential::Present {
                env_var: env_var.to_string(),
                key: ApiKey::new(value.trim()),
            },
            _ => Credential::Missing {
                env_var: env_var.to_string(),
            },
        }
    }

    #[must_use]
    pub fn env_var(&self) -> &str {
        match self {
            Credential::Present { env_var, .. } | Credential::Missing { env_var } => env_var,
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<&ApiKey> {
        match self {
            Credential::Present { key, .. } => Some(key),
            Credential::Missing { .. } => None,
        }
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Credential::Present { .. })
    }
}

/// Headline provider settings
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub credential: Credential,
    pub base_url: String,
    /// Country code passed as `country`
    pub region: String,
    /// Upper bound on headlines per fetch, passed as `pageSize`
    pub max_headlines: u32,
}

/// Text generator settings
#[derive(Debug, Clone)]
pub struct LyricsConfig {
    pub credential: Credential,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Audio generator settings. `make_instrumental` is always false.
#[derive(Debug, Clone)]
pub struct SongConfig {
    pub credential: Credential,
    pub base_url: String,
    pub title: String,
    pub tags: String,
    pub model: String,
}

/// Transport settings shared by every adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Effective configuration.
///
/// ```toml
/// [news]
/// api_key_env = "NEWS_API_KEY"
/// region = "us"
/// max_headlines = 10
///
/// [lyrics]
/// model = "claude-sonnet-4-20250514"
/// max_tokens = 1024
///
/// [song]
/// tags = "pop, electronic"
///
/// [http]
/// timeout_secs = 120
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub news: NewsConfig,
    pub lyrics: LyricsConfig,
    pub song: SongConfig,
    pub http: HttpConfig,
    pub verbose: bool,
    /// Config file that was loaded, if any
    pub source_path: Option<PathBuf>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub region: Option<String>,
    pub max_headlines: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TomlConfig {
    pub news: Option<NewsSection>,
    pub lyrics: Option<LyricsSection>,
    pub song: Option<SongSection>,
    pub http: Option<HttpSection>,
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NewsSection {
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub region: Option<String>,
    pub max_headlines: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LyricsSection {
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SongSection {
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub title: Option<String>,
    pub tags: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults.
    ///
    /// Discovery starts at `HEADSONG_HOME` when set, otherwise at the current
    /// directory. Credentials are read from the process environment.
    pub fn discover(cli_args: &CliArgs) -> Result<Self, ConfigError> {
        let start_dir = match std::env::var_os(HOME_ENV_VAR) {
            Some(home) => PathBuf::from(home),
            None => std::env::current_dir().map_err(|e| ConfigError::DiscoveryFailed {
                reason: format!("cannot read current directory: {e}"),
            })?,
        };
        Self::discover_from(&start_dir, cli_args, &|name| std::env::var(name).ok())
    }

    /// Discover configuration starting from a specific directory, reading
    /// credentials through `env`.
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(
        start_dir: &Path,
        cli_args: &CliArgs,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let config_path = match &cli_args.config_path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigError::NotFound {
                        path: explicit.display().to_string(),
                    });
                }
                Some(explicit.clone())
            }
            None => Self::discover_config_file_from(start_dir),
        };

        let file = match &config_path {
            Some(path) => Self::load_config_file(path)?,
            None => TomlConfig::default(),
        };

        Self::from_parts(file, cli_args, config_path, env)
    }

    /// Search upward from `start_dir` for `.headsong/config.toml`.
    ///
    /// Stops at the first repository root (`.git`, `.hg`, `.svn`) or the
    /// filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current_dir = dir.parent();
        }

        None
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::DiscoveryFailed {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display())))
    }

    pub(crate) fn from_parts(
        file: TomlConfig,
        cli_args: &CliArgs,
        source_path: Option<PathBuf>,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let news = file.news.unwrap_or_default();
        let lyrics = file.lyrics.unwrap_or_default();
        let song = file.song.unwrap_or_default();
        let http = file.http.unwrap_or_default();

        let news_key_env = news.api_key_env.as_deref().unwrap_or(DEFAULT_NEWS_KEY_ENV);
        let lyrics_key_env = lyrics
            .api_key_env
            .as_deref()
            .unwrap_or(DEFAULT_LYRICS_KEY_ENV);
        let song_key_env = song.api_key_env.as_deref().unwrap_or(DEFAULT_SONG_KEY_ENV);

        let timeout_secs = cli_args
            .timeout_secs
            .or(http.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let connect_timeout_secs = http
            .connect_timeout_secs
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);

        let config = Config {
            news: NewsConfig {
                credential: Credential::resolve(news_key_env, env),
                base_url: news.base_url.unwrap_or_else(|| DEFAULT_NEWS_URL.to_string()),
                region: cli_args
                    .region
                    .clone()
                    .or(news.region)
                    .unwrap_or_else(|| DEFAULT_REGION.to_string()),
                max_headlines: cli_args
                    .max_headlines
                    .or(news.max_headlines)
                    .unwrap_or(DEFAULT_MAX_HEADLINES),
            },
            lyrics: LyricsConfig {
                credential: Credential::resolve(lyrics_key_env, env),
                base_url: lyrics
                    .base_url
                    .unwrap_or_else(|| DEFAULT_LYRICS_URL.to_string()),
                model: lyrics
                    .model
                    .unwrap_or_else(|| DEFAULT_LYRICS_MODEL.to_string()),
                max_tokens: lyrics.max_tokens.unwrap_or(DEFAULT_LYRICS_MAX_TOKENS),
            },
            song: SongConfig {
                credential: Credential::resolve(song_key_env, env),
                base_url: song.base_url.unwrap_or_else(|| DEFAULT_SONG_URL.to_string()),
                title: song.title.unwrap_or_else(|| DEFAULT_SONG_TITLE.to_string()),
                tags: song.tags.unwrap_or_else(|| DEFAULT_SONG_TAGS.to_string()),
                model: song.model.unwrap_or_else(|| DEFAULT_SONG_MODEL.to_string()),
            },
            http: HttpConfig {
                timeout: Duration::from_secs(timeout_secs),
                connect_timeout: Duration::from_secs(connect_timeout_secs),
            },
            verbose: cli_args.verbose.or(file.verbose).unwrap_or(false),
            source_path,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.news.max_headlines == 0 || self.news.max_headlines > MAX_HEADLINES_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "max_headlines".to_string(),
                value: self.news.max_headlines.to_string(),
            });
        }
        let region = &self.news.region;
        if region.len() != 2 || !region.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidValue {
                key: "region".to_string(),
                value: region.clone(),
            });
        }
        if self.lyrics.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_tokens".to_string(),
                value: "0".to_string(),
            });
        }
        if self.http.timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        if self.http.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "connect_timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Credential for one service
    #[must_use]
    pub fn credential(&self, service: Service) -> &Credential {
        match service {
            Service::News => &self.news.credential,
            Service::Lyrics => &self.lyrics.credential,
            Service::Song => &self.song.credential,
        }
    }

    #[must_use]
    pub fn base_url(&self, service: Service) -> &str {
        match service {
            Service::News => &self.news.base_url,
            Service::Lyrics => &self.lyrics.base_url,
            Service::Song => &self.song.base_url,
        }
    }
}
