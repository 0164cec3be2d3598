//! Configuration for headsong
//!
//! Precedence: CLI flags > `.headsong/config.toml` > built-in defaults.
//! Credentials are resolved once, when the `Config` is built, and handed to
//! the adapters as typed [`Credential`] values.

mod config;

pub use config::{
    ApiKey, CliArgs, Config, ConfigBuilder, Credential, HttpConfig, LyricsConfig, NewsConfig,
    SongConfig, CONFIG_DIR_NAME, CONFIG_FILE_NAME, HOME_ENV_VAR,
};
