//! headsong - turn live news headlines into lyrics and a song
//!
//! The pipeline chains three services: NewsAPI for headlines, the Anthropic
//! Messages API for lyrics, and SunoAPI for song generation. Each stage is a
//! single request with explicit preconditions; failures keep every artifact
//! already produced.
//!
//! headsong can be used in two ways:
//! - **CLI**: `headsong headlines`, `headsong lyrics --select 0,2`,
//!   `headsong run --select 0,2`, `headsong doctor`
//! - **Library**: build an [`Orchestrator`] from a [`Config`] (or from your own
//!   adapter implementations) and drive the stages yourself
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use headsong::{CliArgs, Config, Orchestrator, SongOutcome};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::discover(&CliArgs::default())?;
//! let pipeline = Orchestrator::from_config(&config)?;
//!
//! pipeline.fetch_headlines().await?;
//! pipeline.toggle_selection(0)?;
//! pipeline.generate_lyrics().await?;
//! match pipeline.generate_song().await? {
//!     SongOutcome::Ready(url) => println!("{url}"),
//!     SongOutcome::Pending(payload) => println!("queued: {payload}"),
//!     SongOutcome::Partial { raw } => println!("unrecognized: {raw}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # JSON Contracts
//!
//! `--json` output (pipeline snapshots and doctor reports) is emitted in JCS
//! (RFC 8785) canonical form via [`emit_jcs`].

// ============================================================================
// Public API
// ============================================================================

/// Stateful pipeline core and its read-only views.
pub use headsong_engine::{
    ErrorView, HeadlineView, Orchestrator, PipelineSettings, PipelineSnapshot, PipelineState,
    SongArtifact, SongOutcome, build_lyrics_prompt,
};

/// Adapter seams. Implement these to run the pipeline against other services.
pub use headsong_adapters::{
    Adapters, AudioGenerator, AudioRequest, AudioResponse, HeadlineProvider, HeadlineRequest,
    TextGenerator, TextRequest,
};

/// Configuration with discovery and precedence: CLI > config file > defaults.
pub use headsong_config::{CliArgs, Config, ConfigBuilder, Credential};

/// Library-level error type.
///
/// Library code returns `HeadsongError` and never calls `std::process::exit()`.
pub use headsong_utils::error::{
    AdapterError, ErrorCategory, HeadsongError, InvalidInput, PipelineError, UserFriendlyError,
};

/// Exit codes matching the documented exit code table.
pub use headsong_utils::exit_codes::ExitCode;

pub use headsong_utils::types::{ErrorKind, Service, Stage};

/// JCS (RFC 8785) canonical JSON emission.
pub use headsong_utils::canonicalization::emit_jcs;

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use headsong_doctor as doctor;
#[doc(hidden)]
pub use headsong_utils::{logging, redaction};

// CLI module, exported for white-box testing of flag parsing
#[doc(hidden)]
pub mod cli;
