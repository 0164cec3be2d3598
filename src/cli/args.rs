//! CLI argument definitions and parsing structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// headsong - turn live news headlines into lyrics and a song
#[derive(Parser, Debug)]
#[command(name = "headsong")]
#[command(about = "Turn live news headlines into generated lyrics and a song")]
#[command(long_about = r#"
headsong fetches top headlines, writes song lyrics inspired by the ones you
select, and submits those lyrics for song generation.

EXAMPLES:
  # List current headlines with their indices
  headsong headlines --region gb --max 5

  # Generate lyrics from headlines 0 and 2
  headsong lyrics --select 0,2

  # Run the whole pipeline and print the song URL (or the pending job)
  headsong run --select 0,2 --json

  # Check credentials, then make one live request per safe service
  headsong doctor --probe

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD (or HEADSONG_HOME)
  for .headsong/config.toml. Use --config to specify an explicit path.

CREDENTIALS:
  NEWS_API_KEY, ANTHROPIC_API_KEY and SUNO_API_KEY by default; each service
  section of the config file can name a different variable via api_key_env.
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Request timeout in seconds for every upstream call (default: 120)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Headline source options shared by the pipeline commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsArgs {
    /// Two-letter country code for top headlines (default: us)
    #[arg(long)]
    pub region: Option<String>,

    /// Maximum number of headlines to fetch, 1 to 100 (default: 10)
    #[arg(long = "max")]
    pub max: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch and list current headlines
    Headlines {
        #[command(flatten)]
        news: NewsArgs,

        /// Output the pipeline snapshot as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch headlines, select some, and generate lyrics
    ///
    /// EXAMPLES:
    ///   headsong lyrics --select 0,2
    ///   headsong lyrics --select 1 --region gb --json
    Lyrics {
        #[command(flatten)]
        news: NewsArgs,

        /// Comma-separated headline indices to build the lyrics from
        #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
        select: Vec<usize>,

        /// Output the pipeline snapshot as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the whole pipeline: headlines, lyrics, song
    ///
    /// Prints the song URL when ready, the job payload when generation is
    /// still in progress, or the raw response when it is not recognized.
    Run {
        #[command(flatten)]
        news: NewsArgs,

        /// Comma-separated headline indices to build the lyrics from
        #[arg(long, value_delimiter = ',', required = true, num_args = 1..)]
        select: Vec<usize>,

        /// Output the pipeline snapshot as canonical JSON
        #[arg(long)]
        json: bool,
    },

    /// Check credentials and connectivity
    ///
    /// The song service is never probed: any request starts a billable job.
    Doctor {
        /// Make one minimal live request to the news and lyrics services
        #[arg(long)]
        probe: bool,

        /// Output as canonical JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Headline options for commands that fetch headlines
    #[must_use]
    pub fn news_args(&self) -> Option<&NewsArgs> {
        match self {
            Self::Headlines { news, .. } | Self::Lyrics { news, .. } | Self::Run { news, .. } => {
                Some(news)
            }
            Self::Doctor { .. } => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Headlines { .. } => "headlines",
            Self::Lyrics { .. } => "lyrics",
            Self::Run { .. } => "run",
            Self::Doctor { .. } => "doctor",
        }
    }
}

/// Build the CLI command structure without parsing arguments
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
