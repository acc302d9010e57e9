use crate::credentials::DEFAULT_TOKEN_ENV;
use crate::github::DEFAULT_API_URL;
use crate::logging::{self, Profile};
use crate::publish::DEFAULT_COMMIT_MESSAGE;
use crate::render::DEFAULT_OUTPUT_FILE;
use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::snapshot::DEFAULT_SNAPSHOT_FILE;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "starboard")]
#[command(
    about = "Track public repository stats and render a status page with day-over-day deltas"
)]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(
        long,
        help = "Path to the snapshot file",
        default_value = DEFAULT_SNAPSHOT_FILE,
        global = true
    )]
    pub snapshot: PathBuf,

    #[arg(long, short, help = "Enable debug logging", global = true)]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON", global = true)]
    pub log_json: bool,
}

#[derive(Args, Clone)]
pub struct UpdateArgs {
    #[arg(long, env = "STARBOARD_OWNER", help = "Owner login (defaults to the token's user)")]
    pub owner: Option<String>,

    #[arg(
        long,
        default_value = DEFAULT_TOKEN_ENV,
        help = "Environment variable holding the API token"
    )]
    pub token_env: String,

    #[arg(long, env = "STARBOARD_TOKEN_FILE", help = "Token file used when the variable is unset")]
    pub token_file: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_API_URL, help = "API base URL")]
    pub api_url: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE, help = "Where to write the HTML page")]
    pub output: PathBuf,

    #[arg(long, help = "Link shown next to the update date")]
    pub source_url: Option<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        help = "Attempts per repository before it is dropped"
    )]
    pub max_attempts: u32,

    #[arg(
        long,
        default_value = "2s",
        value_parser = humantime::parse_duration,
        help = "Pause after a failed attempt (e.g. 2s, 500ms)"
    )]
    pub retry_delay: Duration,

    #[arg(long, help = "Commit and push the work tree after rendering")]
    pub publish: bool,

    #[arg(
        long,
        default_value = DEFAULT_COMMIT_MESSAGE,
        help = "Commit message used with --publish"
    )]
    pub commit_message: String,

    #[arg(long, help = "Hide the progress bar")]
    pub no_progress: bool,
}

impl UpdateArgs {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch current stats, save the snapshot, and render the page
    Update(UpdateArgs),
    /// Print the stored snapshot
    Show {
        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
    /// Re-render the page from the stored snapshot without network access
    Render {
        #[arg(long, help = "Owner login shown on the page")]
        owner: String,

        #[arg(long, default_value = DEFAULT_OUTPUT_FILE, help = "Where to write the HTML page")]
        output: PathBuf,

        #[arg(long, help = "Link shown next to the update date")]
        source_url: Option<String>,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        let profile = if self.common.log_json { Profile::Json } else { Profile::Text };
        logging::init(profile, self.common.verbose);

        match self.command {
            Commands::Update(args) => crate::update::exec(self.common, args),
            Commands::Show { json, ndjson } => crate::show::exec(self.common, json, ndjson),
            Commands::Render { owner, output, source_url } => {
                crate::render::exec(self.common, owner, output, source_url)
            }
        }
    }
}
