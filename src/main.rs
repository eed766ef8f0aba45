//! mirror: keep local copies of every branch of every repository of a
//! GitHub owner or Bitbucket Server project.

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use goobits_mirror::commands::{self, OutputFormat};
use goobits_mirror::core::config::TOKEN_ENV_VAR;
use goobits_mirror::core::{MirrorConfig, MirrorOptions};
use goobits_mirror::utils::{install_ctrl_c_handler, ShutdownSignal};

#[derive(Debug, Parser)]
#[command(name = "mirror", version, about = "Mirror every branch of every repository to local disk")]
struct Cli {
    /// clone-and-sync-all (clone), sync-existing (pull), enumerate-only (list) or analyze-all (analyze)
    #[arg(short, long)]
    action: Option<String>,

    /// API token; falls back to MIRROR_TOKEN
    #[arg(long, env = TOKEN_ENV_VAR, hide_env_values = true)]
    token: Option<String>,

    /// GitHub user or organization
    #[arg(long, visible_alias = "owner")]
    username: Option<String>,

    /// Destination root for working copies
    #[arg(long)]
    dest: Option<PathBuf>,

    /// github or stash
    #[arg(long)]
    platform: Option<String>,

    /// Bitbucket Server base URL, or a GitHub Enterprise API URL
    #[arg(long, visible_alias = "stash-url")]
    server_url: Option<String>,

    /// Only this project (Stash) or owner (GitHub)
    #[arg(long)]
    project: Option<String>,

    /// Case-insensitive repository name filter
    #[arg(long)]
    filter: Option<String>,

    /// Skip repositories synced within this many minutes; analyze-all only
    /// inspects copies with git activity within this many minutes
    #[arg(long, value_name = "MINUTES")]
    older_than: Option<u64>,

    /// Number of repositories synced concurrently (default 5)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Sync one repository at a time
    #[arg(long, conflicts_with = "jobs")]
    sequential: bool,

    /// Spacing between API calls for services without a quota API
    #[arg(long, value_name = "SECS")]
    rate_limit_window: Option<u64>,

    /// Per git command timeout
    #[arg(long, value_name = "SECS")]
    command_timeout: Option<u64>,

    /// Output format for enumerate-only and analyze-all
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// error, warn, info, debug or trace (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Debug logging, no progress bar
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> MirrorOptions {
        MirrorOptions {
            action: self.action,
            token: self.token,
            owner: self.username,
            destination: self.dest,
            platform: self.platform,
            server_url: self.server_url,
            project: self.project,
            filter: self.filter,
            older_than: self.older_than,
            jobs: self.jobs,
            sequential: self.sequential,
            rate_limit_window_secs: self.rate_limit_window,
            command_timeout_secs: self.command_timeout,
            format: self.format,
        }
    }
}

fn init_tracing(log_level: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { log_level };
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(format!("goobits_mirror={default_level},mirror={default_level}")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.verbose);

    let show_progress = !cli.verbose && std::io::stderr().is_terminal();
    let config = MirrorConfig::from_options(cli.into_options())?;

    // Set up graceful shutdown handler (Ctrl+C)
    let shutdown = ShutdownSignal::new();
    install_ctrl_c_handler(shutdown.clone());

    commands::dispatch(&config, shutdown, show_progress).await
}
