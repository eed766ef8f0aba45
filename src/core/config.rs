//! Configuration constants and run settings

use std::path::PathBuf;
use std::time::Duration;

use crate::commands::{Action, OutputFormat};
use crate::error::ConfigError;
use crate::git::GIT_OPERATION_TIMEOUT_SECS;
use crate::provider::rate_limit::DEFAULT_FALLBACK_WINDOW_SECS;
use crate::provider::{Platform, ProviderSettings};

// Concurrency Configuration
//
// Clones and fetches are network-bound; five workers keeps hosting services
// from throttling while still overlapping transfers.
pub const DEFAULT_SYNC_CONCURRENCY: usize = 5;

/// Determines the worker count for sync operations based on CLI args
///
/// Priority order:
/// 1. --sequential flag → 1
/// 2. --jobs N flag → N (at least 1)
/// 3. Default → 5
pub fn get_sync_concurrency(jobs: Option<usize>, sequential: bool) -> usize {
    if sequential {
        return 1;
    }
    match jobs {
        Some(n) => n.max(1),
        None => DEFAULT_SYNC_CONCURRENCY,
    }
}

// Staleness configuration
pub const DEFAULT_STALENESS_MINUTES: u64 = 1;
pub const MARKERS_DIR_NAME: &str = ".markers";

// Environment
pub const TOKEN_ENV_VAR: &str = "MIRROR_TOKEN";

// Progress bar configuration
pub const PROGRESS_CHARS: &str = "##-";
pub const PROGRESS_TEMPLATE: &str = "{prefix:.bold} [{bar:30}] {pos}/{len} {wide_msg}";

// UI Constants
pub const NO_REPOS_MESSAGE: &str = "No repositories to sync.";
pub const ENUMERATING_MESSAGE: &str = "enumerating repositories...";

// Display formatting constants
pub const NAME_DISPLAY_WIDTH: usize = 30;
pub const PATH_DISPLAY_WIDTH: usize = 40;
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 60;
pub const ERROR_MESSAGE_TRUNCATE_LENGTH: usize = 57;

/// Raw, unvalidated run inputs as collected from the command line
#[derive(Debug, Clone, Default)]
pub struct MirrorOptions {
    pub action: Option<String>,
    pub token: Option<String>,
    pub owner: Option<String>,
    pub destination: Option<PathBuf>,
    pub platform: Option<String>,
    pub server_url: Option<String>,
    pub project: Option<String>,
    pub filter: Option<String>,
    pub older_than: Option<u64>,
    pub jobs: Option<usize>,
    pub sequential: bool,
    pub rate_limit_window_secs: Option<u64>,
    pub command_timeout_secs: Option<u64>,
    pub format: OutputFormat,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub action: Action,
    pub destination: PathBuf,
    /// `None` for actions that never contact the hosting service
    pub provider: Option<ProviderSettings>,
    pub project: Option<String>,
    pub name_filter: Option<String>,
    pub staleness_minutes: u64,
    /// analyze-all only inspects copies with git activity within this many minutes
    pub activity_window_minutes: Option<u64>,
    pub concurrency: usize,
    pub rate_limit_window: Duration,
    pub command_timeout: Duration,
    pub format: OutputFormat,
}

impl MirrorConfig {
    /// Validates every input before any network or filesystem activity
    pub fn from_options(options: MirrorOptions) -> Result<Self, ConfigError> {
        let action = match non_empty(options.action) {
            Some(name) => Action::parse(&name)?,
            None => return Err(ConfigError::MissingInput("action")),
        };
        let destination = options
            .destination
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingInput("dest"))?;
        // Working copies are addressed from several working directories
        let destination = std::path::absolute(&destination).unwrap_or(destination);

        let provider = if action.needs_provider() {
            Some(provider_settings(
                non_empty(options.token),
                non_empty(options.platform),
                non_empty(options.owner),
                non_empty(options.server_url),
            )?)
        } else {
            None
        };

        Ok(Self {
            action,
            destination,
            provider,
            project: non_empty(options.project),
            name_filter: non_empty(options.filter),
            staleness_minutes: options
                .older_than
                .unwrap_or(DEFAULT_STALENESS_MINUTES)
                .max(1),
            activity_window_minutes: options.older_than,
            concurrency: get_sync_concurrency(options.jobs, options.sequential),
            rate_limit_window: Duration::from_secs(
                options
                    .rate_limit_window_secs
                    .unwrap_or(DEFAULT_FALLBACK_WINDOW_SECS),
            ),
            command_timeout: Duration::from_secs(
                options
                    .command_timeout_secs
                    .unwrap_or(GIT_OPERATION_TIMEOUT_SECS)
                    .max(1),
            ),
            format: options.format,
        })
    }
}

fn provider_settings(
    token: Option<String>,
    platform: Option<String>,
    owner: Option<String>,
    server_url: Option<String>,
) -> Result<ProviderSettings, ConfigError> {
    let token = token.ok_or(ConfigError::MissingInput("token"))?;
    let platform: Platform = platform
        .ok_or(ConfigError::MissingInput("platform"))?
        .parse()?;

    if platform == Platform::GitHub && owner.is_none() {
        return Err(ConfigError::MissingInput("username"));
    }
    // Optional for GitHub, where it names an Enterprise API URL
    match &server_url {
        Some(url) => validate_server_url(url)?,
        None if platform.requires_server_url() => {
            return Err(ConfigError::MissingServerUrl {
                platform: platform.to_string(),
            })
        }
        None => {}
    }

    Ok(ProviderSettings {
        platform,
        token,
        owner,
        server_url,
    })
}

fn validate_server_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidServerUrl {
            url: url.to_string(),
            reason: "expected an http:// or https:// URL".to_string(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
