//! Command handlers and the action dispatch table

pub mod analyze;
pub mod list;
pub mod sync;

use anyhow::Result;

use crate::core::{MirrorConfig, SyncContext};
use crate::error::ConfigError;
use crate::provider::{self, EnumerationRequest, RateLimiter, RepositoryDescriptor, RepositoryEnumerator};
use crate::utils::ShutdownSignal;

pub use list::OutputFormat;

/// Everything `mirror` can be asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Enumerate the hosting service, clone what is missing, reconcile everything
    CloneAll,
    /// Reconcile working copies already on disk without contacting the service
    SyncExisting,
    /// Enumerate and print, touching nothing on disk
    List,
    /// Report branches and history of working copies already on disk
    Analyze,
}

// Accepted spellings, canonical name first for each action
const ACTION_TABLE: &[(&str, Action)] = &[
    ("clone-and-sync-all", Action::CloneAll),
    ("sync-existing", Action::SyncExisting),
    ("enumerate-only", Action::List),
    ("analyze-all", Action::Analyze),
    ("clone", Action::CloneAll),
    ("pull", Action::SyncExisting),
    ("list", Action::List),
    ("analyze", Action::Analyze),
];

impl Action {
    pub const ALL: [Action; 4] = [Action::CloneAll, Action::SyncExisting, Action::List, Action::Analyze];

    pub fn name(&self) -> &'static str {
        match self {
            Action::CloneAll => "clone-and-sync-all",
            Action::SyncExisting => "sync-existing",
            Action::List => "enumerate-only",
            Action::Analyze => "analyze-all",
        }
    }

    /// Canonical action names, for help and error messages
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Action::name).collect()
    }

    /// Resolves a canonical name or alias, case-insensitively
    pub fn parse(name: &str) -> Result<Action, ConfigError> {
        let wanted = name.trim().to_lowercase();
        ACTION_TABLE
            .iter()
            .find(|(candidate, _)| *candidate == wanted)
            .map(|(_, action)| *action)
            .ok_or_else(|| ConfigError::UnknownAction(name.to_string()))
    }

    pub fn needs_provider(&self) -> bool {
        !matches!(self, Action::SyncExisting | Action::Analyze)
    }
}

/// Runs the configured action to completion
///
/// Per-repository failures are reported in the summary and never fail the run;
/// configuration and enumeration errors do.
pub async fn dispatch(config: &MirrorConfig, shutdown: ShutdownSignal, show_progress: bool) -> Result<()> {
    let span = tracing::info_span!("mirror", action = config.action.name());
    let context = SyncContext::new(span, shutdown);

    match config.action {
        Action::CloneAll => sync::handle_clone_all(config, context, show_progress).await,
        Action::SyncExisting => sync::handle_sync_existing(config, context, show_progress).await,
        Action::List => list::handle_enumerate(config, context).await,
        Action::Analyze => analyze::handle_analyze(config, context).await,
    }
}

/// Enumerates the configured provider, aborting on the first API error
pub(crate) async fn enumerate_repositories(
    config: &MirrorConfig,
    context: &SyncContext,
) -> crate::error::Result<Vec<RepositoryDescriptor>> {
    let settings = config
        .provider
        .as_ref()
        .ok_or(ConfigError::MissingInput("platform"))?;
    let provider = provider::connect(settings)?;
    let limiter = RateLimiter::new(config.rate_limit_window);
    let enumerator = RepositoryEnumerator::new(provider.as_ref(), &limiter, &context.span);

    let request = EnumerationRequest {
        project: config.project.clone(),
        name_filter: config.name_filter.clone(),
    };
    Ok(enumerator.enumerate(&request).await?)
}
