//! Error taxonomy shared across the mirror engine

use thiserror::Error;

pub use crate::git::CommandError;
pub use crate::provider::ProviderError;

/// Invalid or missing run configuration. Always reported before any work starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--{0} is required")]
    MissingInput(&'static str),

    #[error("--server-url is required when using the {platform} platform")]
    MissingServerUrl { platform: String },

    #[error("unknown action '{0}' (expected one of: {expected})", expected = crate::commands::Action::names().join(", "))]
    UnknownAction(String),

    #[error("unknown platform '{0}' (expected 'github' or 'stash')")]
    UnknownPlatform(String),

    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}

/// Top-level error for a mirror run.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("source API error: {0}")]
    SourceApi(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = MirrorError> = std::result::Result<T, E>;
