//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod executor;
pub mod fixtures;
pub mod git;
pub mod provider;

pub use self::executor::{RecordingExecutor, ScriptedExecutor};
pub use self::fixtures::{MirrorSandbox, UpstreamRepo};
pub use self::git::{git, is_git_available, setup_git_repo};
pub use self::provider::FakeProvider;
