//! Graceful Ctrl+C handling

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag the scheduler polls before dispatching each task
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    #[inline]
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
    }
}

/// Set up the Ctrl+C handler for graceful shutdown.
///
/// The first Ctrl+C stops new dispatch and lets in-flight commands finish;
/// the second exits immediately with status 130.
pub fn install_ctrl_c_handler(signal: ShutdownSignal) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            return;
        }

        let is_tty = std::io::stderr().is_terminal();
        if is_tty {
            eprintln!("\n\nShutdown requested, finishing in-flight repositories...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("shutdown requested, finishing in-flight repositories");
        }

        signal.request();

        // Wait for second Ctrl+C for force quit
        if tokio::signal::ctrl_c().await.is_ok() {
            if is_tty {
                eprintln!("Force quit!");
            }
            std::process::exit(130);
        }
    });
}
