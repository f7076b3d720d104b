//! Interrupt flag raised by termination signals.
//!
//! The worker's only blocking point is the stdin read, so interruption is
//! observed at loop-iteration boundaries rather than by waiting on a signal
//! stream: SIGINT and SIGTERM merely raise a flag the session loop polls
//! before reading the next line.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::flag;
use thiserror::Error;

/// Errors reported while installing signal handlers.
#[derive(Debug, Error)]
pub(crate) enum InterruptError {
    /// Installing a signal handler failed.
    #[error("failed to install handler for signal {signal}: {source}")]
    Install {
        signal: i32,
        #[source]
        source: io::Error,
    },
}

/// Flag set when the process receives a termination signal.
#[derive(Debug, Clone)]
pub(crate) struct InterruptFlag {
    raised: Arc<AtomicBool>,
}

impl InterruptFlag {
    /// Installs SIGINT/SIGTERM handlers that raise the flag.
    pub(crate) fn register() -> Result<Self, InterruptError> {
        let raised = Arc::new(AtomicBool::new(false));
        for signal in [SIGINT, SIGTERM] {
            flag::register(signal, Arc::clone(&raised))
                .map_err(|source| InterruptError::Install { signal, source })?;
        }
        Ok(Self { raised })
    }

    /// Builds an unregistered flag for tests.
    #[cfg(test)]
    pub(crate) fn manual() -> Self {
        Self {
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raises the flag as a signal handler would.
    #[cfg(test)]
    pub(crate) fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }

    /// Whether a termination signal has been observed.
    pub(crate) fn is_raised(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}
