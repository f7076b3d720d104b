//! Process lifecycle bracketing around the session loop.
//!
//! The bracket logs a start event, installs the interrupt flag, runs the
//! session loop over the process's own stdin/stdout, and always logs a stop
//! event naming how the loop ended. Interruption is a graceful stop. A panic
//! escaping the loop would mean the dispatcher's total-function contract was
//! broken; it is caught here, logged, and still produces an orderly exit.

mod interrupt;

pub(crate) use self::interrupt::InterruptFlag;

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use bobbin_config::Config;
use tracing::{error, info};

use crate::dispatch::Dispatcher;
use crate::session::{self, SessionEnd};
use crate::telemetry;

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

#[cfg(feature = "local")]
type DefaultProvider = bobbin_embed::FastembedProvider;
#[cfg(not(feature = "local"))]
type DefaultProvider = bobbin_embed::UnavailableProvider;

/// Runs the worker: configuration, telemetry, then the bracketed session
/// loop. This is the whole program behind `main`.
#[must_use]
pub fn run() -> ExitCode {
    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("bobbind: failed to load configuration: {error}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = telemetry::initialise(&config) {
        eprintln!("bobbind: failed to initialise telemetry: {error}");
        return ExitCode::FAILURE;
    }

    run_worker(&config)
}

fn run_worker(config: &Config) -> ExitCode {
    let interrupt = match InterruptFlag::register() {
        Ok(flag) => flag,
        Err(error) => {
            error!(target: PROCESS_TARGET, error = %error, "failed to install signal handlers");
            return ExitCode::FAILURE;
        }
    };

    let mut dispatcher =
        Dispatcher::new(DefaultProvider::new(), config.default_model().to_owned());

    info!(
        target: PROCESS_TARGET,
        default_model = config.default_model(),
        "embedding worker started"
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        session::run_session(
            stdin.lock(),
            stdout.lock(),
            &mut dispatcher,
            &interrupt,
            config.max_request_bytes(),
        )
    }));

    let code = match outcome {
        Ok(Ok(end)) => {
            log_session_end(end);
            ExitCode::SUCCESS
        }
        Ok(Err(error)) => {
            error!(target: PROCESS_TARGET, error = %error, "session loop faulted");
            ExitCode::FAILURE
        }
        Err(payload) => {
            error!(
                target: PROCESS_TARGET,
                panic = panic_message(payload.as_ref()),
                "session loop panicked"
            );
            ExitCode::FAILURE
        }
    };

    info!(target: PROCESS_TARGET, "embedding worker stopped");
    code
}

fn log_session_end(end: SessionEnd) {
    match end {
        SessionEnd::Interrupted => {
            info!(target: PROCESS_TARGET, "session interrupted by signal, stopping")
        }
        SessionEnd::Shutdown | SessionEnd::EndOfInput => {
            info!(target: PROCESS_TARGET, outcome = %end, "session loop ended")
        }
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_reads_static_strings() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn panic_message_reads_owned_strings() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom".to_owned());
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn panic_message_tolerates_other_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(17_u32);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
