//! The bobbin embedding worker.
//!
//! bobbind is a long-lived child process owned by a controlling peer. The
//! peer writes one JSON request per line on the worker's stdin; the worker
//! answers with exactly one JSON response per line on stdout, in request
//! order, and keeps diagnostics on stderr. Three request actions exist:
//! `embed` (turn texts into vectors with a named model), `ping` (liveness
//! and backend availability), and `shutdown` (stop the loop after the
//! response is written).
//!
//! Processing is fully serial: one request is decoded, dispatched, and
//! answered before the next line is read. The only cross-request state is
//! the model registry, which keeps the most recently loaded model so
//! consecutive requests naming the same model skip the expensive load.
//!
//! The session ends on a `shutdown` request, when the peer closes the pipe,
//! or on SIGINT/SIGTERM; all three are graceful, logged exits.

mod dispatch;
mod process;
mod session;
mod telemetry;

pub use process::run;
