//! Request decoding, routing, and response encoding for the worker.
//!
//! One request per line, one response per line. A request names an action
//! and carries action-specific fields:
//!
//! ```json
//! {"id":"1","action":"embed","texts":["hello","world"],"model":"all-MiniLM-L6-v2"}
//! ```
//!
//! The worker answers with a flat JSON object correlated by `id`:
//!
//! ```json
//! {"id":"1","success":true,"embeddings":[[0.1,0.2],[0.3,0.4]],"dimensions":2,"count":2,"error":null}
//! ```
//!
//! [`Dispatcher::handle`] is total: validation faults, unknown actions,
//! model-load failures, and computation failures all come back as failure
//! responses (`success: false` plus an `error` message and a `traceback`
//! rendering of the cause chain). Nothing escapes the dispatch boundary.

mod errors;
mod handler;
mod request;
mod response;

pub(crate) use self::errors::DispatchError;
pub(crate) use self::handler::Dispatcher;
pub(crate) use self::request::RequestEnvelope;
pub(crate) use self::response::{Response, ResponseWriter};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
