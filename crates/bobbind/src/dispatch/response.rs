//! Response encoding for the worker.
//!
//! Responses are flat JSON objects written one per line. `success` and
//! `error` are always present (`error` is `null` on success, mirroring the
//! wire contract the controlling peer expects); action payload fields are
//! omitted when they do not apply. `id` is omitted only for failures
//! answering lines that never decoded into a request.

use std::io::Write;

use serde::Serialize;

use super::errors::DispatchError;

/// One protocol response, serialised as a single JSONL line.
#[derive(Debug, Serialize)]
pub(crate) struct Response {
    /// Correlation id copied from the request; absent for undecodable input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    /// Whether the request was handled successfully.
    pub(crate) success: bool,
    /// Liveness flag for `ping`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) pong: Option<bool>,
    /// Whether an embedding backend is compiled into this worker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) backend_available: Option<bool>,
    /// One vector per input text, in input order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) embeddings: Option<Vec<Vec<f32>>>,
    /// Shared dimensionality of the returned vectors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dimensions: Option<usize>,
    /// Number of returned vectors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) count: Option<usize>,
    /// Signals the session loop to stop after this response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) shutdown: Option<bool>,
    /// Failure message; `null` on success.
    pub(crate) error: Option<String>,
    /// Rendered cause chain for failures, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) traceback: Option<String>,
}

impl Response {
    fn base(id: Option<String>, success: bool) -> Self {
        Self {
            id,
            success,
            pong: None,
            backend_available: None,
            embeddings: None,
            dimensions: None,
            count: None,
            shutdown: None,
            error: None,
            traceback: None,
        }
    }

    /// Creates a successful `ping` response.
    pub(crate) fn pong(id: String, backend_available: bool) -> Self {
        Self {
            pong: Some(true),
            backend_available: Some(backend_available),
            ..Self::base(Some(id), true)
        }
    }

    /// Creates a successful `embed` response.
    ///
    /// `count` is the vector count and `dimensions` the length of the first
    /// vector (0 when the model returned none).
    pub(crate) fn embedded(id: String, embeddings: Vec<Vec<f32>>) -> Self {
        let dimensions = embeddings.first().map_or(0, Vec::len);
        let count = embeddings.len();
        Self {
            embeddings: Some(embeddings),
            dimensions: Some(dimensions),
            count: Some(count),
            ..Self::base(Some(id), true)
        }
    }

    /// Creates a successful `shutdown` response.
    pub(crate) fn shutdown(id: String) -> Self {
        Self {
            shutdown: Some(true),
            ..Self::base(Some(id), true)
        }
    }

    /// Creates a failure response from a dispatch error.
    ///
    /// Pass `None` for `id` when the failing line never decoded into a
    /// request, so no correlation is possible.
    pub(crate) fn failure(id: Option<String>, error: &DispatchError) -> Self {
        Self {
            error: Some(error.to_string()),
            traceback: error.render_trace(),
            ..Self::base(id, false)
        }
    }

    /// Whether this response tells the session loop to stop.
    pub(crate) fn is_shutdown(&self) -> bool {
        self.shutdown == Some(true)
    }
}

/// Writer that serialises responses as JSONL and flushes immediately.
///
/// The flush after every message is part of the protocol contract: the peer
/// must observe each response without buffering delay.
pub(crate) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer over the given output stream.
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one response as a JSONL line and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation, writing, or flushing fails.
    pub(crate) fn write_response(&mut self, response: &Response) -> Result<(), DispatchError> {
        serde_json::to_writer(&mut self.writer, response)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
