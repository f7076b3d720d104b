//! Error types for request decoding and dispatch failures.
//!
//! Each variant maps to one failure mode of the protocol: undecodable
//! input, a request missing fields its action requires, an unrecognised
//! action, an oversized line, a model fault, or an IO/serialisation fault
//! while answering. All of them are surfaced to the peer as structured
//! failure responses.

use std::io;

use bobbin_embed::ModelError;
use thiserror::Error;

/// Errors surfaced during request parsing and dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The line could not be parsed as a request.
    #[error("malformed request: {message}")]
    MalformedRequest {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// An `embed` request without a non-empty `texts` sequence.
    #[error("no texts provided")]
    MissingTexts,

    /// The action tag is missing or unrecognised.
    #[error("unknown action: {action}")]
    UnknownAction {
        /// The offending value; absent actions are reported as `unknown`.
        action: String,
    },

    /// The request line exceeds the configured size bound.
    #[error("request too large: exceeds {max_bytes} byte limit")]
    RequestTooLarge { max_bytes: usize },

    /// Model resolution, loading, or computation failed.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Writing a response to the peer failed.
    #[error("failed to write response: {0}")]
    Io(#[from] io::Error),

    /// Response serialisation failed.
    #[error("failed to serialize response: {0}")]
    SerializeResponse(#[from] serde_json::Error),
}

impl DispatchError {
    /// Creates a malformed-request error from a serde error.
    pub(crate) fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedRequest {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a malformed-request error with a custom message.
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an unknown-action error naming the offending value.
    pub(crate) fn unknown_action(action: impl Into<String>) -> Self {
        Self::UnknownAction {
            action: action.into(),
        }
    }

    /// Creates a request-too-large error.
    pub(crate) fn request_too_large(max_bytes: usize) -> Self {
        Self::RequestTooLarge { max_bytes }
    }

    /// Renders the error's cause chain for the `traceback` diagnostic field.
    ///
    /// Returns `None` when the error has no underlying cause.
    pub(crate) fn render_trace(&self) -> Option<String> {
        let mut rendered = String::new();
        let mut cause = std::error::Error::source(self);
        while let Some(error) = cause {
            if !rendered.is_empty() {
                rendered.push('\n');
            }
            rendered.push_str("caused by: ");
            rendered.push_str(&error.to_string());
            cause = error.source();
        }
        (!rendered.is_empty()).then_some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_names_the_value() {
        let error = DispatchError::unknown_action("frobnicate");
        assert_eq!(error.to_string(), "unknown action: frobnicate");
    }

    #[test]
    fn trace_is_absent_without_a_cause() {
        assert!(DispatchError::MissingTexts.render_trace().is_none());
    }

    #[test]
    fn trace_renders_the_cause_chain() {
        let source = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        let error = DispatchError::from_json_error(source);
        let trace = error.render_trace().expect("trace should be present");
        assert!(trace.starts_with("caused by: "));
    }
}
