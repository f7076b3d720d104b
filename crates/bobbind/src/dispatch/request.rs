//! Request deserialisation and action parsing.
//!
//! A request arrives as one JSON object per line. The envelope is decoded
//! first; action-specific requirements (a non-empty `texts` sequence for
//! `embed`) are checked afterwards by the dispatcher, so a missing field
//! becomes an early validation failure rather than a deep fault.

use serde::Deserialize;

use super::errors::DispatchError;

/// Correlation id used when the peer omits one.
pub(crate) const UNKNOWN_REQUEST_ID: &str = "unknown";

/// Value reported for a missing or empty action tag.
const UNKNOWN_ACTION: &str = "unknown";

/// Decoded request envelope, before action validation.
#[derive(Debug, Deserialize)]
pub(crate) struct RequestEnvelope {
    /// Correlation id, echoed verbatim into the response.
    id: Option<String>,
    /// Action tag; absence is treated as the unknown action.
    action: Option<String>,
    /// Input texts, only meaningful for `embed`.
    texts: Option<Vec<String>>,
    /// Model name, only meaningful for `embed`.
    model: Option<String>,
}

impl RequestEnvelope {
    /// Parses a request line.
    ///
    /// Trailing whitespace (including the newline delimiter) is trimmed
    /// before parsing. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::MalformedRequest`] when the line is empty or
    /// is not a JSON object matching the envelope schema.
    pub(crate) fn parse(line: &[u8]) -> Result<Self, DispatchError> {
        let trimmed = trim_trailing_whitespace(line);
        if trimmed.is_empty() {
            return Err(DispatchError::malformed("empty request line"));
        }
        serde_json::from_slice(trimmed).map_err(DispatchError::from_json_error)
    }

    /// Correlation id for the response, defaulting to the sentinel.
    pub(crate) fn request_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_owned())
    }

    /// The action tag as sent, with absence normalised to `unknown`.
    pub(crate) fn action_name(&self) -> &str {
        self.action
            .as_deref()
            .map(str::trim)
            .filter(|action| !action.is_empty())
            .unwrap_or(UNKNOWN_ACTION)
    }

    /// Parses the action tag.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownAction`] naming the offending value
    /// when the tag is missing or unrecognised.
    pub(crate) fn action(&self) -> Result<Action, DispatchError> {
        Action::parse(self.action_name())
    }

    /// The input texts, when present and non-empty.
    pub(crate) fn texts(&self) -> Option<&[String]> {
        self.texts.as_deref().filter(|texts| !texts.is_empty())
    }

    /// The requested model name, falling back to the supplied default.
    pub(crate) fn model_name<'a>(&'a self, default: &'a str) -> &'a str {
        self.model
            .as_deref()
            .map(str::trim)
            .filter(|model| !model.is_empty())
            .unwrap_or(default)
    }
}

/// Known request actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    /// Compute embeddings for a batch of texts.
    Embed,
    /// Liveness and backend-availability probe.
    Ping,
    /// Stop the session loop after answering.
    Shutdown,
}

impl Action {
    /// Parses an action tag (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnknownAction`] for anything but the three
    /// known tags.
    pub(crate) fn parse(value: &str) -> Result<Self, DispatchError> {
        match value.to_ascii_lowercase().as_str() {
            "embed" => Ok(Self::Embed),
            "ping" => Ok(Self::Ping),
            "shutdown" => Ok(Self::Shutdown),
            _ => Err(DispatchError::unknown_action(value)),
        }
    }
}

/// Trims trailing ASCII whitespace from a byte slice.
fn trim_trailing_whitespace(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |position| position + 1);
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_embed_request() {
        let line = br#"{"id":"7","action":"embed","texts":["hello"],"model":"minilm"}"#;
        let envelope = RequestEnvelope::parse(line).expect("parse embed request");
        assert_eq!(envelope.request_id(), "7");
        assert_eq!(envelope.action().expect("action"), Action::Embed);
        assert_eq!(envelope.texts().expect("texts"), ["hello".to_owned()]);
        assert_eq!(envelope.model_name("default"), "minilm");
    }

    #[test]
    fn missing_id_defaults_to_sentinel() {
        let envelope =
            RequestEnvelope::parse(br#"{"action":"ping"}"#).expect("parse ping request");
        assert_eq!(envelope.request_id(), "unknown");
    }

    #[test]
    fn missing_model_falls_back_to_default() {
        let envelope = RequestEnvelope::parse(br#"{"action":"embed","texts":["a"]}"#)
            .expect("parse embed request");
        assert_eq!(envelope.model_name("all-MiniLM-L6-v2"), "all-MiniLM-L6-v2");
    }

    #[test]
    fn empty_texts_read_as_absent() {
        let envelope = RequestEnvelope::parse(br#"{"action":"embed","texts":[]}"#)
            .expect("parse embed request");
        assert!(envelope.texts().is_none());
    }

    #[test]
    fn trims_trailing_newline_before_parsing() {
        let envelope =
            RequestEnvelope::parse(b"{\"action\":\"ping\"}\n").expect("parse with newline");
        assert_eq!(envelope.action().expect("action"), Action::Ping);
    }

    #[test]
    fn rejects_empty_lines() {
        let error = RequestEnvelope::parse(b"  \n").expect_err("empty line");
        assert!(matches!(error, DispatchError::MalformedRequest { .. }));
    }

    #[test]
    fn rejects_invalid_json() {
        let error = RequestEnvelope::parse(b"not json").expect_err("invalid json");
        assert!(matches!(error, DispatchError::MalformedRequest { .. }));
    }

    #[test]
    fn ignores_unknown_fields() {
        let envelope = RequestEnvelope::parse(br#"{"action":"ping","extra":42}"#)
            .expect("parse with extra field");
        assert_eq!(envelope.action().expect("action"), Action::Ping);
    }

    #[test]
    fn action_parse_is_case_insensitive() {
        assert_eq!(Action::parse("PING").expect("parse"), Action::Ping);
        assert_eq!(Action::parse("Shutdown").expect("parse"), Action::Shutdown);
    }

    #[test]
    fn missing_action_reports_the_sentinel_value() {
        let envelope = RequestEnvelope::parse(br#"{"id":"1"}"#).expect("parse bare request");
        let error = envelope.action().expect_err("action should be unknown");
        assert_eq!(error.to_string(), "unknown action: unknown");
    }

    #[test]
    fn unrecognised_action_names_the_value() {
        let envelope =
            RequestEnvelope::parse(br#"{"action":"train"}"#).expect("parse train request");
        let error = envelope.action().expect_err("action should be unknown");
        assert_eq!(error.to_string(), "unknown action: train");
    }
}
