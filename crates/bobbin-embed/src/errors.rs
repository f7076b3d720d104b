//! Error types for model loading and embedding computation.
//!
//! Every fault crossing the embedding boundary is converted into a
//! [`ModelError`] carrying a human-readable cause, so callers can surface it
//! as a structured failure instead of propagating a foreign error type.

use thiserror::Error;

/// Boxed source error preserved for diagnostics.
type Source = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced while resolving, loading, or running a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The requested model name was empty or whitespace-only.
    #[error("model name must not be empty")]
    EmptyName,

    /// No embedding backend is compiled into this build.
    #[error("embedding backend is not available in this build")]
    BackendUnavailable,

    /// The name did not resolve to any model the backend knows.
    #[error("unknown model: {name}")]
    UnknownModel {
        /// The unresolvable name as requested.
        name: String,
    },

    /// The backend failed while loading a resolvable model.
    #[error("failed to load model {name}: {message}")]
    Load {
        /// Name of the model that failed to load.
        name: String,
        message: String,
        #[source]
        source: Option<Source>,
    },

    /// The loaded model failed while computing embeddings.
    #[error("embedding computation failed: {message}")]
    Embed {
        message: String,
        #[source]
        source: Option<Source>,
    },

    /// An embedding was requested before any model was loaded.
    #[error("no model loaded")]
    NoModelLoaded,
}

impl ModelError {
    /// Creates an unknown-model error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownModel { name: name.into() }
    }

    /// Creates a load error wrapping the backend's fault.
    pub fn load(name: impl Into<String>, source: impl Into<Source>) -> Self {
        let source = source.into();
        Self::Load {
            name: name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates a computation error wrapping the backend's fault.
    pub fn embed(source: impl Into<Source>) -> Self {
        let source = source.into();
        Self::Embed {
            message: source.to_string(),
            source: Some(source),
        }
    }
}
