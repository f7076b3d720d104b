//! Seams between the worker and the embedding backend.

use crate::errors::ModelError;

/// A loaded model that turns batches of text into vectors.
///
/// Implementations must return one vector per input text, in input order,
/// with every vector sharing the model's dimensionality.
pub trait TextEmbedder {
    /// Computes embeddings for the given texts.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Embed`] when the underlying computation fails.
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError>;
}

/// A backend capable of loading models by name.
pub trait ModelProvider {
    /// The loaded model type produced by this provider.
    type Model: TextEmbedder;

    /// Whether the backend can load models in this runtime at all.
    ///
    /// Health probes report this without attempting a load.
    fn available(&self) -> bool;

    /// Loads a fresh model for the given (trimmed, non-empty) name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownModel`] for unresolvable names and
    /// [`ModelError::Load`] when the backend fails on a resolvable one.
    fn load(&self, name: &str) -> Result<Self::Model, ModelError>;
}

/// Provider used when no embedding backend is compiled in.
///
/// Keeps the worker protocol fully functional in degraded form: `ping`
/// reports the backend as unavailable and every `embed` request fails with
/// a clear cause instead of crashing the process.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableProvider;

impl UnavailableProvider {
    /// Builds the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Model type for [`UnavailableProvider`]; never constructed.
#[derive(Debug, Clone, Copy)]
pub struct UnavailableModel;

impl TextEmbedder for UnavailableModel {
    fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        Err(ModelError::BackendUnavailable)
    }
}

impl ModelProvider for UnavailableProvider {
    type Model = UnavailableModel;

    fn available(&self) -> bool {
        false
    }

    fn load(&self, _name: &str) -> Result<Self::Model, ModelError> {
        Err(ModelError::BackendUnavailable)
    }
}
