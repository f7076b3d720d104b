//! Single-slot model registry with lazy load and reuse semantics.
//!
//! Loading a model is assumed expensive, so the registry keeps the most
//! recently loaded model and reuses it while requests keep naming it. A
//! request for a different name loads the replacement first and only then
//! swaps it in; a failed load leaves the previous model current.

use std::fmt;

use tracing::debug;

use crate::errors::ModelError;
use crate::provider::{ModelProvider, TextEmbedder};

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Registry owning at most one loaded model at a time.
pub struct ModelRegistry<P: ModelProvider> {
    provider: P,
    current: Option<LoadedModel<P::Model>>,
}

struct LoadedModel<M> {
    name: String,
    model: M,
}

impl<P: ModelProvider> fmt::Debug for ModelRegistry<P> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ModelRegistry")
            .field("current_model", &self.current_model_name())
            .finish_non_exhaustive()
    }
}

impl<P: ModelProvider> ModelRegistry<P> {
    /// Builds an empty registry over the supplied provider.
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            current: None,
        }
    }

    /// Whether the underlying backend can load models at all.
    #[must_use]
    pub fn backend_available(&self) -> bool {
        self.provider.available()
    }

    /// Name of the currently loaded model, if any.
    #[must_use]
    pub fn current_model_name(&self) -> Option<&str> {
        self.current.as_ref().map(|loaded| loaded.name.as_str())
    }

    /// Ensures the named model is the current one, loading it on demand.
    ///
    /// Requests for the already-current name succeed without consulting the
    /// provider. A different name triggers a fresh load; the previous model
    /// is dropped only once the replacement loaded successfully, so a failed
    /// load leaves the registry's state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyName`] for blank names and forwards the
    /// provider's error when the load fails.
    pub fn ensure_loaded(&mut self, name: &str) -> Result<(), ModelError> {
        let wanted = name.trim();
        if wanted.is_empty() {
            return Err(ModelError::EmptyName);
        }

        if self
            .current
            .as_ref()
            .is_some_and(|loaded| loaded.name == wanted)
        {
            debug!(target: REGISTRY_TARGET, model = wanted, "reusing loaded model");
            return Ok(());
        }

        debug!(target: REGISTRY_TARGET, model = wanted, "loading model");
        let model = self.provider.load(wanted)?;
        self.current = Some(LoadedModel {
            name: wanted.to_owned(),
            model,
        });
        Ok(())
    }

    /// Computes embeddings with the current model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NoModelLoaded`] when [`Self::ensure_loaded`]
    /// has not succeeded yet, and forwards the model's error otherwise.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        match self.current.as_ref() {
            Some(loaded) => loaded.model.embed(texts),
            None => Err(ModelError::NoModelLoaded),
        }
    }
}
