//! Local embedding backend built on fastembed (ONNX runtime).
//!
//! Model names are resolved against the models fastembed ships. A request
//! may use either the full model code (for example
//! `sentence-transformers/all-MiniLM-L6-v2`) or just its trailing path
//! segment (`all-MiniLM-L6-v2`), matched case-insensitively.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tracing::info;

use crate::errors::ModelError;
use crate::provider::{ModelProvider, TextEmbedder};

const LOCAL_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::local");

/// Provider loading fastembed models by name.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastembedProvider;

impl FastembedProvider {
    /// Builds the provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ModelProvider for FastembedProvider {
    type Model = FastembedModel;

    fn available(&self) -> bool {
        true
    }

    fn load(&self, name: &str) -> Result<Self::Model, ModelError> {
        let model = resolve_model(name)?;
        info!(target: LOCAL_TARGET, model = name, "loading fastembed model");
        let embedding = TextEmbedding::try_new(
            InitOptions::new(model).with_show_download_progress(false),
        )
        .map_err(|source| ModelError::load(name, source))?;
        Ok(FastembedModel { inner: embedding })
    }
}

/// A loaded fastembed model.
pub struct FastembedModel {
    inner: TextEmbedding,
}

impl std::fmt::Debug for FastembedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastembedModel").finish_non_exhaustive()
    }
}

impl TextEmbedder for FastembedModel {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.inner
            .embed(texts.to_vec(), None)
            .map_err(ModelError::embed)
    }
}

/// Resolves a requested name to one of fastembed's supported models.
fn resolve_model(name: &str) -> Result<EmbeddingModel, ModelError> {
    TextEmbedding::list_supported_models()
        .into_iter()
        .find(|info| code_matches(&info.model_code, name))
        .map(|info| info.model)
        .ok_or_else(|| ModelError::unknown(name))
}

/// Whether a model code matches the requested name.
///
/// Comparison ignores case, an optional organisation prefix on the code, and
/// the `-onnx` suffix some published mirrors append.
fn code_matches(code: &str, wanted: &str) -> bool {
    let wanted = wanted.to_ascii_lowercase();
    let code = code.to_ascii_lowercase();
    if code == wanted {
        return true;
    }
    let tail = code.rsplit('/').next().unwrap_or(code.as_str());
    tail == wanted || tail.strip_suffix("-onnx") == Some(wanted.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_the_default_model_name() {
        let model = resolve_model("all-MiniLM-L6-v2").expect("default model should resolve");
        assert_eq!(model, EmbeddingModel::AllMiniLML6V2);
    }

    #[test]
    fn resolves_full_model_codes() {
        let supported = TextEmbedding::list_supported_models();
        let first = supported.first().expect("fastembed ships models");
        let model = resolve_model(&first.model_code).expect("full code should resolve");
        assert_eq!(model, first.model);
    }

    #[test]
    fn resolution_ignores_case() {
        assert!(resolve_model("ALL-MINILM-L6-V2").is_ok());
    }

    #[test]
    fn unknown_names_fail_to_resolve() {
        let error = resolve_model("definitely-not-a-model").expect_err("should not resolve");
        assert!(matches!(error, ModelError::UnknownModel { .. }));
    }

    #[test]
    fn provider_reports_available() {
        assert!(FastembedProvider::new().available());
    }
}
