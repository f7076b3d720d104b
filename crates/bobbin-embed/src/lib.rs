//! Embedding capability for the bobbin worker.
//!
//! The worker treats vector computation as an external collaborator behind
//! two seams: [`ModelProvider`] resolves a model name into a loaded model,
//! and [`TextEmbedder`] turns a batch of texts into one vector per text.
//! [`ModelRegistry`] sits on top of a provider and owns at most one loaded
//! model at a time, reusing it while consecutive requests name the same
//! model and replacing it when a different name arrives.
//!
//! The default `local` feature supplies a fastembed-backed provider that
//! resolves names against the models fastembed ships. Built without it, the
//! crate still compiles and [`UnavailableProvider`] reports the degraded
//! state: every load fails with a clear cause and availability probes answer
//! `false`.

mod errors;
#[cfg(feature = "local")]
mod local;
mod provider;
mod registry;

pub use errors::ModelError;
#[cfg(feature = "local")]
pub use local::{FastembedModel, FastembedProvider};
pub use provider::{ModelProvider, TextEmbedder, UnavailableModel, UnavailableProvider};
pub use registry::ModelRegistry;
