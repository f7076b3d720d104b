//! The action dispatcher.
//!
//! [`Dispatcher::handle`] is a total function from decoded request to
//! response: every fault on the way (validation, model resolution, loading,
//! computation) is converted into a failure response carrying the error
//! message and its cause chain. The dispatcher owns the model registry, the
//! one piece of state that outlives a request.

use bobbin_embed::{ModelProvider, ModelRegistry};
use tracing::{debug, warn};

use super::DISPATCH_TARGET;
use super::errors::DispatchError;
use super::request::{Action, RequestEnvelope};
use super::response::Response;

/// Routes decoded requests to their action handlers.
#[derive(Debug)]
pub(crate) struct Dispatcher<P: ModelProvider> {
    registry: ModelRegistry<P>,
    default_model: String,
}

impl<P: ModelProvider> Dispatcher<P> {
    /// Creates a dispatcher over the given provider.
    pub(crate) fn new(provider: P, default_model: String) -> Self {
        Self {
            registry: ModelRegistry::new(provider),
            default_model,
        }
    }

    /// Handles one request, always producing exactly one response.
    pub(crate) fn handle(&mut self, envelope: &RequestEnvelope) -> Response {
        let id = envelope.request_id();
        debug!(
            target: DISPATCH_TARGET,
            id = %id,
            action = envelope.action_name(),
            "dispatching request"
        );
        match self.dispatch(envelope, &id) {
            Ok(response) => response,
            Err(error) => {
                warn!(target: DISPATCH_TARGET, id = %id, error = %error, "request failed");
                Response::failure(Some(id), &error)
            }
        }
    }

    fn dispatch(
        &mut self,
        envelope: &RequestEnvelope,
        id: &str,
    ) -> Result<Response, DispatchError> {
        match envelope.action()? {
            Action::Ping => Ok(Response::pong(
                id.to_owned(),
                self.registry.backend_available(),
            )),
            Action::Shutdown => Ok(Response::shutdown(id.to_owned())),
            Action::Embed => self.embed(envelope, id),
        }
    }

    fn embed(&mut self, envelope: &RequestEnvelope, id: &str) -> Result<Response, DispatchError> {
        let texts = envelope.texts().ok_or(DispatchError::MissingTexts)?;
        let model = envelope.model_name(&self.default_model).to_owned();

        self.registry.ensure_loaded(&model)?;
        let embeddings = self.registry.embed(texts)?;
        Ok(Response::embedded(id.to_owned(), embeddings))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use bobbin_embed::{ModelError, TextEmbedder, UnavailableProvider};
    use rstest::{fixture, rstest};

    use super::*;

    const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";

    /// Provider yielding fixed-dimension stub models, recording every load.
    #[derive(Debug, Default, Clone)]
    struct StubProvider {
        loads: Rc<RefCell<Vec<String>>>,
        fail_for: Option<String>,
    }

    impl StubProvider {
        fn failing_for(name: &str) -> Self {
            Self {
                loads: Rc::default(),
                fail_for: Some(name.to_owned()),
            }
        }

        fn loads(&self) -> Vec<String> {
            self.loads.borrow().clone()
        }
    }

    #[derive(Debug)]
    struct StubModel;

    impl TextEmbedder for StubModel {
        fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
            Ok(texts
                .iter()
                .map(|text| vec![text.len() as f32, 0.0, 1.0, 2.0])
                .collect())
        }
    }

    impl ModelProvider for StubProvider {
        type Model = StubModel;

        fn available(&self) -> bool {
            true
        }

        fn load(&self, name: &str) -> Result<StubModel, ModelError> {
            if self.fail_for.as_deref() == Some(name) {
                return Err(ModelError::unknown(name));
            }
            self.loads.borrow_mut().push(name.to_owned());
            Ok(StubModel)
        }
    }

    fn envelope(line: &str) -> RequestEnvelope {
        RequestEnvelope::parse(line.as_bytes()).expect("test request should parse")
    }

    #[fixture]
    fn dispatcher() -> (Dispatcher<StubProvider>, StubProvider) {
        let provider = StubProvider::default();
        let inspector = provider.clone();
        (
            Dispatcher::new(provider, DEFAULT_MODEL.to_owned()),
            inspector,
        )
    }

    #[rstest]
    fn ping_succeeds_without_touching_the_registry(
        dispatcher: (Dispatcher<StubProvider>, StubProvider),
    ) {
        let (mut dispatcher, inspector) = dispatcher;
        let response = dispatcher.handle(&envelope(r#"{"id":"p1","action":"ping"}"#));

        assert!(response.success);
        assert_eq!(response.id.as_deref(), Some("p1"));
        assert_eq!(response.pong, Some(true));
        assert_eq!(response.backend_available, Some(true));
        assert!(inspector.loads().is_empty());
    }

    #[rstest]
    fn ping_reports_an_unavailable_backend() {
        let mut dispatcher = Dispatcher::new(UnavailableProvider::new(), DEFAULT_MODEL.to_owned());
        let response = dispatcher.handle(&envelope(r#"{"action":"ping"}"#));

        assert!(response.success);
        assert_eq!(response.backend_available, Some(false));
    }

    #[rstest]
    fn embed_preserves_count_and_order(dispatcher: (Dispatcher<StubProvider>, StubProvider)) {
        let (mut dispatcher, _) = dispatcher;
        let response = dispatcher.handle(&envelope(
            r#"{"id":"e1","action":"embed","texts":["hi","there"],"model":"minilm"}"#,
        ));

        assert!(response.success);
        assert_eq!(response.count, Some(2));
        assert_eq!(response.dimensions, Some(4));
        let embeddings = response.embeddings.expect("embeddings present");
        // The stub encodes the text length into the first component.
        assert_eq!(embeddings[0][0], 2.0);
        assert_eq!(embeddings[1][0], 5.0);
    }

    #[rstest]
    fn embed_without_texts_fails_validation(
        dispatcher: (Dispatcher<StubProvider>, StubProvider),
    ) {
        let (mut dispatcher, inspector) = dispatcher;
        let response = dispatcher.handle(&envelope(r#"{"id":"e2","action":"embed"}"#));

        assert!(!response.success);
        assert_eq!(response.id.as_deref(), Some("e2"));
        assert_eq!(response.error.as_deref(), Some("no texts provided"));
        assert!(inspector.loads().is_empty());
    }

    #[rstest]
    fn embed_with_empty_texts_fails_validation(
        dispatcher: (Dispatcher<StubProvider>, StubProvider),
    ) {
        let (mut dispatcher, _) = dispatcher;
        let response =
            dispatcher.handle(&envelope(r#"{"id":"e3","action":"embed","texts":[]}"#));

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("no texts provided"));
    }

    #[rstest]
    fn embed_defaults_to_the_configured_model(
        dispatcher: (Dispatcher<StubProvider>, StubProvider),
    ) {
        let (mut dispatcher, inspector) = dispatcher;
        let response =
            dispatcher.handle(&envelope(r#"{"id":"e4","action":"embed","texts":["x"]}"#));

        assert!(response.success);
        assert_eq!(inspector.loads(), vec![DEFAULT_MODEL.to_owned()]);
    }

    #[rstest]
    fn repeated_embeds_reuse_the_loaded_model(
        dispatcher: (Dispatcher<StubProvider>, StubProvider),
    ) {
        let (mut dispatcher, inspector) = dispatcher;
        let embed = r#"{"action":"embed","texts":["x"],"model":"minilm"}"#;
        dispatcher.handle(&envelope(embed));
        dispatcher.handle(&envelope(embed));
        dispatcher.handle(&envelope(r#"{"action":"embed","texts":["x"],"model":"bge"}"#));

        assert_eq!(inspector.loads(), vec!["minilm".to_owned(), "bge".to_owned()]);
    }

    #[rstest]
    fn failed_model_load_becomes_a_failure_response() {
        let mut dispatcher = Dispatcher::new(
            StubProvider::failing_for("missing"),
            DEFAULT_MODEL.to_owned(),
        );
        let response = dispatcher.handle(&envelope(
            r#"{"id":"e5","action":"embed","texts":["x"],"model":"missing"}"#,
        ));

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("unknown model: missing"));
    }

    #[rstest]
    fn unknown_action_names_the_value(dispatcher: (Dispatcher<StubProvider>, StubProvider)) {
        let (mut dispatcher, _) = dispatcher;
        let response = dispatcher.handle(&envelope(r#"{"id":"u1","action":"train"}"#));

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("unknown action: train"));
    }

    #[rstest]
    fn missing_action_is_reported_as_unknown(
        dispatcher: (Dispatcher<StubProvider>, StubProvider),
    ) {
        let (mut dispatcher, _) = dispatcher;
        let response = dispatcher.handle(&envelope(r#"{"id":"u2"}"#));

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("unknown action: unknown"));
    }

    #[rstest]
    fn shutdown_sets_the_stop_flag(dispatcher: (Dispatcher<StubProvider>, StubProvider)) {
        let (mut dispatcher, _) = dispatcher;
        let response = dispatcher.handle(&envelope(r#"{"id":"s1","action":"shutdown"}"#));

        assert!(response.success);
        assert!(response.is_shutdown());
        assert_eq!(response.id.as_deref(), Some("s1"));
    }
}
