pub mod engine;
mod parse;
pub mod prompt;
pub mod schema;

use std::sync::Arc;

use pysecure_core::{AiSettings, BundleError, ProjectBundle, PromptVariant};

pub use engine::{CompletionEngine, LlmEngine, ScriptedEngine};
pub use parse::parse_response;
pub use schema::SchemaDialect;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("configuration: {0}")]
    Config(String),

    #[error("transport: {0}")]
    Transport(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Malformed(#[from] BundleError),
}

/// Everything sent to the service for one generation: the fixed instruction
/// plus the strict output schema.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub variant: PromptVariant,
    pub prompt: String,
    pub schema: serde_json::Value,
}

impl GenerationRequest {
    pub fn build(variant: PromptVariant, dialect: SchemaDialect) -> Self {
        Self {
            variant,
            prompt: prompt::instruction(variant),
            schema: schema::bundle_schema(dialect),
        }
    }
}

/// Generation client. Cheap to clone; clones share the engine.
#[derive(Clone)]
pub struct Generator {
    engine: Arc<dyn CompletionEngine>,
    variant: PromptVariant,
    dialect: SchemaDialect,
}

impl Generator {
    pub fn new(
        engine: Arc<dyn CompletionEngine>,
        variant: PromptVariant,
        dialect: SchemaDialect,
    ) -> Self {
        Self {
            engine,
            variant,
            dialect,
        }
    }

    /// Build a generator talking to the configured provider.
    pub fn from_settings(settings: &AiSettings) -> Result<Self, GenerateError> {
        let engine = LlmEngine::new(settings.clone())?;
        Ok(Self::new(
            Arc::new(engine),
            settings.variant,
            SchemaDialect::for_provider(&settings.provider),
        ))
    }

    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    pub fn request(&self) -> GenerationRequest {
        GenerationRequest::build(self.variant, self.dialect)
    }

    /// Issue exactly one request and validate the reply. No retries.
    pub async fn generate(&self) -> Result<ProjectBundle, GenerateError> {
        let request = self.request();
        tracing::info!(variant = ?self.variant, dialect = ?self.dialect, "requesting project bundle");

        let raw = self.engine.complete(&request).await?;
        tracing::debug!(bytes = raw.len(), "received generation response");

        let bundle = parse_response(&raw)?;
        tracing::info!(
            files = bundle.files.len(),
            nodes = bundle.mental_map.nodes.len(),
            links = bundle.mental_map.links.len(),
            "project bundle accepted"
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{
        "files": [{"name": "main.py", "content": "import gui", "description": "Entrada"}],
        "documentation": "Docs",
        "mentalMap": {
            "nodes": [{"id": "main", "label": "main.py", "type": "file"}],
            "links": []
        }
    }"#;

    fn generator(engine: Arc<ScriptedEngine>) -> Generator {
        Generator::new(engine, PromptVariant::Hardened, SchemaDialect::Gemini)
    }

    #[tokio::test]
    async fn test_generate_success() {
        let engine = Arc::new(ScriptedEngine::new([Ok(GOOD.to_string())]));
        let bundle = generator(engine.clone()).generate().await.unwrap();
        assert_eq!(bundle.files.len(), 1);
        assert_eq!(bundle.documentation, "Docs");
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let engine = Arc::new(ScriptedEngine::new([
            Err(GenerateError::Transport("unreachable".into())),
            Ok(GOOD.to_string()),
        ]));
        let err = generator(engine.clone()).generate().await.unwrap_err();
        assert!(matches!(err, GenerateError::Transport(_)));
        assert_eq!(engine.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_fails_whole_bundle() {
        let raw = r#"{"files": [{"name": "main.py"}], "documentation": "", "mentalMap": {"nodes": [], "links": []}}"#;
        let engine = Arc::new(ScriptedEngine::new([Ok(raw.to_string())]));
        let err = generator(engine).generate().await.unwrap_err();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }

    #[test]
    fn test_request_carries_prompt_and_schema() {
        let engine = Arc::new(ScriptedEngine::new([]));
        let req = generator(engine).request();
        assert_eq!(req.variant, PromptVariant::Hardened);
        assert!(req.prompt.contains("security.py"));
        assert_eq!(req.schema["type"], "OBJECT");
    }

    #[test]
    fn test_from_settings_requires_key() {
        assert!(matches!(
            Generator::from_settings(&AiSettings::default()),
            Err(GenerateError::Config(_))
        ));
    }
}
