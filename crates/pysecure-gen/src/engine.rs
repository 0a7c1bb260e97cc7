use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::{ChatMessage, StructuredOutputFormat};

use pysecure_core::AiSettings;

use crate::{GenerateError, GenerationRequest};

/// One request in, one raw response body out.
#[async_trait]
pub trait CompletionEngine: Send + Sync {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerateError>;
}

pub(crate) fn map_backend(provider: &str) -> Result<LLMBackend, GenerateError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(GenerateError::Config(format!("unknown provider: {other}"))),
    }
}

/// Engine backed by the `llm` crate with structured JSON output.
pub struct LlmEngine {
    settings: AiSettings,
}

impl LlmEngine {
    pub fn new(settings: AiSettings) -> Result<Self, GenerateError> {
        map_backend(&settings.provider)?;
        if !pysecure_core::ai_configured(&settings) {
            return Err(GenerateError::Config(format!(
                "no API key configured for provider {}; set API_KEY or run `pysecure settings --api-key`",
                settings.provider
            )));
        }
        Ok(Self { settings })
    }
}

#[async_trait]
impl CompletionEngine for LlmEngine {
    async fn complete(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        let backend = map_backend(&self.settings.provider)?;

        let format: StructuredOutputFormat = serde_json::from_value(serde_json::json!({
            "name": "project_bundle",
            "description": "Generated Python login project with documentation and mental map",
            "schema": request.schema,
            "strict": true,
        }))
        .map_err(|e| GenerateError::Config(format!("output schema: {e}")))?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.settings.model)
            .schema(format);

        if !self.settings.api_key.is_empty() {
            builder = builder.api_key(&self.settings.api_key);
        }

        let llm = builder
            .build()
            .map_err(|e| GenerateError::Config(format!("build LLM: {e}")))?;

        let messages = vec![ChatMessage::user().content(&request.prompt).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| GenerateError::Transport(format!("chat: {e}")))?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(GenerateError::EmptyResponse),
        }
    }
}

/// Replays canned outcomes in order. Used by tests and offline demos.
pub struct ScriptedEngine {
    replies: Mutex<VecDeque<Result<String, GenerateError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedEngine {
    pub fn new(replies: impl IntoIterator<Item = Result<String, GenerateError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hold every reply back for `delay` before returning it.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionEngine for ScriptedEngine {
    async fn complete(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .replies
            .lock()
            .map_err(|_| GenerateError::Transport("scripted engine poisoned".to_string()))?
            .pop_front();
        next.unwrap_or_else(|| Err(GenerateError::Transport("no scripted reply left".to_string())))
    }
}
