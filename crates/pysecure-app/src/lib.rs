//! # pysecure
//!
//! Application layer: the shell state machine, the bundle viewer, the login
//! preview and the clipboard adapter. `main.rs` drives these from the CLI.

pub mod clipboard;
pub mod login;
pub mod shell;
pub mod view;

use pysecure_core::{AiSettings, PromptVariant};
use pysecure_gen::{GenerateError, Generator};

pub use clipboard::{Clipboard, ClipboardError, MemoryClipboard, SystemClipboard};
pub use login::{LoginForm, Submission};
pub use shell::{Action, Effect, Screen, Shell, ShellError, Tab, Ticket, COPY_FEEDBACK};

/// Settings file merged with the process environment.
pub fn load_settings() -> AiSettings {
    let mut settings = pysecure_core::read_settings();
    settings.apply_env(|name| std::env::var(name).ok());
    settings
}

/// Field updates for the settings file. `None` leaves a field alone.
#[derive(Debug, Default, Clone)]
pub struct SettingsUpdate {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub variant: Option<PromptVariant>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.model.is_none()
            && self.api_key.is_none()
            && self.variant.is_none()
    }

    /// An empty key means "keep the stored one".
    pub fn apply(self, settings: &mut AiSettings) {
        if let Some(provider) = self.provider {
            settings.provider = provider;
        }
        if let Some(model) = self.model {
            settings.model = model;
        }
        if let Some(key) = self.api_key.filter(|k| !k.is_empty()) {
            settings.api_key = key;
        }
        if let Some(variant) = self.variant {
            settings.variant = variant;
        }
    }
}

/// Generator for the given settings, refusing early when no model is configured.
pub fn generator_for(settings: &AiSettings) -> Result<Generator, GenerateError> {
    if !pysecure_core::ai_configured(settings) {
        return Err(GenerateError::Config(
            "AI not configured. Set an API key with `pysecure settings --api-key` \
             or the GEMINI_API_KEY environment variable."
                .to_string(),
        ));
    }
    Generator::from_settings(settings)
}
