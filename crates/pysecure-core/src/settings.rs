use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Which instruction the generator sends. The output schema is the same for both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PromptVariant {
    Minimal,
    #[default]
    Hardened,
}

impl std::str::FromStr for PromptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minimal" => Ok(PromptVariant::Minimal),
            "hardened" | "security" => Ok(PromptVariant::Hardened),
            other => Err(format!("unknown prompt variant: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    #[serde(default)]
    pub variant: PromptVariant,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            variant: PromptVariant::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl AiSettings {
    /// Fill gaps from the process environment. An explicit key in the file wins
    /// over the generic `API_KEY`/`GEMINI_API_KEY` variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(p) = lookup("PYSECURE_PROVIDER").filter(|v| !v.is_empty()) {
            self.provider = p;
        }
        if let Some(m) = lookup("PYSECURE_MODEL").filter(|v| !v.is_empty()) {
            self.model = m;
        }
        if let Some(k) = lookup("PYSECURE_API_KEY").filter(|v| !v.is_empty()) {
            self.api_key = k;
            return;
        }
        if self.api_key.is_empty() {
            if let Some(k) = ["API_KEY", "GEMINI_API_KEY"]
                .iter()
                .find_map(|name| lookup(name).filter(|v| !v.is_empty()))
            {
                self.api_key = k;
            }
        }
    }

    /// Settings safe to print: the key is replaced by a marker.
    pub fn redacted(&self) -> serde_json::Value {
        serde_json::json!({
            "provider": self.provider,
            "model": self.model,
            "variant": self.variant,
            "hasKey": !self.api_key.is_empty(),
            "configured": ai_configured(self),
        })
    }
}

/// Resolve the settings directory (~/.pysecure/).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".pysecure")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn read_settings() -> AiSettings {
    read_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to defaults.
pub fn read_settings_from(path: &Path) -> AiSettings {
    if !path.exists() {
        return AiSettings::default();
    }
    match fs::read_to_string(path)
        .map_err(SettingsError::from)
        .and_then(|s| serde_json::from_str(&s).map_err(SettingsError::from))
    {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            AiSettings::default()
        }
    }
}

pub fn write_settings(settings: &AiSettings) -> Result<(), SettingsError> {
    write_settings_to(&settings_path(), settings)
}

pub fn write_settings_to(path: &Path, settings: &AiSettings) -> Result<(), SettingsError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let s = AiSettings::default();
        assert_eq!(s.provider, "google");
        assert_eq!(s.model, "gemini-3-flash-preview");
        assert_eq!(s.variant, PromptVariant::Hardened);
        assert!(!ai_configured(&s));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let s = AiSettings {
            provider: "ollama".into(),
            model: "llama3".into(),
            ..Default::default()
        };
        assert!(ai_configured(&s));
    }

    #[test]
    fn test_env_fills_missing_key() {
        let mut s = AiSettings::default();
        s.apply_env(env(&[("GEMINI_API_KEY", "g-key")]));
        assert_eq!(s.api_key, "g-key");

        let mut s = AiSettings::default();
        s.apply_env(env(&[("API_KEY", "a-key"), ("GEMINI_API_KEY", "g-key")]));
        assert_eq!(s.api_key, "a-key");
    }

    #[test]
    fn test_file_key_beats_generic_env() {
        let mut s = AiSettings {
            api_key: "file-key".into(),
            ..Default::default()
        };
        s.apply_env(env(&[("API_KEY", "a-key")]));
        assert_eq!(s.api_key, "file-key");

        s.apply_env(env(&[("PYSECURE_API_KEY", "explicit"), ("PYSECURE_MODEL", "m2")]));
        assert_eq!(s.api_key, "explicit");
        assert_eq!(s.model, "m2");
    }

    #[test]
    fn test_redacted_hides_key() {
        let s = AiSettings {
            api_key: "secret".into(),
            ..Default::default()
        };
        let shown = s.redacted().to_string();
        assert!(!shown.contains("secret"));
        assert!(shown.contains("\"hasKey\":true"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let s = AiSettings {
            provider: "openai".into(),
            api_key: "k".into(),
            model: "gpt-4o".into(),
            variant: PromptVariant::Minimal,
        };
        write_settings_to(&path, &s).unwrap();
        assert_eq!(read_settings_from(&path), s);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(read_settings_from(&path), AiSettings::default());
        assert_eq!(
            read_settings_from(&dir.path().join("missing.json")),
            AiSettings::default()
        );
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!("minimal".parse::<PromptVariant>().unwrap(), PromptVariant::Minimal);
        assert_eq!("hardened".parse::<PromptVariant>().unwrap(), PromptVariant::Hardened);
        assert!("other".parse::<PromptVariant>().is_err());
    }
}
