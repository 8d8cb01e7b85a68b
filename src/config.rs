//! Application configuration: a JSON file in the user config directory,
//! with a few environment overrides layered on top.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::session::DEFAULT_HISTORY_LIMIT;
use crate::error::ConfigError;

const APP_DIR: &str = "adventure_forge";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Gemini,
    OpenAiCompatible,
}

impl Backend {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Backend::Gemini),
            "openai" | "open_ai_compatible" | "lm_studio" => Some(Backend::OpenAiCompatible),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    pub gemini_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub temperature: f32,
    /// Recent actions sent along with each turn.
    pub history_limit: usize,
    /// Applied to the HTTP client; the session itself never times out.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Gemini,
            gemini_model: "gemini-3-flash-preview".into(),
            gemini_api_key: None,
            gemini_base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            openai_base_url: "http://localhost:1234".into(),
            openai_model: "local-model".into(),
            temperature: 0.7,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Loads the user's config, falling back to defaults, then applies
    /// environment overrides.
    pub fn load() -> Self {
        let path = config_path();
        let config = match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Self::default()
            }
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `GEMINI_API_KEY` wins over `API_KEY`; `ADVENTURE_BACKEND` picks the backend.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .filter(|k| !k.trim().is_empty());
        if key.is_some() {
            self.gemini_api_key = key;
        }

        if let Some(raw) = lookup("ADVENTURE_BACKEND") {
            match Backend::parse(&raw) {
                Some(backend) => self.backend = backend,
                None => warn!(value = %raw, "unknown ADVENTURE_BACKEND, keeping {:?}", self.backend),
            }
        }

        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Per-user directory holding config and UI settings.
pub fn app_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

pub fn config_path() -> PathBuf {
    app_config_dir().join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.backend, Backend::Gemini);
        assert_eq!(cfg.history_limit, 5);
        assert_eq!(cfg.gemini_model, "gemini-3-flash-preview");
        assert!(cfg.request_timeout().is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "backend": "open_ai_compatible", "temperature": 0.2 }"#).unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();

        assert_eq!(cfg.backend, Backend::OpenAiCompatible);
        assert_eq!(cfg.temperature, 0.2);
        assert_eq!(cfg.openai_base_url, "http://localhost:1234");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let cfg = AppConfig {
            request_timeout_secs: Some(30),
            ..AppConfig::default()
        };

        cfg.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();

        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn env_overrides_key_and_backend() {
        let cfg = AppConfig::default().with_env(|key| match key {
            "API_KEY" => Some("fallback".into()),
            "GEMINI_API_KEY" => Some("primary".into()),
            "ADVENTURE_BACKEND" => Some("lm_studio".into()),
            _ => None,
        });

        assert_eq!(cfg.gemini_api_key.as_deref(), Some("primary"));
        assert_eq!(cfg.backend, Backend::OpenAiCompatible);
    }

    #[test]
    fn blank_env_key_is_ignored() {
        let cfg = AppConfig {
            gemini_api_key: Some("from-file".into()),
            ..AppConfig::default()
        }
        .with_env(|key| (key == "GEMINI_API_KEY").then(|| "  ".to_string()));

        assert_eq!(cfg.gemini_api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn unknown_backend_is_ignored() {
        let cfg = AppConfig::default()
            .with_env(|key| (key == "ADVENTURE_BACKEND").then(|| "carrier-pigeon".to_string()));
        assert_eq!(cfg.backend, Backend::Gemini);
    }
}
