use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, Backend};
use crate::engine::gemini_client::GeminiClient;
use crate::engine::llm_client::OpenAiCompatibleClient;
use crate::error::RequestError;
use crate::model::narrative::{NarrativeRequest, NarrativeResponse};

/// A backend that turns a player request into the next story beat.
///
/// Calls block until the backend answers or fails; the engine always invokes
/// them off the UI thread.
pub trait NarrativeService: Send + Sync {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeResponse, RequestError>;
}

impl<T: NarrativeService + ?Sized> NarrativeService for Arc<T> {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeResponse, RequestError> {
        (**self).generate(request)
    }
}

/// Stands in for a backend that could not be built, so the failure reaches
/// the player through the normal error path.
pub struct UnavailableNarrator(pub RequestError);

impl NarrativeService for UnavailableNarrator {
    fn generate(&self, _request: &NarrativeRequest) -> Result<NarrativeResponse, RequestError> {
        Err(self.0.clone())
    }
}

/// Builds the backend selected in the config.
pub fn narrator_from_config(config: &AppConfig) -> Result<Arc<dyn NarrativeService>, RequestError> {
    let timeout = config.request_timeout();
    let narrator: Arc<dyn NarrativeService> = match config.backend {
        Backend::Gemini => Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            &config.gemini_model,
            config.gemini_api_key.as_deref(),
            config.temperature,
            timeout,
        )?),
        Backend::OpenAiCompatible => Arc::new(OpenAiCompatibleClient::new(
            &config.openai_base_url,
            &config.openai_model,
            config.temperature,
            timeout,
        )?),
    };
    info!(backend = ?config.backend, "narrative backend ready");
    Ok(narrator)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gemini_backend_requires_a_key() {
        let config = AppConfig {
            gemini_api_key: None,
            ..AppConfig::default()
        };
        assert_eq!(
            narrator_from_config(&config).err(),
            Some(RequestError::MissingApiKey)
        );
    }

    #[test]
    fn local_backend_needs_no_key() {
        let config = AppConfig {
            backend: Backend::OpenAiCompatible,
            ..AppConfig::default()
        };
        assert!(narrator_from_config(&config).is_ok());
    }
}
