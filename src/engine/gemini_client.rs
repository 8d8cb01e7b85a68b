use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::engine::llm_client::{build_http_client, check_status, transport};
use crate::engine::narrative_service::NarrativeService;
use crate::engine::prompt_builder::PromptBuilder;
use crate::error::RequestError;
use crate::model::llm_decode::decode_narrative;
use crate::model::narrative::{NarrativeRequest, NarrativeResponse};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
    pub temperature: f32,
}

#[derive(Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
}

/// Narrator backed by the Gemini `generateContent` endpoint with a JSON
/// response schema.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<&str>,
        temperature: f32,
        timeout: Option<Duration>,
    ) -> Result<Self, RequestError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RequestError::MissingApiKey)?;

        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            temperature,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    pub fn content_request(&self, request: &NarrativeRequest) -> GenerateContentRequest {
        let prompt = PromptBuilder::build(request);

        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: prompt.system }],
            },
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: prompt.user }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".into(),
                response_schema: response_schema(),
                temperature: self.temperature,
            },
        }
    }
}

impl NarrativeService for GeminiClient {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeResponse, RequestError> {
        let body = self.content_request(request);
        debug!(model = %self.model, "sending generateContent");

        let resp: GenerateContentResponse = check_status(
            self.http
                .post(self.endpoint())
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send()
                .map_err(transport)?,
        )?
        .json()
        .map_err(|e| RequestError::Parse(e.to_string()))?;

        let text = candidate_text(resp)?;
        debug!(bytes = text.len(), "generateContent received");
        decode_narrative(&text)
    }
}

/// Concatenates the text parts of the first candidate.
fn candidate_text(resp: GenerateContentResponse) -> Result<String, RequestError> {
    let candidate = resp
        .candidates
        .into_iter()
        .next()
        .ok_or(RequestError::EmptyCompletion)?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(RequestError::EmptyCompletion);
    }
    Ok(text)
}

/// Schema the model must answer with.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "narrative": {
                "type": "STRING",
                "description": "The next part of the story describing the results of the player's action."
            },
            "choices": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "3 to 4 short choices for the player to take next."
            },
            "healthChange": {
                "type": "NUMBER",
                "description": "Positive or negative change to the player's health (e.g., -10 or +5)."
            },
            "xpReward": {
                "type": "NUMBER",
                "description": "Experience points gained from this interaction."
            },
            "inventoryUpdate": {
                "type": "OBJECT",
                "properties": {
                    "add": { "type": "ARRAY", "items": { "type": "STRING" } },
                    "remove": { "type": "ARRAY", "items": { "type": "STRING" } }
                },
                "required": ["add", "remove"]
            },
            "isGameOver": {
                "type": "BOOLEAN",
                "description": "True if the player died or reached a definitive bad/good ending."
            },
            "gameOverReason": {
                "type": "STRING",
                "description": "Optional summary of how the game ended."
            }
        },
        "required": ["narrative", "choices", "healthChange", "xpReward", "inventoryUpdate", "isGameOver"]
    })
}
