use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::narrative_service::NarrativeService;
use crate::engine::prompt_builder::PromptBuilder;
use crate::error::RequestError;
use crate::model::llm_decode::decode_narrative;
use crate::model::narrative::{NarrativeRequest, NarrativeResponse};

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
}

/// Narrator backed by an OpenAI-style chat completions server such as LM Studio.
pub struct OpenAiCompatibleClient {
    http: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: &str,
        model: &str,
        temperature: f32,
        timeout: Option<Duration>,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            temperature,
        })
    }

    pub fn chat_request(&self, request: &NarrativeRequest) -> ChatCompletionRequest {
        let prompt = PromptBuilder::build(request);

        ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user".into(),
                    content: prompt.user,
                },
            ],
        }
    }

    pub fn test_connection(&self) -> Result<String, RequestError> {
        let resp: serde_json::Value = check_status(
            self.http
                .get(format!("{}/v1/models", self.base_url))
                .send()
                .map_err(transport)?,
        )?
        .json()
        .map_err(|e| RequestError::Parse(e.to_string()))?;

        Ok(format!(
            "Connected ({} models available)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

impl NarrativeService for OpenAiCompatibleClient {
    fn generate(&self, request: &NarrativeRequest) -> Result<NarrativeResponse, RequestError> {
        let req = self.chat_request(request);
        debug!(model = %req.model, chars = req.messages.iter().map(|m| m.content.len()).sum::<usize>(), "sending chat completion");

        let resp: ChatCompletionResponse = check_status(
            self.http
                .post(format!("{}/v1/chat/completions", self.base_url))
                .json(&req)
                .send()
                .map_err(transport)?,
        )?
        .json()
        .map_err(|e| RequestError::Parse(e.to_string()))?;

        let content = completion_text(resp)?;
        debug!(bytes = content.len(), "chat completion received");
        decode_narrative(&content)
    }
}

fn completion_text(resp: ChatCompletionResponse) -> Result<String, RequestError> {
    resp.choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or(RequestError::EmptyCompletion)
}

pub(crate) fn build_http_client(timeout: Option<Duration>) -> Result<Client, RequestError> {
    Client::builder().timeout(timeout).build().map_err(transport)
}

pub(crate) fn transport(err: reqwest::Error) -> RequestError {
    RequestError::Transport(err.to_string())
}

pub(crate) fn check_status(resp: Response) -> Result<Response, RequestError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(RequestError::Status {
        status: status.as_u16(),
        body: resp.text().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::game_state::{PlayerState, Theme};

    #[test]
    fn chat_request_has_system_then_user() {
        let client =
            OpenAiCompatibleClient::new("http://localhost:1234/", "local-model", 0.7, None).unwrap();
        let player = PlayerState::new("Ada", Theme::Fantasy).unwrap();

        let req = client.chat_request(&NarrativeRequest::start(player));
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "local-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("High Fantasy Medieval"));
        assert_eq!(client.base_url, "http://localhost:1234");
    }

    #[test]
    fn first_choice_content_is_used() {
        let resp: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"content":"first"}},{"message":{"content":"second"}}]}"#,
        )
        .unwrap();
        assert_eq!(completion_text(resp).unwrap(), "first");
    }

    #[test]
    fn no_choices_is_empty_completion() {
        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            completion_text(resp),
            Err(RequestError::EmptyCompletion)
        ));
    }
}
