//! Minimal `OpenAI` REST client: JSON-mode chat completions and Whisper
//! transcription.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PipelineError;

const SERVICE: &str = "openai";

/// One chat completion request whose reply is expected to be a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub system: &'a str,
    pub user: &'a str,
    pub temperature: f32,
    /// Ask the API to enforce a JSON object reply.
    pub json_mode: bool,
}

#[derive(Serialize)]
struct ChatBody<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// HTTP client for the `OpenAI` API.
#[derive(Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Run a chat completion and parse the reply content as JSON.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Http`] on network failure.
    /// - [`PipelineError::UpstreamUnavailable`] on a non-2xx status.
    /// - [`PipelineError::Deserialize`] if the envelope or the reply content
    ///   is not valid JSON.
    pub async fn chat_json(&self, request: ChatRequest<'_>) -> Result<Value, PipelineError> {
        let body = ChatBody {
            model: request.model,
            messages: [
                Message {
                    role: "system",
                    content: request.system,
                },
                Message {
                    role: "user",
                    content: request.user,
                },
            ],
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::upstream(
                SERVICE,
                format!("chat completion returned status {}", response.status()),
            ));
        }

        let raw = response.text().await?;
        let parsed: ChatResponse =
            serde_json::from_str(&raw).map_err(|e| PipelineError::Deserialize {
                context: "chat completion envelope".to_string(),
                source: e,
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        serde_json::from_str(strip_code_fence(&content)).map_err(|e| PipelineError::Deserialize {
            context: "chat completion content".to_string(),
            source: e,
        })
    }

    /// Transcribe an audio file.
    ///
    /// # Errors
    ///
    /// Same failure classes as [`OpenAiClient::chat_json`].
    pub async fn transcribe(
        &self,
        model: &str,
        audio: Vec<u8>,
        file_name: &str,
    ) -> Result<String, PipelineError> {
        let part = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("model", model.to_string())
            .part("file", part);

        let response = self
            .client
            .post(format!("{}/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PipelineError::upstream(
                SERVICE,
                format!("transcription returned status {}", response.status()),
            ));
        }

        let raw = response.text().await?;
        let parsed: TranscriptionResponse =
            serde_json::from_str(&raw).map_err(|e| PipelineError::Deserialize {
                context: "transcription".to_string(),
                source: e,
            })?;
        Ok(parsed.text)
    }
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
