//! Model-backed analyzers.

use async_trait::async_trait;
use cooper_core::{AudioRef, EmotionVector};

use super::{parse_emotion_reply, AudioEmotionAnalyzer, TextEmotionAnalyzer, EMOTION_SYSTEM_PROMPT};
use crate::error::PipelineError;
use crate::openai::{ChatRequest, OpenAiClient};

/// Text analyzer asking a chat model for emotion scores.
pub struct OpenAiTextAnalyzer {
    client: OpenAiClient,
    model: String,
}

impl OpenAiTextAnalyzer {
    #[must_use]
    pub fn new(client: OpenAiClient, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

async fn classify(
    client: &OpenAiClient,
    model: &str,
    text: &str,
) -> Result<EmotionVector, PipelineError> {
    let reply = client
        .chat_json(ChatRequest {
            model,
            system: EMOTION_SYSTEM_PROMPT,
            user: text,
            temperature: 0.0,
            json_mode: true,
        })
        .await
        .map_err(|e| PipelineError::Analysis(format!("emotion model call failed: {e}")))?;
    parse_emotion_reply(&reply)
}

#[async_trait]
impl TextEmotionAnalyzer for OpenAiTextAnalyzer {
    async fn analyze_text(&self, text: &str) -> Result<EmotionVector, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::Analysis("text payload is empty".to_string()));
        }
        classify(&self.client, &self.model, text).await
    }
}

/// Audio analyzer: download, transcribe with Whisper, classify the transcript.
pub struct WhisperAudioAnalyzer {
    client: OpenAiClient,
    transcription_model: String,
    chat_model: String,
}

impl WhisperAudioAnalyzer {
    #[must_use]
    pub fn new(client: OpenAiClient, transcription_model: &str, chat_model: &str) -> Self {
        Self {
            client,
            transcription_model: transcription_model.to_string(),
            chat_model: chat_model.to_string(),
        }
    }
}

#[async_trait]
impl AudioEmotionAnalyzer for WhisperAudioAnalyzer {
    async fn analyze_audio(&self, audio: &AudioRef) -> Result<EmotionVector, PipelineError> {
        let bytes = self
            .client
            .http()
            .get(&audio.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| PipelineError::Analysis(format!("audio download failed: {e}")))?
            .bytes()
            .await
            .map_err(|e| PipelineError::Analysis(format!("audio download failed: {e}")))?;

        if bytes.is_empty() {
            return Err(PipelineError::Analysis("audio payload is empty".to_string()));
        }

        let transcript = self
            .client
            .transcribe(&self.transcription_model, bytes.to_vec(), &file_name(&audio.url))
            .await
            .map_err(|e| PipelineError::Analysis(format!("transcription failed: {e}")))?;

        if transcript.trim().is_empty() {
            return Err(PipelineError::Analysis(
                "transcription produced no text".to_string(),
            ));
        }

        let prompt = format!("Audio transcript: {transcript}");
        classify(&self.client, &self.chat_model, &prompt).await
    }
}

/// Whisper infers the format from the file extension.
fn file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/')
        .next()
        .filter(|name| name.contains('.'))
        .map_or_else(|| "audio.mp3".to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::file_name;

    #[test]
    fn file_name_keeps_extension() {
        assert_eq!(file_name("https://cdn.example.com/a/track.m4a?sig=1"), "track.m4a");
    }

    #[test]
    fn file_name_defaults_to_mp3() {
        assert_eq!(file_name("https://cdn.example.com/stream"), "audio.mp3");
    }
}
