//! Emotion scoring for text and audio.

mod lexicon;
mod openai;

use async_trait::async_trait;
use cooper_core::{AudioRef, EmotionVector, EMOTION_LABELS};
use serde_json::Value;

use crate::error::PipelineError;

pub use lexicon::{lexicon_emotions, LexiconTextAnalyzer};
pub use openai::{OpenAiTextAnalyzer, WhisperAudioAnalyzer};

/// Scores a block of text (transcript and comments).
#[async_trait]
pub trait TextEmotionAnalyzer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PipelineError::Analysis`] for an empty payload or a failed
    /// model call.
    async fn analyze_text(&self, text: &str) -> Result<EmotionVector, PipelineError>;
}

/// Scores the audio track of a video.
#[async_trait]
pub trait AudioEmotionAnalyzer: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PipelineError::Analysis`] if the audio cannot be fetched,
    /// transcribed or classified.
    async fn analyze_audio(&self, audio: &AudioRef) -> Result<EmotionVector, PipelineError>;
}

pub(crate) const EMOTION_SYSTEM_PROMPT: &str = "You are an expert in emotion analysis. \
Analyze the following text and determine the emotional content. \
Return a JSON object with the following emotions and their corresponding confidence scores (0.0-1.0): \
joy, sadness, anger, fear, surprise, disgust, neutral. \
The scores should sum to 1.0. Only return the JSON object, nothing else.";

/// Turn a model's JSON reply into an [`EmotionVector`].
///
/// Scores may be numbers or numeric strings. At least one canonical label
/// must carry a score.
pub(crate) fn parse_emotion_reply(reply: &Value) -> Result<EmotionVector, PipelineError> {
    let Value::Object(map) = reply else {
        return Err(PipelineError::Analysis(
            "model reply is not a JSON object".to_string(),
        ));
    };

    let scores: Vec<(String, f64)> = map
        .iter()
        .filter_map(|(label, value)| {
            let score = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            Some((label.to_lowercase(), score))
        })
        .collect();

    if !scores
        .iter()
        .any(|(label, _)| EMOTION_LABELS.contains(&label.as_str()))
    {
        return Err(PipelineError::Analysis(
            "model reply contains no emotion scores".to_string(),
        ));
    }

    Ok(EmotionVector::from_model_scores(scores))
}
