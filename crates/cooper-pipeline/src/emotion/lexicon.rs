//! Offline emotion lexicon scorer.

use std::collections::BTreeMap;

use async_trait::async_trait;
use cooper_core::{EmotionVector, EMOTION_LABELS};

use super::TextEmotionAnalyzer;
use crate::error::PipelineError;

/// Word → (emotion label, weight).
///
/// Keys are lowercase single words. Weights are positive; per-label totals
/// are normalised so the final scores sum to `1.0`.
pub(crate) const LEXICON: &[(&str, &str, f64)] = &[
    // joy
    ("love", "joy", 1.0),
    ("loved", "joy", 1.0),
    ("amazing", "joy", 0.9),
    ("awesome", "joy", 0.9),
    ("great", "joy", 0.7),
    ("happy", "joy", 1.0),
    ("fun", "joy", 0.7),
    ("funny", "joy", 0.8),
    ("beautiful", "joy", 0.7),
    ("best", "joy", 0.7),
    ("excited", "joy", 0.9),
    ("delicious", "joy", 0.7),
    ("nice", "joy", 0.5),
    ("helpful", "joy", 0.5),
    // sadness
    ("sad", "sadness", 1.0),
    ("cried", "sadness", 0.9),
    ("crying", "sadness", 0.9),
    ("miss", "sadness", 0.6),
    ("lonely", "sadness", 0.9),
    ("heartbreaking", "sadness", 1.0),
    ("depressing", "sadness", 0.9),
    ("sorry", "sadness", 0.5),
    // anger
    ("angry", "anger", 1.0),
    ("hate", "anger", 1.0),
    ("furious", "anger", 1.0),
    ("annoying", "anger", 0.7),
    ("worst", "anger", 0.7),
    ("ridiculous", "anger", 0.6),
    ("scam", "anger", 0.8),
    // fear
    ("scared", "fear", 1.0),
    ("scary", "fear", 0.9),
    ("afraid", "fear", 1.0),
    ("worried", "fear", 0.7),
    ("terrifying", "fear", 1.0),
    ("dangerous", "fear", 0.7),
    ("nervous", "fear", 0.6),
    // surprise
    ("wow", "surprise", 0.9),
    ("omg", "surprise", 0.9),
    ("unexpected", "surprise", 0.8),
    ("shocked", "surprise", 1.0),
    ("surprised", "surprise", 1.0),
    ("unbelievable", "surprise", 0.8),
    // disgust
    ("gross", "disgust", 1.0),
    ("disgusting", "disgust", 1.0),
    ("nasty", "disgust", 0.8),
    ("ew", "disgust", 0.8),
    ("yuck", "disgust", 0.9),
];

/// Score text using the emotion lexicon.
///
/// Splits text into lowercase words, sums matching weights per label and
/// normalises. Text with no lexicon words is fully `neutral`. Returns `None`
/// for empty or whitespace-only text.
#[must_use]
pub fn lexicon_emotions(text: &str) -> Option<EmotionVector> {
    if text.trim().is_empty() {
        return None;
    }

    let mut totals: BTreeMap<&str, f64> = EMOTION_LABELS.iter().map(|l| (*l, 0.0)).collect();
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if let Some(&(_, label, weight)) = LEXICON.iter().find(|(lex, _, _)| *lex == w) {
            *totals.entry(label).or_insert(0.0) += weight;
        }
    }

    let sum: f64 = totals.values().sum();
    if sum <= 0.0 {
        totals.insert("neutral", 1.0);
        return Some(EmotionVector::from_model_scores(totals));
    }

    Some(EmotionVector::from_model_scores(
        totals.into_iter().map(|(label, total)| (label, total / sum)),
    ))
}

/// Deterministic [`TextEmotionAnalyzer`] needing no network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconTextAnalyzer;

#[async_trait]
impl TextEmotionAnalyzer for LexiconTextAnalyzer {
    async fn analyze_text(&self, text: &str) -> Result<EmotionVector, PipelineError> {
        lexicon_emotions(text)
            .ok_or_else(|| PipelineError::Analysis("text payload is empty".to_string()))
    }
}
