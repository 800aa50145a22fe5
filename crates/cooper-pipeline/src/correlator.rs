//! Emotion/engagement correlation.
//!
//! Pure computation over already-collected records. The only failure is a
//! label mismatch between a video's text and audio vectors.

use std::collections::BTreeMap;

use cooper_core::{CorrelationResult, EmotionVector, Engagement, Trend, ENGAGEMENT_FIELDS};

use crate::error::PipelineError;

/// Fewest videos for which a cross-video coefficient is reported.
const MIN_TREND_VIDEOS: usize = 3;

/// Everything the correlator needs for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationInput {
    pub video_id: String,
    pub text: EmotionVector,
    pub audio: Option<EmotionVector>,
    pub engagement: Engagement,
    pub comment_count: usize,
}

/// Scores how strongly a video's emotion signal relates to its engagement.
pub trait CorrelationScorer: Send + Sync {
    fn magnitude(&self, combined: &EmotionVector, engagement: &Engagement) -> f64;
}

/// `dominant_score * engagement_rate`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EngagementWeightedScorer;

impl CorrelationScorer for EngagementWeightedScorer {
    fn magnitude(&self, combined: &EmotionVector, engagement: &Engagement) -> f64 {
        let dominant = combined.dominant().map_or(0.0, |(_, score)| score);
        dominant * engagement.engagement_rate()
    }
}

pub struct Correlator {
    scorer: Box<dyn CorrelationScorer>,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new(Box::new(EngagementWeightedScorer))
    }
}

impl Correlator {
    #[must_use]
    pub fn new(scorer: Box<dyn CorrelationScorer>) -> Self {
        Self { scorer }
    }

    /// Correlate a single video.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidInput`] if the text and audio vectors
    /// have different label sets.
    pub fn correlate_one(&self, input: &CorrelationInput) -> Result<CorrelationResult, PipelineError> {
        let combined = match &input.audio {
            Some(audio) => input.text.average(audio).map_err(|e| {
                PipelineError::InvalidInput(format!("video {}: {e}", input.video_id))
            })?,
            None => input.text.clone(),
        };

        let (dominant_emotion, dominant_score) = combined
            .dominant()
            .map(|(label, score)| (label.to_string(), score))
            .ok_or_else(|| {
                PipelineError::InvalidInput(format!("video {}: empty emotion vector", input.video_id))
            })?;

        let magnitude = self.scorer.magnitude(&combined, &input.engagement);
        let metrics = ratio_metrics(&combined, &input.engagement, input.comment_count);

        Ok(CorrelationResult {
            video_id: input.video_id.clone(),
            engagement_rate: input.engagement.engagement_rate(),
            combined,
            dominant_emotion,
            dominant_score,
            magnitude,
            metrics,
        })
    }

    /// Correlate a batch, preserving input order.
    ///
    /// # Errors
    ///
    /// Fails on the first input with mismatched label sets.
    pub fn correlate(
        &self,
        inputs: &[CorrelationInput],
    ) -> Result<Vec<CorrelationResult>, PipelineError> {
        inputs.iter().map(|input| self.correlate_one(input)).collect()
    }

    /// Pearson correlation between each emotion's score and engagement rate
    /// across videos, strongest first.
    ///
    /// Needs at least three videos; labels with no variance are omitted.
    #[must_use]
    pub fn trends(results: &[CorrelationResult]) -> Vec<Trend> {
        if results.len() < MIN_TREND_VIDEOS {
            return Vec::new();
        }

        let rates: Vec<f64> = results.iter().map(|r| r.engagement_rate).collect();
        let mut trends: Vec<Trend> = results[0]
            .combined
            .labels()
            .filter_map(|label| {
                let scores: Vec<f64> = results
                    .iter()
                    .map(|r| r.combined.get(label).unwrap_or(0.0))
                    .collect();
                pearson(&scores, &rates).map(|coefficient| Trend {
                    emotion: label.to_string(),
                    coefficient: round_to(coefficient, 4),
                    video_count: results.len(),
                })
            })
            .collect();

        trends.sort_by(|a, b| {
            b.coefficient
                .abs()
                .total_cmp(&a.coefficient.abs())
                .then_with(|| a.emotion.cmp(&b.emotion))
        });
        trends
    }
}

/// `{label}_vs_{field}` and `{label}_comment_ratio`, scaled by 100 and
/// rounded to two decimals.
fn ratio_metrics(
    combined: &EmotionVector,
    engagement: &Engagement,
    comment_count: usize,
) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();
    for (label, score) in combined.iter() {
        for field in ENGAGEMENT_FIELDS {
            let value = engagement.field(field).unwrap_or(0);
            #[allow(clippy::cast_precision_loss)]
            let ratio = if value > 0 {
                round_to(score / value as f64 * 100.0, 2)
            } else {
                0.0
            };
            metrics.insert(format!("{label}_vs_{field}"), ratio);
        }
        if comment_count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let ratio = round_to(score * 100.0 / comment_count as f64, 2);
            metrics.insert(format!("{label}_comment_ratio"), ratio);
        }
    }
    metrics
}

fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
