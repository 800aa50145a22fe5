//! Ranked, human-readable insights from correlation results.

use std::cmp::Ordering;

use cooper_core::{CorrelationResult, Insight};

/// Orders correlation results for presentation.
pub trait InsightRanker: Send + Sync {
    fn compare(&self, a: &CorrelationResult, b: &CorrelationResult) -> Ordering;
}

/// Largest |magnitude| first, ties broken by video id.
#[derive(Debug, Default, Clone, Copy)]
pub struct MagnitudeRanker;

impl InsightRanker for MagnitudeRanker {
    fn compare(&self, a: &CorrelationResult, b: &CorrelationResult) -> Ordering {
        b.magnitude
            .abs()
            .total_cmp(&a.magnitude.abs())
            .then_with(|| a.video_id.cmp(&b.video_id))
    }
}

pub struct InsightGenerator {
    ranker: Box<dyn InsightRanker>,
}

impl Default for InsightGenerator {
    fn default() -> Self {
        Self::new(Box::new(MagnitudeRanker))
    }
}

impl InsightGenerator {
    #[must_use]
    pub fn new(ranker: Box<dyn InsightRanker>) -> Self {
        Self { ranker }
    }

    /// One insight per result, in ranked order.
    #[must_use]
    pub fn generate(&self, results: &[CorrelationResult]) -> Vec<Insight> {
        let mut ranked: Vec<&CorrelationResult> = results.iter().collect();
        ranked.sort_by(|a, b| self.ranker.compare(a, b));
        ranked.into_iter().map(describe).collect()
    }
}

fn describe(result: &CorrelationResult) -> Insight {
    let emotion = &result.dominant_emotion;
    let score_pct = result.dominant_score * 100.0;

    let text = if result.engagement_rate > 0.0 {
        let rate_pct = result.engagement_rate * 100.0;
        format!(
            "Video {} is driven by {emotion} ({score_pct:.0}% of the emotional signal) \
             with a {rate_pct:.2}% engagement rate.",
            result.video_id
        )
    } else {
        format!(
            "Video {} is driven by {emotion} ({score_pct:.0}% of the emotional signal); \
             no engagement counters were available.",
            result.video_id
        )
    };

    Insight {
        text,
        supporting_video_ids: vec![result.video_id.clone()],
        magnitude: result.magnitude,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use cooper_core::EmotionVector;

    use super::*;

    fn result(id: &str, magnitude: f64, engagement_rate: f64) -> CorrelationResult {
        CorrelationResult {
            video_id: id.to_string(),
            combined: EmotionVector::from_model_scores([("joy", 0.8)]),
            dominant_emotion: "joy".to_string(),
            dominant_score: 0.8,
            engagement_rate,
            magnitude,
            metrics: BTreeMap::new(),
        }
    }

    #[test]
    fn one_insight_per_result() {
        let insights = InsightGenerator::default()
            .generate(&[result("a", 0.2, 0.1), result("b", 0.5, 0.3)]);
        assert_eq!(insights.len(), 2);
    }

    #[test]
    fn ranked_by_absolute_magnitude() {
        let insights = InsightGenerator::default().generate(&[
            result("small", 0.1, 0.1),
            result("negative", -0.9, 0.1),
            result("mid", 0.5, 0.1),
        ]);
        let order: Vec<&str> = insights
            .iter()
            .map(|i| i.supporting_video_ids[0].as_str())
            .collect();
        assert_eq!(order, ["negative", "mid", "small"]);
    }

    #[test]
    fn ties_break_on_video_id() {
        let insights =
            InsightGenerator::default().generate(&[result("b", 0.5, 0.1), result("a", 0.5, 0.1)]);
        assert_eq!(insights[0].supporting_video_ids, ["a"]);
    }

    #[test]
    fn empty_input_yields_no_insights() {
        assert!(InsightGenerator::default().generate(&[]).is_empty());
    }

    #[test]
    fn text_mentions_emotion_and_rate() {
        let insights = InsightGenerator::default().generate(&[result("v1", 0.9, 0.125)]);
        assert!(insights[0].text.contains("joy"));
        assert!(insights[0].text.contains("12.50%"));
    }

    #[test]
    fn text_notes_missing_engagement() {
        let insights = InsightGenerator::default().generate(&[result("v1", 0.8, 0.0)]);
        assert!(insights[0].text.contains("no engagement counters"));
    }
}
