use std::collections::BTreeMap;

use cooper_core::{EmotionVector, Engagement, Insight, Trend};
use serde::Serialize;

/// Pipeline stage at which a video dropped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scrape,
    TextAnalysis,
    Correlation,
}

/// A video that was found but produced no correlation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedVideo {
    pub video_id: String,
    pub stage: Stage,
    pub reason: String,
}

/// Per-video emotion signals included in the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoSummary {
    pub id: String,
    pub title: String,
    pub url: String,
    pub engagement: Engagement,
    pub comment_count: usize,
    pub text_emotions: EmotionVector,
    /// `None` when the video had no audio or audio analysis failed.
    pub audio_emotions: Option<EmotionVector>,
    pub dominant_emotion: String,
    pub engagement_rate: f64,
    pub magnitude: f64,
    /// `{label}_vs_{field}` and `{label}_comment_ratio` ratios.
    pub metrics: BTreeMap<String, f64>,
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub query: String,
    pub videos: Vec<VideoSummary>,
    pub insights: Vec<Insight>,
    pub trends: Vec<Trend>,
    pub pr_hooks: Vec<String>,
    pub skipped: Vec<SkippedVideo>,
}

impl AnalysisReport {
    /// Report for a query that matched no videos.
    #[must_use]
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            videos: Vec::new(),
            insights: Vec::new(),
            trends: Vec::new(),
            pr_hooks: Vec::new(),
            skipped: Vec::new(),
        }
    }
}
