//! Typed records passed between pipeline stages.
//!
//! Every stage produces new values; nothing here is mutated once built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Upper bound on videos analyzed per request.
pub const MAX_LIMIT: usize = 20;

/// Canonical emotion labels produced by the analyzers.
pub const EMOTION_LABELS: [&str; 7] = [
    "joy", "sadness", "anger", "fear", "surprise", "disgust", "neutral",
];

/// Engagement counters the correlator compares emotions against.
pub const ENGAGEMENT_FIELDS: [&str; 4] = ["likes", "comments", "shares", "views"];

/// A validated analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    text: String,
    limit: usize,
}

impl Query {
    /// Build a query from raw caller input.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] if the text is blank or `limit`
    /// is outside `1..=MAX_LIMIT`.
    pub fn new(text: &str, limit: usize) -> Result<Self, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::InvalidQuery("query text is empty".to_string()));
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(CoreError::InvalidQuery(format!(
                "limit must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }
        Ok(Self {
            text: text.to_string(),
            limit,
        })
    }

    /// Build a query from request parameters that may name one video.
    ///
    /// Blank values count as absent. `url` must be http(s) and doubles as
    /// the query text when `text` is absent. Returns the query together with
    /// the trimmed URL.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidQuery`] for a non-http(s) URL, when
    /// neither text nor URL is given, or for any [`Query::new`] failure.
    pub fn with_direct_url<'a>(
        text: Option<&str>,
        url: Option<&'a str>,
        limit: usize,
    ) -> Result<(Self, Option<&'a str>), CoreError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        if let Some(url) = url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::InvalidQuery(format!(
                    "url must be an http(s) URL, got {url:?}"
                )));
            }
        }

        let text = text
            .filter(|t| !t.trim().is_empty())
            .or(url)
            .ok_or_else(|| CoreError::InvalidQuery("pass a query or a video url".to_string()))?;
        Ok((Self::new(text, limit)?, url))
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

/// Public engagement counters for one video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
}

impl Engagement {
    /// Interactions per view. `0.0` when the video has no recorded views.
    #[must_use]
    pub fn engagement_rate(&self) -> f64 {
        if self.views == 0 {
            return 0.0;
        }
        let interactions = self
            .likes
            .saturating_add(self.comments)
            .saturating_add(self.shares);
        #[allow(clippy::cast_precision_loss)]
        let rate = interactions as f64 / self.views as f64;
        rate
    }

    /// Look up a counter by its name in [`ENGAGEMENT_FIELDS`].
    #[must_use]
    pub fn field(&self, name: &str) -> Option<u64> {
        match name {
            "views" => Some(self.views),
            "likes" => Some(self.likes),
            "comments" => Some(self.comments),
            "shares" => Some(self.shares),
            _ => None,
        }
    }

    /// Prefer `self`, falling back to `other` for counters that are zero.
    #[must_use]
    pub fn or(self, other: Engagement) -> Engagement {
        let pick = |a: u64, b: u64| if a == 0 { b } else { a };
        Engagement {
            views: pick(self.views, other.views),
            likes: pick(self.likes, other.likes),
            comments: pick(self.comments, other.comments),
            shares: pick(self.shares, other.shares),
        }
    }
}

/// A video returned by the finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    pub id: String,
    pub title: String,
    pub url: String,
    pub engagement: Engagement,
}

impl VideoCandidate {
    /// Candidate for a URL supplied directly by the caller.
    ///
    /// The id is the last path segment of the URL, or the URL itself when it
    /// has no usable path.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let id = path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .unwrap_or(url)
            .to_string();

        Self {
            id,
            title: String::new(),
            url: url.to_string(),
            engagement: Engagement::default(),
        }
    }
}

/// Location of a video's audio track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioRef {
    pub url: String,
}

/// Text and audio collected for one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapedContent {
    pub video_id: String,
    pub comments: Vec<String>,
    pub transcript: Option<String>,
    pub audio: Option<AudioRef>,
    /// Counters reported by the scraper, when it saw any.
    pub engagement: Option<Engagement>,
}

impl ScrapedContent {
    /// Transcript followed by comments, one per line, blanks dropped.
    #[must_use]
    pub fn text_payload(&self) -> String {
        self.transcript
            .iter()
            .chain(self.comments.iter())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Emotion label to score in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>")]
#[serde(into = "BTreeMap<String, f64>")]
pub struct EmotionVector(BTreeMap<String, f64>);

/// Position in [`EMOTION_LABELS`]; unknown labels rank after all of them.
fn label_rank(label: &str) -> usize {
    EMOTION_LABELS
        .iter()
        .position(|l| *l == label)
        .unwrap_or(EMOTION_LABELS.len())
}

impl EmotionVector {
    /// Build a vector from exact scores.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidEmotionVector`] for an empty map or any
    /// score that is not a finite number in `[0, 1]`.
    pub fn new(scores: BTreeMap<String, f64>) -> Result<Self, CoreError> {
        if scores.is_empty() {
            return Err(CoreError::InvalidEmotionVector(
                "vector has no labels".to_string(),
            ));
        }
        if let Some((label, score)) = scores
            .iter()
            .find(|(_, s)| !s.is_finite() || **s < 0.0 || **s > 1.0)
        {
            return Err(CoreError::InvalidEmotionVector(format!(
                "score for '{label}' out of range: {score}"
            )));
        }
        Ok(Self(scores))
    }

    /// Build a vector from loosely-shaped model output.
    ///
    /// Labels are lowercased; anything outside [`EMOTION_LABELS`] is dropped,
    /// missing canonical labels become `0.0` and scores are clamped to `[0, 1]`.
    pub fn from_model_scores<I, K>(scores: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut map: BTreeMap<String, f64> = EMOTION_LABELS
            .iter()
            .map(|label| ((*label).to_string(), 0.0))
            .collect();

        for (label, score) in scores {
            let label = label.as_ref().trim().to_lowercase();
            if let Some(slot) = map.get_mut(&label) {
                *slot = if score.is_finite() {
                    score.clamp(0.0, 1.0)
                } else {
                    0.0
                };
            }
        }

        Self(map)
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest-scoring label. Ties go to the label listed first in
    /// [`EMOTION_LABELS`]; labels outside it come last, alphabetically.
    #[must_use]
    pub fn dominant(&self) -> Option<(&str, f64)> {
        self.iter().fold(None, |best, (label, score)| match best {
            Some((best_label, best_score)) => {
                let wins = score
                    .total_cmp(&best_score)
                    .then_with(|| label_rank(best_label).cmp(&label_rank(label)));
                if wins == std::cmp::Ordering::Greater {
                    Some((label, score))
                } else {
                    best
                }
            }
            None => Some((label, score)),
        })
    }

    #[must_use]
    pub fn same_labels(&self, other: &EmotionVector) -> bool {
        self.0.keys().eq(other.0.keys())
    }

    /// Element-wise mean of two vectors.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LabelMismatch`] if the label sets differ.
    pub fn average(&self, other: &EmotionVector) -> Result<EmotionVector, CoreError> {
        if !self.same_labels(other) {
            return Err(CoreError::LabelMismatch {
                left: self.labels().map(str::to_string).collect(),
                right: other.labels().map(str::to_string).collect(),
            });
        }
        let merged = self
            .0
            .iter()
            .zip(other.0.values())
            .map(|((label, a), b)| (label.clone(), (a + b) / 2.0))
            .collect();
        Ok(Self(merged))
    }
}

impl TryFrom<BTreeMap<String, f64>> for EmotionVector {
    type Error = CoreError;

    fn try_from(value: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EmotionVector> for BTreeMap<String, f64> {
    fn from(value: EmotionVector) -> Self {
        value.0
    }
}

/// Combined emotion signal and engagement statistics for one video.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationResult {
    pub video_id: String,
    pub combined: EmotionVector,
    pub dominant_emotion: String,
    pub dominant_score: f64,
    pub engagement_rate: f64,
    /// Strength of the emotion/engagement relationship; drives ranking.
    pub magnitude: f64,
    /// Named ratios such as `joy_vs_likes` and `joy_comment_ratio`.
    pub metrics: BTreeMap<String, f64>,
}

/// A human-readable finding backed by one or more videos.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub text: String,
    pub supporting_video_ids: Vec<String>,
    pub magnitude: f64,
}

/// Cross-video Pearson correlation between one emotion and engagement rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trend {
    pub emotion: String,
    pub coefficient: f64,
    pub video_count: usize,
}
