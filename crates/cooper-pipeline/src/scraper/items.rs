//! Dataset item parsing.
//!
//! Actors disagree on shape: some emit one item per video with a `comments`
//! array, others one item per comment with a `text` field. Both are merged
//! into a single [`ScrapedContent`].

use std::collections::HashMap;

use cooper_core::{AudioRef, Engagement, ScrapedContent};
use serde::Deserialize;
use serde_json::Value;

use crate::error::PipelineError;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ScrapeItem {
    #[serde(default)]
    comments: Vec<CommentValue>,
    text: Option<String>,
    transcript: Option<String>,
    audio_url: Option<String>,
    music_meta: Option<MusicMeta>,
    #[serde(default)]
    metadata: HashMap<String, Value>,
    digg_count: Option<u64>,
    play_count: Option<u64>,
    comment_count: Option<u64>,
    share_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CommentValue {
    Plain(String),
    Object { text: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MusicMeta {
    play_url: Option<String>,
}

impl CommentValue {
    fn into_text(self) -> String {
        match self {
            CommentValue::Plain(text) | CommentValue::Object { text } => text,
        }
    }
}

impl ScrapeItem {
    fn engagement(&self) -> Engagement {
        let meta = |key: &str| self.metadata.get(key).and_then(as_count);
        Engagement {
            views: self.play_count.or_else(|| meta("views")).unwrap_or(0),
            likes: self.digg_count.or_else(|| meta("likes")).unwrap_or(0),
            comments: self.comment_count.or_else(|| meta("comments")).unwrap_or(0),
            shares: self.share_count.or_else(|| meta("shares")).unwrap_or(0),
        }
    }
}

/// Merge raw dataset items into one [`ScrapedContent`] for `video_id`.
///
/// # Errors
///
/// Returns [`PipelineError::Scrape`] when the dataset is empty.
pub(super) fn merge_items(
    video_id: &str,
    items: Vec<ScrapeItem>,
) -> Result<ScrapedContent, PipelineError> {
    if items.is_empty() {
        return Err(PipelineError::scrape(video_id, "scrape returned no items"));
    }

    let mut comments = Vec::new();
    let mut transcript: Option<String> = None;
    let mut audio: Option<AudioRef> = None;
    let mut engagement = Engagement::default();

    for item in items {
        let counters = item.engagement();
        engagement = Engagement {
            views: engagement.views.max(counters.views),
            likes: engagement.likes.max(counters.likes),
            comments: engagement.comments.max(counters.comments),
            shares: engagement.shares.max(counters.shares),
        };

        if transcript.is_none() {
            transcript = item.transcript.filter(|t| !t.trim().is_empty());
        }
        if audio.is_none() {
            audio = item
                .audio_url
                .or_else(|| item.music_meta.and_then(|m| m.play_url))
                .filter(|u| !u.trim().is_empty())
                .map(|url| AudioRef { url });
        }

        comments.extend(item.comments.into_iter().map(CommentValue::into_text));
        comments.extend(item.text);
    }

    comments.retain(|c| !c.trim().is_empty());

    Ok(ScrapedContent {
        video_id: video_id.to_string(),
        comments,
        transcript,
        audio,
        engagement: (engagement != Engagement::default()).then_some(engagement),
    })
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
