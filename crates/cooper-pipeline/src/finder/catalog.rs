//! Fixed topic catalog used when no search provider is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use cooper_core::{Engagement, Query, VideoCandidate};

use super::{bounded, VideoFinder};
use crate::error::PipelineError;

const DEFAULT_TOPICS: &[&str] = &["cooking", "fitness"];
const VIDEOS_PER_TOPIC: usize = 10;

/// In-memory finder mapping a topic name to a fixed list of videos.
///
/// Topic lookup ignores case and surrounding whitespace. Unknown topics
/// return no candidates.
pub struct CatalogFinder {
    topics: HashMap<String, Vec<VideoCandidate>>,
}

impl CatalogFinder {
    #[must_use]
    pub fn new(topics: HashMap<String, Vec<VideoCandidate>>) -> Self {
        let topics = topics
            .into_iter()
            .map(|(topic, videos)| (topic.trim().to_lowercase(), videos))
            .collect();
        Self { topics }
    }
}

impl Default for CatalogFinder {
    fn default() -> Self {
        let topics = DEFAULT_TOPICS
            .iter()
            .map(|topic| {
                let videos = (1..=VIDEOS_PER_TOPIC)
                    .map(|n| VideoCandidate {
                        id: format!("{topic}-{n}"),
                        title: format!("{topic} video {n}"),
                        url: format!("https://www.tiktok.com/{topic}/video{n}"),
                        engagement: Engagement::default(),
                    })
                    .collect();
                ((*topic).to_string(), videos)
            })
            .collect();
        Self::new(topics)
    }
}

#[async_trait]
impl VideoFinder for CatalogFinder {
    async fn find(&self, query: &Query) -> Result<Vec<VideoCandidate>, PipelineError> {
        let key = query.text().to_lowercase();
        let videos = self.topics.get(&key).cloned().unwrap_or_default();
        if videos.is_empty() {
            tracing::debug!(topic = %key, "no catalog entry for topic");
        }
        Ok(bounded(videos, query.limit()))
    }
}
