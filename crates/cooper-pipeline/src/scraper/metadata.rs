use async_trait::async_trait;
use cooper_core::{ScrapedContent, VideoCandidate};

use super::ContentScraper;
use crate::error::PipelineError;

/// Scraper for deployments with no scrape backend: the candidate's title is
/// the only text and there is no audio.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetadataScraper;

#[async_trait]
impl ContentScraper for MetadataScraper {
    async fn scrape(&self, candidate: &VideoCandidate) -> Result<ScrapedContent, PipelineError> {
        if candidate.title.trim().is_empty() {
            return Err(PipelineError::scrape(&candidate.id, "candidate has no title"));
        }
        Ok(ScrapedContent {
            video_id: candidate.id.clone(),
            comments: Vec::new(),
            transcript: Some(candidate.title.clone()),
            audio: None,
            engagement: Some(candidate.engagement),
        })
    }
}
