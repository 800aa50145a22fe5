//! Comment, transcript and audio collection for candidate videos.

mod apify;
mod items;
mod metadata;

use async_trait::async_trait;
use cooper_core::{ScrapedContent, VideoCandidate};

use crate::error::PipelineError;

pub use apify::{ApifyScraper, ScrapeConfig};
pub use metadata::MetadataScraper;

/// Fetches the text and audio attached to one video.
#[async_trait]
pub trait ContentScraper: Send + Sync {
    /// # Errors
    ///
    /// Returns [`PipelineError::Scrape`] when this video cannot be scraped.
    /// Callers skip the video and carry on with the rest of the batch.
    async fn scrape(&self, candidate: &VideoCandidate) -> Result<ScrapedContent, PipelineError>;
}
