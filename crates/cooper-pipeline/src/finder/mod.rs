//! Video discovery.

mod catalog;
mod youtube;

use std::collections::HashSet;

use async_trait::async_trait;
use cooper_core::{Query, VideoCandidate};

use crate::error::PipelineError;

pub use catalog::CatalogFinder;
pub use youtube::YouTubeFinder;

/// Source of candidate videos for a query.
#[async_trait]
pub trait VideoFinder: Send + Sync {
    /// Return at most `query.limit()` candidates, best match first.
    ///
    /// No matches is `Ok(vec![])`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UpstreamUnavailable`] if the provider fails.
    async fn find(&self, query: &Query) -> Result<Vec<VideoCandidate>, PipelineError>;
}

/// Drop repeated ids (first occurrence wins) and cut the list to `limit`.
#[must_use]
pub fn bounded(candidates: Vec<VideoCandidate>, limit: usize) -> Vec<VideoCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> VideoCandidate {
        VideoCandidate {
            id: id.to_string(),
            title: format!("video {id}"),
            url: format!("https://example.com/{id}"),
            engagement: cooper_core::Engagement::default(),
        }
    }

    #[test]
    fn bounded_truncates_to_limit() {
        let list = (0..8).map(|i| candidate(&i.to_string())).collect();
        assert_eq!(bounded(list, 5).len(), 5);
    }

    #[test]
    fn bounded_removes_duplicates_before_truncating() {
        let list = vec![candidate("a"), candidate("a"), candidate("b"), candidate("c")];
        let out = bounded(list, 2);
        let ids: Vec<_> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
