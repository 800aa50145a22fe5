//! `YouTube` Data API v3 search.

use std::collections::HashMap;

use async_trait::async_trait;
use cooper_core::{Engagement, Query, VideoCandidate};
use serde::Deserialize;

use super::{bounded, VideoFinder};
use crate::error::PipelineError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const SERVICE: &str = "youtube";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    statistics: Option<Statistics>,
}

// The API reports counters as decimal strings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

/// Finder backed by the `YouTube` search and videos endpoints.
pub struct YouTubeFinder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeFinder {
    #[must_use]
    pub fn new(client: reqwest::Client, api_key: &str) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Point the finder at a different API root (for wiremock).
    #[must_use]
    pub fn with_base_url(client: reqwest::Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn search(&self, query: &Query) -> Result<Vec<(String, String)>, PipelineError> {
        let max_results = query.limit().to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("type", "video"),
                ("q", query.text()),
                ("maxResults", max_results.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, e))?;

        if !response.status().is_success() {
            return Err(PipelineError::upstream(
                SERVICE,
                format!("search returned status {}", response.status()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::upstream(SERVICE, e))?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            PipelineError::upstream(SERVICE, format!("malformed search response: {e}"))
        })?;

        Ok(parsed
            .items
            .into_iter()
            .filter_map(|item| {
                let id = item.id.video_id?;
                let title = item.snippet.and_then(|s| s.title).unwrap_or_default();
                Some((id, title))
            })
            .collect())
    }

    async fn statistics(&self, ids: &[&str]) -> Result<HashMap<String, Engagement>, PipelineError> {
        let joined = ids.join(",");
        let response = self
            .client
            .get(format!("{}/videos", self.base_url))
            .query(&[
                ("part", "statistics"),
                ("id", joined.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let parsed: VideosResponse = response.json().await?;
        Ok(parsed
            .items
            .into_iter()
            .map(|item| {
                let engagement = item.statistics.map(to_engagement).unwrap_or_default();
                (item.id, engagement)
            })
            .collect())
    }
}

#[async_trait]
impl VideoFinder for YouTubeFinder {
    async fn find(&self, query: &Query) -> Result<Vec<VideoCandidate>, PipelineError> {
        let hits = self.search(query).await?;
        if hits.is_empty() {
            tracing::debug!(query = query.text(), "youtube search returned no videos");
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
        // Search succeeded; missing counters only weaken the correlation.
        let stats = match self.statistics(&ids).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "youtube statistics lookup failed");
                HashMap::new()
            }
        };

        let candidates = hits
            .into_iter()
            .map(|(id, title)| VideoCandidate {
                url: format!("https://www.youtube.com/watch?v={id}"),
                engagement: stats.get(&id).copied().unwrap_or_default(),
                id,
                title,
            })
            .collect();

        Ok(bounded(candidates, query.limit()))
    }
}

fn to_engagement(stats: Statistics) -> Engagement {
    let count = |v: Option<String>| v.and_then(|s| s.parse::<u64>().ok()).unwrap_or(0);
    Engagement {
        views: count(stats.view_count),
        likes: count(stats.like_count),
        comments: count(stats.comment_count),
        shares: 0,
    }
}
