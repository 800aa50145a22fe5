//! Scrape jobs run through an Apify actor task or an automation webhook.
//!
//! A job is started per video, then polled until it finishes or the
//! deadline passes. Transient HTTP failures while polling are logged and
//! polling continues; anything else fails that one video.

use std::time::Duration;

use async_trait::async_trait;
use cooper_core::{ScrapedContent, VideoCandidate};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::items::{merge_items, ScrapeItem};
use super::ContentScraper;
use crate::error::PipelineError;

const DEFAULT_BASE_URL: &str = "https://api.apify.com";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Actor input sent when starting a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeConfig {
    pub comments_per_post: u32,
    pub exclude_pinned_posts: bool,
    pub max_replies_per_comment: u32,
    pub results_per_page: u32,
    #[serde(rename = "postURLs")]
    pub post_urls: Vec<String>,
}

impl ScrapeConfig {
    #[must_use]
    pub fn for_url(url: &str) -> Self {
        Self {
            comments_per_post: 10,
            exclude_pinned_posts: true,
            max_replies_per_comment: 5,
            results_per_page: 20,
            post_urls: vec![url.to_string()],
        }
    }
}

enum Backend {
    Apify {
        base_url: String,
        token: String,
        task_id: String,
    },
    Webhook {
        url: String,
    },
}

#[derive(Debug, Deserialize)]
struct ApifyEnvelope {
    data: ApifyRun,
}

#[derive(Debug, Deserialize)]
struct ApifyRun {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct WebhookStart {
    job_id: String,
}

#[derive(Debug, Deserialize)]
struct WebhookStatus {
    status: String,
    #[serde(default)]
    items: Vec<ScrapeItem>,
}

enum JobStatus {
    Running,
    Finished(Vec<ScrapeItem>),
    Failed(String),
}

/// [`ContentScraper`] driving remote scrape jobs.
pub struct ApifyScraper {
    client: reqwest::Client,
    backend: Backend,
    poll_interval: Duration,
    timeout: Duration,
}

impl ApifyScraper {
    /// Scraper starting runs of an Apify actor task.
    #[must_use]
    pub fn apify(client: reqwest::Client, token: &str, task_id: &str) -> Self {
        Self::apify_with_base_url(client, token, task_id, DEFAULT_BASE_URL)
    }

    /// Same as [`ApifyScraper::apify`] against a custom API root (for wiremock).
    #[must_use]
    pub fn apify_with_base_url(
        client: reqwest::Client,
        token: &str,
        task_id: &str,
        base_url: &str,
    ) -> Self {
        Self {
            client,
            backend: Backend::Apify {
                base_url: base_url.trim_end_matches('/').to_string(),
                token: token.to_string(),
                task_id: task_id.to_string(),
            },
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Scraper posting jobs to a webhook that exposes `/status/{job_id}`.
    #[must_use]
    pub fn webhook(client: reqwest::Client, url: &str) -> Self {
        Self {
            client,
            backend: Backend::Webhook {
                url: url.trim_end_matches('/').to_string(),
            },
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Poll every `poll_interval` (at least 10ms) until `timeout`.
    #[must_use]
    pub fn with_polling(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        self.timeout = timeout;
        self
    }

    /// Start a job and return its id.
    async fn start(&self, config: &ScrapeConfig) -> Result<String, PipelineError> {
        match &self.backend {
            Backend::Apify {
                base_url,
                token,
                task_id,
            } => {
                let envelope: ApifyEnvelope = self
                    .client
                    .post(format!("{base_url}/v2/actor-tasks/{task_id}/runs"))
                    .query(&[("token", token)])
                    .json(config)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(envelope.data.id)
            }
            Backend::Webhook { url } => {
                let start: WebhookStart = self
                    .client
                    .post(url)
                    .json(config)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                Ok(start.job_id)
            }
        }
    }

    async fn check_status(&self, job_id: &str) -> Result<JobStatus, PipelineError> {
        match &self.backend {
            Backend::Apify {
                base_url, token, ..
            } => {
                let envelope: ApifyEnvelope = self
                    .client
                    .get(format!("{base_url}/v2/actor-runs/{job_id}"))
                    .query(&[("token", token)])
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;

                match envelope.data.status.as_str() {
                    "SUCCEEDED" => {
                        let items: Vec<ScrapeItem> = self
                            .client
                            .get(format!(
                                "{base_url}/v2/actor-runs/{}/dataset/items",
                                envelope.data.id
                            ))
                            .query(&[("token", token)])
                            .send()
                            .await?
                            .error_for_status()?
                            .json()
                            .await?;
                        Ok(JobStatus::Finished(items))
                    }
                    "FAILED" | "ABORTED" | "TIMED-OUT" => Ok(JobStatus::Failed(envelope.data.status)),
                    _ => Ok(JobStatus::Running),
                }
            }
            Backend::Webhook { url } => {
                let status: WebhookStatus = self
                    .client
                    .get(format!("{url}/status/{job_id}"))
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;

                match status.status.as_str() {
                    "completed" => Ok(JobStatus::Finished(status.items)),
                    "failed" => Ok(JobStatus::Failed(status.status)),
                    _ => Ok(JobStatus::Running),
                }
            }
        }
    }

    async fn wait_for_items(
        &self,
        video_id: &str,
        job_id: &str,
    ) -> Result<Vec<ScrapeItem>, PipelineError> {
        let deadline = Instant::now() + self.timeout;

        loop {
            match self.check_status(job_id).await {
                Ok(JobStatus::Finished(items)) => return Ok(items),
                Ok(JobStatus::Failed(status)) => {
                    return Err(PipelineError::scrape(
                        video_id,
                        format!("job {job_id} ended with status {status}"),
                    ));
                }
                Ok(JobStatus::Running) => {}
                Err(e) => {
                    tracing::warn!(
                        video_id,
                        job_id,
                        error = %e,
                        "scrape status check failed, will poll again"
                    );
                }
            }

            if Instant::now() + self.poll_interval > deadline {
                return Err(PipelineError::scrape(
                    video_id,
                    format!(
                        "job {job_id} did not complete within {}s",
                        self.timeout.as_secs()
                    ),
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl ContentScraper for ApifyScraper {
    async fn scrape(&self, candidate: &VideoCandidate) -> Result<ScrapedContent, PipelineError> {
        let config = ScrapeConfig::for_url(&candidate.url);
        let job_id = self
            .start(&config)
            .await
            .map_err(|e| PipelineError::scrape(&candidate.id, format!("start failed: {e}")))?;

        tracing::debug!(video_id = %candidate.id, job_id = %job_id, "scrape job started");

        let items = self.wait_for_items(&candidate.id, &job_id).await?;
        merge_items(&candidate.id, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_config_uses_actor_field_names() {
        let json = serde_json::to_value(ScrapeConfig::for_url("https://example.com/v")).unwrap();
        assert_eq!(json["commentsPerPost"], 10);
        assert_eq!(json["excludePinnedPosts"], true);
        assert_eq!(json["maxRepliesPerComment"], 5);
        assert_eq!(json["resultsPerPage"], 20);
        assert_eq!(json["postURLs"][0], "https://example.com/v");
    }
}
