use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A provider the whole request depends on is down or rejecting calls.
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: &'static str, reason: String },

    /// Scraping failed for a single video.
    #[error("scrape failed for {video_id}: {reason}")]
    Scrape { video_id: String, reason: String },

    /// An emotion model produced no usable vector.
    #[error("analysis error: {0}")]
    Analysis(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("TEI embed error: {0}")]
    Tei(String),

    #[error("Pinecone error: {0}")]
    Pinecone(String),
}

impl From<cooper_core::CoreError> for PipelineError {
    fn from(err: cooper_core::CoreError) -> Self {
        Self::InvalidInput(err.to_string())
    }
}

impl PipelineError {
    pub(crate) fn upstream(service: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::UpstreamUnavailable {
            service,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn scrape(video_id: &str, reason: impl std::fmt::Display) -> Self {
        Self::Scrape {
            video_id: video_id.to_string(),
            reason: reason.to_string(),
        }
    }
}
