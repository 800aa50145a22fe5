use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_concurrent_videos: usize,
    pub youtube_api_key: Option<String>,
    pub apify_token: Option<String>,
    pub apify_actor_task_id: Option<String>,
    pub scraper_webhook_url: Option<String>,
    pub scraper_poll_interval_secs: u64,
    pub scraper_timeout_secs: u64,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub text_model: String,
    pub insight_model: String,
    pub transcription_model: String,
    pub tei_url: Option<String>,
    pub pinecone_api_key: Option<String>,
    pub pinecone_index_host: Option<String>,
    pub pinecone_namespace: String,
    pub brand_guidelines_path: Option<PathBuf>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_concurrent_videos", &self.max_concurrent_videos)
            .field("youtube_api_key", &redact(&self.youtube_api_key))
            .field("apify_token", &redact(&self.apify_token))
            .field("apify_actor_task_id", &self.apify_actor_task_id)
            .field("scraper_webhook_url", &self.scraper_webhook_url)
            .field(
                "scraper_poll_interval_secs",
                &self.scraper_poll_interval_secs,
            )
            .field("scraper_timeout_secs", &self.scraper_timeout_secs)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("text_model", &self.text_model)
            .field("insight_model", &self.insight_model)
            .field("transcription_model", &self.transcription_model)
            .field("tei_url", &self.tei_url)
            .field("pinecone_api_key", &redact(&self.pinecone_api_key))
            .field("pinecone_index_host", &self.pinecone_index_host)
            .field("pinecone_namespace", &self.pinecone_namespace)
            .field("brand_guidelines_path", &self.brand_guidelines_path)
            .finish()
    }
}
