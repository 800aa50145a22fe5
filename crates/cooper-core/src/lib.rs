//! Shared types for Cooper: the typed records that flow between pipeline
//! stages, query validation, and application configuration.

mod app_config;
mod config;
pub mod models;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use models::{
    AudioRef, CorrelationResult, EmotionVector, Engagement, Insight, Query, ScrapedContent, Trend,
    VideoCandidate, EMOTION_LABELS, ENGAGEMENT_FIELDS, MAX_LIMIT,
};

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid emotion vector: {0}")]
    InvalidEmotionVector(String),

    #[error("emotion label sets differ: {left:?} vs {right:?}")]
    LabelMismatch {
        left: Vec<String>,
        right: Vec<String>,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
