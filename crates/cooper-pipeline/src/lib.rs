//! Video emotion/engagement analysis pipeline.
//!
//! Stages, leaf first:
//!
//! - [`finder`]: query → bounded list of candidate videos
//! - [`scraper`]: candidate → comments, transcript and audio reference
//! - [`emotion`]: text and audio → emotion vectors
//! - [`correlator`]: per-video vectors + engagement → correlation results
//! - [`insights`] and [`hooks`]: ranked insights and PR hooks
//!
//! [`Pipeline`] wires them together; [`GuidelineStore`] supplies brand voice
//! context for hook writing.

pub mod correlator;
mod embeddings;
pub mod emotion;
pub mod error;
pub mod finder;
pub mod guidelines;
pub mod hooks;
pub mod insights;
pub mod openai;
pub mod pipeline;
pub mod scraper;
pub mod types;
mod vector_store;

pub use correlator::{CorrelationInput, CorrelationScorer, Correlator, EngagementWeightedScorer};
pub use error::PipelineError;
pub use guidelines::{chunk_guidelines, GuidelineStore};
pub use hooks::HookWriter;
pub use insights::{InsightGenerator, InsightRanker, MagnitudeRanker};
pub use pipeline::{Pipeline, PipelineBuilder, PipelineInfo, PR_HOOK_COUNT};
pub use types::{AnalysisReport, SkippedVideo, Stage, VideoSummary};
