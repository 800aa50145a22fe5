//! Pipeline orchestration.
//!
//! One run: find candidates, scrape and score each video with bounded
//! concurrency, correlate, rank insights, compute trends, write PR hooks.
//! Per-video failures are recorded as [`SkippedVideo`]s; only a finder
//! failure aborts the run.

use std::sync::Arc;
use std::time::Duration;

use cooper_core::{AppConfig, CorrelationResult, EmotionVector, Query, VideoCandidate};
use futures::stream::{self, StreamExt};

use crate::correlator::{CorrelationInput, Correlator};
use crate::emotion::{
    AudioEmotionAnalyzer, LexiconTextAnalyzer, OpenAiTextAnalyzer, TextEmotionAnalyzer,
    WhisperAudioAnalyzer,
};
use crate::error::PipelineError;
use crate::finder::{self, CatalogFinder, VideoFinder, YouTubeFinder};
use crate::guidelines::GuidelineStore;
use crate::hooks::HookWriter;
use crate::insights::InsightGenerator;
use crate::openai::OpenAiClient;
use crate::scraper::{ApifyScraper, ContentScraper, MetadataScraper};
use crate::types::{AnalysisReport, SkippedVideo, Stage, VideoSummary};

/// Number of PR hooks attached to each report.
pub const PR_HOOK_COUNT: usize = 2;

const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Which backends a pipeline was wired with, for health reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineInfo {
    pub search: String,
    pub emotion_model: String,
}

pub struct Pipeline {
    finder: Arc<dyn VideoFinder>,
    scraper: Arc<dyn ContentScraper>,
    text_analyzer: Arc<dyn TextEmotionAnalyzer>,
    audio_analyzer: Option<Arc<dyn AudioEmotionAnalyzer>>,
    correlator: Correlator,
    insights: InsightGenerator,
    hooks: HookWriter,
    max_concurrent: usize,
    info: PipelineInfo,
}

/// A video that made it through every stage.
struct Analyzed {
    summary: VideoSummary,
    result: CorrelationResult,
}

impl Pipeline {
    #[must_use]
    pub fn builder(
        finder: Arc<dyn VideoFinder>,
        scraper: Arc<dyn ContentScraper>,
        text_analyzer: Arc<dyn TextEmotionAnalyzer>,
    ) -> PipelineBuilder {
        PipelineBuilder {
            finder,
            scraper,
            text_analyzer,
            audio_analyzer: None,
            correlator: Correlator::default(),
            insights: InsightGenerator::default(),
            hooks: None,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            info: PipelineInfo {
                search: "custom".to_string(),
                emotion_model: "custom".to_string(),
            },
        }
    }

    /// Wire real clients from configuration.
    ///
    /// Missing credentials select offline components: [`CatalogFinder`]
    /// without a YouTube key, [`MetadataScraper`] without Apify or a webhook,
    /// [`LexiconTextAnalyzer`] and template hooks without an `OpenAI` key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the brand
    /// guidelines file cannot be read.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .build()?;

        let (finder, search): (Arc<dyn VideoFinder>, &str) = match &config.youtube_api_key {
            Some(key) => (Arc::new(YouTubeFinder::new(client.clone(), key)), "youtube"),
            None => {
                tracing::warn!("YOUTUBE_API_KEY not set, using the offline catalog finder");
                (Arc::new(CatalogFinder::default()), "catalog")
            }
        };

        let polling = (
            Duration::from_secs(config.scraper_poll_interval_secs),
            Duration::from_secs(config.scraper_timeout_secs),
        );
        let scraper: Arc<dyn ContentScraper> = match (
            &config.apify_token,
            &config.apify_actor_task_id,
            &config.scraper_webhook_url,
        ) {
            (Some(token), Some(task), _) => Arc::new(
                ApifyScraper::apify(client.clone(), token, task).with_polling(polling.0, polling.1),
            ),
            (_, _, Some(url)) => Arc::new(
                ApifyScraper::webhook(client.clone(), url).with_polling(polling.0, polling.1),
            ),
            _ => {
                tracing::warn!("no scrape backend configured, analyzing video titles only");
                Arc::new(MetadataScraper)
            }
        };

        let guidelines = Arc::new(GuidelineStore::from_config(&client, config)?);

        let mut builder = match &config.openai_api_key {
            Some(key) => {
                let openai = OpenAiClient::new(client.clone(), key, &config.openai_base_url);
                Self::builder(
                    finder,
                    scraper,
                    Arc::new(OpenAiTextAnalyzer::new(openai.clone(), &config.text_model)),
                )
                .audio_analyzer(Arc::new(WhisperAudioAnalyzer::new(
                    openai.clone(),
                    &config.transcription_model,
                    &config.text_model,
                )))
                .hooks(HookWriter::with_model(
                    openai,
                    &config.insight_model,
                    Arc::clone(&guidelines),
                ))
                .emotion_model(&config.text_model)
            }
            None => {
                tracing::warn!("OPENAI_API_KEY not set, using the offline emotion lexicon");
                Self::builder(finder, scraper, Arc::new(LexiconTextAnalyzer))
                    .hooks(HookWriter::templated(Arc::clone(&guidelines)))
                    .emotion_model("lexicon")
            }
        };
        builder = builder
            .search_backend(search)
            .max_concurrent(config.max_concurrent_videos);

        Ok(builder.build())
    }

    #[must_use]
    pub fn info(&self) -> &PipelineInfo {
        &self.info
    }

    /// Run the full analysis for `query`, or for the single video at
    /// `direct_url` when one is given.
    ///
    /// An empty candidate list yields an empty report.
    ///
    /// # Errors
    ///
    /// Returns the finder's error (typically
    /// [`PipelineError::UpstreamUnavailable`]); per-video failures never fail
    /// the run.
    pub async fn run(
        &self,
        query: &Query,
        direct_url: Option<&str>,
    ) -> Result<AnalysisReport, PipelineError> {
        let candidates = match direct_url {
            Some(url) => vec![VideoCandidate::from_url(url)],
            None => finder::bounded(self.finder.find(query).await?, query.limit()),
        };

        if candidates.is_empty() {
            tracing::info!(query = query.text(), "no candidate videos found");
            return Ok(AnalysisReport::empty(query.text()));
        }

        let concurrency = self.max_concurrent.clamp(1, query.limit().max(1));
        tracing::info!(
            query = query.text(),
            candidates = candidates.len(),
            concurrency,
            "analyzing candidate videos"
        );

        let mut outcomes: Vec<(usize, Result<Analyzed, SkippedVideo>)> =
            stream::iter(candidates.into_iter().enumerate())
                .map(|(index, candidate)| {
                    let fut = self.analyze(candidate);
                    async move { (index, fut.await) }
                })
                .buffer_unordered(concurrency)
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _)| *index);

        let mut videos = Vec::new();
        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for (_, outcome) in outcomes {
            match outcome {
                Ok(analyzed) => {
                    videos.push(analyzed.summary);
                    results.push(analyzed.result);
                }
                Err(skip) => skipped.push(skip),
            }
        }

        let insights = self.insights.generate(&results);
        let trends = Correlator::trends(&results);
        let pr_hooks = self.hooks.suggest(&insights, PR_HOOK_COUNT).await;

        tracing::info!(
            query = query.text(),
            analyzed = videos.len(),
            skipped = skipped.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            query: query.text().to_string(),
            videos,
            insights,
            trends,
            pr_hooks,
            skipped,
        })
    }

    async fn analyze(&self, candidate: VideoCandidate) -> Result<Analyzed, SkippedVideo> {
        let skip = |stage: Stage, reason: &PipelineError| {
            tracing::warn!(video_id = %candidate.id, ?stage, error = %reason, "skipping video");
            SkippedVideo {
                video_id: candidate.id.clone(),
                stage,
                reason: reason.to_string(),
            }
        };

        let scraped = self
            .scraper
            .scrape(&candidate)
            .await
            .map_err(|e| skip(Stage::Scrape, &e))?;

        let text = scraped.text_payload();
        let (text_vector, audio_vector) = tokio::join!(
            self.text_analyzer.analyze_text(&text),
            self.audio_vector(&candidate.id, scraped.audio.as_ref()),
        );
        let text_vector = text_vector.map_err(|e| skip(Stage::TextAnalysis, &e))?;

        let engagement = scraped
            .engagement
            .unwrap_or_default()
            .or(candidate.engagement);
        let input = CorrelationInput {
            video_id: candidate.id.clone(),
            text: text_vector,
            audio: audio_vector,
            engagement,
            comment_count: scraped.comments.len(),
        };
        let result = self
            .correlator
            .correlate_one(&input)
            .map_err(|e| skip(Stage::Correlation, &e))?;

        let summary = VideoSummary {
            id: candidate.id.clone(),
            title: candidate.title.clone(),
            url: candidate.url.clone(),
            engagement,
            comment_count: input.comment_count,
            text_emotions: input.text,
            audio_emotions: input.audio,
            dominant_emotion: result.dominant_emotion.clone(),
            engagement_rate: result.engagement_rate,
            magnitude: result.magnitude,
            metrics: result.metrics.clone(),
        };

        Ok(Analyzed { summary, result })
    }

    /// Audio is optional signal: failures degrade to text-only correlation.
    async fn audio_vector(
        &self,
        video_id: &str,
        audio: Option<&cooper_core::AudioRef>,
    ) -> Option<EmotionVector> {
        let (analyzer, audio) = (self.audio_analyzer.as_ref()?, audio?);
        match analyzer.analyze_audio(audio).await {
            Ok(vector) => Some(vector),
            Err(e) => {
                tracing::warn!(video_id, error = %e, "audio analysis failed, using text only");
                None
            }
        }
    }
}

/// Assembles a [`Pipeline`] from injected components.
pub struct PipelineBuilder {
    finder: Arc<dyn VideoFinder>,
    scraper: Arc<dyn ContentScraper>,
    text_analyzer: Arc<dyn TextEmotionAnalyzer>,
    audio_analyzer: Option<Arc<dyn AudioEmotionAnalyzer>>,
    correlator: Correlator,
    insights: InsightGenerator,
    hooks: Option<HookWriter>,
    max_concurrent: usize,
    info: PipelineInfo,
}

impl PipelineBuilder {
    #[must_use]
    pub fn audio_analyzer(mut self, analyzer: Arc<dyn AudioEmotionAnalyzer>) -> Self {
        self.audio_analyzer = Some(analyzer);
        self
    }

    #[must_use]
    pub fn correlator(mut self, correlator: Correlator) -> Self {
        self.correlator = correlator;
        self
    }

    #[must_use]
    pub fn insights(mut self, insights: InsightGenerator) -> Self {
        self.insights = insights;
        self
    }

    #[must_use]
    pub fn hooks(mut self, hooks: HookWriter) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Upper bound on videos processed at once. Zero is treated as one.
    #[must_use]
    pub fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    #[must_use]
    pub fn search_backend(mut self, name: &str) -> Self {
        self.info.search = name.to_string();
        self
    }

    #[must_use]
    pub fn emotion_model(mut self, name: &str) -> Self {
        self.info.emotion_model = name.to_string();
        self
    }

    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            finder: self.finder,
            scraper: self.scraper,
            text_analyzer: self.text_analyzer,
            audio_analyzer: self.audio_analyzer,
            correlator: self.correlator,
            insights: self.insights,
            hooks: self
                .hooks
                .unwrap_or_else(|| HookWriter::templated(Arc::new(GuidelineStore::default()))),
            max_concurrent: self.max_concurrent,
            info: self.info,
        }
    }
}
