//! End-to-end pipeline behaviour with in-process stub components.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cooper_core::{AudioRef, EmotionVector, Engagement, Query, ScrapedContent, VideoCandidate};
use cooper_pipeline::emotion::{AudioEmotionAnalyzer, LexiconTextAnalyzer, TextEmotionAnalyzer};
use cooper_pipeline::finder::{CatalogFinder, VideoFinder};
use cooper_pipeline::scraper::ContentScraper;
use cooper_pipeline::{Pipeline, PipelineError, Stage};

struct FixedFinder(Vec<VideoCandidate>);

#[async_trait]
impl VideoFinder for FixedFinder {
    async fn find(&self, _query: &Query) -> Result<Vec<VideoCandidate>, PipelineError> {
        Ok(self.0.clone())
    }
}

struct DownFinder;

#[async_trait]
impl VideoFinder for DownFinder {
    async fn find(&self, _query: &Query) -> Result<Vec<VideoCandidate>, PipelineError> {
        Err(PipelineError::UpstreamUnavailable {
            service: "youtube",
            reason: "quota exceeded".to_string(),
        })
    }
}

/// Serves canned comments; ids listed in `failing` fail to scrape.
struct StubScraper {
    comments: HashMap<String, Vec<String>>,
    failing: Vec<String>,
    calls: AtomicUsize,
}

impl StubScraper {
    fn new(comments: &[(&str, &str)], failing: &[&str]) -> Self {
        Self {
            comments: comments
                .iter()
                .map(|(id, text)| ((*id).to_string(), vec![(*text).to_string()]))
                .collect(),
            failing: failing.iter().map(|id| (*id).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentScraper for StubScraper {
    async fn scrape(&self, candidate: &VideoCandidate) -> Result<ScrapedContent, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&candidate.id) {
            return Err(PipelineError::Scrape {
                video_id: candidate.id.clone(),
                reason: "actor crashed".to_string(),
            });
        }
        Ok(ScrapedContent {
            video_id: candidate.id.clone(),
            comments: self.comments.get(&candidate.id).cloned().unwrap_or_default(),
            transcript: None,
            audio: Some(AudioRef {
                url: format!("https://cdn.example.com/{}.mp3", candidate.id),
            }),
            engagement: None,
        })
    }
}

struct FixedAudio(Result<EmotionVector, ()>);

#[async_trait]
impl AudioEmotionAnalyzer for FixedAudio {
    async fn analyze_audio(&self, _audio: &AudioRef) -> Result<EmotionVector, PipelineError> {
        self.0
            .clone()
            .map_err(|()| PipelineError::Analysis("audio model down".to_string()))
    }
}

fn candidate(id: &str, views: u64, likes: u64) -> VideoCandidate {
    VideoCandidate {
        id: id.to_string(),
        title: format!("video {id}"),
        url: format!("https://example.com/{id}"),
        engagement: Engagement {
            views,
            likes,
            comments: 0,
            shares: 0,
        },
    }
}

fn five_candidates() -> Vec<VideoCandidate> {
    vec![
        candidate("a", 1000, 300),
        candidate("b", 1000, 50),
        candidate("c", 1000, 120),
        candidate("d", 1000, 10),
        candidate("e", 1000, 200),
    ]
}

fn comments() -> Vec<(&'static str, &'static str)> {
    vec![
        ("a", "I love this, so happy"),
        ("b", "this is so sad, I cried"),
        ("c", "wow unexpected"),
        ("d", "gross"),
        ("e", "amazing and fun"),
    ]
}

fn text_analyzer() -> Arc<dyn TextEmotionAnalyzer> {
    Arc::new(LexiconTextAnalyzer)
}

#[tokio::test]
async fn scrape_failures_are_skipped_not_fatal() {
    let scraper = Arc::new(StubScraper::new(&comments(), &["b", "d"]));
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(five_candidates())),
        scraper.clone(),
        text_analyzer(),
    )
    .build();

    let query = Query::new("sustainable fashion", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();

    assert_eq!(scraper.calls.load(Ordering::SeqCst), 5);
    assert_eq!(report.videos.len(), 3);
    assert_eq!(report.insights.len(), 3);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped.iter().all(|s| s.stage == Stage::Scrape));

    let ids: Vec<&str> = report.skipped.iter().map(|s| s.video_id.as_str()).collect();
    assert_eq!(ids, ["b", "d"]);
}

#[tokio::test]
async fn insights_reference_candidates_and_are_ranked() {
    let candidates = five_candidates();
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(candidates.clone())),
        Arc::new(StubScraper::new(&comments(), &[])),
        text_analyzer(),
    )
    .max_concurrent(2)
    .build();

    let query = Query::new("sustainable fashion", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();

    assert!(report.insights.len() <= 5);
    for insight in &report.insights {
        assert!(insight
            .supporting_video_ids
            .iter()
            .all(|id| candidates.iter().any(|c| &c.id == id)));
    }
    let magnitudes: Vec<f64> = report.insights.iter().map(|i| i.magnitude.abs()).collect();
    assert!(magnitudes.windows(2).all(|w| w[0] >= w[1]));

    // Video order follows the finder, regardless of completion order.
    let ids: Vec<&str> = report.videos.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d", "e"]);
    assert!(!report.trends.is_empty());
    assert_eq!(report.pr_hooks.len(), 2);
}

#[tokio::test]
async fn finder_results_are_cut_to_limit() {
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(five_candidates())),
        Arc::new(StubScraper::new(&comments(), &[])),
        text_analyzer(),
    )
    .build();

    let query = Query::new("q", 2).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    assert_eq!(report.videos.len(), 2);
}

#[tokio::test]
async fn empty_search_yields_empty_report() {
    let pipeline = Pipeline::builder(
        Arc::new(CatalogFinder::default()),
        Arc::new(StubScraper::new(&[], &[])),
        text_analyzer(),
    )
    .build();

    let query = Query::new("underwater basket weaving", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    assert!(report.videos.is_empty());
    assert!(report.insights.is_empty());
    assert!(report.pr_hooks.is_empty());
}

#[tokio::test]
async fn finder_outage_aborts_the_run() {
    let pipeline = Pipeline::builder(
        Arc::new(DownFinder),
        Arc::new(StubScraper::new(&[], &[])),
        text_analyzer(),
    )
    .build();

    let query = Query::new("q", 5).unwrap();
    let err = pipeline.run(&query, None).await.unwrap_err();
    assert!(matches!(err, PipelineError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn direct_url_bypasses_the_finder() {
    let scraper = Arc::new(StubScraper::new(&[("123", "love it")], &[]));
    let pipeline = Pipeline::builder(Arc::new(DownFinder), scraper, text_analyzer()).build();

    let query = Query::new("direct", 5).unwrap();
    let report = pipeline
        .run(&query, Some("https://www.tiktok.com/@chef/video/123"))
        .await
        .unwrap();

    assert_eq!(report.videos.len(), 1);
    assert_eq!(report.videos[0].id, "123");
    assert_eq!(report.videos[0].dominant_emotion, "joy");
}

#[tokio::test]
async fn empty_text_payload_is_skipped_at_text_analysis() {
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(vec![candidate("silent", 10, 1)])),
        Arc::new(StubScraper::new(&[], &[])),
        text_analyzer(),
    )
    .build();

    let query = Query::new("q", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    assert!(report.videos.is_empty());
    assert_eq!(report.skipped[0].stage, Stage::TextAnalysis);
}

#[tokio::test]
async fn audio_vector_is_blended_with_text() {
    let audio = EmotionVector::from_model_scores([("fear", 1.0)]);
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(vec![candidate("a", 100, 10)])),
        Arc::new(StubScraper::new(&[("a", "scary")], &[])),
        text_analyzer(),
    )
    .audio_analyzer(Arc::new(FixedAudio(Ok(audio))))
    .build();

    let query = Query::new("q", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    let video = &report.videos[0];
    assert!(video.audio_emotions.is_some());
    assert_eq!(video.dominant_emotion, "fear");
}

#[tokio::test]
async fn audio_failure_falls_back_to_text_only() {
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(vec![candidate("a", 100, 10)])),
        Arc::new(StubScraper::new(&[("a", "I love this")], &[])),
        text_analyzer(),
    )
    .audio_analyzer(Arc::new(FixedAudio(Err(()))))
    .build();

    let query = Query::new("q", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    assert_eq!(report.videos.len(), 1);
    assert!(report.videos[0].audio_emotions.is_none());
    assert!(report.skipped.is_empty());
}

#[tokio::test]
async fn candidate_counters_fill_missing_scraped_engagement() {
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(vec![candidate("a", 1000, 100)])),
        Arc::new(StubScraper::new(&[("a", "great")], &[])),
        text_analyzer(),
    )
    .build();

    let query = Query::new("q", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    assert!((report.videos[0].engagement_rate - 0.1).abs() < 1e-9);
}

#[tokio::test]
async fn report_carries_magnitude_and_ratio_metrics() {
    let pipeline = Pipeline::builder(
        Arc::new(FixedFinder(vec![candidate("a", 1000, 100)])),
        Arc::new(StubScraper::new(&[("a", "great")], &[])),
        text_analyzer(),
    )
    .build();

    let query = Query::new("q", 5).unwrap();
    let report = pipeline.run(&query, None).await.unwrap();
    let video = &report.videos[0];
    // joy = 1.0, rate = 100 / 1000
    assert!((video.magnitude - 0.1).abs() < 1e-9);
    assert_eq!(video.metrics["joy_vs_likes"], 1.0);
    assert_eq!(video.metrics["joy_vs_views"], 0.1);
    assert_eq!(video.metrics["joy_comment_ratio"], 100.0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["videos"][0]["metrics"]["joy_vs_likes"], 1.0);
}
