use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::Request;
use cooper_core::{Engagement, Query, ScrapedContent, VideoCandidate};
use cooper_pipeline::emotion::LexiconTextAnalyzer;
use cooper_pipeline::finder::{CatalogFinder, VideoFinder};
use cooper_pipeline::scraper::ContentScraper;
use serde_json::Value;
use tower::ServiceExt;

use super::*;

struct StubFinder;

#[async_trait]
impl VideoFinder for StubFinder {
    async fn find(&self, query: &Query) -> Result<Vec<VideoCandidate>, PipelineError> {
        if query.text() == "outage" {
            return Err(PipelineError::UpstreamUnavailable {
                service: "youtube",
                reason: "quota exceeded".to_string(),
            });
        }
        Ok((1..=8)
            .map(|n| VideoCandidate {
                id: format!("v{n}"),
                title: format!("video {n}"),
                url: format!("https://example.com/v{n}"),
                engagement: Engagement {
                    views: 1000,
                    likes: 10 * n,
                    comments: 0,
                    shares: 0,
                },
            })
            .collect())
    }
}

/// Fails to scrape `v3`.
struct StubScraper;

#[async_trait]
impl ContentScraper for StubScraper {
    async fn scrape(&self, candidate: &VideoCandidate) -> Result<ScrapedContent, PipelineError> {
        if candidate.id == "v3" {
            return Err(PipelineError::Scrape {
                video_id: candidate.id.clone(),
                reason: "blocked".to_string(),
            });
        }
        Ok(ScrapedContent {
            video_id: candidate.id.clone(),
            comments: vec!["love it, amazing".to_string(), "so sad".to_string()],
            transcript: None,
            audio: None,
            engagement: None,
        })
    }
}

fn app_with(finder: Arc<dyn VideoFinder>, auth: AuthState) -> Router {
    let pipeline = Pipeline::builder(finder, Arc::new(StubScraper), Arc::new(LexiconTextAnalyzer))
        .search_backend("stub")
        .emotion_model("lexicon")
        .build();
    build_app(
        AppState {
            pipeline: Arc::new(pipeline),
        },
        auth,
        default_rate_limit_state(),
    )
}

fn app() -> Router {
    app_with(Arc::new(StubFinder), AuthState::disabled())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[test]
fn api_error_validation_error_maps_to_bad_request() {
    let response = ApiError::validation("req-1", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_upstream_unavailable_maps_to_bad_gateway() {
    let response = ApiError::new("req-1", ErrorCode::UpstreamUnavailable, "down").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[test]
fn error_codes_serialize_as_snake_case() {
    let json = serde_json::to_value(ErrorCode::RateLimited).expect("serialize");
    assert_eq!(json, "rate_limited");
}

#[tokio::test]
async fn health_reports_backends() {
    let (status, body) = get_json(app(), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["search"], "stub");
    assert_eq!(body["data"]["emotion_model"], "lexicon");
    assert!(body["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn chat_returns_report_within_limit() {
    let (status, body) = get_json(app(), "/api/v1/chat?query=sustainable%20fashion&limit=5").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["query"], "sustainable fashion");
    // v3 fails to scrape, leaving four of the five candidates.
    assert_eq!(data["videos"].as_array().unwrap().len(), 4);
    assert_eq!(data["skipped"][0]["video_id"], "v3");
    assert_eq!(data["skipped"][0]["stage"], "scrape");

    let first = &data["videos"][0];
    assert!(first["metrics"]["joy_vs_likes"].as_f64().unwrap() > 0.0);
    assert!(first["metrics"]["joy_comment_ratio"].is_number());
    assert!(first["magnitude"].is_number());

    let insights = data["insights"].as_array().unwrap();
    assert!(insights.len() <= 5);
    for insight in insights {
        let id = insight["supporting_video_ids"][0].as_str().unwrap();
        assert!(["v1", "v2", "v4", "v5"].contains(&id));
    }
}

#[tokio::test]
async fn chat_defaults_limit_to_ten() {
    let (status, body) = get_json(app(), "/api/v1/chat?query=fashion").await;
    assert_eq!(status, StatusCode::OK);
    // Eight candidates, one scrape failure.
    assert_eq!(body["data"]["videos"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn chat_rejects_out_of_range_limit() {
    for uri in [
        "/api/v1/chat?query=fashion&limit=0",
        "/api/v1/chat?query=fashion&limit=21",
        "/api/v1/chat?query=fashion&limit=lots",
    ] {
        let (status, body) = get_json(app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"]["code"], "validation_error");
    }
}

#[tokio::test]
async fn chat_rejects_missing_query() {
    let (status, body) = get_json(app(), "/api/v1/chat?query=%20%20").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn chat_rejects_non_http_url() {
    let (status, _) = get_json(app(), "/api/v1/chat?url=ftp://example.com/v").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_direct_url_analyzes_one_video() {
    let (status, body) =
        get_json(app(), "/api/v1/chat?url=https://www.tiktok.com/@chef/video/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"][0]["id"], "42");
}

#[tokio::test]
async fn chat_empty_search_is_ok() {
    let app = app_with(Arc::new(CatalogFinder::default()), AuthState::disabled());
    let (status, body) = get_json(app, "/api/v1/chat?query=quantum%20knitting").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["insights"], serde_json::json!([]));
}

#[tokio::test]
async fn chat_maps_search_outage_to_bad_gateway() {
    let (status, body) = get_json(app(), "/api/v1/chat?query=outage").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "upstream_unavailable");
}

#[tokio::test]
async fn chat_requires_bearer_token_when_enabled() {
    let auth = AuthState::from_keys("secret", false).unwrap();
    let app = app_with(Arc::new(StubFinder), auth);

    let (status, body) = get_json(app.clone(), "/api/v1/chat?query=fashion").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/chat?query=fashion")
                .header("authorization", "Bearer secret")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_rejection_carries_request_id() {
    let auth = AuthState::from_keys("secret", false).unwrap();
    let response = app_with(Arc::new(StubFinder), auth)
        .oneshot(
            Request::builder()
                .uri("/api/v1/chat?query=fashion")
                .header("x-request-id", "req-401")
                .header("authorization", "Bearer wrong")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["meta"]["request_id"], "req-401");
}

#[tokio::test]
async fn request_id_header_is_echoed() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.headers()["x-request-id"], "req-abc");
}
