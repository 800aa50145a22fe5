use axum::{
    extract::{Query, State},
    Extension, Json,
};
use cooper_core::Query as AnalysisQuery;
use cooper_pipeline::AnalysisReport;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_LIMIT: usize = 10;

/// `limit` stays a string so a malformed value gets the JSON error envelope
/// instead of axum's plain-text rejection.
#[derive(Debug, Deserialize)]
pub(super) struct ChatQuery {
    pub query: Option<String>,
    pub limit: Option<String>,
    pub url: Option<String>,
}

pub(super) async fn chat(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ChatQuery>,
) -> Result<Json<ApiResponse<AnalysisReport>>, ApiError> {
    let invalid = |message: String| ApiError::validation(req_id.0.clone(), message);

    let limit = parse_limit(params.limit.as_deref()).map_err(invalid)?;
    let (query, url) =
        AnalysisQuery::with_direct_url(params.query.as_deref(), params.url.as_deref(), limit)
            .map_err(|e| invalid(e.to_string()))?;

    tracing::info!(
        request_id = %req_id.0,
        query = query.text(),
        limit = query.limit(),
        direct_url = url.is_some(),
        "chat analysis requested"
    );

    let report = state
        .pipeline
        .run(&query, url)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_limit(raw: Option<&str>) -> Result<usize, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LIMIT),
        Some(value) => value
            .parse::<usize>()
            .map_err(|_| format!("limit must be a positive integer, got {value:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::parse_limit;

    #[test]
    fn limit_defaults_to_ten() {
        assert_eq!(parse_limit(None), Ok(10));
        assert_eq!(parse_limit(Some(" ")), Ok(10));
    }

    #[test]
    fn limit_must_be_numeric() {
        assert_eq!(parse_limit(Some("5")), Ok(5));
        assert!(parse_limit(Some("five")).is_err());
        assert!(parse_limit(Some("-1")).is_err());
    }
}
