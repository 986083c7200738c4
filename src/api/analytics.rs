//! Analytics API handlers
//!
//! NotFound is decided here, before the aggregator runs: a short code
//! with no URL record is a 404 and `build_report` is never invoked.
//! The report itself is recomputed from a fresh click snapshot on
//! every request.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::analytics::models::ClickRecord;
use crate::analytics::report::{AnalyticsReport, BasicReport, ReportOptions};
use crate::analytics::{build_basic_report, build_report};
use crate::models::ShortUrl;

use super::handlers::{AppState, ErrorResponse};

#[derive(Serialize)]
pub struct UrlInfo {
    pub original_url: String,
    pub short_code: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ShortUrl> for UrlInfo {
    fn from(url: &ShortUrl) -> Self {
        Self {
            original_url: url.original_url.clone(),
            short_code: url.short_code.clone(),
            tags: url.tags.clone(),
            created_at: url.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub url: UrlInfo,
    pub analytics: AnalyticsReport,
}

#[derive(Serialize)]
pub struct BasicAnalyticsResponse {
    pub url: UrlInfo,
    pub analytics: BasicReport,
}

#[derive(Serialize)]
pub struct AllClicksResponse {
    pub success: bool,
    pub clicks: Vec<ClickRecord>,
}

/// Get the enhanced analytics report for a short code
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<Json<AnalyticsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let url = lookup_url(&state, &short_code).await?;
    let clicks = load_clicks(&state, &short_code).await?;

    let report = build_report(&clicks, url.created_at, Utc::now(), &ReportOptions::enhanced());

    Ok(Json(AnalyticsResponse {
        url: UrlInfo::from(&url),
        analytics: report,
    }))
}

/// Get the legacy flat report for a short code
pub async fn get_basic_analytics(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<Json<BasicAnalyticsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let url = lookup_url(&state, &short_code).await?;
    let clicks = load_clicks(&state, &short_code).await?;

    let report = build_basic_report(&clicks, &ReportOptions::basic());

    Ok(Json(BasicAnalyticsResponse {
        url: UrlInfo::from(&url),
        analytics: report,
    }))
}

/// Get the full raw click list for a short code, newest first
pub async fn get_all_clicks(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<Json<AllClicksResponse>, (StatusCode, Json<ErrorResponse>)> {
    lookup_url(&state, &short_code).await?;
    let clicks = load_clicks(&state, &short_code).await?;

    Ok(Json(AllClicksResponse {
        success: true,
        clicks,
    }))
}

async fn lookup_url(
    state: &AppState,
    short_code: &str,
) -> Result<ShortUrl, (StatusCode, Json<ErrorResponse>)> {
    match state.storage.get_url(short_code).await {
        Ok(Some(url)) => Ok(url),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Short URL not found".to_string(),
            }),
        )),
        Err(e) => {
            tracing::error!(error = %e, "failed to load URL record");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Server error".to_string(),
                }),
            ))
        }
    }
}

async fn load_clicks(
    state: &AppState,
    short_code: &str,
) -> Result<Vec<ClickRecord>, (StatusCode, Json<ErrorResponse>)> {
    state.storage.clicks_for_code(short_code).await.map_err(|e| {
        tracing::error!(error = %e, "failed to load click records");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Failed to get analytics".to_string(),
            }),
        )
    })
}
