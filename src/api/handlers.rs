use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

use crate::analytics::extract_client_ip;
use crate::models::{CreateUrlRequest, ShortUrl};
use crate::storage::{Storage, StorageError};

const SHORT_CODE_LEN: usize = 8;
const MAX_CODE_ATTEMPTS: usize = 10;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub success: bool,
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
    pub tags: Vec<String>,
}

#[derive(Serialize)]
pub struct UrlWithStats {
    #[serde(flatten)]
    pub url: ShortUrl,
    #[serde(rename = "clickCount")]
    pub click_count: i64,
}

/// Generate a random short code
fn generate_short_code() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    (0..SHORT_CODE_LEN)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/// Create a new shortened URL
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<Json<ShortenResponse>, (StatusCode, Json<ErrorResponse>)> {
    if payload.url.is_empty() || Url::parse(&payload.url).is_err() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Please provide a valid URL".to_string(),
            }),
        ));
    }

    let tags = payload.tags.unwrap_or_default();
    let creator_ip = extract_client_ip(&headers, addr.ip()).to_string();

    // Regenerate on collision instead of checking first: the store's
    // unique constraint is the arbiter.
    let mut attempts = 0;
    let url = loop {
        let code = generate_short_code();
        match state
            .storage
            .create_url(&code, &payload.url, &tags, &creator_ip)
            .await
        {
            Ok(url) => break url,
            Err(StorageError::Conflict) if attempts < MAX_CODE_ATTEMPTS => {
                attempts += 1;
            }
            Err(StorageError::Conflict) => {
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to generate unique short code".to_string(),
                    }),
                ));
            }
            Err(StorageError::Other(e)) => {
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!("Failed to create short URL: {}", e),
                    }),
                ));
            }
        }
    };

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    Ok(Json(ShortenResponse {
        success: true,
        short_url: format!("http://{}/{}", host, url.short_code),
        short_code: url.short_code.clone(),
        original_url: url.original_url.clone(),
        tags: url.tags.clone(),
    }))
}

/// List URLs created from the caller's address, with click counts
pub async fn my_urls(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Vec<UrlWithStats>>, (StatusCode, Json<ErrorResponse>)> {
    let creator_ip = extract_client_ip(&headers, addr.ip()).to_string();

    let urls = state
        .storage
        .list_urls_by_creator(&creator_ip)
        .await
        .map_err(internal_error)?;

    let mut result = Vec::with_capacity(urls.len());
    for url in urls {
        let click_count = state
            .storage
            .click_count(&url.short_code)
            .await
            .map_err(internal_error)?;
        result.push(UrlWithStats { url, click_count });
    }

    Ok(Json(result))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}

fn internal_error(e: anyhow::Error) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!(error = %e, "storage failure");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Server error".to_string(),
        }),
    )
}
