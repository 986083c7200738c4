use axum::{
    extract::{ConnectInfo, Path, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::geoip::resolve_location;
use crate::analytics::models::ClickRecord;
use crate::analytics::{classify, extract_client_ip, GeoIpService};
use crate::storage::Storage;

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
    pub geoip: Arc<GeoIpService>,
}

/// Redirect to the original URL, logging the click on the way.
///
/// A failed click write never blocks the redirect; it is logged and
/// swallowed. The redirect is temporary on purpose: a permanent one
/// would let browsers cache the hop and skip the server entirely.
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    RawQuery(query): RawQuery,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> impl IntoResponse {
    match state.storage.get_url(&code).await {
        Ok(Some(url)) => {
            let click = build_click(&code, &headers, addr.ip(), &state.geoip);
            if let Err(err) = state.storage.record_click(&click).await {
                tracing::warn!(short_code = %code, error = %err, "failed to record click");
            }

            let target = append_query(&url.original_url, query.as_deref());
            Redirect::temporary(&target).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "Short URL not found").into_response(),
        Err(err) => {
            tracing::error!(short_code = %code, error = %err, "lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

fn build_click(
    short_code: &str,
    headers: &HeaderMap,
    socket_ip: std::net::IpAddr,
    geoip: &GeoIpService,
) -> ClickRecord {
    let client_ip = extract_client_ip(headers, socket_ip);
    let user_agent = header_str(headers, header::USER_AGENT);
    let referer = header_str(headers, header::REFERER);

    let device = classify(&user_agent);
    let location = resolve_location(geoip, client_ip);

    tracing::debug!(
        short_code = %short_code,
        country = %location.country,
        browser = %device.browser,
        device_type = %device.device_type,
        "click logged"
    );

    ClickRecord {
        short_code: short_code.to_string(),
        ip_address: client_ip.to_string(),
        country: location.country,
        region: location.region,
        city: location.city,
        user_agent,
        browser: device.browser,
        os: device.os,
        device_type: device.device_type,
        referer,
        clicked_at: Utc::now(),
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}

/// Carry incoming query parameters over to the target URL.
fn append_query(original: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => {
            let separator = if original.contains('?') { '&' } else { '?' };
            format!("{original}{separator}{q}")
        }
        _ => original.to_string(),
    }
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    #[derive(Serialize)]
    struct HealthResponse {
        status: String,
    }

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_query_uses_question_mark() {
        assert_eq!(
            append_query("https://example.com/page", Some("a=1&b=2")),
            "https://example.com/page?a=1&b=2"
        );
    }

    #[test]
    fn append_query_uses_ampersand_when_target_has_query() {
        assert_eq!(
            append_query("https://example.com/page?x=9", Some("a=1")),
            "https://example.com/page?x=9&a=1"
        );
    }

    #[test]
    fn append_query_passes_through_without_params() {
        assert_eq!(append_query("https://example.com", None), "https://example.com");
        assert_eq!(append_query("https://example.com", Some("")), "https://example.com");
    }
}
