//! Data models for click analytics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged visit to a short link.
///
/// Records are append-only: `clicked_at` is assigned once at write time
/// and no field is ever mutated or deleted afterwards. Empty strings
/// stand in for values that were absent at ingestion; the aggregator
/// substitutes the "Unknown" sentinel before tallying.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickRecord {
    /// Short code that was accessed
    pub short_code: String,

    /// Client IP address as observed (masked only on report output)
    pub ip_address: String,

    /// Country display name, or "Unknown"
    pub country: String,

    /// Region/state/province, or "Unknown"
    pub region: String,

    /// City name, or "Unknown"
    pub city: String,

    /// Raw user-agent string as received
    pub user_agent: String,

    /// Browser family derived from the user agent
    pub browser: String,

    /// Operating system derived from the user agent
    pub os: String,

    /// "Mobile", "Tablet" or "Desktop"
    pub device_type: String,

    /// Referer header value, empty when absent
    pub referer: String,

    /// Timestamp of the visit (UTC)
    pub clicked_at: DateTime<Utc>,
}

/// Browser/OS/device triple derived from a raw user-agent string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub browser: String,
    pub os: String,
    pub device_type: String,
}

/// Raw resolver output, before display-name mapping.
#[derive(Debug, Clone, Default)]
pub struct ResolvedLocation {
    /// ISO country code (e.g., "US", "GB")
    pub country_code: Option<String>,

    /// Region/state/province
    pub region: Option<String>,

    /// City name
    pub city: Option<String>,
}

/// Display-ready location attached to a click record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLocation {
    pub country: String,
    pub region: String,
    pub city: String,
}
