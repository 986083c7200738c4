//! Report shapes returned by the analytics endpoints.
//!
//! Reports are derived values: recomputed from the click records on
//! every request and never persisted. Wire casing follows the legacy
//! service this replaces (camelCase sections, snake_case click rows).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Truncation limits for the ranked report sections.
///
/// Each limit is its own knob; the two report endpoints differ only in
/// `recent_clicks`.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub top_countries: usize,
    pub top_browsers: usize,
    pub top_referers: usize,
    pub recent_clicks: usize,
}

impl ReportOptions {
    /// Limits used by the enhanced analytics endpoint.
    pub fn enhanced() -> Self {
        Self {
            top_countries: 5,
            top_browsers: 5,
            top_referers: 10,
            recent_clicks: 100,
        }
    }

    /// Limits used by the legacy flat report.
    pub fn basic() -> Self {
        Self {
            recent_clicks: 10,
            ..Self::enhanced()
        }
    }
}

/// Classification of click-volume trajectory over the two most recent
/// 7-day windows of the daily tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthTrend {
    Growing,
    Declining,
    Stable,
}

/// One row of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_clicks: usize,
    pub unique_visitors: usize,
    pub clicks_last_24h: usize,
    pub clicks_last_7_days: usize,
    pub clicks_last_30_days: usize,
    /// Rounded to two decimal places.
    pub avg_clicks_per_day: f64,
    /// "H:00 (N clicks)", or "No data".
    pub peak_hour: String,
    /// "DayName (N clicks)", or "No data".
    pub peak_day: String,
    pub growth_trend: GrowthTrend,
    /// Shares are rounded to one decimal place independently and do
    /// not necessarily sum to exactly 100.
    pub mobile_share: f64,
    pub desktop_share: f64,
    pub tablet_share: f64,
}

/// Mutually exclusive hour-of-day buckets covering all 24 hours:
/// Night [0,6), Morning [6,12), Afternoon [12,18), Evening [18,24).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimeOfDay {
    pub morning: usize,
    pub afternoon: usize,
    pub evening: usize,
    pub night: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceBreakdown {
    pub mobile: usize,
    pub desktop: usize,
    pub tablet: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub top_countries: Vec<RankedEntry>,
    pub top_browsers: Vec<RankedEntry>,
    pub top_devices: Vec<RankedEntry>,
    pub top_referers: Vec<RankedEntry>,
    /// Each hour's share of the 7-day hourly total, percent, 2 dp.
    pub hourly_click_rate: BTreeMap<u32, f64>,
    pub time_of_day: TimeOfDay,
    pub device_breakdown: DeviceBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct Geographic {
    pub countries: BTreeMap<String, usize>,
    pub regions: BTreeMap<String, usize>,
    pub cities: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub browsers: BTreeMap<String, usize>,
    pub devices: BTreeMap<String, usize>,
    pub operating_systems: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Traffic {
    pub referers: BTreeMap<String, usize>,
    /// Keyed by UTC calendar date ("2026-08-06").
    pub daily_clicks: BTreeMap<String, usize>,
    /// Keyed by hour of day 0-23, last 7 days only.
    pub hourly_clicks: BTreeMap<u32, usize>,
    /// Keyed by English day-of-week name, whole record set.
    pub weekly_clicks: BTreeMap<String, usize>,
}

/// One entry of the bounded recent-clicks feed. The IP is masked on
/// output; the stored record is untouched.
#[derive(Debug, Clone, Serialize)]
pub struct RecentClick {
    pub country: String,
    pub region: String,
    pub city: String,
    pub browser: String,
    pub os: String,
    pub device_type: String,
    pub clicked_at: DateTime<Utc>,
    pub referer: String,
    pub ip_address: String,
}

/// Full analytics report for one short code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: Summary,
    pub insights: Insights,
    pub geographic: Geographic,
    pub technology: Technology,
    pub traffic: Traffic,
    pub recent_clicks: Vec<RecentClick>,
}

/// Entry of the legacy feed: no IP, no region.
#[derive(Debug, Clone, Serialize)]
pub struct BasicRecentClick {
    pub country: String,
    pub city: String,
    pub browser: String,
    pub os: String,
    pub device_type: String,
    pub clicked_at: DateTime<Utc>,
    pub referer: String,
}

/// The flat report shape served by the first-generation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicReport {
    pub total_clicks: usize,
    pub countries: BTreeMap<String, usize>,
    pub browsers: BTreeMap<String, usize>,
    pub devices: BTreeMap<String, usize>,
    pub operating_systems: BTreeMap<String, usize>,
    pub daily_clicks: BTreeMap<String, usize>,
    pub recent_clicks: Vec<BasicRecentClick>,
}
