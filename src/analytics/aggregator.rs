//! Analytics report builder
//!
//! A pure reducer: one pass over the click records plus a few
//! whole-list reductions. No hidden state, no clock access — `now` is
//! injected so reports are reproducible in tests. All calendar
//! bucketing (dates, hours, weekdays) uses UTC as carried by
//! `clicked_at`; no local-timezone formatting anywhere.
//!
//! Input order is not assumed; the recent-clicks feed sorts its own
//! reverse-chronological view. Degenerate input (empty record set,
//! zero elapsed time, missing fields) is absorbed by sentinels and
//! numeric guards — nothing in here can fail.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::collections::{BTreeMap, HashSet};
use url::Url;

use crate::analytics::models::ClickRecord;
use crate::analytics::report::{
    AnalyticsReport, BasicRecentClick, BasicReport, DeviceBreakdown, Geographic, GrowthTrend,
    Insights, RankedEntry, RecentClick, ReportOptions, Summary, Technology, TimeOfDay, Traffic,
};
use crate::analytics::{DIRECT, NO_DATA, UNKNOWN};

/// Build the full analytics report for one short code.
///
/// `created_at` is the owning URL's creation time, `now` the request
/// wall-clock. Calling twice with the same inputs yields identical
/// output.
pub fn build_report(
    records: &[ClickRecord],
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    options: &ReportOptions,
) -> AnalyticsReport {
    let total_clicks = records.len();

    let cutoff_24h = now - Duration::hours(24);
    let cutoff_7d = now - Duration::days(7);
    let cutoff_30d = now - Duration::days(30);

    let mut unique_ips: HashSet<&str> = HashSet::new();
    let mut clicks_last_24h = 0;
    let mut clicks_last_7_days = 0;
    let mut clicks_last_30_days = 0;

    let mut countries = BTreeMap::new();
    let mut regions = BTreeMap::new();
    let mut cities = BTreeMap::new();
    let mut browsers = BTreeMap::new();
    let mut devices = BTreeMap::new();
    let mut operating_systems = BTreeMap::new();
    let mut referers = BTreeMap::new();

    let mut daily_clicks: BTreeMap<String, usize> = BTreeMap::new();
    let mut hourly_clicks: BTreeMap<u32, usize> = BTreeMap::new();
    // Sunday-first, indexed by Weekday::num_days_from_sunday.
    let mut weekday_counts = [0usize; 7];

    let mut time_of_day = TimeOfDay::default();
    let mut breakdown = DeviceBreakdown::default();

    for record in records {
        let clicked = record.clicked_at;

        // The windows are nested, not mutually exclusive.
        if clicked > cutoff_24h {
            clicks_last_24h += 1;
        }
        if clicked > cutoff_7d {
            clicks_last_7_days += 1;
        }
        if clicked > cutoff_30d {
            clicks_last_30_days += 1;
        }

        unique_ips.insert(record.ip_address.as_str());

        bump(&mut countries, or_unknown(&record.country));
        bump(&mut regions, or_unknown(&record.region));
        bump(&mut cities, or_unknown(&record.city));
        bump(&mut browsers, or_unknown(&record.browser));
        bump(&mut devices, or_unknown(&record.device_type));
        bump(&mut operating_systems, or_unknown(&record.os));
        bump(&mut referers, &referrer_domain(&record.referer));

        bump(&mut daily_clicks, &clicked.date_naive().to_string());

        if clicked > cutoff_7d {
            *hourly_clicks.entry(clicked.hour()).or_insert(0) += 1;
        }

        weekday_counts[clicked.weekday().num_days_from_sunday() as usize] += 1;

        match clicked.hour() {
            0..=5 => time_of_day.night += 1,
            6..=11 => time_of_day.morning += 1,
            12..=17 => time_of_day.afternoon += 1,
            _ => time_of_day.evening += 1,
        }

        match record.device_type.as_str() {
            "Mobile" => breakdown.mobile += 1,
            "Desktop" => breakdown.desktop += 1,
            "Tablet" => breakdown.tablet += 1,
            _ => {}
        }
    }

    let weekly_clicks: BTreeMap<String, usize> = weekday_counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .map(|(index, count)| (day_name(index).to_string(), *count))
        .collect();

    // Ties break toward the lower hour / earlier Sunday-first day:
    // iteration is ascending and only a strictly greater count wins.
    let peak_hour = hourly_clicks
        .iter()
        .fold(None::<(u32, usize)>, |best, (hour, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((*hour, *count)),
        })
        .map(|(hour, count)| format!("{}:00 ({} clicks)", hour, count))
        .unwrap_or_else(|| NO_DATA.to_string());

    let peak_day = weekday_counts
        .iter()
        .enumerate()
        .filter(|(_, count)| **count > 0)
        .fold(None::<(usize, usize)>, |best, (index, count)| match best {
            Some((_, best_count)) if best_count >= *count => best,
            _ => Some((index, *count)),
        })
        .map(|(index, count)| format!("{} ({} clicks)", day_name(index), count))
        .unwrap_or_else(|| NO_DATA.to_string());

    let avg_clicks_per_day = if total_clicks > 0 {
        let elapsed_days = (now - created_at).num_seconds() as f64 / 86_400.0;
        round2(total_clicks as f64 / elapsed_days.ceil().max(1.0))
    } else {
        0.0
    };

    let growth_trend = classify_growth(&daily_clicks);

    let total_hourly: usize = hourly_clicks.values().sum();
    let hourly_click_rate: BTreeMap<u32, f64> = hourly_clicks
        .iter()
        .map(|(hour, count)| (*hour, percentage(*count, total_hourly, 2)))
        .collect();

    let insights = Insights {
        top_countries: top_n(&countries, options.top_countries),
        top_browsers: top_n(&browsers, options.top_browsers),
        top_devices: top_n(&devices, devices.len()),
        top_referers: top_n(&referers, options.top_referers),
        hourly_click_rate,
        time_of_day,
        device_breakdown: breakdown.clone(),
    };

    let summary = Summary {
        total_clicks,
        unique_visitors: unique_ips.len(),
        clicks_last_24h,
        clicks_last_7_days,
        clicks_last_30_days,
        avg_clicks_per_day,
        peak_hour,
        peak_day,
        growth_trend,
        mobile_share: percentage(breakdown.mobile, total_clicks, 1),
        desktop_share: percentage(breakdown.desktop, total_clicks, 1),
        tablet_share: percentage(breakdown.tablet, total_clicks, 1),
    };

    let recent_clicks = most_recent(records, options.recent_clicks)
        .into_iter()
        .map(|record| RecentClick {
            country: record.country.clone(),
            region: record.region.clone(),
            city: record.city.clone(),
            browser: record.browser.clone(),
            os: record.os.clone(),
            device_type: record.device_type.clone(),
            clicked_at: record.clicked_at,
            referer: record.referer.clone(),
            ip_address: mask_ip(&record.ip_address),
        })
        .collect();

    AnalyticsReport {
        summary,
        insights,
        geographic: Geographic {
            countries,
            regions,
            cities,
        },
        technology: Technology {
            browsers,
            devices,
            operating_systems,
        },
        traffic: Traffic {
            referers,
            daily_clicks,
            hourly_clicks,
            weekly_clicks,
        },
        recent_clicks,
    }
}

/// Build the legacy flat report: plain tallies plus a short feed.
pub fn build_basic_report(records: &[ClickRecord], options: &ReportOptions) -> BasicReport {
    let mut countries = BTreeMap::new();
    let mut browsers = BTreeMap::new();
    let mut devices = BTreeMap::new();
    let mut operating_systems = BTreeMap::new();
    let mut daily_clicks = BTreeMap::new();

    for record in records {
        bump(&mut countries, or_unknown(&record.country));
        bump(&mut browsers, or_unknown(&record.browser));
        bump(&mut devices, or_unknown(&record.device_type));
        bump(&mut operating_systems, or_unknown(&record.os));
        bump(&mut daily_clicks, &record.clicked_at.date_naive().to_string());
    }

    let recent_clicks = most_recent(records, options.recent_clicks)
        .into_iter()
        .map(|record| BasicRecentClick {
            country: record.country.clone(),
            city: record.city.clone(),
            browser: record.browser.clone(),
            os: record.os.clone(),
            device_type: record.device_type.clone(),
            clicked_at: record.clicked_at,
            referer: record.referer.clone(),
        })
        .collect();

    BasicReport {
        total_clicks: records.len(),
        countries,
        browsers,
        devices,
        operating_systems,
        daily_clicks,
        recent_clicks,
    }
}

/// Derive the referrer bucket for a click. Empty means the visitor
/// typed or pasted the link ("Direct"); a referer that cannot be
/// parsed to a host is a distinct "Unknown".
fn referrer_domain(referer: &str) -> String {
    if referer.is_empty() {
        return DIRECT.to_string();
    }
    match Url::parse(referer) {
        Ok(url) => url
            .host_str()
            .map(|host| host.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string()),
        Err(_) => UNKNOWN.to_string(),
    }
}

/// Mask the final dot-delimited octet for display ("1.2.3.***").
/// Addresses without a dot are masked entirely; empty renders "N/A".
/// The stored value is never modified.
fn mask_ip(ip: &str) -> String {
    if ip.is_empty() {
        return "N/A".to_string();
    }
    match ip.rfind('.') {
        Some(index) => format!("{}.***", &ip[..index]),
        None => "***".to_string(),
    }
}

/// Growth classification over the chronologically sorted daily tally:
/// the most recent 7 entries against the 7 before them. Fewer than two
/// distinct days is always "stable".
fn classify_growth(daily_clicks: &BTreeMap<String, usize>) -> GrowthTrend {
    if daily_clicks.len() < 2 {
        return GrowthTrend::Stable;
    }

    let counts: Vec<usize> = daily_clicks.values().copied().collect();
    let len = counts.len();
    let recent = &counts[len.saturating_sub(7)..];
    let previous = &counts[len.saturating_sub(14)..len.saturating_sub(7)];

    let recent_avg = mean(recent);
    let previous_avg = if previous.is_empty() { 0.0 } else { mean(previous) };

    if recent_avg > previous_avg * 1.1 {
        GrowthTrend::Growing
    } else if recent_avg < previous_avg * 0.9 {
        GrowthTrend::Declining
    } else {
        GrowthTrend::Stable
    }
}

/// References to the most recent `limit` records, newest first. Equal
/// timestamps keep later-inserted records first, matching the store's
/// newest-first ordering.
fn most_recent(records: &[ClickRecord], limit: usize) -> Vec<&ClickRecord> {
    let mut ordered: Vec<&ClickRecord> = records.iter().rev().collect();
    ordered.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
    ordered.truncate(limit);
    ordered
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str) {
    *map.entry(key.to_string()).or_insert(0) += 1;
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN
    } else {
        value
    }
}

/// Descending by count; equal counts keep the map's key-ascending
/// order (stable sort), so rankings are deterministic.
fn top_n(map: &BTreeMap<String, usize>, limit: usize) -> Vec<RankedEntry> {
    let mut entries: Vec<RankedEntry> = map
        .iter()
        .map(|(name, count)| RankedEntry {
            name: name.clone(),
            count: *count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(limit);
    entries
}

/// Percentage with a zero-total guard: never NaN, never a panic.
fn percentage(count: usize, total: usize, decimals: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let factor = 10f64.powi(decimals as i32);
    (count as f64 / total as f64 * 100.0 * factor).round() / factor
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn mean(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

fn day_name(index: usize) -> &'static str {
    match index {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        _ => "Saturday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn click_at(clicked_at: DateTime<Utc>) -> ClickRecord {
        ClickRecord {
            short_code: "abc123".to_string(),
            ip_address: "1.2.3.4".to_string(),
            country: "United States".to_string(),
            region: "CA".to_string(),
            city: "San Francisco".to_string(),
            user_agent: String::new(),
            browser: "Chrome".to_string(),
            os: "Windows".to_string(),
            device_type: "Desktop".to_string(),
            referer: String::new(),
            clicked_at,
        }
    }

    #[test]
    fn mask_ip_replaces_last_octet() {
        assert_eq!(mask_ip("203.0.113.7"), "203.0.113.***");
        assert_eq!(mask_ip("2001:db8::1"), "***");
        assert_eq!(mask_ip(""), "N/A");
    }

    #[test]
    fn referrer_domain_buckets() {
        assert_eq!(referrer_domain(""), DIRECT);
        assert_eq!(referrer_domain("https://news.ycombinator.com/item?id=1"), "news.ycombinator.com");
        assert_eq!(referrer_domain("not a url"), UNKNOWN);
        assert_eq!(referrer_domain("mailto:someone@example.com"), UNKNOWN);
    }

    #[test]
    fn peak_hour_tie_breaks_to_lower_hour() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let day = Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap();
        let records = vec![
            click_at(day + Duration::hours(15)),
            click_at(day + Duration::hours(9)),
        ];

        let report = build_report(&records, day, now, &ReportOptions::enhanced());
        assert_eq!(report.summary.peak_hour, "9:00 (1 clicks)");
    }

    #[test]
    fn peak_day_tie_breaks_sunday_first() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        // 2026-03-08 is a Sunday, 2026-03-09 a Monday.
        let records = vec![
            click_at(Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap()),
            click_at(Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap()),
        ];

        let report = build_report(&records, now - Duration::days(5), now, &ReportOptions::enhanced());
        assert_eq!(report.summary.peak_day, "Sunday (1 clicks)");
    }

    #[test]
    fn future_created_at_does_not_break_average() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let records = vec![click_at(now - Duration::hours(1))];

        let report = build_report(&records, now + Duration::days(3), now, &ReportOptions::enhanced());
        assert_eq!(report.summary.avg_clicks_per_day, 1.0);
    }

    #[test]
    fn empty_fields_tally_as_unknown() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let mut record = click_at(now - Duration::hours(2));
        record.country = String::new();
        record.browser = String::new();

        let report = build_report(&[record], now - Duration::days(1), now, &ReportOptions::enhanced());
        assert_eq!(report.geographic.countries.get(UNKNOWN), Some(&1));
        assert_eq!(report.technology.browsers.get(UNKNOWN), Some(&1));
        assert_eq!(report.summary.total_clicks, 1);
    }

    #[test]
    fn basic_report_keeps_ten_most_recent() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let records: Vec<ClickRecord> = (0..15)
            .map(|i| click_at(now - Duration::minutes(i)))
            .collect();

        let report = build_basic_report(&records, &ReportOptions::basic());
        assert_eq!(report.total_clicks, 15);
        assert_eq!(report.recent_clicks.len(), 10);
        assert_eq!(report.recent_clicks[0].clicked_at, now);
    }

    #[test]
    fn top_n_is_deterministic_on_ties() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 2);
        map.insert("c".to_string(), 5);

        let ranked = top_n(&map, 3);
        assert_eq!(ranked[0].name, "c");
        assert_eq!(ranked[1].name, "a");
        assert_eq!(ranked[2].name, "b");
    }
}
