//! Integration tests for the analytics report builder
//!
//! The builder is a pure function of (records, created_at, now), so
//! every test pins `now` and asserts exact output.

use chrono::{DateTime, Duration, TimeZone, Utc};
use stoat::analytics::report::{GrowthTrend, ReportOptions};
use stoat::analytics::{build_report, ClickRecord};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 20, 12, 0, 0).unwrap()
}

fn click(clicked_at: DateTime<Utc>) -> ClickRecord {
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
fn empty_record_set_yields_zeroed_report() {
    let now = fixed_now();
    let report = build_report(&[], now, now, &ReportOptions::enhanced());

    assert_eq!(report.summary.total_clicks, 0);
    assert_eq!(report.summary.unique_visitors, 0);
    assert_eq!(report.summary.avg_clicks_per_day, 0.0);
    assert_eq!(report.summary.peak_hour, "No data");
    assert_eq!(report.summary.peak_day, "No data");
    assert_eq!(report.summary.growth_trend, GrowthTrend::Stable);
    assert_eq!(report.summary.mobile_share, 0.0);
    assert_eq!(report.summary.desktop_share, 0.0);
    assert_eq!(report.summary.tablet_share, 0.0);
    assert!(report.geographic.countries.is_empty());
    assert!(report.recent_clicks.is_empty());
}

#[test]
fn ten_clicks_from_one_ip() {
    let now = fixed_now();
    let records: Vec<ClickRecord> = (0..10)
        .map(|i| click(now - Duration::minutes(i)))
        .collect();

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());

    assert_eq!(report.summary.total_clicks, 10);
    assert_eq!(report.summary.unique_visitors, 1);
    assert_eq!(report.geographic.countries.len(), 1);
    assert_eq!(report.geographic.countries.get("United States"), Some(&10));
    assert_eq!(report.technology.browsers.get("Chrome"), Some(&10));
}

#[test]
fn unique_visitors_never_exceeds_total() {
    let now = fixed_now();
    let mut records = Vec::new();
    for i in 0..6 {
        let mut record = click(now - Duration::minutes(i));
        record.ip_address = format!("10.1.0.{}", i % 3);
        records.push(record);
    }

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());
    assert_eq!(report.summary.total_clicks, 6);
    assert_eq!(report.summary.unique_visitors, 3);
}

#[test]
fn time_windows_are_nested() {
    let now = fixed_now();
    let records = vec![
        click(now - Duration::hours(1)),
        click(now - Duration::days(3)),
        click(now - Duration::days(20)),
        click(now - Duration::days(40)),
    ];

    let report = build_report(&records, now - Duration::days(60), now, &ReportOptions::enhanced());

    assert_eq!(report.summary.clicks_last_24h, 1);
    assert_eq!(report.summary.clicks_last_7_days, 2);
    assert_eq!(report.summary.clicks_last_30_days, 3);
    assert_eq!(report.summary.total_clicks, 4);
    assert!(report.summary.clicks_last_24h <= report.summary.clicks_last_7_days);
    assert!(report.summary.clicks_last_7_days <= report.summary.clicks_last_30_days);
}

#[test]
fn time_of_day_buckets_partition_exactly() {
    let now = fixed_now();
    let base = Utc.with_ymd_and_hms(2026, 4, 19, 0, 0, 0).unwrap();
    let records = vec![
        click(base + Duration::hours(2)),  // night
        click(base + Duration::hours(8)),  // morning
        click(base + Duration::hours(13)), // afternoon
        click(base + Duration::hours(20)), // evening
        click(base + Duration::hours(5)),  // night
    ];

    let report = build_report(&records, base, now, &ReportOptions::enhanced());
    let buckets = &report.insights.time_of_day;

    assert_eq!(buckets.night, 2);
    assert_eq!(buckets.morning, 1);
    assert_eq!(buckets.afternoon, 1);
    assert_eq!(buckets.evening, 1);
    assert_eq!(
        buckets.night + buckets.morning + buckets.afternoon + buckets.evening,
        report.summary.total_clicks
    );
}

#[test]
fn empty_referer_counts_as_direct() {
    let now = fixed_now();
    let mut with_referer = click(now - Duration::hours(2));
    with_referer.referer = "https://news.ycombinator.com/item?id=1".to_string();
    let mut garbage = click(now - Duration::hours(3));
    garbage.referer = "not a url at all".to_string();
    let records = vec![click(now - Duration::hours(1)), with_referer, garbage];

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());

    assert_eq!(report.traffic.referers.get("Direct"), Some(&1));
    assert_eq!(report.traffic.referers.get("news.ycombinator.com"), Some(&1));
    assert_eq!(report.traffic.referers.get("Unknown"), Some(&1));
}

#[test]
fn fourteen_days_of_doubling_is_growing() {
    let now = fixed_now();
    let mut records = Vec::new();
    // Prior week: one click per day. Recent week: two per day.
    for day in 8..=14 {
        records.push(click(now - Duration::days(day)));
    }
    for day in 1..=7 {
        records.push(click(now - Duration::days(day)));
        records.push(click(now - Duration::days(day) + Duration::hours(1)));
    }

    let report = build_report(&records, now - Duration::days(15), now, &ReportOptions::enhanced());
    assert_eq!(report.summary.growth_trend, GrowthTrend::Growing);
}

#[test]
fn fourteen_days_of_halving_is_declining() {
    let now = fixed_now();
    let mut records = Vec::new();
    for day in 8..=14 {
        records.push(click(now - Duration::days(day)));
        records.push(click(now - Duration::days(day) + Duration::hours(1)));
    }
    for day in 1..=7 {
        records.push(click(now - Duration::days(day)));
    }

    let report = build_report(&records, now - Duration::days(15), now, &ReportOptions::enhanced());
    assert_eq!(report.summary.growth_trend, GrowthTrend::Declining);
}

#[test]
fn single_day_is_stable_by_default() {
    let now = fixed_now();
    let records = vec![click(now - Duration::hours(1)), click(now - Duration::hours(2))];

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());
    assert_eq!(report.summary.growth_trend, GrowthTrend::Stable);
}

#[test]
fn device_shares_are_bounded_and_rounded() {
    let now = fixed_now();
    let mut mobile = click(now - Duration::hours(1));
    mobile.device_type = "Mobile".to_string();
    let mut tablet = click(now - Duration::hours(2));
    tablet.device_type = "Tablet".to_string();
    let desktop = click(now - Duration::hours(3));
    let records = vec![mobile, tablet, desktop];

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());

    assert_eq!(report.summary.mobile_share, 33.3);
    assert_eq!(report.summary.desktop_share, 33.3);
    assert_eq!(report.summary.tablet_share, 33.3);
    for share in [
        report.summary.mobile_share,
        report.summary.desktop_share,
        report.summary.tablet_share,
    ] {
        assert!((0.0..=100.0).contains(&share));
    }
    assert_eq!(report.insights.device_breakdown.mobile, 1);
    assert_eq!(report.insights.device_breakdown.desktop, 1);
    assert_eq!(report.insights.device_breakdown.tablet, 1);
}

#[test]
fn average_clicks_per_day_over_five_days() {
    let now = fixed_now();
    let records: Vec<ClickRecord> = (0..10)
        .map(|i| click(now - Duration::hours(i * 2)))
        .collect();

    let report = build_report(&records, now - Duration::days(5), now, &ReportOptions::enhanced());
    assert_eq!(report.summary.avg_clicks_per_day, 2.0);
}

#[test]
fn hourly_tally_covers_only_the_last_seven_days() {
    let now = fixed_now();
    let recent = click(now - Duration::hours(3));
    let old = click(now - Duration::days(10));
    let records = vec![recent.clone(), old.clone()];

    let report = build_report(&records, now - Duration::days(20), now, &ReportOptions::enhanced());

    let hourly_total: usize = report.traffic.hourly_clicks.values().sum();
    assert_eq!(hourly_total, 1);
    // The old click still lands in the whole-set tallies.
    assert_eq!(report.traffic.daily_clicks.values().sum::<usize>(), 2);
    assert_eq!(report.traffic.weekly_clicks.values().sum::<usize>(), 2);
}

#[test]
fn recent_feed_masks_ip_without_touching_records() {
    let now = fixed_now();
    let mut record = click(now - Duration::hours(1));
    record.ip_address = "203.0.113.7".to_string();
    let records = vec![record];

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());

    assert_eq!(report.recent_clicks[0].ip_address, "203.0.113.***");
    assert_eq!(records[0].ip_address, "203.0.113.7");
}

#[test]
fn recent_feed_is_truncated_and_newest_first() {
    let now = fixed_now();
    let records: Vec<ClickRecord> = (0..120)
        .map(|i| click(now - Duration::minutes(i)))
        .collect();

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());

    assert_eq!(report.recent_clicks.len(), 100);
    assert_eq!(report.recent_clicks[0].clicked_at, now);
    assert!(report.recent_clicks[0].clicked_at >= report.recent_clicks[99].clicked_at);
}

#[test]
fn report_is_idempotent() {
    let now = fixed_now();
    let records: Vec<ClickRecord> = (0..30)
        .map(|i| {
            let mut record = click(now - Duration::hours(i));
            record.ip_address = format!("198.51.100.{}", i % 5);
            record.browser = if i % 2 == 0 { "Chrome" } else { "Firefox" }.to_string();
            record
        })
        .collect();
    let created_at = now - Duration::days(3);

    let first = build_report(&records, created_at, now, &ReportOptions::enhanced());
    let second = build_report(&records, created_at, now, &ReportOptions::enhanced());

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn input_order_does_not_matter() {
    let now = fixed_now();
    let mut records: Vec<ClickRecord> = (0..20)
        .map(|i| click(now - Duration::hours(i)))
        .collect();
    let created_at = now - Duration::days(2);

    let sorted = build_report(&records, created_at, now, &ReportOptions::enhanced());
    records.reverse();
    let reversed = build_report(&records, created_at, now, &ReportOptions::enhanced());

    assert_eq!(
        serde_json::to_value(&sorted).unwrap(),
        serde_json::to_value(&reversed).unwrap()
    );
}

#[test]
fn top_rankings_respect_their_limits() {
    let now = fixed_now();
    let mut records = Vec::new();
    for i in 0..8 {
        let mut record = click(now - Duration::minutes(i));
        record.country = format!("Country {}", i);
        record.browser = format!("Browser {}", i);
        record.referer = format!("https://site{}.example.com/", i);
        records.push(record);
    }

    let report = build_report(&records, now - Duration::days(1), now, &ReportOptions::enhanced());

    assert_eq!(report.insights.top_countries.len(), 5);
    assert_eq!(report.insights.top_browsers.len(), 5);
    assert_eq!(report.insights.top_referers.len(), 8); // under the limit of 10
    assert_eq!(report.geographic.countries.len(), 8); // full map is untruncated
}
