//! Click analytics: user-agent classification, geo resolution, and
//! on-demand report building.
//!
//! The aggregator is a pure reducer over an immutable snapshot of click
//! records; everything stateful (storage, clock, resolver) is injected
//! by the caller.

pub mod aggregator;
pub mod classifier;
pub mod geoip;
pub mod ip_extractor;
pub mod models;
pub mod report;

pub use aggregator::{build_basic_report, build_report};
pub use classifier::classify;
pub use geoip::GeoIpService;
pub use ip_extractor::extract_client_ip;
pub use models::{ClickRecord, DeviceInfo};
pub use report::{AnalyticsReport, BasicReport, ReportOptions};

/// Sentinel for missing or unclassifiable categorical values.
pub const UNKNOWN: &str = "Unknown";

/// Referrer bucket for visits that arrived without a referer header.
pub const DIRECT: &str = "Direct";

/// Rendered in place of a peak statistic that has no backing data.
pub const NO_DATA: &str = "No data";
