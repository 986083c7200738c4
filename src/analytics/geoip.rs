//! GeoIP lookup service using MaxMind GeoLite2/GeoIP2 MMDB
//!
//! The database is optional: without a configured path every lookup
//! returns `None` and clicks tally under the "Unknown" sentinel.
//! Loopback and private-range addresses are recognized before the
//! resolver is consulted and mapped to a fixed local/dev
//! pseudo-location.

use anyhow::{Context, Result};
use ipnet::Ipv4Net;
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::sync::Arc;

use crate::analytics::models::{DisplayLocation, ResolvedLocation};
use crate::analytics::UNKNOWN;

/// Private ranges treated as local development traffic.
const LOCAL_NETS: [&str; 2] = ["192.168.0.0/16", "10.0.0.0/16"];

/// ISO code to display name, for the countries the service is likely
/// to see. Codes outside the table fall back to the raw code.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("US", "United States"),
    ("RU", "Russia"),
    ("DE", "Germany"),
    ("GB", "United Kingdom"),
    ("FR", "France"),
    ("JP", "Japan"),
    ("CN", "China"),
    ("CA", "Canada"),
    ("AU", "Australia"),
    ("BR", "Brazil"),
    ("IN", "India"),
    ("IT", "Italy"),
    ("ES", "Spain"),
    ("NL", "Netherlands"),
    ("SE", "Sweden"),
    ("NO", "Norway"),
    ("DK", "Denmark"),
    ("FI", "Finland"),
    ("PL", "Poland"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
    ("KZ", "Kazakhstan"),
    ("BY", "Belarus"),
];

/// GeoIP lookup service backed by a memory-mapped City database
pub struct GeoIpService {
    city_reader: Option<Arc<Reader<Mmap>>>,
}

impl GeoIpService {
    /// Create a new GeoIP service from an MMDB file path
    ///
    /// # Arguments
    /// * `city_path` - Optional path to a GeoLite2-City or GeoIP2-City .mmdb file
    pub fn new(city_path: Option<&str>) -> Result<Self> {
        let city_reader = if let Some(path) = city_path {
            let reader = unsafe { Reader::open_mmap(path) }
                .with_context(|| format!("Failed to open GeoIP City database at {}", path))?;
            Some(Arc::new(reader))
        } else {
            None
        };

        Ok(Self { city_reader })
    }

    /// Lookup geographic location for an IP address
    ///
    /// Returns `None` when no database is loaded or the address is not
    /// in it. Fields inside the result may still be individually absent.
    pub fn lookup(&self, ip: IpAddr) -> Option<ResolvedLocation> {
        let reader = self.city_reader.as_ref()?;
        let result = reader.lookup(ip).ok()?;
        let city = result.decode::<geoip2::City>().ok()??;

        Some(ResolvedLocation {
            country_code: city.country.iso_code.map(|s| s.to_string()),
            region: city
                .subdivisions
                .first()
                .and_then(|subdivision| subdivision.names.english.map(|s| s.to_string())),
            city: city.city.names.english.map(|s| s.to_string()),
        })
    }
}

// Implement Clone by cloning the Arc
impl Clone for GeoIpService {
    fn clone(&self) -> Self {
        Self {
            city_reader: self.city_reader.clone(),
        }
    }
}

/// True for loopback and the private ranges used in development setups.
pub fn is_local_address(ip: IpAddr) -> bool {
    if ip.is_loopback() {
        return true;
    }
    let IpAddr::V4(v4) = ip else { return false };
    LOCAL_NETS
        .iter()
        .filter_map(|net| net.parse::<Ipv4Net>().ok())
        .any(|net| net.contains(&v4))
}

/// Map an ISO country code to its display name, falling back to the
/// raw code, and to "Unknown" when no code is present.
pub fn country_display_name(code: Option<&str>) -> String {
    match code {
        Some(code) => COUNTRY_NAMES
            .iter()
            .find(|(iso, _)| *iso == code)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_else(|| code.to_string()),
        None => UNKNOWN.to_string(),
    }
}

/// Resolve the display location recorded on a click.
///
/// Local/dev addresses never reach the resolver; resolver misses tally
/// as "Unknown" across all three fields.
pub fn resolve_location(service: &GeoIpService, ip: IpAddr) -> DisplayLocation {
    if is_local_address(ip) {
        return DisplayLocation {
            country: "Local Network".to_string(),
            region: "Development".to_string(),
            city: "localhost".to_string(),
        };
    }

    match service.lookup(ip) {
        Some(location) => DisplayLocation {
            country: country_display_name(location.country_code.as_deref()),
            region: location.region.unwrap_or_else(|| UNKNOWN.to_string()),
            city: location.city.unwrap_or_else(|| UNKNOWN.to_string()),
        },
        None => DisplayLocation {
            country: UNKNOWN.to_string(),
            region: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
        },
    }
}
