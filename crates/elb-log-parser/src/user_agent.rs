//! Coarse user-agent classification into browser and OS families.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::UNKNOWN;

// Browser signatures, checked in order: more specific tokens come first
// (Edge and Opera UAs also carry "Chrome/", Chrome UAs carry "Safari/").
static BROWSER_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"ELB-HealthChecker/").unwrap(), "ELB-HealthChecker"),
        (Regex::new(r"(?i)\bGooglebot\b").unwrap(), "Googlebot"),
        (Regex::new(r"(?i)\bbingbot\b").unwrap(), "bingbot"),
        (Regex::new(r"\bEdg(?:e|A|iOS)?/").unwrap(), "Edge"),
        (Regex::new(r"\b(?:OPR|Opera)/").unwrap(), "Opera"),
        (Regex::new(r"\bSamsungBrowser/").unwrap(), "Samsung Internet"),
        (Regex::new(r"\b(?:Firefox|FxiOS)/").unwrap(), "Firefox"),
        (Regex::new(r"\bCriOS/").unwrap(), "Chrome Mobile iOS"),
        (Regex::new(r"\bChrome/[\d.]+ Mobile\b").unwrap(), "Chrome Mobile"),
        (Regex::new(r"\b(?:Chrome|Chromium)/").unwrap(), "Chrome"),
        (
            Regex::new(r"\bVersion/[\d.]+ Mobile/\S+ Safari/").unwrap(),
            "Mobile Safari",
        ),
        (Regex::new(r"\bVersion/[\d.]+.* Safari/").unwrap(), "Safari"),
        (Regex::new(r"\bMSIE \d|\bTrident/").unwrap(), "IE"),
        (Regex::new(r"^curl/").unwrap(), "curl"),
        (Regex::new(r"^Wget/").unwrap(), "Wget"),
        (Regex::new(r"^python-requests/").unwrap(), "Python Requests"),
        (Regex::new(r"^Go-http-client/").unwrap(), "Go-http-client"),
    ]
});

// iOS before Mac OS X (iPhone UAs say "like Mac OS X"), Android before Linux
static OS_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\bWindows\b").unwrap(), "Windows"),
        (Regex::new(r"\b(?:iPhone|iPad|iPod)\b").unwrap(), "iOS"),
        (Regex::new(r"\bAndroid\b").unwrap(), "Android"),
        (Regex::new(r"\bCrOS\b").unwrap(), "Chrome OS"),
        (Regex::new(r"\b(?:Macintosh|Mac OS X)\b").unwrap(), "Mac OS X"),
        (Regex::new(r"\bLinux\b").unwrap(), "Linux"),
    ]
});

/// Browser and OS family for one user agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaClass {
    pub browser_family: String,
    pub os_family: String,
}

impl UaClass {
    pub fn unknown() -> Self {
        Self {
            browser_family: UNKNOWN.to_string(),
            os_family: UNKNOWN.to_string(),
        }
    }
}

/// Classify a user-agent string (already unquoted). Never fails.
pub fn classify(user_agent: &str) -> UaClass {
    let ua = user_agent.trim();
    if ua.is_empty() || ua == "-" {
        return UaClass::unknown();
    }
    UaClass {
        browser_family: first_match(&BROWSER_PATTERNS, ua).to_string(),
        os_family: first_match(&OS_PATTERNS, ua).to_string(),
    }
}

fn first_match(patterns: &[(Regex, &'static str)], ua: &str) -> &'static str {
    patterns
        .iter()
        .find(|(pattern, _)| pattern.is_match(ua))
        .map_or(UNKNOWN, |(_, family)| *family)
}
