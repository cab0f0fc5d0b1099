//! Click classifier
//!
//! Best-effort heuristics over the user agent. Every function is total and
//! falls back to `"unknown"`; the raw user agent never leaves this module.

use once_cell::sync::Lazy;
use regex::Regex;

pub const UNKNOWN: &str = "unknown";
pub const BOT_FAMILY: &str = "bot";

static BOT_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)bot|crawl|spider|slurp|preview|headless|phantomjs|puppeteer|playwright|selenium|curl|wget|python-requests|python-urllib|go-http-client|okhttp|axios|node-fetch|libwww|httpclient|scrapy|facebookexternalhit|whatsapp|slackbot|discordbot|linkedinbot|telegrambot|twitterbot|skypeuripreview|embedly|vkshare|pinterest",
    )
    .ok()
});

/// Classifier output for one click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickClassification {
    pub is_likely_bot: bool,
    pub device_type: &'static str,
    pub ua_family: &'static str,
    pub os_family: &'static str,
}

pub fn classify(user_agent: Option<&str>) -> ClickClassification {
    let ua = user_agent.map(str::trim).unwrap_or_default().to_lowercase();
    let is_likely_bot = is_bot(&ua);

    ClickClassification {
        is_likely_bot,
        device_type: device_type(&ua),
        ua_family: if is_likely_bot {
            BOT_FAMILY
        } else {
            browser_family(&ua)
        },
        os_family: os_family(&ua),
    }
}

pub fn is_bot(ua: &str) -> bool {
    !ua.is_empty()
        && BOT_PATTERN
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(ua))
}

/// `ua` must already be lowercase
pub fn device_type(ua: &str) -> &'static str {
    if contains_any(ua, &["tablet", "ipad"]) {
        "tablet"
    } else if contains_any(ua, &["mobile", "iphone", "android"]) {
        "mobile"
    } else if contains_any(ua, &["windows", "macintosh", "linux", "x11", "cros "]) {
        "desktop"
    } else {
        UNKNOWN
    }
}

/// Order matters: Edge and Opera also carry `chrome/`, Chrome carries `safari/`.
pub fn browser_family(ua: &str) -> &'static str {
    if contains_any(ua, &["edg/", "edge/", "edga/", "edgios/"]) {
        "edge"
    } else if contains_any(ua, &["opr/", "opera"]) {
        "opera"
    } else if contains_any(ua, &["chrome/", "crios/", "chromium/"]) {
        "chrome"
    } else if contains_any(ua, &["firefox/", "fxios/"]) {
        "firefox"
    } else if ua.contains("safari/") {
        "safari"
    } else {
        UNKNOWN
    }
}

/// Android before Linux, iOS before macOS
pub fn os_family(ua: &str) -> &'static str {
    if ua.contains("windows") {
        "windows"
    } else if ua.contains("android") {
        "android"
    } else if contains_any(ua, &["iphone", "ipad", "ipod"]) {
        "ios"
    } else if contains_any(ua, &["mac os", "macintosh"]) {
        "macos"
    } else if contains_any(ua, &["linux", "x11", "cros "]) {
        "linux"
    } else {
        UNKNOWN
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
