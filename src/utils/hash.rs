//! Privacy hashing
//!
//! Everything that could re-identify a visitor goes through SHA-256 before it
//! is persisted. Inputs are already generalized (IP prefix, lowercased UA).

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

const MISSING_IP: &str = "no-ip";
const MISSING_UA: &str = "no-ua";

/// 64-char lowercase hex SHA-256
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Uniqueness / change-detection key for a destination URL
pub fn destination_url_hash(destination_url: &str) -> String {
    sha256_hex(destination_url)
}

/// Hash of a generalized IP prefix (never the raw address)
pub fn ip_hash(generalized_ip: &str) -> String {
    sha256_hex(&format!("ip|{}", generalized_ip))
}

/// Daily-rotating fingerprint used to estimate unique opens
///
/// Returns `None` when neither an IP prefix nor a user agent is known.
pub fn fingerprint_hash(
    generalized_ip: Option<&str>,
    user_agent: Option<&str>,
    day_bucket: NaiveDate,
) -> Option<String> {
    let user_agent = user_agent.map(str::trim).filter(|ua| !ua.is_empty());
    if generalized_ip.is_none() && user_agent.is_none() {
        return None;
    }

    let ua_lower = user_agent.map(str::to_lowercase);
    Some(sha256_hex(&format!(
        "fp|{}|{}|{}",
        generalized_ip.unwrap_or(MISSING_IP),
        ua_lower.as_deref().unwrap_or(MISSING_UA),
        day_bucket.format("%Y-%m-%d")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sha256_hex_shape() {
        let h = sha256_hex("https://example.com");
        assert_eq!(h.len(), 64);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(h, sha256_hex("https://example.com"));
    }

    #[test]
    fn test_fingerprint_rotates_daily() {
        let a = fingerprint_hash(Some("203.0.113.0/24"), Some("UA"), day(2026, 1, 1));
        let b = fingerprint_hash(Some("203.0.113.0/24"), Some("UA"), day(2026, 1, 2));
        assert!(a.is_some());
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_ua_case() {
        let a = fingerprint_hash(None, Some("Mozilla/5.0"), day(2026, 1, 1));
        let b = fingerprint_hash(None, Some("MOZILLA/5.0"), day(2026, 1, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_requires_some_signal() {
        assert_eq!(fingerprint_hash(None, None, day(2026, 1, 1)), None);
        assert_eq!(fingerprint_hash(None, Some("   "), day(2026, 1, 1)), None);
    }

    #[test]
    fn test_ip_hash_is_not_the_prefix() {
        let h = ip_hash("203.0.113.0/24");
        assert!(!h.contains("203.0.113"));
    }
}
