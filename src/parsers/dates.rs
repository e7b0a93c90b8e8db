//! Publication date normalization.
//!
//! Sites publish dates in every format imaginable; downstream consumers
//! get exactly one: ISO-8601. Anything unparseable becomes None rather
//! than a guess.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime formats seen in the wild, tried after RFC 3339/2822.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Date-only formats, emitted as `YYYY-MM-DD`.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
];

/// Normalize a raw date string to ISO-8601.
///
/// Returns None when the input cannot be parsed with reasonable
/// confidence; callers treat that as "date unknown".
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.to_rfc3339());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.format("%Y-%m-%d").to_string());
        }
    }

    // Last resort: an embedded YYYY-MM-DD somewhere in the string
    // ("Published 2024-03-01 by staff").
    static EMBEDDED: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
        regex::Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("static regex")
    });
    if let Some(cap) = EMBEDDED.captures(raw) {
        let candidate = format!("{}-{}-{}", &cap[1], &cap[2], &cap[3]);
        if NaiveDate::parse_from_str(&candidate, "%Y-%m-%d").is_ok() {
            return Some(candidate);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_passes_through() {
        let iso = normalize_date("2024-03-01T08:30:00+01:00").expect("parsed");
        assert!(iso.starts_with("2024-03-01T08:30:00"));
    }

    #[test]
    fn rfc2822_converted() {
        let iso = normalize_date("Fri, 01 Mar 2024 08:30:00 +0000").expect("parsed");
        assert!(iso.starts_with("2024-03-01"));
    }

    #[test]
    fn human_formats() {
        assert_eq!(normalize_date("March 1, 2024").as_deref(), Some("2024-03-01"));
        assert_eq!(normalize_date("1 March 2024").as_deref(), Some("2024-03-01"));
        assert_eq!(normalize_date("01.03.2024").as_deref(), Some("2024-03-01"));
    }

    #[test]
    fn embedded_iso_date() {
        assert_eq!(
            normalize_date("Published 2024-03-01 by the newsroom").as_deref(),
            Some("2024-03-01")
        );
    }

    #[test]
    fn garbage_is_none() {
        assert!(normalize_date("").is_none());
        assert!(normalize_date("yesterday-ish").is_none());
        assert!(normalize_date("Related Articles").is_none());
    }
}
