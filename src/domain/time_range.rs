// Time-range normalization for user supplied dashboard bounds
use super::dashboard::TimeRange;
use super::error::{DashboardError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

pub const ABSOLUTE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static RELATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^now(?:[+-][0-9]+[hdmsy])?$").expect("valid relative time pattern"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d %b %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// A validated bound, ready to be written into a dashboard's `time` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    /// `now` or `now[+-]<n><unit>`, passed through verbatim.
    Relative(String),
    /// Normalized to `YYYY-MM-DD HH:MM:SS` (UTC when the input carried an offset).
    Absolute(String),
}

impl TimeBound {
    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        match self {
            TimeBound::Relative(s) | TimeBound::Absolute(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            TimeBound::Relative(s) | TimeBound::Absolute(s) => s,
        }
    }
}

pub fn normalize(input: &str) -> Result<TimeBound> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DashboardError::Validation("time bound is empty".to_string()));
    }

    if RELATIVE.is_match(trimmed) {
        return Ok(TimeBound::Relative(trimmed.to_string()));
    }

    // Anything mentioning `now` that failed the relative pattern is malformed,
    // never a date.
    if trimmed.to_ascii_lowercase().contains("now") {
        return Err(DashboardError::Validation(format!(
            "malformed relative time: {}",
            trimmed
        )));
    }

    parse_absolute(trimmed)
        .map(|dt| TimeBound::Absolute(dt.format(ABSOLUTE_FORMAT).to_string()))
        .ok_or_else(|| DashboardError::Validation(format!("unrecognized time: {}", trimmed)))
}

/// Normalizes both bounds; a missing or blank `to` means `now`.
pub fn normalize_range(from: &str, to: Option<&str>) -> Result<TimeRange> {
    let from = normalize(from)?;
    let to = match to.map(str::trim).filter(|s| !s.is_empty()) {
        Some(to) => normalize(to)?,
        None => TimeBound::Relative("now".to_string()),
    };
    Ok(TimeRange {
        from: from.into_string(),
        to: to.into_string(),
    })
}

fn parse_absolute(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(input) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S %z"] {
        if let Ok(dt) = DateTime::parse_from_str(input, fmt) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_passthrough() {
        assert_eq!(normalize("now-24h").unwrap(), TimeBound::Relative("now-24h".to_string()));
        assert_eq!(normalize("now").unwrap().as_str(), "now");
        assert_eq!(normalize("now+3d").unwrap().as_str(), "now+3d");
        assert_eq!(normalize(" now-1y ").unwrap().as_str(), "now-1y");
    }

    #[test]
    fn test_malformed_relative_rejected() {
        assert!(normalize("now-24").is_err());
        assert!(normalize("now-h").is_err());
        assert!(normalize("now-5w").is_err());
        assert!(normalize("24h-now").is_err());
    }

    #[test]
    fn test_absolute_normalized() {
        assert_eq!(
            normalize("2023-05-01 10:00:00").unwrap(),
            TimeBound::Absolute("2023-05-01 10:00:00".to_string())
        );
        assert_eq!(normalize("2023-05-01").unwrap().as_str(), "2023-05-01 00:00:00");
        assert_eq!(normalize("2023-05-01T10:15").unwrap().as_str(), "2023-05-01 10:15:00");
        assert_eq!(normalize("05/01/2023 08:30:00").unwrap().as_str(), "2023-05-01 08:30:00");
        assert_eq!(
            normalize("2023-05-01T10:00:00+02:00").unwrap().as_str(),
            "2023-05-01 08:00:00"
        );
    }

    #[test]
    fn test_garbage_rejected() {
        let err = normalize("not-a-date").unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
        assert!(normalize("").is_err());
        assert!(normalize("2023-13-45").is_err());
    }

    #[test]
    fn test_range_defaults_to_now() {
        let range = normalize_range("now-6h", None).unwrap();
        assert_eq!(range.from, "now-6h");
        assert_eq!(range.to, "now");

        let range = normalize_range("2023-05-01", Some("  ")).unwrap();
        assert_eq!(range.to, "now");

        assert!(normalize_range("now-6h", Some("later")).is_err());
    }
}
