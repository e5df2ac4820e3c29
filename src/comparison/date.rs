//! Report date parsing, for ordering only.
//!
//! Lab reports carry dates in whatever format the lab prints. Parsing here is
//! total: anything unreadable resolves to the Unix epoch so undated reports
//! sort before dated ones.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// `DD.MM.YYYY`, optionally followed by a time part.
static DOTTED_DMY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{4})\b").unwrap());

/// `YYYY-MM-DD`, optionally followed by a time part.
static ISO_YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:$|[T\s])").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%Y.%m.%d",
];

/// Earliest resolvable date; what missing and unreadable dates resolve to.
pub fn epoch() -> NaiveDateTime {
    DateTime::UNIX_EPOCH.naive_utc()
}

/// Resolve a report date string to a sortable timestamp. Never fails.
pub fn parse_report_date(raw: Option<&str>) -> NaiveDateTime {
    let Some(text) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return epoch();
    };

    match parse_known_patterns(text).or_else(|| parse_generic(text)) {
        Some(parsed) => parsed,
        None => {
            tracing::debug!(date = text, "Unrecognised report date, sorting as epoch");
            epoch()
        }
    }
}

fn parse_known_patterns(text: &str) -> Option<NaiveDateTime> {
    // Both branches keep the time of day when present so same-day reports
    // still order by time.
    if let Some(caps) = DOTTED_DMY.captures(text) {
        return parse_generic(text).or_else(|| ymd(&caps[3], &caps[2], &caps[1]));
    }
    if let Some(caps) = ISO_YMD.captures(text) {
        return parse_generic(text).or_else(|| ymd(&caps[1], &caps[2], &caps[3]));
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
    Some(date.and_time(NaiveTime::MIN))
}

fn parse_generic(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}
