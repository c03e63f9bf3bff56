//! Temporal scoring: idle time since last CRM activity and buyer reply latency.
//!
//! Both functions are total. Bad timestamps turn into a warning and a neutral
//! value (`0` idle days, `+inf` reply speed) instead of an error, so one
//! malformed row never aborts a batch.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

use crate::pipeline::types::Message;

/// Offset-carrying layouts tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
];

/// Naive layouts, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp (`Z` suffix, explicit offset, naive, or date only).
///
/// The timestamp's own offset is kept so calendar dates are taken where the
/// activity happened.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }

    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Some(dt);
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc().fixed_offset());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Whole calendar days between `last_activity` and `reference`.
///
/// Time of day is ignored. Future activity counts as `0`, as does an
/// unparseable timestamp (logged as a data-quality warning).
pub fn idle_days(last_activity: &str, reference: DateTime<Utc>) -> i64 {
    let Some(activity) = parse_timestamp(last_activity) else {
        warn!(
            last_activity = %last_activity,
            "Invalid timestamp format for last_activity, treating as 0 idle days"
        );
        return 0;
    };

    let activity_date = activity.date_naive();
    let today = reference.date_naive();

    if activity_date > today {
        warn!(
            last_activity = %last_activity,
            "last_activity is in the future, treating as 0 idle days"
        );
        return 0;
    }

    (today - activity_date).num_days()
}

/// Median minutes between a `sender` message and the `counterparty` message right after it.
///
/// Only strictly positive gaps count; equal or out-of-order timestamps are
/// dropped, not treated as instant replies. A pair with a missing or
/// unparseable timestamp is skipped. Returns `+inf` when no gap survives.
pub fn reply_speed(thread: &[Message], sender: &str, counterparty: &str) -> f64 {
    let mut gaps = Vec::new();

    for pair in thread.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        if prev.from_addr() != Some(sender) || curr.from_addr() != Some(counterparty) {
            continue;
        }

        let sent = prev.ts.as_deref().and_then(parse_timestamp);
        let replied = curr.ts.as_deref().and_then(parse_timestamp);
        let (Some(sent), Some(replied)) = (sent, replied) else {
            warn!(
                sent_ts = prev.ts.as_deref().unwrap_or("<missing>"),
                reply_ts = curr.ts.as_deref().unwrap_or("<missing>"),
                "Invalid or missing timestamp in reply pair, skipping"
            );
            continue;
        };

        let minutes = (replied - sent).num_milliseconds() as f64 / 60_000.0;
        if minutes > 0.0 {
            gaps.push(minutes);
        }
    }

    median(&gaps).unwrap_or(f64::INFINITY)
}

/// Statistical median; the mean of the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Round to one decimal place. Infinity passes through.
///
/// Rounds the exact binary value, ties to even, so `0.25` becomes `0.2` and
/// `0.35` (stored just below) becomes `0.3`.
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}
