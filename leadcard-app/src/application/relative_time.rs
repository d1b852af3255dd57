use crate::domain::LastVerified;
use chrono::{DateTime, Utc};

pub const INVALID_DATE: &str = "Invalid Date";

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60.0 * MS_PER_SECOND;
const MS_PER_HOUR: f64 = 60.0 * MS_PER_MINUTE;
const MS_PER_DAY: f64 = 24.0 * MS_PER_HOUR;
const DAYS_PER_MONTH: f64 = 30.436_875;

#[derive(Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// Bands walked in order; a band applies when the rounded amount of its unit
/// stays within `max`. Bands without a `unit` reuse the previous amount.
struct Band {
    unit: Option<Unit>,
    max: Option<u64>,
    label: Label,
}

#[derive(Clone, Copy)]
enum Label {
    Fixed(&'static str),
    Counted(&'static str),
}

const BANDS: &[Band] = &[
    Band { unit: Some(Unit::Second), max: Some(44), label: Label::Fixed("a few seconds") },
    Band { unit: None, max: Some(89), label: Label::Fixed("a minute") },
    Band { unit: Some(Unit::Minute), max: Some(44), label: Label::Counted("minutes") },
    Band { unit: None, max: Some(89), label: Label::Fixed("an hour") },
    Band { unit: Some(Unit::Hour), max: Some(21), label: Label::Counted("hours") },
    Band { unit: None, max: Some(35), label: Label::Fixed("a day") },
    Band { unit: Some(Unit::Day), max: Some(25), label: Label::Counted("days") },
    Band { unit: None, max: Some(45), label: Label::Fixed("a month") },
    Band { unit: Some(Unit::Month), max: Some(10), label: Label::Counted("months") },
    Band { unit: None, max: Some(17), label: Label::Fixed("a year") },
    Band { unit: Some(Unit::Year), max: None, label: Label::Counted("years") },
];

/// "3 hours ago" / "in 2 days" style phrase for `then` as seen from `now`.
pub fn from_now(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (now - then).num_milliseconds();
    let phrase = phrase_for(diff_ms.unsigned_abs() as f64);
    if diff_ms >= 0 {
        format!("{} ago", phrase)
    } else {
        format!("in {}", phrase)
    }
}

/// Relative phrase for a "last verified" stamp; unreadable stamps give
/// [`INVALID_DATE`].
pub fn verified_from_now(last_verified: &LastVerified, now: DateTime<Utc>) -> String {
    last_verified
        .to_datetime()
        .map(|then| from_now(then, now))
        .unwrap_or_else(|| INVALID_DATE.to_string())
}

fn phrase_for(ms: f64) -> String {
    let mut amount = 0;
    for band in BANDS {
        if let Some(unit) = band.unit {
            amount = rounded(ms, unit);
        }
        if band.max.map_or(true, |max| amount <= max) {
            return match band.label {
                Label::Fixed(text) => text.to_string(),
                Label::Counted(unit) => format!("{} {}", amount, unit),
            };
        }
    }
    format!("{} years", amount)
}

fn rounded(ms: f64, unit: Unit) -> u64 {
    let value = match unit {
        Unit::Second => ms / MS_PER_SECOND,
        Unit::Minute => ms / MS_PER_MINUTE,
        Unit::Hour => ms / MS_PER_HOUR,
        Unit::Day => ms / MS_PER_DAY,
        Unit::Month => ms / MS_PER_DAY / DAYS_PER_MONTH,
        Unit::Year => ms / MS_PER_DAY / DAYS_PER_MONTH / 12.0,
    };
    value.round() as u64
}
