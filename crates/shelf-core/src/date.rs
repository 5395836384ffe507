//! Date values accepted by `date` fields.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A front-matter date, normalized to UTC.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) and YAML timestamps: a date and time
/// separated by `T`, `t` or whitespace, optional fractional seconds and an
/// optional zone (`Z`, `+HH:MM`, `-HH` or `-H`, possibly after whitespace).
/// A timestamp without a zone is taken as UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentDate(DateTime<Utc>);

impl ContentDate {
    /// Parse a date from its front-matter string form.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.with_timezone(&Utc)));
        }

        if let Some(dt) = parse_timestamp(value) {
            return Some(Self(dt));
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| Self(dt.and_utc()))
    }

    /// The underlying UTC timestamp.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// The calendar date.
    pub fn date_naive(&self) -> NaiveDate {
        self.0.date_naive()
    }

    fn is_midnight(&self) -> bool {
        self.0.num_seconds_from_midnight() == 0 && self.0.nanosecond() == 0
    }
}

/// Parse a YAML 1.1 timestamp with a time part.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let split = value.find(['T', 't', ' ', '\t'])?;
    let (date, rest) = value.split_at(split);
    let rest = rest[1..].trim_start();

    let (time, offset) = split_zone(rest)?;
    let naive = NaiveDateTime::parse_from_str(
        &format!("{date}T{}", time.trim_end()),
        "%Y-%m-%dT%H:%M:%S%.f",
    )
    .ok()?;

    let local = FixedOffset::east_opt(offset)?
        .from_local_datetime(&naive)
        .single()?;
    Some(local.with_timezone(&Utc))
}

/// Split a time part into the clock time and its zone offset in seconds.
fn split_zone(rest: &str) -> Option<(&str, i32)> {
    if let Some(time) = rest.strip_suffix(['Z', 'z']) {
        return Some((time, 0));
    }

    let Some(sign_at) = rest.rfind(['+', '-']) else {
        return Some((rest, 0));
    };
    let (time, zone) = rest.split_at(sign_at);
    let sign = if zone.starts_with('-') { -1 } else { 1 };

    let (hours, minutes) = match zone[1..].split_once(':') {
        Some((h, m)) if m.len() == 2 => (h, m),
        Some(_) => return None,
        None => (&zone[1..], "0"),
    };
    if hours.is_empty() || hours.len() > 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }

    Some((time, sign * (hours * 3600 + minutes * 60)))
}

impl From<DateTime<Utc>> for ContentDate {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for ContentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_midnight() {
            write!(f, "{}", self.0.format("%Y-%m-%d"))
        } else {
            write!(f, "{}", self.0.to_rfc3339())
        }
    }
}

impl Serialize for ContentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: {raw}")))
    }
}
