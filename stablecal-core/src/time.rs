//! Timezone-aware event timestamps.

use chrono::{DateTime, Datelike, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{ExportError, ExportResult};

/// A timezone-aware timestamp as it appears on a calendar component.
///
/// UTC timestamps are written with a trailing `Z`. Zoned timestamps are
/// written as local wall time with a `TZID` parameter and require a matching
/// VTIMEZONE in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTime {
    Utc(DateTime<Utc>),
    Zoned(DateTime<Tz>),
}

impl EventTime {
    /// Parse a producer timestamp.
    ///
    /// Accepts:
    /// - `2020-01-01T13:30:00Z` (UTC)
    /// - `2020-01-01T08:30:00-05:00` (fixed offset, normalized to UTC)
    /// - `2020-06-01T18:00:00-04:00[America/Toronto]` (zoned, offset must agree)
    /// - `2020-06-01T18:00:00[America/Toronto]` (zoned local time)
    ///
    /// Floating times (no offset, no zone) are rejected.
    pub fn parse(field: &'static str, input: &str) -> ExportResult<Self> {
        let input = input.trim();

        if let Some(open) = input.find('[') {
            let zone = input[open + 1..].strip_suffix(']').ok_or_else(|| {
                ExportError::invalid_record(field, format!("has an unterminated zone in '{input}'"))
            })?;
            let tz: Tz = zone.parse().map_err(|_| {
                ExportError::invalid_record(field, format!("names unknown timezone '{zone}'"))
            })?;
            return Self::parse_zoned(field, &input[..open], tz);
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(EventTime::Utc(dt.with_timezone(&Utc)));
        }

        if input.parse::<NaiveDateTime>().is_ok() {
            return Err(ExportError::invalid_record(
                field,
                format!("'{input}' has no timezone or UTC offset"),
            ));
        }

        Err(ExportError::invalid_record(
            field,
            format!("'{input}' is not a valid timestamp"),
        ))
    }

    fn parse_zoned(field: &'static str, stamp: &str, tz: Tz) -> ExportResult<Self> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
            let zoned = dt.with_timezone(&tz);
            if zoned.offset().fix() != *dt.offset() {
                return Err(ExportError::invalid_record(
                    field,
                    format!(
                        "offset {} in '{stamp}' does not match {} ({})",
                        dt.offset(),
                        tz.name(),
                        zoned.offset().fix()
                    ),
                ));
            }
            return Ok(EventTime::Zoned(zoned));
        }

        let naive: NaiveDateTime = stamp.parse().map_err(|_| {
            ExportError::invalid_record(field, format!("'{stamp}' is not a valid timestamp"))
        })?;

        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(EventTime::Zoned(dt)),
            LocalResult::Ambiguous(_, _) => Err(ExportError::invalid_record(
                field,
                format!("'{stamp}' is ambiguous in {}", tz.name()),
            )),
            LocalResult::None => Err(ExportError::invalid_record(
                field,
                format!("'{stamp}' does not exist in {}", tz.name()),
            )),
        }
    }

    /// The IANA zone name for zoned timestamps.
    pub fn tzid(&self) -> Option<&'static str> {
        match self {
            EventTime::Utc(_) => None,
            EventTime::Zoned(dt) => Some(dt.timezone().name()),
        }
    }

    pub fn timezone(&self) -> Option<Tz> {
        match self {
            EventTime::Utc(_) => None,
            EventTime::Zoned(dt) => Some(dt.timezone()),
        }
    }

    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::Utc(dt) => *dt,
            EventTime::Zoned(dt) => dt.with_timezone(&Utc),
        }
    }

    /// Calendar year of the timestamp in its own zone.
    pub fn local_year(&self) -> i32 {
        match self {
            EventTime::Utc(dt) => dt.year(),
            EventTime::Zoned(dt) => dt.year(),
        }
    }

    /// DATE-TIME value text (RFC 5545 §3.3.5), seconds precision.
    pub fn to_ics_value(&self) -> String {
        match self {
            EventTime::Utc(dt) => dt.format("%Y%m%dT%H%M%SZ").to_string(),
            EventTime::Zoned(dt) => dt.naive_local().format("%Y%m%dT%H%M%S").to_string(),
        }
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(dt: DateTime<Utc>) -> Self {
        EventTime::Utc(dt)
    }
}

impl From<DateTime<Tz>> for EventTime {
    fn from(dt: DateTime<Tz>) -> Self {
        EventTime::Zoned(dt)
    }
}
