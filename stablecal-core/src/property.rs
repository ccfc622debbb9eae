//! Property names and typed property values.

use chrono::{FixedOffset, NaiveDateTime};

use crate::ics::escape_text;
use crate::time::EventTime;

/// Every property this crate knows how to emit.
///
/// Declaration order is the canonical emission order: properties of a
/// component are always written in this order, at every nesting level. The
/// leading names follow the conventional iCalendar ordering (`VERSION` before
/// `PRODID`, `SUMMARY` before `DTSTART`, `DTSTART` before the offsets), the
/// rest are in ASCII order of their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyName {
    Version,
    ProdId,
    Method,
    Summary,
    DtStart,
    DtEnd,
    DtStamp,
    Uid,
    TzId,
    TzOffsetTo,
    TzOffsetFrom,
    Description,
    Location,
    RRule,
    TzName,
    Url,
    XWrCalName,
}

impl PropertyName {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyName::Version => "VERSION",
            PropertyName::ProdId => "PRODID",
            PropertyName::Method => "METHOD",
            PropertyName::Summary => "SUMMARY",
            PropertyName::DtStart => "DTSTART",
            PropertyName::DtEnd => "DTEND",
            PropertyName::DtStamp => "DTSTAMP",
            PropertyName::Uid => "UID",
            PropertyName::TzId => "TZID",
            PropertyName::TzOffsetTo => "TZOFFSETTO",
            PropertyName::TzOffsetFrom => "TZOFFSETFROM",
            PropertyName::Description => "DESCRIPTION",
            PropertyName::Location => "LOCATION",
            PropertyName::RRule => "RRULE",
            PropertyName::TzName => "TZNAME",
            PropertyName::Url => "URL",
            PropertyName::XWrCalName => "X-WR-CALNAME",
        }
    }

    /// Look up a property by its wire name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_uppercase();
        let found = match name.as_str() {
            "VERSION" => PropertyName::Version,
            "PRODID" => PropertyName::ProdId,
            "METHOD" => PropertyName::Method,
            "SUMMARY" => PropertyName::Summary,
            "DTSTART" => PropertyName::DtStart,
            "DTEND" => PropertyName::DtEnd,
            "DTSTAMP" => PropertyName::DtStamp,
            "UID" => PropertyName::Uid,
            "TZID" => PropertyName::TzId,
            "TZOFFSETTO" => PropertyName::TzOffsetTo,
            "TZOFFSETFROM" => PropertyName::TzOffsetFrom,
            "DESCRIPTION" => PropertyName::Description,
            "LOCATION" => PropertyName::Location,
            "RRULE" => PropertyName::RRule,
            "TZNAME" => PropertyName::TzName,
            "URL" => PropertyName::Url,
            "X-WR-CALNAME" => PropertyName::XWrCalName,
            _ => return None,
        };
        Some(found)
    }
}

impl std::fmt::Display for PropertyName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// TEXT, escaped on output
    Text(String),
    /// DATE-TIME in UTC or with a TZID parameter
    DateTime(EventTime),
    /// DATE-TIME without zone, used for observance starts inside VTIMEZONE
    LocalDateTime(NaiveDateTime),
    /// UTC-OFFSET
    UtcOffset(FixedOffset),
    /// RECUR, written verbatim
    Recur(String),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_event_time(&self) -> Option<&EventTime> {
        match self {
            Value::DateTime(t) => Some(t),
            _ => None,
        }
    }

    /// Parameters that belong on the content line, already formatted
    /// (e.g. `;TZID=America/Toronto`).
    pub fn params(&self) -> String {
        match self {
            Value::DateTime(time) => match time.tzid() {
                Some(tzid) => format!(";TZID={}", quote_param(tzid)),
                None => String::new(),
            },
            _ => String::new(),
        }
    }

    /// Value text as it appears after the colon of the content line.
    pub fn to_ics(&self) -> String {
        match self {
            Value::Text(s) => escape_text(s),
            Value::DateTime(time) => time.to_ics_value(),
            Value::LocalDateTime(dt) => dt.format("%Y%m%dT%H%M%S").to_string(),
            Value::UtcOffset(offset) => format_utc_offset(offset),
            Value::Recur(rule) => rule.clone(),
        }
    }
}

impl From<EventTime> for Value {
    fn from(time: EventTime) -> Self {
        Value::DateTime(time)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Format a UTC offset as `+HHMM`, or `+HHMMSS` when seconds are present.
pub fn format_utc_offset(offset: &FixedOffset) -> String {
    let total = offset.local_minus_utc();
    let sign = if total < 0 { '-' } else { '+' };
    let total = total.abs();
    let (hours, minutes, seconds) = (total / 3600, (total / 60) % 60, total % 60);

    if seconds == 0 {
        format!("{sign}{hours:02}{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}{seconds:02}")
    }
}

/// Parameter values containing `:`, `;` or `,` must be quoted.
fn quote_param(value: &str) -> String {
    if value.contains([':', ';', ',']) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}
